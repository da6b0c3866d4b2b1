use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::db::models::RemapTable;

/// Why a raw cell value was rejected by its column type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("{value} is below the minimum of {min}")]
    BelowMinimum { value: i64, min: i64 },
    #[error("{value} is above the maximum of {max}")]
    AboveMaximum { value: i64, max: i64 },
    #[error("{value} is outside the 0 to 5 star range")]
    StarsOutOfRange { value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaResource {
    Columns,
    Items,
}

impl fmt::Display for QuotaResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaResource::Columns => f.write_str("column"),
            QuotaResource::Items => f.write_str("item"),
        }
    }
}

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    DuplicateName,
    NotFound,
    QuotaExceeded,
    StorageFailure,
}

#[derive(Error, Debug)]
pub enum ListError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid value: {0}")]
    InvalidValue(#[from] ValueError),
    #[error("The name '{0}' is already used in this list")]
    DuplicateName(String),
    /// Missing, or not owned by the caller. The two are deliberately not
    /// distinguished.
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("{resource} quota reached ({used} of {limit})")]
    QuotaExceeded {
        resource: QuotaResource,
        used: u64,
        limit: u64,
    },
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl ListError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ListError::InvalidInput(_) | ListError::InvalidValue(_) => ErrorKind::InvalidInput,
            ListError::DuplicateName(_) => ErrorKind::DuplicateName,
            ListError::NotFound(_) => ErrorKind::NotFound,
            ListError::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            ListError::Database(_) => ErrorKind::StorageFailure,
        }
    }
}

/// A column import that stopped partway. `resolved` holds the remap pairs
/// worked out before the failure; the import runs in a transaction, so any
/// columns it created for them have been rolled back.
#[derive(Error, Debug)]
#[error("column import failed after {} resolved column(s): {error}", .resolved.len())]
pub struct ImportError {
    pub resolved: RemapTable,
    #[source]
    pub error: ListError,
}

impl ImportError {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

impl From<ImportError> for ListError {
    fn from(err: ImportError) -> Self {
        err.error
    }
}
