use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stored discriminant of a column's type. Bounds live in separate columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text", enum_name = "column_kind_enum")]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    #[sea_orm(string_value = "string")]
    String,
    #[sea_orm(string_value = "int")]
    Int,
    #[sea_orm(string_value = "stars")]
    Stars,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::String => "string",
            ColumnKind::Int => "int",
            ColumnKind::Stars => "stars",
        };
        f.write_str(name)
    }
}

impl FromStr for ColumnKind {
    type Err = String;

    /// Accepts the stored names case-insensitively, plus the synonyms
    /// "text", "integer" and "number".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "text" => Ok(ColumnKind::String),
            "int" | "integer" | "number" => Ok(ColumnKind::Int),
            "stars" => Ok(ColumnKind::Stars),
            other => Err(format!("unknown column type '{other}'")),
        }
    }
}
