//! Custom per-list columns for collection lists.
//!
//! Users own collections, collections hold lists, and every list can define
//! typed columns (`String`, bounded `Int`, 0-5 `Stars`) whose per-item values
//! live in a sparse attribute table. The services under [`db::services`]
//! cover column and value storage, importing one list's columns into
//! another, moving items between lists, and cascading deletes.

pub mod config;
pub mod db;
pub mod error;
pub mod validation;

pub use config::{AppConfig, ConfigError};
pub use db::models::{ColumnType, ColumnTypeSpec, MovedItem, RemapPair, RemapTable};
pub use error::{ErrorKind, ImportError, ListError, ValueError};
