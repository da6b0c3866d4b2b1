//! The `services` module is the data-access API of the crate. Each sub-module
//! owns the queries for one area (lists, columns, values, items) or one
//! multi-step operation (import, move, cascading delete), so callers work
//! with entity models without touching the schema.
//!
//! Every function takes any `ConnectionTrait`, so it runs on the pool or
//! inside a caller's transaction. Multi-step operations also need
//! `TransactionTrait` and open their own transaction (a savepoint when the
//! caller already holds one).

pub mod attribute_value_service;
pub mod column_definition_service;
pub mod column_import_service;
pub mod deletion_service;
pub mod item_move_service;
pub mod item_service;
pub mod list_service;
pub mod quota_service;

pub use column_import_service::import_columns;
pub use deletion_service::{delete_collection, delete_item, delete_list, delete_user};
pub use item_move_service::{move_item, transfer_item};
pub use quota_service::{Quota, QuotaLimits};
