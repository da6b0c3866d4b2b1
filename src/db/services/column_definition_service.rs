use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};
use tracing::{debug, info};

use crate::db::entities::prelude::ColumnDefinition;
use crate::db::entities::{collection, column_definition, list};
use crate::db::models::{ColumnType, ColumnTypeSpec};
use crate::db::services::quota_service::{self, QuotaLimits};
use crate::db::services::{attribute_value_service, list_service};
use crate::error::ListError;

// --- Column Definition Service Functions ---

/// Trims a column name and rejects blank ones.
pub fn normalize_name(name: &str) -> Result<String, ListError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ListError::InvalidInput("Column name cannot be empty".to_string()));
    }
    Ok(trimmed.to_owned())
}

async fn next_position<C>(db: &C, list_id: i64) -> Result<i32, DbErr>
where
    C: ConnectionTrait,
{
    let last = ColumnDefinition::find()
        .filter(column_definition::Column::ListId.eq(list_id))
        .order_by_desc(column_definition::Column::Position)
        .one(db)
        .await?;
    Ok(last.map(|c| c.position + 1).unwrap_or(0))
}

/// Adds a column to a list. Names are compared exactly (case-sensitive)
/// against the list's other columns, and `Int` bounds must not be inverted.
pub async fn create<C>(
    db: &C,
    list_id: i64,
    name: &str,
    column_type: ColumnType,
) -> Result<column_definition::Model, ListError>
where
    C: ConnectionTrait,
{
    let name = normalize_name(name)?;
    column_type.check()?;
    if list_service::find_list(db, list_id).await?.is_none() {
        return Err(ListError::NotFound(format!("List {list_id}")));
    }
    if find_by_name(db, &name, list_id).await?.is_some() {
        return Err(ListError::DuplicateName(name));
    }

    let (min_value, max_value) = column_type.stored_bounds();
    let new_column = column_definition::ActiveModel {
        list_id: Set(list_id),
        name: Set(name),
        kind: Set(column_type.kind()),
        min_value: Set(min_value),
        max_value: Set(max_value),
        position: Set(next_position(db, list_id).await?),
        ..Default::default()
    };
    let created = new_column.insert(db).await?;
    debug!(definition_id = created.id, list_id, kind = %created.kind, "Column created.");
    Ok(created)
}

/// The user-facing "add column" flow: checks ownership and the column quota,
/// then creates the column.
pub async fn add_column<C>(
    db: &C,
    user_id: i64,
    list_id: i64,
    name: &str,
    spec: &ColumnTypeSpec,
    limits: &QuotaLimits,
) -> Result<column_definition::Model, ListError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let column_type = ColumnType::from_spec(spec)?;

    let txn = db.begin().await?;
    list_service::find_owned_list(&txn, list_id, user_id).await?;
    quota_service::column_quota(&txn, user_id, limits)
        .await?
        .ensure_room()?;
    let created = create(&txn, list_id, name, column_type).await?;
    txn.commit().await?;
    Ok(created)
}

/// Renames a column. The type cannot be changed after creation.
pub async fn rename<C>(
    db: &C,
    definition_id: i64,
    new_name: &str,
) -> Result<column_definition::Model, ListError>
where
    C: ConnectionTrait,
{
    let name = normalize_name(new_name)?;
    let definition = find_by_id(db, definition_id)
        .await?
        .ok_or_else(|| ListError::NotFound(format!("Column {definition_id}")))?;

    if definition.name == name {
        return Ok(definition);
    }
    if find_by_name(db, &name, definition.list_id).await?.is_some() {
        return Err(ListError::DuplicateName(name));
    }

    let mut active_column = definition.into_active_model();
    active_column.name = Set(name);
    Ok(active_column.update(db).await?)
}

pub async fn find_by_id<C>(db: &C, definition_id: i64) -> Result<Option<column_definition::Model>, DbErr>
where
    C: ConnectionTrait,
{
    ColumnDefinition::find_by_id(definition_id).one(db).await
}

/// Columns of a list in display order.
pub async fn find_by_list<C>(db: &C, list_id: i64) -> Result<Vec<column_definition::Model>, DbErr>
where
    C: ConnectionTrait,
{
    ColumnDefinition::find()
        .filter(column_definition::Column::ListId.eq(list_id))
        .order_by_asc(column_definition::Column::Position)
        .order_by_asc(column_definition::Column::Id)
        .all(db)
        .await
}

pub async fn find_by_name<C>(
    db: &C,
    name: &str,
    list_id: i64,
) -> Result<Option<column_definition::Model>, DbErr>
where
    C: ConnectionTrait,
{
    ColumnDefinition::find()
        .filter(column_definition::Column::ListId.eq(list_id))
        .filter(column_definition::Column::Name.eq(name.trim()))
        .one(db)
        .await
}

/// Deletes a column and every value stored under it. Unknown ids are a no-op.
pub async fn delete<C>(db: &C, definition_id: i64) -> Result<(), DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let Some(definition) = find_by_id(db, definition_id).await? else {
        return Ok(());
    };

    let txn = db.begin().await?;
    let values_removed =
        attribute_value_service::delete_all_for_definition(&txn, definition.id).await?;
    ColumnDefinition::delete_by_id(definition.id).exec(&txn).await?;
    txn.commit().await?;

    info!(
        definition_id,
        list_id = definition.list_id,
        values_removed,
        "Column deleted."
    );
    Ok(())
}

/// Deletes every column of a list, values first. Returns the number of
/// columns removed.
pub async fn delete_all_for_list<C>(db: &C, list_id: i64) -> Result<u64, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let ids: Vec<i64> = find_by_list(db, list_id)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();
    if ids.is_empty() {
        return Ok(0);
    }

    let txn = db.begin().await?;
    attribute_value_service::delete_all_for_definitions(&txn, ids).await?;
    let removed = ColumnDefinition::delete_many()
        .filter(column_definition::Column::ListId.eq(list_id))
        .exec(&txn)
        .await?
        .rows_affected;
    txn.commit().await?;
    Ok(removed)
}

/// Number of columns across every list the user owns.
pub async fn count_for_user<C>(db: &C, user_id: i64) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    ColumnDefinition::find()
        .join(JoinType::InnerJoin, column_definition::Relation::List.def())
        .join(JoinType::InnerJoin, list::Relation::Collection.def())
        .filter(collection::Column::UserId.eq(user_id))
        .count(db)
        .await
}
