use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use std::collections::HashMap;
use tracing::debug;

use crate::db::entities::prelude::AttributeValue;
use crate::db::entities::{attribute_value, column_definition, item};
use crate::db::models::{AttributeIndex, CellRef, ItemCell};
use crate::db::services::{column_definition_service, item_service};
use crate::error::ListError;
use crate::validation::{self, ValidatedValue};

// --- Attribute Value Service Functions ---

fn ensure_same_list(
    item: &item::Model,
    definition: &column_definition::Model,
) -> Result<(), ListError> {
    if item.list_id != definition.list_id {
        return Err(ListError::InvalidInput(format!(
            "Column {} belongs to list {}, but item {} is in list {}",
            definition.id, definition.list_id, item.id, item.list_id
        )));
    }
    Ok(())
}

/// Validates `raw` against the column's type and stores it for the item.
///
/// Empty input removes the stored value and returns `None`.
pub async fn set<C>(
    db: &C,
    item: &item::Model,
    definition: &column_definition::Model,
    raw: &str,
) -> Result<Option<attribute_value::Model>, ListError>
where
    C: ConnectionTrait,
{
    ensure_same_list(item, definition)?;
    let validated = validation::validate(&definition.column_type(), raw)?;
    write_validated(db, item.id, definition.id, validated).await
}

async fn write_validated<C>(
    db: &C,
    item_id: i64,
    definition_id: i64,
    validated: ValidatedValue,
) -> Result<Option<attribute_value::Model>, ListError>
where
    C: ConnectionTrait,
{
    let existing = find_for_cell(db, item_id, definition_id).await?;
    let Some(value) = validated.into_stored() else {
        if let Some(existing) = existing {
            AttributeValue::delete_by_id(existing.id).exec(db).await?;
            debug!(item_id, definition_id, "Cleared attribute value.");
        }
        return Ok(None);
    };

    let saved = match existing {
        Some(existing) if existing.value == value => existing,
        Some(existing) => {
            let mut active_value = existing.into_active_model();
            active_value.value = Set(value);
            active_value.update(db).await?
        }
        None => {
            attribute_value::ActiveModel {
                item_id: Set(item_id),
                definition_id: Set(definition_id),
                value: Set(value),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };
    Ok(Some(saved))
}

/// Same as [`set`], resolving the item and column by id first.
pub async fn set_by_id<C>(
    db: &C,
    item_id: i64,
    definition_id: i64,
    raw: &str,
) -> Result<Option<attribute_value::Model>, ListError>
where
    C: ConnectionTrait,
{
    let item = item_service::find_by_id(db, item_id)
        .await?
        .ok_or_else(|| ListError::NotFound(format!("Item {item_id}")))?;
    let definition = column_definition_service::find_by_id(db, definition_id)
        .await?
        .ok_or_else(|| ListError::NotFound(format!("Column {definition_id}")))?;
    set(db, &item, &definition, raw).await
}

pub async fn find_by_id<C>(db: &C, value_id: i64) -> Result<Option<attribute_value::Model>, DbErr>
where
    C: ConnectionTrait,
{
    AttributeValue::find_by_id(value_id).one(db).await
}

pub async fn find_by_item<C>(db: &C, item_id: i64) -> Result<Vec<attribute_value::Model>, DbErr>
where
    C: ConnectionTrait,
{
    AttributeValue::find()
        .filter(attribute_value::Column::ItemId.eq(item_id))
        .order_by_asc(attribute_value::Column::Id)
        .all(db)
        .await
}

pub async fn find_by_definition<C>(
    db: &C,
    definition_id: i64,
) -> Result<Vec<attribute_value::Model>, DbErr>
where
    C: ConnectionTrait,
{
    AttributeValue::find()
        .filter(attribute_value::Column::DefinitionId.eq(definition_id))
        .order_by_asc(attribute_value::Column::Id)
        .all(db)
        .await
}

/// The stored value of one cell, if any.
pub async fn find_for_cell<C>(
    db: &C,
    item_id: i64,
    definition_id: i64,
) -> Result<Option<attribute_value::Model>, DbErr>
where
    C: ConnectionTrait,
{
    AttributeValue::find()
        .filter(attribute_value::Column::ItemId.eq(item_id))
        .filter(attribute_value::Column::DefinitionId.eq(definition_id))
        .one(db)
        .await
}

pub async fn delete<C>(db: &C, value_id: i64) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    AttributeValue::delete_by_id(value_id).exec(db).await?;
    Ok(())
}

pub async fn delete_all_for_item<C>(db: &C, item_id: i64) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let res = AttributeValue::delete_many()
        .filter(attribute_value::Column::ItemId.eq(item_id))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

pub async fn delete_all_for_items<C>(db: &C, item_ids: Vec<i64>) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    if item_ids.is_empty() {
        return Ok(0);
    }
    let res = AttributeValue::delete_many()
        .filter(attribute_value::Column::ItemId.is_in(item_ids))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

pub async fn delete_all_for_definition<C>(db: &C, definition_id: i64) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let res = AttributeValue::delete_many()
        .filter(attribute_value::Column::DefinitionId.eq(definition_id))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

pub async fn delete_all_for_definitions<C>(db: &C, definition_ids: Vec<i64>) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    if definition_ids.is_empty() {
        return Ok(0);
    }
    let res = AttributeValue::delete_many()
        .filter(attribute_value::Column::DefinitionId.is_in(definition_ids))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

/// One cell per column of the item's list, in column order. Columns without
/// a stored value come back as `CellRef::Pending`.
pub async fn cells_for_item<C>(db: &C, item: &item::Model) -> Result<Vec<ItemCell>, DbErr>
where
    C: ConnectionTrait,
{
    let definitions = column_definition_service::find_by_list(db, item.list_id).await?;
    let mut values: HashMap<i64, attribute_value::Model> = find_by_item(db, item.id)
        .await?
        .into_iter()
        .map(|value| (value.definition_id, value))
        .collect();

    Ok(definitions
        .into_iter()
        .map(|definition| match values.remove(&definition.id) {
            Some(value) => ItemCell {
                cell: CellRef::Existing(value.id),
                value: Some(value.value),
                definition,
            },
            None => ItemCell {
                cell: CellRef::Pending(definition.id),
                value: None,
                definition,
            },
        })
        .collect())
}

/// Applies a batch of form edits to one item.
///
/// Every edit is resolved and validated before anything is written; the
/// writes then run in one transaction. Returns the item's values afterwards.
pub async fn apply_cell_edits<C>(
    db: &C,
    item: &item::Model,
    edits: &[(CellRef, String)],
) -> Result<Vec<attribute_value::Model>, ListError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let mut resolved = Vec::with_capacity(edits.len());
    for (cell, raw) in edits {
        let definition_id = match *cell {
            CellRef::Existing(value_id) => {
                let value = find_by_id(db, value_id)
                    .await?
                    .filter(|value| value.item_id == item.id)
                    .ok_or_else(|| {
                        ListError::NotFound(format!("Value {value_id} on item {}", item.id))
                    })?;
                value.definition_id
            }
            CellRef::Pending(definition_id) => definition_id,
        };
        let definition = column_definition_service::find_by_id(db, definition_id)
            .await?
            .ok_or_else(|| ListError::NotFound(format!("Column {definition_id}")))?;
        ensure_same_list(item, &definition)?;
        let validated = validation::validate(&definition.column_type(), raw)?;
        resolved.push((definition.id, validated));
    }

    let txn = db.begin().await?;
    for (definition_id, validated) in resolved {
        write_validated(&txn, item.id, definition_id, validated).await?;
    }
    txn.commit().await?;

    Ok(find_by_item(db, item.id).await?)
}

/// Every value stored for items of the list, keyed by `(item, column)`.
pub async fn index_for_list<C>(db: &C, list_id: i64) -> Result<AttributeIndex, DbErr>
where
    C: ConnectionTrait,
{
    let values = AttributeValue::find()
        .join(JoinType::InnerJoin, attribute_value::Relation::Item.def())
        .filter(item::Column::ListId.eq(list_id))
        .all(db)
        .await?;
    Ok(values.into_iter().collect())
}
