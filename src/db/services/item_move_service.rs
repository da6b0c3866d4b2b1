use sea_orm::{ConnectionTrait, TransactionTrait};
use tracing::{info, warn};

use crate::db::models::{MovedItem, RemapTable};
use crate::db::services::item_service::{self, NewItem};
use crate::db::services::quota_service::{self, QuotaLimits};
use crate::db::services::{
    attribute_value_service, column_definition_service, column_import_service, deletion_service,
    list_service,
};
use crate::error::ListError;

/// Moves (or copies, with `make_copy`) an item into another list.
///
/// The item's name, url and rating are cloned into `to_list_id`, and each of
/// its values is written under the column `remap` maps its column to. Values
/// whose column has no remap entry are not copied; their source column ids
/// are returned in `dropped_definitions`. Runs in one transaction.
pub async fn move_item<C>(
    db: &C,
    item_id: i64,
    from_list_id: i64,
    to_list_id: i64,
    remap: &RemapTable,
    make_copy: bool,
) -> Result<MovedItem, ListError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;

    let source = item_service::find_by_id(&txn, item_id)
        .await?
        .filter(|item| item.list_id == from_list_id)
        .ok_or_else(|| ListError::NotFound(format!("Item {item_id} in list {from_list_id}")))?;
    if list_service::find_list(&txn, to_list_id).await?.is_none() {
        return Err(ListError::NotFound(format!("List {to_list_id}")));
    }
    if item_service::find_by_name(&txn, to_list_id, &source.name)
        .await?
        .is_some()
    {
        return Err(ListError::DuplicateName(source.name));
    }

    let moved = item_service::insert_item(&txn, to_list_id, &NewItem::from(&source)).await?;

    let mut dropped_definitions = Vec::new();
    for value in attribute_value_service::find_by_item(&txn, source.id).await? {
        let Some(target_id) = remap.lookup(value.definition_id) else {
            dropped_definitions.push(value.definition_id);
            continue;
        };
        let target = column_definition_service::find_by_id(&txn, target_id)
            .await?
            .ok_or_else(|| ListError::NotFound(format!("Column {target_id}")))?;
        attribute_value_service::set(&txn, &moved, &target, &value.value).await?;
    }

    if !make_copy {
        deletion_service::delete_item(&txn, source.id).await?;
    }
    txn.commit().await?;

    if !dropped_definitions.is_empty() {
        warn!(
            item_id,
            new_item_id = moved.id,
            dropped = ?dropped_definitions,
            "Values without a remapped column were not carried over."
        );
    }
    info!(
        item_id,
        new_item_id = moved.id,
        from_list_id,
        to_list_id,
        make_copy,
        "Item moved."
    );
    Ok(MovedItem {
        item: moved,
        dropped_definitions,
    })
}

/// Moves an item between two of the user's lists, importing the source
/// list's columns into the destination first so no value is dropped.
///
/// Copies count against the item quota. The import and the move share one
/// transaction.
pub async fn transfer_item<C>(
    db: &C,
    user_id: i64,
    item_id: i64,
    from_list_id: i64,
    to_list_id: i64,
    make_copy: bool,
    limits: &QuotaLimits,
) -> Result<MovedItem, ListError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    list_service::find_owned_list(&txn, from_list_id, user_id).await?;
    list_service::find_owned_list(&txn, to_list_id, user_id).await?;
    if make_copy {
        quota_service::item_quota(&txn, user_id, limits)
            .await?
            .ensure_room()?;
    }

    let remap = column_import_service::import_columns(&txn, to_list_id, from_list_id, user_id, limits)
        .await?;
    let moved = move_item(&txn, item_id, from_list_id, to_list_id, &remap, make_copy).await?;
    txn.commit().await?;
    Ok(moved)
}
