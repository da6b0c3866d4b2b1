//! Cascading deletes for users, collections, lists and items.
//!
//! The schema declares foreign keys without `ON DELETE CASCADE`, so every
//! function here removes children before parents. Each call is one
//! transaction, and an id that does not resolve is a silent no-op.

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, TransactionTrait};
use tracing::info;

use crate::db::entities::item;
use crate::db::entities::prelude::{Collection, Item, List, ListSort, User};
use crate::db::services::{
    attribute_value_service, column_definition_service, item_service, list_service,
};

/// Deletes an item and its attribute values.
pub async fn delete_item<C>(db: &C, item_id: i64) -> Result<(), DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let Some(item) = item_service::find_by_id(db, item_id).await? else {
        return Ok(());
    };

    let txn = db.begin().await?;
    let values_removed = attribute_value_service::delete_all_for_item(&txn, item.id).await?;
    Item::delete_by_id(item.id).exec(&txn).await?;
    txn.commit().await?;

    info!(item_id, list_id = item.list_id, values_removed, "Item deleted.");
    Ok(())
}

/// Deletes a list with its items, their values, its columns and its sort
/// preference.
pub async fn delete_list<C>(db: &C, list_id: i64) -> Result<(), DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    if list_service::find_list(db, list_id).await?.is_none() {
        return Ok(());
    }

    let txn = db.begin().await?;
    let item_ids: Vec<i64> = item_service::find_by_list(&txn, list_id)
        .await?
        .into_iter()
        .map(|item| item.id)
        .collect();
    let values_removed = attribute_value_service::delete_all_for_items(&txn, item_ids).await?;
    let items_removed = Item::delete_many()
        .filter(item::Column::ListId.eq(list_id))
        .exec(&txn)
        .await?
        .rows_affected;
    let columns_removed = column_definition_service::delete_all_for_list(&txn, list_id).await?;
    ListSort::delete_by_id(list_id).exec(&txn).await?;
    List::delete_by_id(list_id).exec(&txn).await?;
    txn.commit().await?;

    info!(
        list_id,
        items_removed,
        values_removed,
        columns_removed,
        "List deleted."
    );
    Ok(())
}

/// Deletes a collection and every list in it.
pub async fn delete_collection<C>(db: &C, collection_id: i64) -> Result<(), DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    if Collection::find_by_id(collection_id).one(db).await?.is_none() {
        return Ok(());
    }

    let txn = db.begin().await?;
    for list in list_service::lists_for_collection(&txn, collection_id).await? {
        delete_list(&txn, list.id).await?;
    }
    Collection::delete_by_id(collection_id).exec(&txn).await?;
    txn.commit().await?;

    info!(collection_id, "Collection deleted.");
    Ok(())
}

/// Deletes a user and everything they own.
pub async fn delete_user<C>(db: &C, user_id: i64) -> Result<(), DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    if list_service::find_user(db, user_id).await?.is_none() {
        return Ok(());
    }

    let txn = db.begin().await?;
    for collection in list_service::collections_for_user(&txn, user_id).await? {
        delete_collection(&txn, collection.id).await?;
    }
    User::delete_by_id(user_id).exec(&txn).await?;
    txn.commit().await?;

    info!(user_id, "User deleted.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::entities::prelude::{AttributeValue, ColumnDefinition};
    use crate::db::entities::{column_definition, list};
    use crate::db::models::ColumnType;
    use crate::db::services::item_service::NewItem;
    use crate::db::test_support::Fixture;
    use sea_orm::PaginatorTrait;

    /// Two columns, two items with values on each, plus a sort preference.
    async fn populate(fx: &Fixture, list: &list::Model) {
        let platform =
            column_definition_service::create(&fx.db, list.id, "Platform", ColumnType::String)
                .await
                .unwrap();
        let fun = column_definition_service::create(&fx.db, list.id, "Fun", ColumnType::Stars)
            .await
            .unwrap();
        for name in ["Tunic", "Inscryption"] {
            let game = item_service::insert_item(&fx.db, list.id, &NewItem::named(name))
                .await
                .unwrap();
            attribute_value_service::set(&fx.db, &game, &platform, "PC").await.unwrap();
            attribute_value_service::set(&fx.db, &game, &fun, "4.5").await.unwrap();
        }
        list_service::set_sort_preference(&fx.db, list.id, "name", false)
            .await
            .unwrap();
    }

    async fn leftovers(fx: &Fixture, list_id: i64) -> (u64, u64, u64, bool) {
        let items = Item::find()
            .filter(item::Column::ListId.eq(list_id))
            .count(&fx.db)
            .await
            .unwrap();
        let columns = ColumnDefinition::find()
            .filter(column_definition::Column::ListId.eq(list_id))
            .count(&fx.db)
            .await
            .unwrap();
        let values = AttributeValue::find().count(&fx.db).await.unwrap();
        let sort = list_service::get_sort_preference(&fx.db, list_id)
            .await
            .unwrap()
            .is_some();
        (items, columns, values, sort)
    }

    #[tokio::test]
    async fn deleting_an_item_removes_its_values() {
        let fx = Fixture::new().await;
        populate(&fx, &fx.list).await;
        let tunic = item_service::find_by_name(&fx.db, fx.list.id, "Tunic")
            .await
            .unwrap()
            .unwrap();

        delete_item(&fx.db, tunic.id).await.unwrap();

        assert!(item_service::find_by_id(&fx.db, tunic.id).await.unwrap().is_none());
        assert!(attribute_value_service::find_by_item(&fx.db, tunic.id)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(AttributeValue::find().count(&fx.db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn deleting_a_list_leaves_no_orphans() {
        let fx = Fixture::new().await;
        populate(&fx, &fx.list).await;

        delete_list(&fx.db, fx.list.id).await.unwrap();

        assert_eq!(leftovers(&fx, fx.list.id).await, (0, 0, 0, false));
        assert!(list_service::find_list(&fx.db, fx.list.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_a_list_spares_its_siblings() {
        let fx = Fixture::new().await;
        let keep = fx.another_list("Keep").await;
        populate(&fx, &fx.list).await;
        populate(&fx, &keep).await;

        delete_list(&fx.db, fx.list.id).await.unwrap();

        let (items, columns, values, sort) = leftovers(&fx, keep.id).await;
        assert_eq!((items, columns, values, sort), (2, 2, 4, true));
    }

    #[tokio::test]
    async fn deleting_a_user_cascades_through_collections() {
        let fx = Fixture::new().await;
        let second = list_service::create_collection(&fx.db, fx.user.id, "Books")
            .await
            .unwrap();
        let shelf = list_service::create_list(&fx.db, second.id, "Shelf").await.unwrap();
        populate(&fx, &fx.list).await;
        populate(&fx, &shelf).await;

        delete_user(&fx.db, fx.user.id).await.unwrap();

        assert!(list_service::find_user(&fx.db, fx.user.id).await.unwrap().is_none());
        assert!(list_service::collections_for_user(&fx.db, fx.user.id)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(List::find().count(&fx.db).await.unwrap(), 0);
        assert_eq!(leftovers(&fx, shelf.id).await, (0, 0, 0, false));
    }

    #[tokio::test]
    async fn unknown_ids_are_ignored() {
        let fx = Fixture::new().await;
        delete_item(&fx.db, 404).await.unwrap();
        delete_list(&fx.db, 404).await.unwrap();
        delete_collection(&fx.db, 404).await.unwrap();
        delete_user(&fx.db, 404).await.unwrap();
        assert!(list_service::find_list(&fx.db, fx.list.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn deleting_twice_is_a_no_op() {
        let fx = Fixture::new().await;
        populate(&fx, &fx.list).await;
        delete_collection(&fx.db, fx.collection.id).await.unwrap();
        delete_collection(&fx.db, fx.collection.id).await.unwrap();
        assert!(list_service::lists_for_collection(&fx.db, fx.collection.id)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(AttributeValue::find().count(&fx.db).await.unwrap(), 0);
    }
}
