use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::entities::prelude::Item;
use crate::db::entities::{collection, item, list};
use crate::db::services::list_service;
use crate::db::services::quota_service::{self, QuotaLimits};
use crate::error::ListError;

const MAX_RATING: i32 = 5;

/// Fields for a new item. Custom column values are written separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub url: Option<String>,
    pub rating: Option<i32>,
}

impl NewItem {
    pub fn named(name: impl Into<String>) -> Self {
        NewItem {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl From<&item::Model> for NewItem {
    fn from(item: &item::Model) -> Self {
        NewItem {
            name: item.name.clone(),
            url: item.url.clone(),
            rating: item.rating,
        }
    }
}

/// Partial update of an item's built-in fields. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub url: Option<Option<String>>,
    pub rating: Option<Option<i32>>,
}

fn check_rating(rating: Option<i32>) -> Result<(), ListError> {
    match rating {
        Some(r) if !(0..=MAX_RATING).contains(&r) => Err(ListError::InvalidInput(format!(
            "Rating {r} is outside 0 to {MAX_RATING}"
        ))),
        _ => Ok(()),
    }
}

fn item_name(name: &str) -> Result<String, ListError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ListError::InvalidInput("Item name cannot be empty".to_string()));
    }
    Ok(trimmed.to_owned())
}

// --- Item Service Functions ---

/// Inserts an item without any quota check. Names are unique per list.
pub async fn insert_item<C>(db: &C, list_id: i64, new_item: &NewItem) -> Result<item::Model, ListError>
where
    C: ConnectionTrait,
{
    let name = item_name(&new_item.name)?;
    check_rating(new_item.rating)?;
    if list_service::find_list(db, list_id).await?.is_none() {
        return Err(ListError::NotFound(format!("List {list_id}")));
    }
    if find_by_name(db, list_id, &name).await?.is_some() {
        return Err(ListError::DuplicateName(name));
    }

    let now = Utc::now();
    let new_item = item::ActiveModel {
        list_id: Set(list_id),
        name: Set(name),
        url: Set(new_item.url.clone()),
        rating: Set(new_item.rating),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(new_item.insert(db).await?)
}

/// Creates an item in a list, charging it to the list owner's item quota.
pub async fn create_item<C>(
    db: &C,
    list_id: i64,
    new_item: &NewItem,
    limits: &QuotaLimits,
) -> Result<item::Model, ListError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let owner_id = list_service::owner_of_list(&txn, list_id).await?;
    quota_service::item_quota(&txn, owner_id, limits)
        .await?
        .ensure_room()?;
    let created = insert_item(&txn, list_id, new_item).await?;
    txn.commit().await?;

    info!(item_id = created.id, list_id, "Item created.");
    Ok(created)
}

pub async fn find_by_id<C>(db: &C, item_id: i64) -> Result<Option<item::Model>, DbErr>
where
    C: ConnectionTrait,
{
    Item::find_by_id(item_id).one(db).await
}

pub async fn find_by_list<C>(db: &C, list_id: i64) -> Result<Vec<item::Model>, DbErr>
where
    C: ConnectionTrait,
{
    Item::find()
        .filter(item::Column::ListId.eq(list_id))
        .order_by_asc(item::Column::Id)
        .all(db)
        .await
}

pub async fn find_by_name<C>(db: &C, list_id: i64, name: &str) -> Result<Option<item::Model>, DbErr>
where
    C: ConnectionTrait,
{
    Item::find()
        .filter(item::Column::ListId.eq(list_id))
        .filter(item::Column::Name.eq(name))
        .one(db)
        .await
}

pub async fn update_item<C>(db: &C, item_id: i64, update: &ItemUpdate) -> Result<item::Model, ListError>
where
    C: ConnectionTrait,
{
    let existing = find_by_id(db, item_id)
        .await?
        .ok_or_else(|| ListError::NotFound(format!("Item {item_id}")))?;
    let list_id = existing.list_id;
    let mut active_item = existing.into_active_model();

    if let Some(name) = &update.name {
        let name = item_name(name)?;
        if let Some(clash) = find_by_name(db, list_id, &name).await? {
            if clash.id != item_id {
                return Err(ListError::DuplicateName(name));
            }
        }
        active_item.name = Set(name);
    }
    if let Some(url) = &update.url {
        active_item.url = Set(url.clone());
    }
    if let Some(rating) = update.rating {
        check_rating(rating)?;
        active_item.rating = Set(rating);
    }
    active_item.updated_at = Set(Utc::now());
    Ok(active_item.update(db).await?)
}

/// Items across all lists the user owns.
pub async fn count_for_user<C>(db: &C, user_id: i64) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    Item::find()
        .join(JoinType::InnerJoin, item::Relation::List.def())
        .join(JoinType::InnerJoin, list::Relation::Collection.def())
        .filter(collection::Column::UserId.eq(user_id))
        .count(db)
        .await
}
