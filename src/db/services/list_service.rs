use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use tracing::info;

use crate::db::entities::{collection, list, list_sort, user};
use crate::error::ListError;

fn required_name(name: &str, what: &str) -> Result<String, ListError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ListError::InvalidInput(format!("{what} name cannot be empty")));
    }
    Ok(trimmed.to_owned())
}

// --- Users ---

/// Creates a user. Usernames are unique.
pub async fn create_user<C>(
    db: &C,
    username: &str,
    bypass_restrictions: bool,
) -> Result<user::Model, ListError>
where
    C: ConnectionTrait,
{
    let username = required_name(username, "User")?;
    if user::Entity::find()
        .filter(user::Column::Username.eq(username.as_str()))
        .one(db)
        .await?
        .is_some()
    {
        return Err(ListError::DuplicateName(username));
    }

    let new_user = user::ActiveModel {
        username: Set(username),
        bypass_restrictions: Set(bypass_restrictions),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    Ok(new_user.insert(db).await?)
}

pub async fn find_user<C>(db: &C, user_id: i64) -> Result<Option<user::Model>, DbErr>
where
    C: ConnectionTrait,
{
    user::Entity::find_by_id(user_id).one(db).await
}

/// Switches a user between the standard and elevated quota tier.
pub async fn set_bypass_restrictions<C>(
    db: &C,
    user_id: i64,
    bypass_restrictions: bool,
) -> Result<user::Model, ListError>
where
    C: ConnectionTrait,
{
    let user = find_user(db, user_id)
        .await?
        .ok_or_else(|| ListError::NotFound(format!("User {user_id}")))?;

    let mut active_user = user.into_active_model();
    active_user.bypass_restrictions = Set(bypass_restrictions);
    Ok(active_user.update(db).await?)
}

// --- Collections ---

pub async fn create_collection<C>(
    db: &C,
    user_id: i64,
    name: &str,
) -> Result<collection::Model, ListError>
where
    C: ConnectionTrait,
{
    let name = required_name(name, "Collection")?;
    if find_user(db, user_id).await?.is_none() {
        return Err(ListError::NotFound(format!("User {user_id}")));
    }

    let new_collection = collection::ActiveModel {
        user_id: Set(user_id),
        name: Set(name),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    Ok(new_collection.insert(db).await?)
}

pub async fn collections_for_user<C>(db: &C, user_id: i64) -> Result<Vec<collection::Model>, DbErr>
where
    C: ConnectionTrait,
{
    collection::Entity::find()
        .filter(collection::Column::UserId.eq(user_id))
        .order_by_asc(collection::Column::Id)
        .all(db)
        .await
}

// --- Lists ---

pub async fn create_list<C>(db: &C, collection_id: i64, name: &str) -> Result<list::Model, ListError>
where
    C: ConnectionTrait,
{
    let name = required_name(name, "List")?;
    if collection::Entity::find_by_id(collection_id)
        .one(db)
        .await?
        .is_none()
    {
        return Err(ListError::NotFound(format!("Collection {collection_id}")));
    }

    let new_list = list::ActiveModel {
        collection_id: Set(collection_id),
        name: Set(name),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let created = new_list.insert(db).await?;
    info!(list_id = created.id, collection_id, "List created.");
    Ok(created)
}

pub async fn rename_list<C>(db: &C, list_id: i64, name: &str) -> Result<list::Model, ListError>
where
    C: ConnectionTrait,
{
    let name = required_name(name, "List")?;
    let existing = find_list(db, list_id)
        .await?
        .ok_or_else(|| ListError::NotFound(format!("List {list_id}")))?;

    let mut active_list = existing.into_active_model();
    active_list.name = Set(name);
    Ok(active_list.update(db).await?)
}

pub async fn find_list<C>(db: &C, list_id: i64) -> Result<Option<list::Model>, DbErr>
where
    C: ConnectionTrait,
{
    list::Entity::find_by_id(list_id).one(db).await
}

pub async fn lists_for_collection<C>(db: &C, collection_id: i64) -> Result<Vec<list::Model>, DbErr>
where
    C: ConnectionTrait,
{
    list::Entity::find()
        .filter(list::Column::CollectionId.eq(collection_id))
        .order_by_asc(list::Column::Id)
        .all(db)
        .await
}

/// Loads a list only if it sits in one of the user's collections.
pub async fn find_owned_list<C>(db: &C, list_id: i64, user_id: i64) -> Result<list::Model, ListError>
where
    C: ConnectionTrait,
{
    list::Entity::find_by_id(list_id)
        .join(JoinType::InnerJoin, list::Relation::Collection.def())
        .filter(collection::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| ListError::NotFound(format!("List {list_id} not found for user {user_id}")))
}

/// Id of the user owning the list's collection.
pub async fn owner_of_list<C>(db: &C, list_id: i64) -> Result<i64, ListError>
where
    C: ConnectionTrait,
{
    let list = find_list(db, list_id)
        .await?
        .ok_or_else(|| ListError::NotFound(format!("List {list_id}")))?;
    let collection = collection::Entity::find_by_id(list.collection_id)
        .one(db)
        .await?
        .ok_or_else(|| ListError::NotFound(format!("Collection {}", list.collection_id)))?;
    Ok(collection.user_id)
}

// --- Sort preference ---

/// Stores how a list should be sorted, replacing any previous preference.
pub async fn set_sort_preference<C>(
    db: &C,
    list_id: i64,
    sort_column: &str,
    descending: bool,
) -> Result<list_sort::Model, ListError>
where
    C: ConnectionTrait,
{
    let sort_column = required_name(sort_column, "Sort column")?;
    if find_list(db, list_id).await?.is_none() {
        return Err(ListError::NotFound(format!("List {list_id}")));
    }

    let saved = match list_sort::Entity::find_by_id(list_id).one(db).await? {
        Some(existing) => {
            let mut active_sort = existing.into_active_model();
            active_sort.sort_column = Set(sort_column);
            active_sort.descending = Set(descending);
            active_sort.update(db).await?
        }
        None => {
            list_sort::ActiveModel {
                list_id: Set(list_id),
                sort_column: Set(sort_column),
                descending: Set(descending),
            }
            .insert(db)
            .await?
        }
    };
    Ok(saved)
}

pub async fn get_sort_preference<C>(db: &C, list_id: i64) -> Result<Option<list_sort::Model>, DbErr>
where
    C: ConnectionTrait,
{
    list_sort::Entity::find_by_id(list_id).one(db).await
}
