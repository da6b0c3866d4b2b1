//! Reconciles the custom columns of two lists.
//!
//! Importing walks the source list's columns in display order and either
//! reuses the destination column with the same name or clones the source
//! column into the destination. The resulting [`RemapTable`] is what the
//! move engine uses to carry attribute values across.

use sea_orm::{ConnectionTrait, TransactionTrait};
use tracing::{info, warn};

use crate::db::models::RemapTable;
use crate::db::services::column_definition_service;
use crate::db::services::list_service;
use crate::db::services::quota_service::{self, QuotaLimits};
use crate::error::{ImportError, ListError};

/// Imports the columns of `source_list_id` into `dest_list_id`.
///
/// Both lists must belong to `user_id`. Columns created by the import count
/// against the user's column quota; reused columns do not. The whole import
/// is one transaction: on failure nothing is created, and the error carries
/// the pairs resolved up to that point.
pub async fn import_columns<C>(
    db: &C,
    dest_list_id: i64,
    source_list_id: i64,
    user_id: i64,
    limits: &QuotaLimits,
) -> Result<RemapTable, ImportError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let mut remap = RemapTable::default();
    match import_into(db, dest_list_id, source_list_id, user_id, limits, &mut remap).await {
        Ok(created) => {
            info!(
                dest_list_id,
                source_list_id,
                mapped = remap.len(),
                created,
                "Columns imported."
            );
            Ok(remap)
        }
        Err(error) => {
            warn!(
                dest_list_id,
                source_list_id,
                resolved = remap.len(),
                error = %error,
                "Column import failed."
            );
            Err(ImportError {
                resolved: remap,
                error,
            })
        }
    }
}

/// Returns how many columns were created.
async fn import_into<C>(
    db: &C,
    dest_list_id: i64,
    source_list_id: i64,
    user_id: i64,
    limits: &QuotaLimits,
    remap: &mut RemapTable,
) -> Result<u64, ListError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    list_service::find_owned_list(&txn, dest_list_id, user_id).await?;
    list_service::find_owned_list(&txn, source_list_id, user_id).await?;

    let mut quota = quota_service::column_quota(&txn, user_id, limits).await?;
    let mut created = 0;
    for column in column_definition_service::find_by_list(&txn, source_list_id).await? {
        if let Some(existing) =
            column_definition_service::find_by_name(&txn, &column.name, dest_list_id).await?
        {
            remap.push(column.id, existing.id);
            continue;
        }

        quota.ensure_room()?;
        let clone = column_definition_service::create(
            &txn,
            dest_list_id,
            &column.name,
            column.column_type(),
        )
        .await?;
        remap.push(column.id, clone.id);
        quota.consume();
        created += 1;
    }

    txn.commit().await?;
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::entities::column_definition;
    use crate::db::enums::ColumnKind;
    use crate::db::models::ColumnType;
    use crate::db::services::list_service::{create_collection, create_user};
    use crate::db::test_support::Fixture;
    use crate::error::{ErrorKind, QuotaResource};
    use sea_orm::{ActiveModelTrait, Set};

    #[tokio::test]
    async fn matching_name_is_reused_without_creating() {
        let fx = Fixture::new().await;
        let dest = fx.another_list("Finished").await;
        let src_category =
            column_definition_service::create(&fx.db, fx.list.id, "Category", ColumnType::String)
                .await
                .unwrap();
        let dest_category =
            column_definition_service::create(&fx.db, dest.id, "Category", ColumnType::String)
                .await
                .unwrap();
        let before = column_definition_service::count_for_user(&fx.db, fx.user.id)
            .await
            .unwrap();

        let remap = import_columns(&fx.db, dest.id, fx.list.id, fx.user.id, &QuotaLimits::default())
            .await
            .unwrap();

        assert_eq!(remap.len(), 1);
        assert_eq!(remap.lookup(src_category.id), Some(dest_category.id));
        assert_eq!(
            column_definition_service::count_for_user(&fx.db, fx.user.id)
                .await
                .unwrap(),
            before
        );
    }

    #[tokio::test]
    async fn missing_column_is_cloned_once() {
        let fx = Fixture::new().await;
        let dest = fx.another_list("Finished").await;
        let genre = column_definition_service::create(
            &fx.db,
            fx.list.id,
            "Genre",
            ColumnType::Int { min: 1, max: 9 },
        )
        .await
        .unwrap();
        let before = column_definition_service::count_for_user(&fx.db, fx.user.id)
            .await
            .unwrap();

        let remap = import_columns(&fx.db, dest.id, fx.list.id, fx.user.id, &QuotaLimits::default())
            .await
            .unwrap();

        let cloned = column_definition_service::find_by_name(&fx.db, "Genre", dest.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cloned.column_type(), genre.column_type());
        assert_eq!(remap.lookup(genre.id), Some(cloned.id));
        assert_eq!(
            column_definition_service::count_for_user(&fx.db, fx.user.id)
                .await
                .unwrap(),
            before + 1
        );

        // a second import finds the clone and creates nothing
        let again = import_columns(&fx.db, dest.id, fx.list.id, fx.user.id, &QuotaLimits::default())
            .await
            .unwrap();
        assert_eq!(again, remap);
    }

    #[tokio::test]
    async fn empty_source_gives_empty_table() {
        let fx = Fixture::new().await;
        let dest = fx.another_list("Finished").await;
        let remap = import_columns(&fx.db, dest.id, fx.list.id, fx.user.id, &QuotaLimits::default())
            .await
            .unwrap();
        assert!(remap.is_empty());
    }

    #[tokio::test]
    async fn quota_failure_rolls_back_and_reports_progress() {
        let fx = Fixture::new().await;
        let dest = fx.another_list("Finished").await;
        let shared =
            column_definition_service::create(&fx.db, fx.list.id, "Category", ColumnType::String)
                .await
                .unwrap();
        column_definition_service::create(&fx.db, fx.list.id, "Genre", ColumnType::String)
            .await
            .unwrap();
        column_definition_service::create(&fx.db, fx.list.id, "Year", ColumnType::Stars)
            .await
            .unwrap();
        column_definition_service::create(&fx.db, dest.id, "Category", ColumnType::String)
            .await
            .unwrap();
        // 4 columns in use, room for exactly one more
        let limits = QuotaLimits {
            column_limit: 5,
            ..Default::default()
        };

        let err = import_columns(&fx.db, dest.id, fx.list.id, fx.user.id, &limits)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::QuotaExceeded);
        assert!(matches!(
            err.error,
            ListError::QuotaExceeded {
                resource: QuotaResource::Columns,
                used: 5,
                limit: 5
            }
        ));
        assert_eq!(err.resolved.len(), 2);
        assert!(err.resolved.lookup(shared.id).is_some());
        let dest_columns = column_definition_service::find_by_list(&fx.db, dest.id)
            .await
            .unwrap();
        assert_eq!(dest_columns.len(), 1);
    }

    #[tokio::test]
    async fn lists_of_other_users_are_not_found() {
        let fx = Fixture::new().await;
        let mallory = create_user(&fx.db, "mallory", false).await.unwrap();
        let theirs = create_collection(&fx.db, mallory.id, "Loot").await.unwrap();
        let their_list = list_service::create_list(&fx.db, theirs.id, "Stash")
            .await
            .unwrap();

        let err = import_columns(&fx.db, fx.list.id, their_list.id, fx.user.id, &QuotaLimits::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.resolved.is_empty());
    }

    #[tokio::test]
    async fn stored_column_with_inverted_bounds_is_not_cloned() {
        let fx = Fixture::new().await;
        let dest = fx.another_list("Finished").await;
        // written straight to the table, as a row predating the bounds check
        column_definition::ActiveModel {
            list_id: Set(fx.list.id),
            name: Set("Broken".to_owned()),
            kind: Set(ColumnKind::Int),
            min_value: Set(Some(10)),
            max_value: Set(Some(1)),
            position: Set(0),
            ..Default::default()
        }
        .insert(&fx.db)
        .await
        .unwrap();

        let err = import_columns(&fx.db, dest.id, fx.list.id, fx.user.id, &QuotaLimits::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(column_definition_service::find_by_list(&fx.db, dest.id)
            .await
            .unwrap()
            .is_empty());
    }
}
