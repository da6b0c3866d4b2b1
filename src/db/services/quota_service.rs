//! Per-user caps on custom columns and items.
//!
//! Each user sits in one of two tiers: the standard limits, or the elevated
//! limits when `users.bypass_restrictions` is set.

use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};

use crate::db::services::{column_definition_service, item_service, list_service};
use crate::error::{ListError, QuotaResource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaLimits {
    pub column_limit: u64,
    pub column_limit_bypass: u64,
    pub item_limit: u64,
    pub item_limit_bypass: u64,
}

impl Default for QuotaLimits {
    fn default() -> Self {
        Self {
            column_limit: 50,
            column_limit_bypass: 500,
            item_limit: 5_000,
            item_limit_bypass: 50_000,
        }
    }
}

impl QuotaLimits {
    pub fn column_limit_for(&self, bypass: bool) -> u64 {
        if bypass {
            self.column_limit_bypass
        } else {
            self.column_limit
        }
    }

    pub fn item_limit_for(&self, bypass: bool) -> u64 {
        if bypass {
            self.item_limit_bypass
        } else {
            self.item_limit
        }
    }
}

/// A running count against a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quota {
    pub resource: QuotaResource,
    pub used: u64,
    pub limit: u64,
}

impl Quota {
    pub fn is_reached(&self) -> bool {
        self.used >= self.limit
    }

    /// Fails with `QuotaExceeded` if no more can be created.
    pub fn ensure_room(&self) -> Result<(), ListError> {
        if self.is_reached() {
            return Err(ListError::QuotaExceeded {
                resource: self.resource,
                used: self.used,
                limit: self.limit,
            });
        }
        Ok(())
    }

    /// Records one more created resource.
    pub fn consume(&mut self) {
        self.used += 1;
    }
}

async fn has_bypass<C>(db: &C, user_id: i64) -> Result<bool, ListError>
where
    C: ConnectionTrait,
{
    list_service::find_user(db, user_id)
        .await?
        .map(|user| user.bypass_restrictions)
        .ok_or_else(|| ListError::NotFound(format!("User {user_id}")))
}

pub async fn column_quota<C>(db: &C, user_id: i64, limits: &QuotaLimits) -> Result<Quota, ListError>
where
    C: ConnectionTrait,
{
    let bypass = has_bypass(db, user_id).await?;
    let used = column_definition_service::count_for_user(db, user_id).await?;
    Ok(Quota {
        resource: QuotaResource::Columns,
        used,
        limit: limits.column_limit_for(bypass),
    })
}

pub async fn item_quota<C>(db: &C, user_id: i64, limits: &QuotaLimits) -> Result<Quota, ListError>
where
    C: ConnectionTrait,
{
    let bypass = has_bypass(db, user_id).await?;
    let used = item_service::count_for_user(db, user_id).await?;
    Ok(Quota {
        resource: QuotaResource::Items,
        used,
        limit: limits.item_limit_for(bypass),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::ColumnType;
    use crate::db::test_support::Fixture;
    use crate::error::ErrorKind;

    #[test]
    fn quota_fills_up_one_at_a_time() {
        let mut quota = Quota {
            resource: QuotaResource::Items,
            used: 1,
            limit: 2,
        };
        assert!(!quota.is_reached());
        assert!(quota.ensure_room().is_ok());
        quota.consume();
        assert!(quota.is_reached());
        assert_eq!(quota.ensure_room().unwrap_err().kind(), ErrorKind::QuotaExceeded);
    }

    #[tokio::test]
    async fn tier_follows_bypass_flag() {
        let fx = Fixture::new().await;
        let limits = QuotaLimits {
            column_limit: 1,
            column_limit_bypass: 3,
            ..Default::default()
        };
        column_definition_service::create(&fx.db, fx.list.id, "Platform", ColumnType::String)
            .await
            .unwrap();

        let standard = column_quota(&fx.db, fx.user.id, &limits).await.unwrap();
        assert_eq!((standard.used, standard.limit), (1, 1));
        assert!(standard.is_reached());

        list_service::set_bypass_restrictions(&fx.db, fx.user.id, true)
            .await
            .unwrap();
        let elevated = column_quota(&fx.db, fx.user.id, &limits).await.unwrap();
        assert_eq!((elevated.used, elevated.limit), (1, 3));
        assert!(!elevated.is_reached());
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let fx = Fixture::new().await;
        let err = item_quota(&fx.db, 4242, &QuotaLimits::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
