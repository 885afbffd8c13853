//! Account status checks for authenticated requests
//!
//! Tokens outlive account changes, so every request re-checks that the
//! account still exists and is active. Results are cached per user for
//! [`ACCOUNT_STATUS_TTL`]; staff management updates the cache directly.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use shared::error::{AppError, ErrorCode};

use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;

pub const ACCOUNT_STATUS_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy)]
struct CachedStatus {
    active: bool,
    checked_at: Instant,
}

/// user_id -> last known `is_active`
#[derive(Debug, Clone)]
pub struct AccountCache {
    entries: Arc<DashMap<i64, CachedStatus>>,
    ttl: Duration,
}

impl Default for AccountCache {
    fn default() -> Self {
        Self::new(ACCOUNT_STATUS_TTL)
    }
}

impl AccountCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Cached status, `None` when unknown or stale
    pub fn get(&self, user_id: i64) -> Option<bool> {
        let entry = self.entries.get(&user_id)?;
        (entry.checked_at.elapsed() < self.ttl).then_some(entry.active)
    }

    pub fn remember(&self, user_id: i64, active: bool) {
        self.entries.insert(
            user_id,
            CachedStatus {
                active,
                checked_at: Instant::now(),
            },
        );
    }
}

/// Reject tokens of deleted or deactivated accounts
pub async fn ensure_active(state: &AppState, store_id: i64, user_id: i64) -> Result<(), AppError> {
    let active = match state.accounts.get(user_id) {
        Some(active) => active,
        None => {
            let active = db::users::find_by_id(&state.pool, store_id, user_id)
                .await
                .map_err(|e| AppError::from(ServiceError::from(e)))?
                .is_some_and(|user| user.is_active);
            state.accounts.remember(user_id, active);
            active
        }
    };

    if !active {
        tracing::info!(store_id, user_id, "Token of a disabled account rejected");
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_user_is_not_cached() {
        let cache = AccountCache::default();
        assert_eq!(cache.get(7), None);
    }

    #[test]
    fn remembered_status_is_returned() {
        let cache = AccountCache::default();
        cache.remember(7, true);
        assert_eq!(cache.get(7), Some(true));
        cache.remember(7, false);
        assert_eq!(cache.get(7), Some(false));
    }

    #[test]
    fn stale_entries_expire() {
        let cache = AccountCache::new(Duration::ZERO);
        cache.remember(7, true);
        assert_eq!(cache.get(7), None);
    }

    mod with_db {
        use super::*;
        use crate::auth::StaffIdentity;
        use crate::services::{accounts, test_support as fx};
        use shared::models::StaffRole;
        use sqlx::PgPool;

        #[sqlx::test(migrations = "./migrations")]
        async fn deactivation_applies_to_issued_tokens(pool: PgPool) {
            let store_id = fx::store(&pool).await;
            let admin_id = fx::user(&pool, store_id, StaffRole::Admin).await;
            let waiter_id = fx::user(&pool, store_id, StaffRole::Waiter).await;
            let state = fx::state(pool);
            let admin = StaffIdentity {
                user_id: admin_id,
                store_id,
                role: StaffRole::Admin,
                driver_id: None,
            };

            assert!(ensure_active(&state, store_id, waiter_id).await.is_ok());

            accounts::set_staff_active(&state, &admin, waiter_id, false)
                .await
                .unwrap();
            let err = ensure_active(&state, store_id, waiter_id).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::AccountDisabled);

            accounts::set_staff_active(&state, &admin, waiter_id, true)
                .await
                .unwrap();
            assert!(ensure_active(&state, store_id, waiter_id).await.is_ok());

            accounts::delete_staff(&state, &admin, waiter_id).await.unwrap();
            let err = ensure_active(&state, store_id, waiter_id).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::AccountDisabled);
        }

        #[sqlx::test(migrations = "./migrations")]
        async fn unknown_accounts_are_rejected(pool: PgPool) {
            let store_id = fx::store(&pool).await;
            let state = fx::state(pool);
            let err = ensure_active(&state, store_id, 42).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::AccountDisabled);
            assert_eq!(state.accounts.get(42), Some(false));
        }
    }
}
