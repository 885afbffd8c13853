//! Application state

use shared::kitchen::WaitThresholds;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::auth::AccountCache;
use crate::config::Config;
use crate::error::BoxError;
use crate::live::RealtimeHub;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// JWT secret for staff authentication
    pub jwt_secret: String,
    /// Per-store change feed
    pub realtime: RealtimeHub,
    /// Kitchen wait-time buckets
    pub kitchen: WaitThresholds,
    /// Recently checked staff account status
    pub accounts: AccountCache,
}

impl AppState {
    /// Connect to PostgreSQL and run pending migrations
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self::with_pool(pool, config))
    }

    pub fn with_pool(pool: PgPool, config: &Config) -> Self {
        Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            realtime: RealtimeHub::new(),
            kitchen: config.kitchen,
            accounts: AccountCache::default(),
        }
    }
}
