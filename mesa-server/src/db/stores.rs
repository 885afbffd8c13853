//! Store (tenant) queries

use shared::models::{Store, StoreUpdate};
use sqlx::PgPool;

use super::BoxError;

const STORE_COLUMNS: &str = "id, slug, name, phone, address, logo_url, is_open, \
     delivery_enabled, pickup_enabled, min_order_value, created_at";

pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Store>, BoxError> {
    let store = sqlx::query_as::<_, Store>(&format!(
        "SELECT {STORE_COLUMNS} FROM stores WHERE slug = $1"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(store)
}

pub async fn find_by_id(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    id: i64,
) -> Result<Option<Store>, BoxError> {
    let store = sqlx::query_as::<_, Store>(&format!(
        "SELECT {STORE_COLUMNS} FROM stores WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(store)
}

pub async fn slug_exists(pool: &PgPool, slug: &str) -> Result<bool, BoxError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM stores WHERE slug = $1)")
        .bind(slug)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

pub async fn create(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    slug: &str,
    name: &str,
    now: i64,
) -> Result<Store, sqlx::Error> {
    sqlx::query_as::<_, Store>(&format!(
        "INSERT INTO stores (id, slug, name, created_at) VALUES ($1, $2, $3, $4) \
         RETURNING {STORE_COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(slug)
    .bind(name)
    .bind(now)
    .fetch_one(conn)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &StoreUpdate,
) -> Result<Option<Store>, BoxError> {
    let store = sqlx::query_as::<_, Store>(&format!(
        r#"
        UPDATE stores SET
            name = COALESCE($1, name),
            phone = COALESCE($2, phone),
            address = COALESCE($3, address),
            logo_url = COALESCE($4, logo_url),
            is_open = COALESCE($5, is_open),
            delivery_enabled = COALESCE($6, delivery_enabled),
            pickup_enabled = COALESCE($7, pickup_enabled),
            min_order_value = COALESCE($8, min_order_value)
        WHERE id = $9
        RETURNING {STORE_COLUMNS}
        "#
    ))
    .bind(&data.name)
    .bind(&data.phone)
    .bind(&data.address)
    .bind(&data.logo_url)
    .bind(data.is_open)
    .bind(data.delivery_enabled)
    .bind(data.pickup_enabled)
    .bind(data.min_order_value)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(store)
}
