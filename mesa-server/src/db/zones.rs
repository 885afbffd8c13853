//! Delivery zone queries

use shared::models::{DeliveryZone, DeliveryZoneCreate, DeliveryZoneUpdate};
use sqlx::PgPool;

use super::BoxError;

const ZONE_COLUMNS: &str = "id, store_id, name, fee, min_order_value, estimated_minutes, is_active";

pub async fn list(
    pool: &PgPool,
    store_id: i64,
    active_only: bool,
) -> Result<Vec<DeliveryZone>, BoxError> {
    let rows = sqlx::query_as::<_, DeliveryZone>(&format!(
        "SELECT {ZONE_COLUMNS} FROM delivery_zones \
         WHERE store_id = $1 AND (is_active OR NOT $2) ORDER BY name"
    ))
    .bind(store_id)
    .bind(active_only)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    store_id: i64,
    id: i64,
) -> Result<Option<DeliveryZone>, BoxError> {
    let row = sqlx::query_as::<_, DeliveryZone>(&format!(
        "SELECT {ZONE_COLUMNS} FROM delivery_zones WHERE store_id = $1 AND id = $2"
    ))
    .bind(store_id)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

pub async fn create(
    pool: &PgPool,
    store_id: i64,
    data: &DeliveryZoneCreate,
) -> Result<DeliveryZone, BoxError> {
    let row = sqlx::query_as::<_, DeliveryZone>(&format!(
        "INSERT INTO delivery_zones (id, store_id, name, fee, min_order_value, estimated_minutes) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {ZONE_COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(store_id)
    .bind(data.name.trim())
    .bind(data.fee)
    .bind(data.min_order_value)
    .bind(data.estimated_minutes)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update(
    pool: &PgPool,
    store_id: i64,
    id: i64,
    data: &DeliveryZoneUpdate,
) -> Result<Option<DeliveryZone>, BoxError> {
    let row = sqlx::query_as::<_, DeliveryZone>(&format!(
        r#"
        UPDATE delivery_zones SET
            name = COALESCE($1, name),
            fee = COALESCE($2, fee),
            min_order_value = COALESCE($3, min_order_value),
            estimated_minutes = COALESCE($4, estimated_minutes),
            is_active = COALESCE($5, is_active)
        WHERE store_id = $6 AND id = $7
        RETURNING {ZONE_COLUMNS}
        "#
    ))
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.fee)
    .bind(data.min_order_value)
    .bind(data.estimated_minutes)
    .bind(data.is_active)
    .bind(store_id)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn delete(pool: &PgPool, store_id: i64, id: i64) -> Result<bool, BoxError> {
    let rows = sqlx::query("DELETE FROM delivery_zones WHERE store_id = $1 AND id = $2")
        .bind(store_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
