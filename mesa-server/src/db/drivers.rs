//! Driver queries

use shared::models::{Driver, DriverCreate, DriverUpdate};
use sqlx::PgPool;

use super::BoxError;

const DRIVER_COLUMNS: &str = "id, store_id, name, phone, is_active";

pub async fn list(pool: &PgPool, store_id: i64) -> Result<Vec<Driver>, BoxError> {
    let rows = sqlx::query_as::<_, Driver>(&format!(
        "SELECT {DRIVER_COLUMNS} FROM drivers WHERE store_id = $1 ORDER BY name"
    ))
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    store_id: i64,
    id: i64,
) -> Result<Option<Driver>, BoxError> {
    let row = sqlx::query_as::<_, Driver>(&format!(
        "SELECT {DRIVER_COLUMNS} FROM drivers WHERE store_id = $1 AND id = $2"
    ))
    .bind(store_id)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

pub async fn create(pool: &PgPool, store_id: i64, data: &DriverCreate) -> Result<Driver, BoxError> {
    let row = sqlx::query_as::<_, Driver>(&format!(
        "INSERT INTO drivers (id, store_id, name, phone) VALUES ($1, $2, $3, $4) \
         RETURNING {DRIVER_COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(store_id)
    .bind(data.name.trim())
    .bind(&data.phone)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update(
    pool: &PgPool,
    store_id: i64,
    id: i64,
    data: &DriverUpdate,
) -> Result<Option<Driver>, BoxError> {
    let row = sqlx::query_as::<_, Driver>(&format!(
        r#"
        UPDATE drivers SET
            name = COALESCE($1, name),
            phone = COALESCE($2, phone),
            is_active = COALESCE($3, is_active)
        WHERE store_id = $4 AND id = $5
        RETURNING {DRIVER_COLUMNS}
        "#
    ))
    .bind(data.name.as_deref().map(str::trim))
    .bind(&data.phone)
    .bind(data.is_active)
    .bind(store_id)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Assigned orders keep their history: `driver_id` is set to NULL
pub async fn delete(pool: &PgPool, store_id: i64, id: i64) -> Result<bool, BoxError> {
    let rows = sqlx::query("DELETE FROM drivers WHERE store_id = $1 AND id = $2")
        .bind(store_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
