//! Coupon queries

use shared::models::{Coupon, CouponCreate, CouponUpdate};
use sqlx::PgPool;

use super::BoxError;

const COUPON_COLUMNS: &str = "id, store_id, code, kind, value, min_order_value, max_uses, \
     used_count, expires_at, is_active";

pub async fn list(pool: &PgPool, store_id: i64) -> Result<Vec<Coupon>, BoxError> {
    let rows = sqlx::query_as::<_, Coupon>(&format!(
        "SELECT {COUPON_COLUMNS} FROM coupons WHERE store_id = $1 ORDER BY code"
    ))
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find(pool: &PgPool, store_id: i64, id: i64) -> Result<Option<Coupon>, BoxError> {
    let row = sqlx::query_as::<_, Coupon>(&format!(
        "SELECT {COUPON_COLUMNS} FROM coupons WHERE store_id = $1 AND id = $2"
    ))
    .bind(store_id)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// `code` must already be normalized
pub async fn find_by_code(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    store_id: i64,
    code: &str,
) -> Result<Option<Coupon>, BoxError> {
    let row = sqlx::query_as::<_, Coupon>(&format!(
        "SELECT {COUPON_COLUMNS} FROM coupons WHERE store_id = $1 AND code = $2"
    ))
    .bind(store_id)
    .bind(code)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

/// Same as `find_by_code`, locking the row so `used_count` cannot race
pub async fn lock_by_code(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    store_id: i64,
    code: &str,
) -> Result<Option<Coupon>, BoxError> {
    let row = sqlx::query_as::<_, Coupon>(&format!(
        "SELECT {COUPON_COLUMNS} FROM coupons WHERE store_id = $1 AND code = $2 FOR UPDATE"
    ))
    .bind(store_id)
    .bind(code)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

pub async fn increment_use(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    id: i64,
) -> Result<(), BoxError> {
    sqlx::query("UPDATE coupons SET used_count = used_count + 1 WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Fails with a unique violation when the code exists in the store
pub async fn create(
    pool: &PgPool,
    store_id: i64,
    code: &str,
    data: &CouponCreate,
) -> Result<Coupon, sqlx::Error> {
    sqlx::query_as::<_, Coupon>(&format!(
        r#"
        INSERT INTO coupons (
            id, store_id, code, kind, value, min_order_value, max_uses, expires_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {COUPON_COLUMNS}
        "#
    ))
    .bind(shared::util::snowflake_id())
    .bind(store_id)
    .bind(code)
    .bind(data.kind.as_str())
    .bind(data.value)
    .bind(data.min_order_value)
    .bind(data.max_uses)
    .bind(data.expires_at)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    store_id: i64,
    id: i64,
    data: &CouponUpdate,
) -> Result<Option<Coupon>, BoxError> {
    let row = sqlx::query_as::<_, Coupon>(&format!(
        r#"
        UPDATE coupons SET
            value = COALESCE($1, value),
            min_order_value = COALESCE($2, min_order_value),
            max_uses = COALESCE($3, max_uses),
            expires_at = COALESCE($4, expires_at),
            is_active = COALESCE($5, is_active)
        WHERE store_id = $6 AND id = $7
        RETURNING {COUPON_COLUMNS}
        "#
    ))
    .bind(data.value)
    .bind(data.min_order_value)
    .bind(data.max_uses)
    .bind(data.expires_at)
    .bind(data.is_active)
    .bind(store_id)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn delete(pool: &PgPool, store_id: i64, id: i64) -> Result<bool, BoxError> {
    let rows = sqlx::query("DELETE FROM coupons WHERE store_id = $1 AND id = $2")
        .bind(store_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
