//! Database fixtures for service tests

use std::collections::HashMap;

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::StaffRole;
use sqlx::PgPool;

use crate::config::Config;
use crate::error::ServiceResult;
use crate::state::AppState;

pub const SLUG: &str = "cantina";

pub fn state(pool: PgPool) -> AppState {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("DATABASE_URL", "postgres://unused"),
        ("JWT_SECRET", "service-test-secret"),
    ]);
    let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
    AppState::with_pool(pool, &config)
}

/// Code of the error a service call failed with
pub fn error_code<T>(result: ServiceResult<T>) -> ErrorCode {
    match result {
        Ok(_) => panic!("expected an error"),
        Err(e) => AppError::from(e).code,
    }
}

/// Open store taking delivery and pickup, no minimum
pub async fn store(pool: &PgPool) -> i64 {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO stores (id, slug, name, is_open, created_at) VALUES ($1, $2, 'Cantina', TRUE, 0)",
    )
    .bind(id)
    .bind(SLUG)
    .execute(pool)
    .await
    .unwrap();
    id
}

pub async fn product(pool: &PgPool, store_id: i64, name: &str, price: Decimal) -> i64 {
    let id = shared::util::snowflake_id();
    sqlx::query("INSERT INTO products (id, store_id, name, price) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(store_id)
        .bind(name)
        .bind(price)
        .execute(pool)
        .await
        .unwrap();
    id
}

pub async fn table(pool: &PgPool, store_id: i64, number: i32) -> i64 {
    let id = shared::util::snowflake_id();
    sqlx::query("INSERT INTO dining_tables (id, store_id, number) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(store_id)
        .bind(number)
        .execute(pool)
        .await
        .unwrap();
    id
}

pub async fn zone(pool: &PgPool, store_id: i64, fee: Decimal) -> i64 {
    let id = shared::util::snowflake_id();
    sqlx::query("INSERT INTO delivery_zones (id, store_id, name, fee) VALUES ($1, $2, 'Centro', $3)")
        .bind(id)
        .bind(store_id)
        .bind(fee)
        .execute(pool)
        .await
        .unwrap();
    id
}

/// Percent coupon limited to `max_uses`
pub async fn coupon(pool: &PgPool, store_id: i64, code: &str, percent: Decimal, max_uses: i32) -> i64 {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO coupons (id, store_id, code, kind, value, max_uses) \
         VALUES ($1, $2, $3, 'percent', $4, $5)",
    )
    .bind(id)
    .bind(store_id)
    .bind(code)
    .bind(percent)
    .bind(max_uses)
    .execute(pool)
    .await
    .unwrap();
    id
}

pub async fn coupon_uses(pool: &PgPool, id: i64) -> i32 {
    sqlx::query_scalar("SELECT used_count FROM coupons WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn user(pool: &PgPool, store_id: i64, role: StaffRole) -> i64 {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO store_users (id, store_id, name, email, password_hash, role) \
         VALUES ($1, $2, 'Staff', $3, 'not-a-hash', $4)",
    )
    .bind(id)
    .bind(store_id)
    .bind(format!("{id}@cantina.test"))
    .bind(role.as_str())
    .execute(pool)
    .await
    .unwrap();
    id
}
