//! Staff user queries

use shared::models::{StaffRole, StaffUser};
use sqlx::PgPool;

use super::BoxError;

const USER_COLUMNS: &str = "id, store_id, name, email, role, driver_id, is_active";

/// Staff row with its password hash (login only)
#[derive(Debug, sqlx::FromRow)]
pub struct UserCredentials {
    #[sqlx(flatten)]
    pub user: StaffUser,
    pub password_hash: String,
}

pub async fn find_credentials(
    pool: &PgPool,
    store_id: i64,
    email: &str,
) -> Result<Option<UserCredentials>, BoxError> {
    let row = sqlx::query_as::<_, UserCredentials>(&format!(
        "SELECT {USER_COLUMNS}, password_hash FROM store_users \
         WHERE store_id = $1 AND email = $2"
    ))
    .bind(store_id)
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn find_by_id(
    pool: &PgPool,
    store_id: i64,
    id: i64,
) -> Result<Option<StaffUser>, BoxError> {
    let user = sqlx::query_as::<_, StaffUser>(&format!(
        "SELECT {USER_COLUMNS} FROM store_users WHERE store_id = $1 AND id = $2"
    ))
    .bind(store_id)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn list(pool: &PgPool, store_id: i64) -> Result<Vec<StaffUser>, BoxError> {
    let users = sqlx::query_as::<_, StaffUser>(&format!(
        "SELECT {USER_COLUMNS} FROM store_users WHERE store_id = $1 ORDER BY role, name"
    ))
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(users)
}

pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: StaffRole,
    pub driver_id: Option<i64>,
}

pub async fn create(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    store_id: i64,
    user: &NewUser<'_>,
) -> Result<StaffUser, sqlx::Error> {
    sqlx::query_as::<_, StaffUser>(&format!(
        "INSERT INTO store_users (id, store_id, name, email, password_hash, role, driver_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {USER_COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(store_id)
    .bind(user.name)
    .bind(user.email)
    .bind(user.password_hash)
    .bind(user.role.as_str())
    .bind(user.driver_id)
    .fetch_one(conn)
    .await
}

pub async fn set_active(
    pool: &PgPool,
    store_id: i64,
    id: i64,
    is_active: bool,
) -> Result<Option<StaffUser>, BoxError> {
    let user = sqlx::query_as::<_, StaffUser>(&format!(
        "UPDATE store_users SET is_active = $1 WHERE store_id = $2 AND id = $3 \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(is_active)
    .bind(store_id)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn delete(pool: &PgPool, store_id: i64, id: i64) -> Result<bool, BoxError> {
    let rows = sqlx::query("DELETE FROM store_users WHERE store_id = $1 AND id = $2")
        .bind(store_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
