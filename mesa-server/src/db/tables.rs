//! Dining table queries

use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate, TableOverview, TableStatus};
use sqlx::PgPool;

use super::BoxError;

const TABLE_COLUMNS: &str = "id, store_id, number, name, capacity, status";

/// Tables with the running total of their open orders
pub async fn list_overview(pool: &PgPool, store_id: i64) -> Result<Vec<TableOverview>, BoxError> {
    let rows = sqlx::query_as::<_, TableOverview>(
        r#"
        SELECT t.id, t.store_id, t.number, t.name, t.capacity, t.status,
               COUNT(o.id) AS open_orders,
               COALESCE(SUM(o.total), 0) AS open_total,
               MIN(o.created_at) AS occupied_since
        FROM dining_tables t
        LEFT JOIN table_orders o ON o.table_id = t.id AND o.status = 'open'
        WHERE t.store_id = $1
        GROUP BY t.id
        ORDER BY t.number
        "#,
    )
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list(pool: &PgPool, store_id: i64) -> Result<Vec<DiningTable>, BoxError> {
    let rows = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {TABLE_COLUMNS} FROM dining_tables WHERE store_id = $1 ORDER BY number"
    ))
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Load a table and lock its row until the transaction ends
pub async fn lock(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    store_id: i64,
    id: i64,
) -> Result<Option<DiningTable>, BoxError> {
    let row = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {TABLE_COLUMNS} FROM dining_tables WHERE store_id = $1 AND id = $2 FOR UPDATE"
    ))
    .bind(store_id)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

pub async fn set_status(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    id: i64,
    status: TableStatus,
) -> Result<(), BoxError> {
    sqlx::query("UPDATE dining_tables SET status = $1 WHERE id = $2")
        .bind(status.as_str())
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Fails with a unique violation when the number is taken
pub async fn create(
    pool: &PgPool,
    store_id: i64,
    data: &DiningTableCreate,
) -> Result<DiningTable, sqlx::Error> {
    sqlx::query_as::<_, DiningTable>(&format!(
        "INSERT INTO dining_tables (id, store_id, number, name, capacity) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {TABLE_COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(store_id)
    .bind(data.number)
    .bind(&data.name)
    .bind(data.capacity.unwrap_or(4))
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    store_id: i64,
    id: i64,
    data: &DiningTableUpdate,
) -> Result<Option<DiningTable>, sqlx::Error> {
    sqlx::query_as::<_, DiningTable>(&format!(
        r#"
        UPDATE dining_tables SET
            number = COALESCE($1, number),
            name = COALESCE($2, name),
            capacity = COALESCE($3, capacity)
        WHERE store_id = $4 AND id = $5
        RETURNING {TABLE_COLUMNS}
        "#
    ))
    .bind(data.number)
    .bind(&data.name)
    .bind(data.capacity)
    .bind(store_id)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Delete a table unless it still has open orders.
///
/// Returns `None` when the table does not exist, `Some(false)` when it is in use.
pub async fn delete_if_idle(pool: &PgPool, store_id: i64, id: i64) -> Result<Option<bool>, BoxError> {
    let mut tx = pool.begin().await?;
    if lock(&mut *tx, store_id, id).await?.is_none() {
        return Ok(None);
    }

    let open: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM table_orders WHERE table_id = $1 AND status = 'open'",
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;
    if open > 0 {
        return Ok(Some(false));
    }

    sqlx::query("DELETE FROM dining_tables WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(Some(true))
}
