//! Table order (PDV) queries

use rust_decimal::Decimal;
use shared::models::{TableOrder, TableOrderItem, TableOrderStatus};

use super::{BoxError, LineColumns, NewLine};

const ORDER_COLUMNS: &str =
    "id, store_id, table_id, status, customer_name, total, created_at, closed_at";
const ITEM_COLUMNS: &str = "id, table_order_id, product_id, product_name, quantity, unit_price, \
     notes, kitchen_status, created_at";

pub async fn create(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    store_id: i64,
    table_id: i64,
    customer_name: Option<&str>,
    now: i64,
) -> Result<TableOrder, BoxError> {
    let row = sqlx::query_as::<_, TableOrder>(&format!(
        "INSERT INTO table_orders (id, store_id, table_id, customer_name, created_at) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {ORDER_COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(store_id)
    .bind(table_id)
    .bind(customer_name)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(row)
}

pub async fn find(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    store_id: i64,
    id: i64,
) -> Result<Option<TableOrder>, BoxError> {
    let row = sqlx::query_as::<_, TableOrder>(&format!(
        "SELECT {ORDER_COLUMNS} FROM table_orders WHERE store_id = $1 AND id = $2"
    ))
    .bind(store_id)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

/// Load an order and lock its row until the transaction ends
pub async fn lock(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    store_id: i64,
    id: i64,
) -> Result<Option<TableOrder>, BoxError> {
    let row = sqlx::query_as::<_, TableOrder>(&format!(
        "SELECT {ORDER_COLUMNS} FROM table_orders WHERE store_id = $1 AND id = $2 FOR UPDATE"
    ))
    .bind(store_id)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

/// Open orders of a table, oldest first
pub async fn list_open_for_table(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    store_id: i64,
    table_id: i64,
) -> Result<Vec<TableOrder>, BoxError> {
    let rows = sqlx::query_as::<_, TableOrder>(&format!(
        "SELECT {ORDER_COLUMNS} FROM table_orders \
         WHERE store_id = $1 AND table_id = $2 AND status = 'open' \
         ORDER BY created_at, id"
    ))
    .bind(store_id)
    .bind(table_id)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

/// Open orders of a table, oldest first, locked until the transaction ends
pub async fn lock_open_for_table(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    store_id: i64,
    table_id: i64,
) -> Result<Vec<TableOrder>, BoxError> {
    let rows = sqlx::query_as::<_, TableOrder>(&format!(
        "SELECT {ORDER_COLUMNS} FROM table_orders \
         WHERE store_id = $1 AND table_id = $2 AND status = 'open' \
         ORDER BY created_at, id FOR UPDATE"
    ))
    .bind(store_id)
    .bind(table_id)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

/// Items of the given orders, in insertion order
pub async fn list_items(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    order_ids: &[i64],
) -> Result<Vec<TableOrderItem>, BoxError> {
    let rows = sqlx::query_as::<_, TableOrderItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM table_order_items \
         WHERE table_order_id = ANY($1) ORDER BY created_at, id"
    ))
    .bind(order_ids)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

pub async fn insert_items(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    order_id: i64,
    lines: &[NewLine],
    now: i64,
) -> Result<Vec<TableOrderItem>, BoxError> {
    let cols = LineColumns::from_lines(lines);
    let rows = sqlx::query_as::<_, TableOrderItem>(&format!(
        r#"
        INSERT INTO table_order_items (
            id, table_order_id, product_id, product_name, quantity, unit_price, notes, created_at
        )
        SELECT u.id, $2, u.product_id, u.product_name, u.quantity, u.unit_price, u.notes, $8
        FROM UNNEST($1::BIGINT[], $3::BIGINT[], $4::TEXT[], $5::INTEGER[], $6::NUMERIC[], $7::TEXT[])
            AS u(id, product_id, product_name, quantity, unit_price, notes)
        RETURNING {ITEM_COLUMNS}
        "#
    ))
    .bind(&cols.ids)
    .bind(order_id)
    .bind(&cols.product_ids)
    .bind(&cols.names)
    .bind(&cols.quantities)
    .bind(&cols.prices)
    .bind(&cols.notes)
    .bind(now)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

pub async fn find_item(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    order_id: i64,
    item_id: i64,
) -> Result<Option<TableOrderItem>, BoxError> {
    let row = sqlx::query_as::<_, TableOrderItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM table_order_items WHERE table_order_id = $1 AND id = $2"
    ))
    .bind(order_id)
    .bind(item_id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

pub async fn delete_item(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    item_id: i64,
) -> Result<(), BoxError> {
    sqlx::query("DELETE FROM table_order_items WHERE id = $1")
        .bind(item_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Recompute `total` from the order's items and return it
pub async fn recompute_total(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    order_id: i64,
) -> Result<Decimal, BoxError> {
    let total: Decimal = sqlx::query_scalar(
        r#"
        UPDATE table_orders SET total = (
            SELECT COALESCE(SUM(unit_price * quantity), 0)
            FROM table_order_items WHERE table_order_id = $1
        )
        WHERE id = $1
        RETURNING total
        "#,
    )
    .bind(order_id)
    .fetch_one(conn)
    .await?;
    Ok(total)
}

/// Move orders to a final status (closed or cancelled)
pub async fn finish(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    ids: &[i64],
    status: TableOrderStatus,
    now: i64,
) -> Result<Vec<TableOrder>, BoxError> {
    let rows = sqlx::query_as::<_, TableOrder>(&format!(
        "UPDATE table_orders SET status = $1, closed_at = $2 \
         WHERE id = ANY($3) AND status = 'open' RETURNING {ORDER_COLUMNS}"
    ))
    .bind(status.as_str())
    .bind(now)
    .bind(ids)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

pub async fn count_open_for_table(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    table_id: i64,
) -> Result<i64, BoxError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM table_orders WHERE table_id = $1 AND status = 'open'",
    )
    .bind(table_id)
    .fetch_one(conn)
    .await?;
    Ok(count)
}
