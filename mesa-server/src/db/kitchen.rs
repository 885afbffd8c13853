//! Kitchen line queries over both item tables

use shared::kitchen::{KitchenLine, KitchenStatus, OrderSource};
use shared::models::OrderStatus;
use sqlx::PgPool;

use super::BoxError;

/// Every line of open table orders and kitchen-active online orders
pub async fn load_lines(pool: &PgPool, store_id: i64) -> Result<Vec<KitchenLine>, BoxError> {
    let active: Vec<&str> = OrderStatus::KITCHEN_ACTIVE
        .iter()
        .map(|s| s.as_str())
        .collect();
    let rows = sqlx::query_as::<_, KitchenLine>(
        r#"
        SELECT 'table'::TEXT AS source, o.id AS order_id,
               COALESCE(t.name, 'Mesa ' || t.number) AS label,
               i.id AS item_id, i.product_name, i.quantity, i.notes,
               i.kitchen_status AS status, i.created_at
        FROM table_order_items i
        JOIN table_orders o ON o.id = i.table_order_id
        JOIN dining_tables t ON t.id = o.table_id
        WHERE o.store_id = $1 AND o.status = 'open'
        UNION ALL
        SELECT 'delivery'::TEXT AS source, o.id AS order_id,
               '#' || o.code AS label,
               i.id AS item_id, i.product_name, i.quantity, i.notes,
               i.kitchen_status AS status, i.created_at
        FROM order_items i
        JOIN orders o ON o.id = i.order_id
        WHERE o.store_id = $1 AND o.status = ANY($2)
        "#,
    )
    .bind(store_id)
    .bind(&active)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Order that owns an item, if the item belongs to the store
pub async fn find_item_order(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    store_id: i64,
    source: OrderSource,
    item_id: i64,
) -> Result<Option<i64>, BoxError> {
    let sql = match source {
        OrderSource::Table => {
            "SELECT o.id FROM table_order_items i JOIN table_orders o ON o.id = i.table_order_id \
             WHERE o.store_id = $1 AND i.id = $2"
        }
        OrderSource::Delivery => {
            "SELECT o.id FROM order_items i JOIN orders o ON o.id = i.order_id \
             WHERE o.store_id = $1 AND i.id = $2"
        }
    };
    let order_id: Option<i64> = sqlx::query_scalar(sql)
        .bind(store_id)
        .bind(item_id)
        .fetch_optional(conn)
        .await?;
    Ok(order_id)
}

pub async fn set_item_status(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    source: OrderSource,
    item_id: i64,
    status: KitchenStatus,
) -> Result<(), BoxError> {
    let sql = match source {
        OrderSource::Table => "UPDATE table_order_items SET kitchen_status = $1 WHERE id = $2",
        OrderSource::Delivery => "UPDATE order_items SET kitchen_status = $1 WHERE id = $2",
    };
    sqlx::query(sql)
        .bind(status.as_str())
        .bind(item_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Kitchen statuses of every item of an order
pub async fn item_statuses(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    source: OrderSource,
    order_id: i64,
) -> Result<Vec<KitchenStatus>, BoxError> {
    let sql = match source {
        OrderSource::Table => {
            "SELECT kitchen_status FROM table_order_items WHERE table_order_id = $1"
        }
        OrderSource::Delivery => "SELECT kitchen_status FROM order_items WHERE order_id = $1",
    };
    let raw: Vec<String> = sqlx::query_scalar(sql)
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    raw.into_iter()
        .map(|s| s.parse::<KitchenStatus>().map_err(BoxError::from))
        .collect()
}

/// Raise every item of an order that is behind `target` up to it.
/// Returns the number of items changed.
pub async fn raise_items(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    source: OrderSource,
    order_id: i64,
    target: KitchenStatus,
) -> Result<u64, BoxError> {
    let behind: Vec<&str> = [
        KitchenStatus::Pending,
        KitchenStatus::Preparing,
        KitchenStatus::Ready,
    ]
    .iter()
    .filter(|s| **s < target)
    .map(|s| s.as_str())
    .collect();

    let sql = match source {
        OrderSource::Table => {
            "UPDATE table_order_items SET kitchen_status = $1 \
             WHERE table_order_id = $2 AND kitchen_status = ANY($3)"
        }
        OrderSource::Delivery => {
            "UPDATE order_items SET kitchen_status = $1 \
             WHERE order_id = $2 AND kitchen_status = ANY($3)"
        }
    };
    let rows = sqlx::query(sql)
        .bind(target.as_str())
        .bind(order_id)
        .bind(&behind)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected())
}
