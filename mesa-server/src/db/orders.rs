//! Online (delivery / pickup) order queries

use rust_decimal::Decimal;
use shared::models::{DriverOrder, Fulfillment, Order, OrderItem, OrderStatus, PaymentMethod};
use sqlx::PgPool;

use super::{BoxError, LineColumns, NewLine};

const ORDER_COLUMNS: &str = "id, store_id, code, customer_name, customer_phone, fulfillment, \
     address, delivery_zone_id, status, payment_method, subtotal, delivery_fee, discount, total, \
     coupon_code, driver_id, notes, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, order_id, product_id, product_name, quantity, unit_price, notes, \
     kitchen_status, created_at";

/// Everything needed to insert an order row
#[derive(Clone, Copy)]
pub struct NewOrder<'a> {
    pub store_id: i64,
    pub code: &'a str,
    pub customer_name: &'a str,
    pub customer_phone: &'a str,
    pub fulfillment: Fulfillment,
    pub address: Option<&'a str>,
    pub delivery_zone_id: Option<i64>,
    pub payment_method: PaymentMethod,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub coupon_code: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub now: i64,
}

/// Returns `None` when `code` is already taken in the store
pub async fn insert(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    order: &NewOrder<'_>,
) -> Result<Option<Order>, BoxError> {
    let row = sqlx::query_as::<_, Order>(&format!(
        r#"
        INSERT INTO orders (
            id, store_id, code, customer_name, customer_phone, fulfillment, address,
            delivery_zone_id, payment_method, subtotal, delivery_fee, discount, total,
            coupon_code, notes, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $16)
        ON CONFLICT (store_id, code) DO NOTHING
        RETURNING {ORDER_COLUMNS}
        "#
    ))
    .bind(shared::util::snowflake_id())
    .bind(order.store_id)
    .bind(order.code)
    .bind(order.customer_name)
    .bind(order.customer_phone)
    .bind(order.fulfillment.as_str())
    .bind(order.address)
    .bind(order.delivery_zone_id)
    .bind(order.payment_method.as_str())
    .bind(order.subtotal)
    .bind(order.delivery_fee)
    .bind(order.discount)
    .bind(order.total)
    .bind(order.coupon_code)
    .bind(order.notes)
    .bind(order.now)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

pub async fn insert_items(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    order_id: i64,
    lines: &[NewLine],
    now: i64,
) -> Result<Vec<OrderItem>, BoxError> {
    let cols = LineColumns::from_lines(lines);
    let rows = sqlx::query_as::<_, OrderItem>(&format!(
        r#"
        INSERT INTO order_items (
            id, order_id, product_id, product_name, quantity, unit_price, notes, created_at
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

pub async fn find(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    store_id: i64,
    id: i64,
) -> Result<Option<Order>, BoxError> {
    let row = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE store_id = $1 AND id = $2"
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
) -> Result<Option<Order>, BoxError> {
    let row = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE store_id = $1 AND id = $2 FOR UPDATE"
    ))
    .bind(store_id)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

/// Public tracking lookup; codes are unique per store, the newest wins across stores
pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Order>, BoxError> {
    let row = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE code = $1 ORDER BY created_at DESC LIMIT 1"
    ))
    .bind(code)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Orders of a store, newest first, optionally filtered by status
pub async fn list(
    pool: &PgPool,
    store_id: i64,
    statuses: &[OrderStatus],
    limit: i64,
) -> Result<Vec<Order>, BoxError> {
    let statuses: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
    let rows = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders \
         WHERE store_id = $1 AND (cardinality($2::TEXT[]) = 0 OR status = ANY($2)) \
         ORDER BY created_at DESC LIMIT $3"
    ))
    .bind(store_id)
    .bind(&statuses)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_items(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    order_id: i64,
) -> Result<Vec<OrderItem>, BoxError> {
    let rows = sqlx::query_as::<_, OrderItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY created_at, id"
    ))
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

pub async fn set_status(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    id: i64,
    status: OrderStatus,
    now: i64,
) -> Result<Order, BoxError> {
    let row = sqlx::query_as::<_, Order>(&format!(
        "UPDATE orders SET status = $1, updated_at = $2 WHERE id = $3 RETURNING {ORDER_COLUMNS}"
    ))
    .bind(status.as_str())
    .bind(now)
    .bind(id)
    .fetch_one(conn)
    .await?;
    Ok(row)
}

pub async fn set_driver(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    id: i64,
    driver_id: Option<i64>,
    now: i64,
) -> Result<Order, BoxError> {
    let row = sqlx::query_as::<_, Order>(&format!(
        "UPDATE orders SET driver_id = $1, updated_at = $2 WHERE id = $3 RETURNING {ORDER_COLUMNS}"
    ))
    .bind(driver_id)
    .bind(now)
    .bind(id)
    .fetch_one(conn)
    .await?;
    Ok(row)
}

/// Active orders assigned to a driver, oldest first
pub async fn list_for_driver(
    pool: &PgPool,
    store_id: i64,
    driver_id: i64,
) -> Result<Vec<DriverOrder>, BoxError> {
    let statuses: Vec<&str> = OrderStatus::DRIVER_ACTIVE.iter().map(|s| s.as_str()).collect();
    let rows = sqlx::query_as::<_, DriverOrder>(
        r#"
        SELECT o.id, o.code, o.customer_name, o.customer_phone, o.fulfillment, o.address,
               z.name AS zone_name, o.status, o.payment_method, o.total, o.notes, o.created_at
        FROM orders o
        LEFT JOIN delivery_zones z ON z.id = o.delivery_zone_id
        WHERE o.store_id = $1 AND o.driver_id = $2 AND o.status = ANY($3)
        ORDER BY o.created_at, o.id
        "#,
    )
    .bind(store_id)
    .bind(driver_id)
    .bind(&statuses)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
