//! Category and product queries

use shared::models::{
    Category, CategoryCreate, CategoryUpdate, Product, ProductCreate, ProductUpdate,
};
use sqlx::PgPool;

use super::BoxError;

const CATEGORY_COLUMNS: &str = "id, store_id, name, sort_order, is_active";
const PRODUCT_COLUMNS: &str =
    "id, store_id, category_id, name, description, price, image_url, is_available, sort_order";

// ── Categories ──

pub async fn list_categories(
    pool: &PgPool,
    store_id: i64,
    active_only: bool,
) -> Result<Vec<Category>, BoxError> {
    let rows = sqlx::query_as::<_, Category>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories \
         WHERE store_id = $1 AND (is_active OR NOT $2) \
         ORDER BY sort_order, name"
    ))
    .bind(store_id)
    .bind(active_only)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn category_exists(pool: &PgPool, store_id: i64, id: i64) -> Result<bool, BoxError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE store_id = $1 AND id = $2)",
    )
    .bind(store_id)
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

pub async fn create_category(
    pool: &PgPool,
    store_id: i64,
    data: &CategoryCreate,
) -> Result<Category, BoxError> {
    let row = sqlx::query_as::<_, Category>(&format!(
        "INSERT INTO categories (id, store_id, name, sort_order) VALUES ($1, $2, $3, $4) \
         RETURNING {CATEGORY_COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(store_id)
    .bind(data.name.trim())
    .bind(data.sort_order.unwrap_or(0))
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update_category(
    pool: &PgPool,
    store_id: i64,
    id: i64,
    data: &CategoryUpdate,
) -> Result<Option<Category>, BoxError> {
    let row = sqlx::query_as::<_, Category>(&format!(
        r#"
        UPDATE categories SET
            name = COALESCE($1, name),
            sort_order = COALESCE($2, sort_order),
            is_active = COALESCE($3, is_active)
        WHERE store_id = $4 AND id = $5
        RETURNING {CATEGORY_COLUMNS}
        "#
    ))
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.sort_order)
    .bind(data.is_active)
    .bind(store_id)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fails with a foreign-key violation while products still reference the category
pub async fn delete_category(pool: &PgPool, store_id: i64, id: i64) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query("DELETE FROM categories WHERE store_id = $1 AND id = $2")
        .bind(store_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

// ── Products ──

pub async fn list_products(
    pool: &PgPool,
    store_id: i64,
    available_only: bool,
) -> Result<Vec<Product>, BoxError> {
    let rows = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE store_id = $1 AND (is_available OR NOT $2) \
         ORDER BY sort_order, name"
    ))
    .bind(store_id)
    .bind(available_only)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Products of a store by id, for pricing an order
pub async fn find_products(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    store_id: i64,
    ids: &[i64],
) -> Result<Vec<Product>, BoxError> {
    let rows = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE store_id = $1 AND id = ANY($2)"
    ))
    .bind(store_id)
    .bind(ids)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

pub async fn create_product(
    pool: &PgPool,
    store_id: i64,
    data: &ProductCreate,
) -> Result<Product, BoxError> {
    let row = sqlx::query_as::<_, Product>(&format!(
        r#"
        INSERT INTO products (
            id, store_id, category_id, name, description, price, image_url, sort_order
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(shared::util::snowflake_id())
    .bind(store_id)
    .bind(data.category_id)
    .bind(data.name.trim())
    .bind(&data.description)
    .bind(data.price)
    .bind(&data.image_url)
    .bind(data.sort_order.unwrap_or(0))
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update_product(
    pool: &PgPool,
    store_id: i64,
    id: i64,
    data: &ProductUpdate,
) -> Result<Option<Product>, BoxError> {
    let row = sqlx::query_as::<_, Product>(&format!(
        r#"
        UPDATE products SET
            category_id = COALESCE($1, category_id),
            name = COALESCE($2, name),
            description = COALESCE($3, description),
            price = COALESCE($4, price),
            image_url = COALESCE($5, image_url),
            is_available = COALESCE($6, is_available),
            sort_order = COALESCE($7, sort_order)
        WHERE store_id = $8 AND id = $9
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(data.category_id)
    .bind(data.name.as_deref().map(str::trim))
    .bind(&data.description)
    .bind(data.price)
    .bind(&data.image_url)
    .bind(data.is_available)
    .bind(data.sort_order)
    .bind(store_id)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn delete_product(pool: &PgPool, store_id: i64, id: i64) -> Result<bool, BoxError> {
    let rows = sqlx::query("DELETE FROM products WHERE store_id = $1 AND id = $2")
        .bind(store_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
