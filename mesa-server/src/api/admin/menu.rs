use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Category, CategoryCreate, CategoryUpdate, Product, ProductCreate, ProductUpdate,
};
use shared::realtime::{ChangeAction, Entity};

use crate::api::ApiResult;
use crate::auth::StaffIdentity;
use crate::db::menu;
use crate::error::on_foreign_key_violation;
use crate::state::AppState;
use crate::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_money, validate_optional_text,
    validate_required_text,
};

use super::{Deleted, internal};

// ── Categories ──

pub async fn list_categories(
    State(state): State<AppState>,
    identity: StaffIdentity,
) -> ApiResult<Vec<Category>> {
    let categories = menu::list_categories(&state.pool, identity.store_id, false)
        .await
        .map_err(internal)?;
    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Json(data): Json<CategoryCreate>,
) -> ApiResult<Category> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;

    let category = menu::create_category(&state.pool, identity.store_id, &data)
        .await
        .map_err(internal)?;
    state.realtime.notify(
        identity.store_id,
        Entity::Category,
        ChangeAction::Insert,
        category.id,
    );
    Ok(Json(category))
}

pub async fn update_category(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(id): Path<i64>,
    Json(data): Json<CategoryUpdate>,
) -> ApiResult<Category> {
    if let Some(name) = &data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }

    let category = menu::update_category(&state.pool, identity.store_id, id, &data)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::CategoryNotFound))?;
    state
        .realtime
        .notify(identity.store_id, Entity::Category, ChangeAction::Update, id);
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Deleted> {
    let deleted = menu::delete_category(&state.pool, identity.store_id, id)
        .await
        .map_err(|e| {
            AppError::from(on_foreign_key_violation(e, || {
                AppError::new(ErrorCode::CategoryHasProducts).with_detail("category_id", id)
            }))
        })?;
    if !deleted {
        return Err(AppError::new(ErrorCode::CategoryNotFound));
    }
    state
        .realtime
        .notify(identity.store_id, Entity::Category, ChangeAction::Delete, id);
    Ok(Json(Deleted::new(id)))
}

// ── Products ──

async fn check_category(
    state: &AppState,
    store_id: i64,
    category_id: Option<i64>,
) -> Result<(), AppError> {
    if let Some(category_id) = category_id
        && !menu::category_exists(&state.pool, store_id, category_id)
            .await
            .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::CategoryNotFound)
            .with_detail("category_id", category_id));
    }
    Ok(())
}

fn check_price(price: rust_decimal::Decimal) -> Result<(), AppError> {
    validate_money(price, "price").map_err(|_| {
        AppError::new(ErrorCode::ProductInvalidPrice).with_detail("price", price.to_string())
    })
}

pub async fn list_products(
    State(state): State<AppState>,
    identity: StaffIdentity,
) -> ApiResult<Vec<Product>> {
    let products = menu::list_products(&state.pool, identity.store_id, false)
        .await
        .map_err(internal)?;
    Ok(Json(products))
}

pub async fn create_product(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Json(data): Json<ProductCreate>,
) -> ApiResult<Product> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&data.image_url, "image_url", MAX_URL_LEN)?;
    check_price(data.price)?;
    check_category(&state, identity.store_id, data.category_id).await?;

    let product = menu::create_product(&state.pool, identity.store_id, &data)
        .await
        .map_err(internal)?;
    tracing::info!(store_id = identity.store_id, product_id = product.id, "Product created");
    state.realtime.notify(
        identity.store_id,
        Entity::Product,
        ChangeAction::Insert,
        product.id,
    );
    Ok(Json(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(id): Path<i64>,
    Json(data): Json<ProductUpdate>,
) -> ApiResult<Product> {
    if let Some(name) = &data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&data.image_url, "image_url", MAX_URL_LEN)?;
    if let Some(price) = data.price {
        check_price(price)?;
    }
    check_category(&state, identity.store_id, data.category_id).await?;

    let product = menu::update_product(&state.pool, identity.store_id, id, &data)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", id))?;
    state
        .realtime
        .notify(identity.store_id, Entity::Product, ChangeAction::Update, id);
    Ok(Json(product))
}

/// Past order lines keep their copied name and price
pub async fn delete_product(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Deleted> {
    if !menu::delete_product(&state.pool, identity.store_id, id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", id));
    }
    state
        .realtime
        .notify(identity.store_id, Entity::Product, ChangeAction::Delete, id);
    Ok(Json(Deleted::new(id)))
}
