use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Driver, DriverCreate, DriverUpdate};
use shared::realtime::{ChangeAction, Entity};

use crate::api::ApiResult;
use crate::auth::StaffIdentity;
use crate::db::drivers;
use crate::state::AppState;
use crate::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};

use super::{Deleted, internal};

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::DriverNotFound).with_detail("driver_id", id)
}

pub async fn list_drivers(
    State(state): State<AppState>,
    identity: StaffIdentity,
) -> ApiResult<Vec<Driver>> {
    let drivers = drivers::list(&state.pool, identity.store_id)
        .await
        .map_err(internal)?;
    Ok(Json(drivers))
}

pub async fn create_driver(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Json(data): Json<DriverCreate>,
) -> ApiResult<Driver> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&data.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let driver = drivers::create(&state.pool, identity.store_id, &data)
        .await
        .map_err(internal)?;
    tracing::info!(store_id = identity.store_id, driver_id = driver.id, "Driver created");
    state.realtime.notify(
        identity.store_id,
        Entity::Driver,
        ChangeAction::Insert,
        driver.id,
    );
    Ok(Json(driver))
}

/// Deactivating a driver keeps their current assignments
pub async fn update_driver(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(id): Path<i64>,
    Json(data): Json<DriverUpdate>,
) -> ApiResult<Driver> {
    if let Some(name) = &data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&data.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let driver = drivers::update(&state.pool, identity.store_id, id, &data)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(id))?;
    state
        .realtime
        .notify(identity.store_id, Entity::Driver, ChangeAction::Update, id);
    Ok(Json(driver))
}

pub async fn delete_driver(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Deleted> {
    if !drivers::delete(&state.pool, identity.store_id, id)
        .await
        .map_err(internal)?
    {
        return Err(not_found(id));
    }
    tracing::info!(store_id = identity.store_id, driver_id = id, "Driver deleted");
    state
        .realtime
        .notify(identity.store_id, Entity::Driver, ChangeAction::Delete, id);
    Ok(Json(Deleted::new(id)))
}
