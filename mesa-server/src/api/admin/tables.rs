use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate};
use shared::realtime::{ChangeAction, Entity};

use crate::api::ApiResult;
use crate::auth::StaffIdentity;
use crate::db::tables;
use crate::error::on_unique_violation;
use crate::state::AppState;
use crate::validation::{MAX_NAME_LEN, validate_optional_text};

use super::{Deleted, internal};

fn check_number(number: i32) -> Result<(), AppError> {
    if number <= 0 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "Table number must be positive",
        )
        .with_detail("field", "number"));
    }
    Ok(())
}

fn check_capacity(capacity: Option<i32>) -> Result<(), AppError> {
    if let Some(capacity) = capacity
        && !(1..=100).contains(&capacity)
    {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "Capacity must be between 1 and 100",
        )
        .with_detail("field", "capacity"));
    }
    Ok(())
}

fn number_taken(number: Option<i32>) -> impl FnOnce() -> AppError {
    move || {
        let err = AppError::new(ErrorCode::TableNumberExists);
        match number {
            Some(n) => err.with_detail("number", n),
            None => err,
        }
    }
}

pub async fn list_tables(
    State(state): State<AppState>,
    identity: StaffIdentity,
) -> ApiResult<Vec<DiningTable>> {
    let tables = tables::list(&state.pool, identity.store_id)
        .await
        .map_err(internal)?;
    Ok(Json(tables))
}

pub async fn create_table(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Json(data): Json<DiningTableCreate>,
) -> ApiResult<DiningTable> {
    check_number(data.number)?;
    check_capacity(data.capacity)?;
    validate_optional_text(&data.name, "name", MAX_NAME_LEN)?;

    let table = tables::create(&state.pool, identity.store_id, &data)
        .await
        .map_err(|e| AppError::from(on_unique_violation(e, number_taken(Some(data.number)))))?;
    state.realtime.notify(
        identity.store_id,
        Entity::DiningTable,
        ChangeAction::Insert,
        table.id,
    );
    Ok(Json(table))
}

pub async fn update_table(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(id): Path<i64>,
    Json(data): Json<DiningTableUpdate>,
) -> ApiResult<DiningTable> {
    if let Some(number) = data.number {
        check_number(number)?;
    }
    check_capacity(data.capacity)?;
    validate_optional_text(&data.name, "name", MAX_NAME_LEN)?;

    let table = tables::update(&state.pool, identity.store_id, id, &data)
        .await
        .map_err(|e| AppError::from(on_unique_violation(e, number_taken(data.number))))?
        .ok_or_else(|| AppError::new(ErrorCode::TableNotFound).with_detail("table_id", id))?;
    state
        .realtime
        .notify(identity.store_id, Entity::DiningTable, ChangeAction::Update, id);
    Ok(Json(table))
}

/// Tables with open orders stay until the orders are closed or cancelled
pub async fn delete_table(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Deleted> {
    match tables::delete_if_idle(&state.pool, identity.store_id, id)
        .await
        .map_err(internal)?
    {
        None => Err(AppError::new(ErrorCode::TableNotFound).with_detail("table_id", id)),
        Some(false) => {
            Err(AppError::new(ErrorCode::TableHasOpenOrders).with_detail("table_id", id))
        }
        Some(true) => {
            state
                .realtime
                .notify(identity.store_id, Entity::DiningTable, ChangeAction::Delete, id);
            Ok(Json(Deleted::new(id)))
        }
    }
}
