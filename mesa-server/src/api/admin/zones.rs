use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{DeliveryZone, DeliveryZoneCreate, DeliveryZoneUpdate};
use shared::realtime::{ChangeAction, Entity};

use crate::api::ApiResult;
use crate::auth::StaffIdentity;
use crate::db::zones;
use crate::state::AppState;
use crate::validation::{MAX_NAME_LEN, validate_money, validate_required_text};

use super::{Deleted, internal};

fn check_amounts(
    fee: Option<Decimal>,
    min_order_value: Option<Decimal>,
    estimated_minutes: Option<i32>,
) -> Result<(), AppError> {
    if let Some(fee) = fee {
        validate_money(fee, "fee")?;
    }
    if let Some(min) = min_order_value {
        validate_money(min, "min_order_value")?;
    }
    if let Some(minutes) = estimated_minutes
        && minutes <= 0
    {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "estimated_minutes must be positive",
        )
        .with_detail("field", "estimated_minutes"));
    }
    Ok(())
}

/// Inactive zones included; the public list only shows active ones
pub async fn list_zones(
    State(state): State<AppState>,
    identity: StaffIdentity,
) -> ApiResult<Vec<DeliveryZone>> {
    let zones = zones::list(&state.pool, identity.store_id, false)
        .await
        .map_err(internal)?;
    Ok(Json(zones))
}

pub async fn create_zone(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Json(data): Json<DeliveryZoneCreate>,
) -> ApiResult<DeliveryZone> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    check_amounts(Some(data.fee), data.min_order_value, data.estimated_minutes)?;

    let zone = zones::create(&state.pool, identity.store_id, &data)
        .await
        .map_err(internal)?;
    state.realtime.notify(
        identity.store_id,
        Entity::DeliveryZone,
        ChangeAction::Insert,
        zone.id,
    );
    Ok(Json(zone))
}

pub async fn update_zone(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(id): Path<i64>,
    Json(data): Json<DeliveryZoneUpdate>,
) -> ApiResult<DeliveryZone> {
    if let Some(name) = &data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    check_amounts(data.fee, data.min_order_value, data.estimated_minutes)?;

    let zone = zones::update(&state.pool, identity.store_id, id, &data)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::DeliveryZoneNotFound).with_detail("zone_id", id))?;
    state
        .realtime
        .notify(identity.store_id, Entity::DeliveryZone, ChangeAction::Update, id);
    Ok(Json(zone))
}

pub async fn delete_zone(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Deleted> {
    if !zones::delete(&state.pool, identity.store_id, id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::DeliveryZoneNotFound).with_detail("zone_id", id));
    }
    state
        .realtime
        .notify(identity.store_id, Entity::DeliveryZone, ChangeAction::Delete, id);
    Ok(Json(Deleted::new(id)))
}
