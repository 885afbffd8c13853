use axum::{Json, extract::State};
use shared::models::{Store, StoreUpdate};

use crate::api::ApiResult;
use crate::auth::StaffIdentity;
use crate::services::accounts;
use crate::state::AppState;

pub async fn get_store(State(state): State<AppState>, identity: StaffIdentity) -> ApiResult<Store> {
    Ok(Json(
        accounts::store_settings(&state, identity.store_id).await?,
    ))
}

/// Opening hours switch, fulfillment toggles and minimum order value
pub async fn update_store(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Json(data): Json<StoreUpdate>,
) -> ApiResult<Store> {
    Ok(Json(
        accounts::update_store(&state, identity.store_id, &data).await?,
    ))
}
