use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::models::{StaffUser, StaffUserCreate};

use crate::api::ApiResult;
use crate::auth::StaffIdentity;
use crate::services::accounts;
use crate::state::AppState;

use super::Deleted;

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

pub async fn list_staff(
    State(state): State<AppState>,
    identity: StaffIdentity,
) -> ApiResult<Vec<StaffUser>> {
    Ok(Json(accounts::list_staff(&state, identity.store_id).await?))
}

pub async fn create_staff(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Json(data): Json<StaffUserCreate>,
) -> ApiResult<StaffUser> {
    Ok(Json(
        accounts::create_staff(&state, identity.store_id, &data).await?,
    ))
}

/// PUT /api/admin/staff/{id}/active
pub async fn set_active(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(id): Path<i64>,
    Json(req): Json<SetActiveRequest>,
) -> ApiResult<StaffUser> {
    Ok(Json(
        accounts::set_staff_active(&state, &identity, id, req.is_active).await?,
    ))
}

pub async fn delete_staff(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Deleted> {
    accounts::delete_staff(&state, &identity, id).await?;
    Ok(Json(Deleted::new(id)))
}
