//! Store registration, staff login and the current user

use axum::{Json, Router, extract::State, routing::{get, post}};
use shared::models::{LoginRequest, LoginResponse, StaffUser, Store, StoreRegister};

use crate::auth::StaffIdentity;
use crate::services::accounts;
use crate::state::AppState;

use super::ApiResult;

/// Public routes (no auth)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/auth/login", post(login))
}

/// Routes for any authenticated staff member
pub fn staff_router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/store", get(store))
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<StoreRegister>,
) -> ApiResult<LoginResponse> {
    Ok(Json(accounts::register_store(&state, &req).await?))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    Ok(Json(accounts::login(&state, &req).await?))
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, identity: StaffIdentity) -> ApiResult<StaffUser> {
    Ok(Json(accounts::me(&state, &identity).await?))
}

/// GET /api/store
pub async fn store(State(state): State<AppState>, identity: StaffIdentity) -> ApiResult<Store> {
    Ok(Json(accounts::store_settings(&state, identity.store_id).await?))
}
