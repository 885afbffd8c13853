//! Driver dashboard endpoints
//!
//! The driver is taken from the token, never from the request.

use axum::{
    Json, Router, middleware,
    extract::{Path, State},
    routing::{get, post},
};
use shared::models::{DriverOrder, Order, StaffRole};

use crate::auth::{StaffIdentity, require_role};
use crate::services::dispatch;
use crate::state::AppState;

use super::ApiResult;

/// Driver routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/driver/orders", get(list_orders))
        .route("/api/driver/orders/{order_id}/pickup", post(pickup))
        .route("/api/driver/orders/{order_id}/deliver", post(deliver))
        .route_layer(middleware::from_fn(require_role(StaffRole::Driver)))
}

/// GET /api/driver/orders
pub async fn list_orders(
    State(state): State<AppState>,
    identity: StaffIdentity,
) -> ApiResult<Vec<DriverOrder>> {
    let driver_id = identity.require_driver()?;
    Ok(Json(
        dispatch::driver_orders(&state, identity.store_id, driver_id).await?,
    ))
}

/// POST /api/driver/orders/{order_id}/pickup
pub async fn pickup(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(order_id): Path<i64>,
) -> ApiResult<Order> {
    let driver_id = identity.require_driver()?;
    Ok(Json(
        dispatch::driver_pickup(&state, identity.store_id, driver_id, order_id).await?,
    ))
}

/// POST /api/driver/orders/{order_id}/deliver
pub async fn deliver(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(order_id): Path<i64>,
) -> ApiResult<Order> {
    let driver_id = identity.require_driver()?;
    Ok(Json(
        dispatch::driver_deliver(&state, identity.store_id, driver_id, order_id).await?,
    ))
}
