//! Customer-facing endpoints: digital menu, checkout and order tracking

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use shared::models::{
    CouponValidateRequest, CouponValidateResponse, DeliveryZone, OrderDetail, PlaceOrderRequest,
    PublicMenu,
};

use crate::services::ordering;
use crate::state::AppState;

use super::ApiResult;

/// Public routes (no auth)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/public/stores/{slug}", get(menu))
        .route("/api/public/stores/{slug}/zones", get(zones))
        .route(
            "/api/public/stores/{slug}/coupons/validate",
            post(validate_coupon),
        )
        .route("/api/public/stores/{slug}/orders", post(place_order))
        .route("/api/public/orders/{code}", get(track_order))
}

/// GET /api/public/stores/{slug}
pub async fn menu(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<PublicMenu> {
    Ok(Json(ordering::public_menu(&state, &slug).await?))
}

/// GET /api/public/stores/{slug}/zones
pub async fn zones(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Vec<DeliveryZone>> {
    Ok(Json(ordering::public_zones(&state, &slug).await?))
}

/// POST /api/public/stores/{slug}/coupons/validate
pub async fn validate_coupon(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<CouponValidateRequest>,
) -> ApiResult<CouponValidateResponse> {
    Ok(Json(ordering::validate_coupon(&state, &slug, &req).await?))
}

/// POST /api/public/stores/{slug}/orders
pub async fn place_order(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderDetail>), shared::AppError> {
    let detail = ordering::place_order(&state, &slug, &req).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/public/orders/{code}
pub async fn track_order(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<OrderDetail> {
    Ok(Json(ordering::track_order(&state, &code).await?))
}
