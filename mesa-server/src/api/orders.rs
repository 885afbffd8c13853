//! Staff view of online orders: listing, status and driver assignment

use axum::{
    Json, Router, middleware,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{AssignDriverRequest, Order, OrderDetail, OrderStatus, OrderStatusUpdate, StaffRole};

use crate::auth::{StaffIdentity, require_any_role};
use crate::services::dispatch;
use crate::state::AppState;

use super::ApiResult;

const ORDER_DESK_ROLES: &[StaffRole] = &[StaffRole::Waiter, StaffRole::Kitchen];

/// Waiter / kitchen routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list_orders))
        .route("/api/orders/{order_id}", get(order_detail))
        .route("/api/orders/{order_id}/status", patch(update_status))
        .route("/api/orders/{order_id}/driver", patch(assign_driver))
        .route_layer(middleware::from_fn(require_any_role(ORDER_DESK_ROLES)))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    /// Comma separated statuses, e.g. `pending,confirmed`
    pub status: Option<String>,
    pub limit: Option<i64>,
}

/// Parse `pending,ready` into statuses; blank means no filter
fn parse_status_filter(raw: Option<&str>) -> Result<Vec<OrderStatus>, AppError> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<OrderStatus>().map_err(|e| {
                AppError::with_message(ErrorCode::InvalidFormat, e.to_string())
                    .with_detail("field", "status")
            })
        })
        .collect()
}

/// GET /api/orders?status=pending,confirmed&limit=50
pub async fn list_orders(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Query(query): Query<ListOrdersQuery>,
) -> ApiResult<Vec<Order>> {
    let statuses = parse_status_filter(query.status.as_deref())?;
    Ok(Json(
        dispatch::list_orders(&state, identity.store_id, &statuses, query.limit).await?,
    ))
}

/// GET /api/orders/{order_id}
pub async fn order_detail(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(order_id): Path<i64>,
) -> ApiResult<OrderDetail> {
    Ok(Json(
        dispatch::order_detail(&state, identity.store_id, order_id).await?,
    ))
}

/// PATCH /api/orders/{order_id}/status
pub async fn update_status(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(order_id): Path<i64>,
    Json(req): Json<OrderStatusUpdate>,
) -> ApiResult<Order> {
    Ok(Json(
        dispatch::update_status(&state, identity.store_id, order_id, req.status).await?,
    ))
}

/// PATCH /api/orders/{order_id}/driver
pub async fn assign_driver(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(order_id): Path<i64>,
    Json(req): Json<AssignDriverRequest>,
) -> ApiResult<Order> {
    Ok(Json(
        dispatch::assign_driver(&state, identity.store_id, order_id, req.driver_id).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_parsing() {
        assert!(parse_status_filter(None).unwrap().is_empty());
        assert!(parse_status_filter(Some(" , ")).unwrap().is_empty());
        assert_eq!(
            parse_status_filter(Some("pending, out_for_delivery")).unwrap(),
            vec![OrderStatus::Pending, OrderStatus::OutForDelivery]
        );
        assert_eq!(
            parse_status_filter(Some("pending,lost")).unwrap_err().code,
            ErrorCode::InvalidFormat
        );
    }
}
