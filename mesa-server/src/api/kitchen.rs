//! Kitchen display endpoints

use axum::{
    Json, Router, middleware,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use serde::Deserialize;
use shared::kitchen::{KitchenItemUpdate, KitchenTicket, OrderSource, TicketAdvance};
use shared::models::StaffRole;

use crate::auth::{StaffIdentity, require_role};
use crate::services::kitchen;
use crate::state::AppState;

use super::ApiResult;

/// Kitchen routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/kitchen/tickets", get(list_tickets))
        .route(
            "/api/kitchen/tickets/{source}/{order_id}/advance",
            post(advance_ticket),
        )
        .route("/api/kitchen/items/{source}/{item_id}", patch(update_item))
        .route_layer(middleware::from_fn(require_role(StaffRole::Kitchen)))
}

#[derive(Debug, Deserialize)]
pub struct TicketsQuery {
    /// Also list tickets whose items are all ready
    #[serde(default = "default_include_ready")]
    pub include_ready: bool,
}

fn default_include_ready() -> bool {
    true
}

/// GET /api/kitchen/tickets
pub async fn list_tickets(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Query(query): Query<TicketsQuery>,
) -> ApiResult<Vec<KitchenTicket>> {
    Ok(Json(
        kitchen::tickets(&state, identity.store_id, query.include_ready).await?,
    ))
}

/// PATCH /api/kitchen/items/{source}/{item_id}
pub async fn update_item(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path((source, item_id)): Path<(OrderSource, i64)>,
    Json(req): Json<KitchenItemUpdate>,
) -> ApiResult<TicketAdvance> {
    Ok(Json(
        kitchen::set_item_status(&state, identity.store_id, source, item_id, req.status).await?,
    ))
}

/// POST /api/kitchen/tickets/{source}/{order_id}/advance
pub async fn advance_ticket(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path((source, order_id)): Path<(OrderSource, i64)>,
) -> ApiResult<TicketAdvance> {
    Ok(Json(
        kitchen::advance_ticket(&state, identity.store_id, source, order_id).await?,
    ))
}
