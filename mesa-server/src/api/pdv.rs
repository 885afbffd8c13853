//! PDV (table service) endpoints

use axum::{
    Json, Router, middleware,
    extract::{Path, State},
    routing::{delete, get, post},
};
use shared::models::{
    AddItemsRequest, OpenTableRequest, PublicMenu, StaffRole, TableBill, TableOrder,
    TableOrderDetail, TableOverview,
};

use crate::auth::{StaffIdentity, require_role};
use crate::services::{ordering, pdv};
use crate::state::AppState;

use super::ApiResult;

/// Waiter routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/pdv/menu", get(menu))
        .route("/api/pdv/tables", get(list_tables))
        .route("/api/pdv/tables/{table_id}/orders", get(table_orders))
        .route("/api/pdv/tables/{table_id}/open", post(open_table))
        .route("/api/pdv/tables/{table_id}/close", post(close_table))
        .route("/api/pdv/orders/{order_id}", get(order_detail))
        .route("/api/pdv/orders/{order_id}/items", post(add_items))
        .route(
            "/api/pdv/orders/{order_id}/items/{item_id}",
            delete(remove_item),
        )
        .route("/api/pdv/orders/{order_id}/cancel", post(cancel_order))
        .route_layer(middleware::from_fn(require_role(StaffRole::Waiter)))
}

/// GET /api/pdv/menu
pub async fn menu(State(state): State<AppState>, identity: StaffIdentity) -> ApiResult<PublicMenu> {
    Ok(Json(ordering::store_menu(&state, identity.store_id).await?))
}

/// GET /api/pdv/tables
pub async fn list_tables(
    State(state): State<AppState>,
    identity: StaffIdentity,
) -> ApiResult<Vec<TableOverview>> {
    Ok(Json(pdv::list_tables(&state, identity.store_id).await?))
}

/// GET /api/pdv/tables/{table_id}/orders
pub async fn table_orders(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(table_id): Path<i64>,
) -> ApiResult<Vec<TableOrderDetail>> {
    Ok(Json(pdv::table_orders(&state, identity.store_id, table_id).await?))
}

/// POST /api/pdv/tables/{table_id}/open
pub async fn open_table(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(table_id): Path<i64>,
    body: Option<Json<OpenTableRequest>>,
) -> ApiResult<TableOrderDetail> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    Ok(Json(pdv::open_table(&state, identity.store_id, table_id, &req).await?))
}

/// POST /api/pdv/tables/{table_id}/close
pub async fn close_table(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(table_id): Path<i64>,
) -> ApiResult<TableBill> {
    Ok(Json(pdv::close_table(&state, identity.store_id, table_id).await?))
}

/// GET /api/pdv/orders/{order_id}
pub async fn order_detail(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(order_id): Path<i64>,
) -> ApiResult<TableOrderDetail> {
    Ok(Json(pdv::order_detail(&state, identity.store_id, order_id).await?))
}

/// POST /api/pdv/orders/{order_id}/items
pub async fn add_items(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(order_id): Path<i64>,
    Json(req): Json<AddItemsRequest>,
) -> ApiResult<TableOrderDetail> {
    Ok(Json(pdv::add_items(&state, identity.store_id, order_id, &req).await?))
}

/// DELETE /api/pdv/orders/{order_id}/items/{item_id}
pub async fn remove_item(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path((order_id, item_id)): Path<(i64, i64)>,
) -> ApiResult<TableOrderDetail> {
    Ok(Json(
        pdv::remove_item(&state, identity.store_id, order_id, item_id).await?,
    ))
}

/// POST /api/pdv/orders/{order_id}/cancel
pub async fn cancel_order(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(order_id): Path<i64>,
) -> ApiResult<TableOrder> {
    Ok(Json(pdv::cancel_order(&state, identity.store_id, order_id).await?))
}
