//! Online order status and driver dispatch

use shared::error::{AppError, ErrorCode};
use shared::models::{DriverOrder, Fulfillment, Order, OrderDetail, OrderStatus};
use shared::realtime::{ChangeAction, Entity};

use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

/// Upper bound on a staff order listing
pub const MAX_ORDER_LIST: i64 = 200;

fn order_not_found(order_id: i64) -> AppError {
    AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id)
}

fn finished_error(order: &Order) -> Option<AppError> {
    let code = match order.status {
        OrderStatus::Delivered => ErrorCode::OrderAlreadyCompleted,
        OrderStatus::Cancelled => ErrorCode::OrderAlreadyCancelled,
        _ => return None,
    };
    Some(AppError::new(code).with_detail("order_id", order.id))
}

/// Whether `order` may move to `to`. `Ok(false)` means the order already
/// has that status and nothing needs to be written.
fn check_transition(order: &Order, to: OrderStatus) -> Result<bool, AppError> {
    if order.status == to {
        return Ok(false);
    }
    if let Some(err) = finished_error(order) {
        return Err(err);
    }
    if !order.status.can_transition_to(to, order.fulfillment) {
        return Err(AppError::invalid_transition(order.status.as_str(), to.as_str())
            .with_detail("order_id", order.id)
            .with_detail("fulfillment", order.fulfillment.as_str()));
    }
    Ok(true)
}

/// Staff listing, newest first. An empty filter lists every status.
pub async fn list_orders(
    state: &AppState,
    store_id: i64,
    statuses: &[OrderStatus],
    limit: Option<i64>,
) -> ServiceResult<Vec<Order>> {
    let limit = limit.unwrap_or(MAX_ORDER_LIST).clamp(1, MAX_ORDER_LIST);
    Ok(db::orders::list(&state.pool, store_id, statuses, limit).await?)
}

pub async fn order_detail(
    state: &AppState,
    store_id: i64,
    order_id: i64,
) -> ServiceResult<OrderDetail> {
    let order = db::orders::find(&state.pool, store_id, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    let items = db::orders::list_items(&state.pool, order.id).await?;
    Ok(OrderDetail { order, items })
}

/// Move an order through its lifecycle
pub async fn update_status(
    state: &AppState,
    store_id: i64,
    order_id: i64,
    to: OrderStatus,
) -> ServiceResult<Order> {
    let now = shared::util::now_millis();
    let mut tx = state.pool.begin().await?;

    let order = db::orders::lock(&mut *tx, store_id, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    if !check_transition(&order, to)? {
        return Ok(order);
    }
    let from = order.status;
    let order = db::orders::set_status(&mut *tx, order.id, to, now).await?;
    tx.commit().await?;

    tracing::info!(
        store_id,
        order_id,
        from = %from,
        to = %to,
        "Order status updated"
    );
    state
        .realtime
        .notify(store_id, Entity::Order, ChangeAction::Update, order.id);
    Ok(order)
}

/// Assign a driver to a delivery order, or unassign with `None`
pub async fn assign_driver(
    state: &AppState,
    store_id: i64,
    order_id: i64,
    driver_id: Option<i64>,
) -> ServiceResult<Order> {
    let now = shared::util::now_millis();
    let mut tx = state.pool.begin().await?;

    let order = db::orders::lock(&mut *tx, store_id, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    if order.fulfillment != Fulfillment::Delivery {
        return Err(AppError::with_message(
            ErrorCode::InvalidRequest,
            "Only delivery orders can have a driver",
        )
        .with_detail("order_id", order_id)
        .into());
    }
    if let Some(err) = finished_error(&order) {
        return Err(err.into());
    }

    if let Some(driver_id) = driver_id {
        let driver = db::drivers::find(&mut *tx, store_id, driver_id)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::DriverNotFound).with_detail("driver_id", driver_id)
            })?;
        if !driver.is_active {
            return Err(AppError::new(ErrorCode::DriverInactive)
                .with_detail("driver_id", driver_id)
                .into());
        }
    }

    let order = db::orders::set_driver(&mut *tx, order.id, driver_id, now).await?;
    tx.commit().await?;

    tracing::info!(store_id, order_id, driver_id = ?driver_id, "Driver assignment changed");
    state
        .realtime
        .notify(store_id, Entity::Order, ChangeAction::Update, order.id);
    Ok(order)
}

/// Dashboard of the calling driver
pub async fn driver_orders(
    state: &AppState,
    store_id: i64,
    driver_id: i64,
) -> ServiceResult<Vec<DriverOrder>> {
    Ok(db::orders::list_for_driver(&state.pool, store_id, driver_id).await?)
}

/// Driver-side transition of an order assigned to them
async fn driver_transition(
    state: &AppState,
    store_id: i64,
    driver_id: i64,
    order_id: i64,
    to: OrderStatus,
) -> ServiceResult<Order> {
    let now = shared::util::now_millis();
    let mut tx = state.pool.begin().await?;

    let order = db::orders::lock(&mut *tx, store_id, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    if order.driver_id != Some(driver_id) {
        return Err(AppError::new(ErrorCode::DriverNotAssigned)
            .with_detail("order_id", order_id)
            .into());
    }
    if !check_transition(&order, to)? {
        return Ok(order);
    }
    let order = db::orders::set_status(&mut *tx, order.id, to, now).await?;
    tx.commit().await?;

    tracing::info!(store_id, order_id, driver_id, status = %to, "Driver updated order");
    state
        .realtime
        .notify(store_id, Entity::Order, ChangeAction::Update, order.id);
    Ok(order)
}

/// ready → out_for_delivery
pub async fn driver_pickup(
    state: &AppState,
    store_id: i64,
    driver_id: i64,
    order_id: i64,
) -> ServiceResult<Order> {
    driver_transition(state, store_id, driver_id, order_id, OrderStatus::OutForDelivery).await
}

/// out_for_delivery → delivered
pub async fn driver_deliver(
    state: &AppState,
    store_id: i64,
    driver_id: i64,
    order_id: i64,
) -> ServiceResult<Order> {
    driver_transition(state, store_id, driver_id, order_id, OrderStatus::Delivered).await
}
