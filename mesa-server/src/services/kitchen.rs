//! Kitchen display operations
//!
//! Cooks work on tickets built from both item tables. Moving the items of
//! an online order also moves the order itself: the first item started
//! puts it in `preparing`, the last item done puts it in `ready`.

use shared::error::{AppError, ErrorCode};
use shared::kitchen::{self, KitchenStatus, KitchenTicket, OrderSource, TicketAdvance};
use shared::models::{Order, OrderStatus, TableOrderStatus};
use shared::realtime::{ChangeAction, Entity};
use sqlx::PgConnection;

use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

/// Current tickets, oldest first.
///
/// Fully ready tickets are left out unless `include_ready` is set; they stay
/// listed until the table is closed or the order leaves the kitchen.
pub async fn tickets(
    state: &AppState,
    store_id: i64,
    include_ready: bool,
) -> ServiceResult<Vec<KitchenTicket>> {
    let lines = db::kitchen::load_lines(&state.pool, store_id).await?;
    let tickets = kitchen::aggregate(lines, shared::util::now_millis(), &state.kitchen);
    Ok(if include_ready {
        tickets
    } else {
        kitchen::outstanding(tickets)
    })
}

/// Order status implied by the kitchen progress of its items, when it
/// differs from `current`.
pub fn delivery_status_for(current: OrderStatus, items: &[KitchenStatus]) -> Option<OrderStatus> {
    let least = items.iter().min()?;
    let started = items.iter().any(|s| *s != KitchenStatus::Pending);

    match current {
        OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Preparing
            if *least == KitchenStatus::Ready =>
        {
            Some(OrderStatus::Ready)
        }
        OrderStatus::Pending | OrderStatus::Confirmed if started => Some(OrderStatus::Preparing),
        _ => None,
    }
}

/// Lock the order a kitchen change applies to and check it is still in
/// the kitchen. Returns the online order for status sync.
async fn lock_active(
    conn: &mut PgConnection,
    store_id: i64,
    source: OrderSource,
    order_id: i64,
) -> ServiceResult<Option<Order>> {
    match source {
        OrderSource::Table => {
            let order = db::table_orders::lock(&mut *conn, store_id, order_id)
                .await?
                .ok_or_else(|| {
                    AppError::new(ErrorCode::TableOrderNotFound).with_detail("table_order_id", order_id)
                })?;
            if order.status != TableOrderStatus::Open {
                return Err(AppError::new(ErrorCode::TableOrderClosed)
                    .with_detail("table_order_id", order_id)
                    .into());
            }
            Ok(None)
        }
        OrderSource::Delivery => {
            let order = db::orders::lock(&mut *conn, store_id, order_id)
                .await?
                .ok_or_else(|| {
                    AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id)
                })?;
            if !OrderStatus::KITCHEN_ACTIVE.contains(&order.status) {
                return Err(AppError::with_message(
                    ErrorCode::InvalidStatusTransition,
                    "Order has already left the kitchen",
                )
                .with_detail("order_id", order_id)
                .with_detail("status", order.status.as_str())
                .into());
            }
            Ok(Some(order))
        }
    }
}

/// Move an online order along with its items. Returns the updated order
/// when its status changed.
async fn sync_order_status(
    conn: &mut PgConnection,
    order: Option<Order>,
    items: &[KitchenStatus],
    now: i64,
) -> ServiceResult<Option<Order>> {
    let Some(order) = order else {
        return Ok(None);
    };
    match delivery_status_for(order.status, items) {
        Some(next) => Ok(Some(db::orders::set_status(&mut *conn, order.id, next, now).await?)),
        None => Ok(None),
    }
}

fn item_entity(source: OrderSource) -> Entity {
    match source {
        OrderSource::Table => Entity::TableOrderItem,
        OrderSource::Delivery => Entity::OrderItem,
    }
}

fn publish_progress(
    state: &AppState,
    store_id: i64,
    source: OrderSource,
    order_id: i64,
    order_changed: bool,
) {
    let entity = match source {
        OrderSource::Table => Entity::TableOrder,
        OrderSource::Delivery => Entity::Order,
    };
    if source == OrderSource::Table || order_changed {
        state
            .realtime
            .notify(store_id, entity, ChangeAction::Update, order_id);
    }
}

/// Set one line's kitchen status. Lines may also be moved back.
pub async fn set_item_status(
    state: &AppState,
    store_id: i64,
    source: OrderSource,
    item_id: i64,
    status: KitchenStatus,
) -> ServiceResult<TicketAdvance> {
    let now = shared::util::now_millis();
    let mut tx = state.pool.begin().await?;

    let order_id = db::kitchen::find_item_order(&mut *tx, store_id, source, item_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderItemNotFound).with_detail("item_id", item_id))?;
    let order = lock_active(&mut tx, store_id, source, order_id).await?;

    db::kitchen::set_item_status(&mut *tx, source, item_id, status).await?;
    let items = db::kitchen::item_statuses(&mut *tx, source, order_id).await?;
    let synced = sync_order_status(&mut tx, order, &items, now).await?;
    tx.commit().await?;

    tracing::debug!(
        store_id,
        source = %source,
        item_id,
        status = %status,
        "Kitchen item updated"
    );
    if let Some(order) = &synced {
        tracing::info!(store_id, order_id, status = %order.status, "Order status follows kitchen");
    }
    state
        .realtime
        .notify(store_id, item_entity(source), ChangeAction::Update, item_id);
    publish_progress(state, store_id, source, order_id, synced.is_some());

    Ok(TicketAdvance {
        source,
        order_id,
        status: items.iter().min().copied().unwrap_or(status),
        items_changed: 1,
    })
}

/// Bump a whole ticket one step: every item behind the ticket's next
/// status is raised to it. A ready ticket stays ready.
pub async fn advance_ticket(
    state: &AppState,
    store_id: i64,
    source: OrderSource,
    order_id: i64,
) -> ServiceResult<TicketAdvance> {
    let now = shared::util::now_millis();
    let mut tx = state.pool.begin().await?;

    let order = lock_active(&mut tx, store_id, source, order_id).await?;
    let before = db::kitchen::item_statuses(&mut *tx, source, order_id).await?;
    let current = before
        .iter()
        .min()
        .copied()
        .ok_or_else(|| AppError::new(ErrorCode::OrderEmpty).with_detail("order_id", order_id))?;
    let target = current.next();

    let items_changed = db::kitchen::raise_items(&mut *tx, source, order_id, target).await?;
    let after: Vec<KitchenStatus> = before.iter().map(|s| (*s).max(target)).collect();
    let synced = sync_order_status(&mut tx, order, &after, now).await?;
    tx.commit().await?;

    tracing::info!(
        store_id,
        source = %source,
        order_id,
        status = %target,
        items_changed,
        "Kitchen ticket advanced"
    );
    if items_changed > 0 {
        // One event per ticket; screens refetch the whole ticket list anyway
        state
            .realtime
            .notify(store_id, item_entity(source), ChangeAction::Update, order_id);
    }
    publish_progress(state, store_id, source, order_id, synced.is_some());

    Ok(TicketAdvance {
        source,
        order_id,
        status: target,
        items_changed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use KitchenStatus::{Pending, Preparing, Ready};

    #[test]
    fn untouched_order_keeps_status() {
        assert_eq!(delivery_status_for(OrderStatus::Pending, &[Pending, Pending]), None);
        assert_eq!(delivery_status_for(OrderStatus::Confirmed, &[Pending]), None);
    }

    #[test]
    fn first_started_item_moves_order_to_preparing() {
        assert_eq!(
            delivery_status_for(OrderStatus::Pending, &[Preparing, Pending]),
            Some(OrderStatus::Preparing)
        );
        assert_eq!(
            delivery_status_for(OrderStatus::Confirmed, &[Ready, Pending]),
            Some(OrderStatus::Preparing)
        );
        assert_eq!(delivery_status_for(OrderStatus::Preparing, &[Ready, Pending]), None);
    }

    #[test]
    fn all_ready_moves_order_to_ready() {
        for current in [OrderStatus::Pending, OrderStatus::Confirmed, OrderStatus::Preparing] {
            assert_eq!(
                delivery_status_for(current, &[Ready, Ready]),
                Some(OrderStatus::Ready)
            );
        }
        assert_eq!(delivery_status_for(OrderStatus::Ready, &[Ready]), None);
    }

    #[test]
    fn orders_past_the_kitchen_are_left_alone() {
        assert_eq!(delivery_status_for(OrderStatus::OutForDelivery, &[Ready]), None);
        assert_eq!(delivery_status_for(OrderStatus::Cancelled, &[Preparing]), None);
    }

    #[test]
    fn order_without_items_has_no_kitchen_status() {
        assert_eq!(delivery_status_for(OrderStatus::Pending, &[]), None);
    }

    mod with_db {
        use super::*;
        use crate::services::{ordering, test_support as fx};
        use rust_decimal::dec;
        use shared::models::{Fulfillment, OrderLineInput, PaymentMethod, PlaceOrderRequest};
        use sqlx::PgPool;

        async fn order_status(state: &AppState, code: &str) -> OrderStatus {
            ordering::track_order(state, code).await.unwrap().order.status
        }

        #[sqlx::test(migrations = "./migrations")]
        async fn advancing_a_delivery_ticket_moves_the_order(pool: PgPool) {
            let store_id = fx::store(&pool).await;
            let pastel = fx::product(&pool, store_id, "Pastel", dec!(9.00)).await;
            let juice = fx::product(&pool, store_id, "Suco", dec!(8.00)).await;
            let zone = fx::zone(&pool, store_id, dec!(5.00)).await;
            let state = fx::state(pool);

            let req = PlaceOrderRequest {
                customer_name: "Caio".into(),
                customer_phone: "11955554444".into(),
                fulfillment: Fulfillment::Delivery,
                address: Some("Rua Oscar Freire, 20".into()),
                delivery_zone_id: Some(zone),
                payment_method: PaymentMethod::Card,
                coupon_code: None,
                notes: None,
                items: [(pastel, 2), (juice, 1)]
                    .into_iter()
                    .map(|(product_id, quantity)| OrderLineInput {
                        product_id,
                        quantity,
                        notes: None,
                    })
                    .collect(),
            };
            let placed = ordering::place_order(&state, fx::SLUG, &req).await.unwrap();
            let code = placed.order.code.clone();
            assert_eq!(placed.order.status, OrderStatus::Pending);

            let first = advance_ticket(&state, store_id, OrderSource::Delivery, placed.order.id)
                .await
                .unwrap();
            assert_eq!(first.status, Preparing);
            assert_eq!(first.items_changed, 2);
            assert_eq!(order_status(&state, &code).await, OrderStatus::Preparing);

            let second = advance_ticket(&state, store_id, OrderSource::Delivery, placed.order.id)
                .await
                .unwrap();
            assert_eq!(second.status, Ready);
            assert_eq!(order_status(&state, &code).await, OrderStatus::Ready);

            let outstanding = tickets(&state, store_id, false).await.unwrap();
            assert!(outstanding.iter().all(|t| t.order_id != placed.order.id));
        }
    }
}
