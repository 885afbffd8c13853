//! PDV (table service)
//!
//! A table is `occupied` while it has at least one open table order.
//! Closing a table closes all of its open orders and frees it in the same
//! transaction, so a bill is never half-closed.
//!
//! Writers lock the table row before any of its order rows.

use std::collections::HashMap;

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    AddItemsRequest, DiningTable, OpenTableRequest, TableBill, TableOrder, TableOrderDetail,
    TableOrderItem, TableOrderStatus, TableOverview, TableStatus,
};
use shared::realtime::{ChangeAction, Entity};

use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::validation::{MAX_NAME_LEN, validate_lines, validate_optional_text};

/// Attach items to their orders, keeping the order sequence
fn group_items(orders: Vec<TableOrder>, items: Vec<TableOrderItem>) -> Vec<TableOrderDetail> {
    let mut by_order: HashMap<i64, Vec<TableOrderItem>> = HashMap::new();
    for item in items {
        by_order.entry(item.table_order_id).or_default().push(item);
    }
    orders
        .into_iter()
        .map(|order| TableOrderDetail {
            items: by_order.remove(&order.id).unwrap_or_default(),
            order,
        })
        .collect()
}

fn table_not_found(table_id: i64) -> AppError {
    AppError::new(ErrorCode::TableNotFound).with_detail("table_id", table_id)
}

fn order_not_found(order_id: i64) -> AppError {
    AppError::new(ErrorCode::TableOrderNotFound).with_detail("table_order_id", order_id)
}

fn ensure_open(order: &TableOrder) -> Result<(), AppError> {
    if order.status != TableOrderStatus::Open {
        return Err(AppError::new(ErrorCode::TableOrderClosed)
            .with_detail("table_order_id", order.id)
            .with_detail("status", order.status.as_str()));
    }
    Ok(())
}

/// Lock a table order's table, then the order itself
async fn lock_order(
    conn: &mut sqlx::PgConnection,
    store_id: i64,
    order_id: i64,
) -> ServiceResult<TableOrder> {
    let table_id = db::table_orders::find(&mut *conn, store_id, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?
        .table_id;
    db::tables::lock(&mut *conn, store_id, table_id)
        .await?
        .ok_or_else(|| table_not_found(table_id))?;
    let order = db::table_orders::lock(&mut *conn, store_id, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    ensure_open(&order)?;
    Ok(order)
}

/// Tables with the running total of their open orders
pub async fn list_tables(state: &AppState, store_id: i64) -> ServiceResult<Vec<TableOverview>> {
    Ok(db::tables::list_overview(&state.pool, store_id).await?)
}

/// Open orders of a table with their items
pub async fn table_orders(
    state: &AppState,
    store_id: i64,
    table_id: i64,
) -> ServiceResult<Vec<TableOrderDetail>> {
    let orders = db::table_orders::list_open_for_table(&state.pool, store_id, table_id).await?;
    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let items = db::table_orders::list_items(&state.pool, &ids).await?;
    Ok(group_items(orders, items))
}

pub async fn order_detail(
    state: &AppState,
    store_id: i64,
    order_id: i64,
) -> ServiceResult<TableOrderDetail> {
    let order = db::table_orders::find(&state.pool, store_id, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    let items = db::table_orders::list_items(&state.pool, &[order.id]).await?;
    Ok(TableOrderDetail { order, items })
}

/// Open a new order on a table and mark it occupied.
///
/// An already occupied table gets an additional open order.
pub async fn open_table(
    state: &AppState,
    store_id: i64,
    table_id: i64,
    req: &OpenTableRequest,
) -> ServiceResult<TableOrderDetail> {
    validate_optional_text(&req.customer_name, "customer_name", MAX_NAME_LEN)?;
    let customer_name = req
        .customer_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let now = shared::util::now_millis();
    let mut tx = state.pool.begin().await?;

    let table = db::tables::lock(&mut *tx, store_id, table_id)
        .await?
        .ok_or_else(|| table_not_found(table_id))?;
    let order = db::table_orders::create(&mut *tx, store_id, table.id, customer_name, now).await?;
    if table.status != TableStatus::Occupied {
        db::tables::set_status(&mut *tx, table.id, TableStatus::Occupied).await?;
    }
    tx.commit().await?;

    tracing::info!(
        store_id,
        table_id,
        table_order_id = order.id,
        "Table order opened"
    );
    state
        .realtime
        .notify(store_id, Entity::TableOrder, ChangeAction::Insert, order.id);
    state
        .realtime
        .notify(store_id, Entity::DiningTable, ChangeAction::Update, table.id);

    Ok(TableOrderDetail {
        order,
        items: Vec::new(),
    })
}

/// Add priced items to an open table order; they start `pending` in the kitchen.
pub async fn add_items(
    state: &AppState,
    store_id: i64,
    order_id: i64,
    req: &AddItemsRequest,
) -> ServiceResult<TableOrderDetail> {
    validate_lines(&req.items)?;

    let now = shared::util::now_millis();
    let mut tx = state.pool.begin().await?;

    let order = lock_order(&mut tx, store_id, order_id).await?;

    let lines = super::price_lines(&mut *tx, store_id, &req.items).await?;
    let added = db::table_orders::insert_items(&mut *tx, order.id, &lines, now).await?;
    let total = db::table_orders::recompute_total(&mut *tx, order.id).await?;
    let items = db::table_orders::list_items(&mut *tx, &[order.id]).await?;
    tx.commit().await?;

    tracing::info!(
        store_id,
        table_order_id = order.id,
        added = added.len(),
        total = %total,
        "Items added to table order"
    );
    for item in &added {
        state
            .realtime
            .notify(store_id, Entity::TableOrderItem, ChangeAction::Insert, item.id);
    }
    state
        .realtime
        .notify(store_id, Entity::TableOrder, ChangeAction::Update, order.id);

    Ok(TableOrderDetail {
        order: TableOrder { total, ..order },
        items,
    })
}

/// Remove an item the kitchen has not started yet
pub async fn remove_item(
    state: &AppState,
    store_id: i64,
    order_id: i64,
    item_id: i64,
) -> ServiceResult<TableOrderDetail> {
    let mut tx = state.pool.begin().await?;

    let order = lock_order(&mut tx, store_id, order_id).await?;

    let item = db::table_orders::find_item(&mut *tx, order.id, item_id)
        .await?
        .ok_or_else(|| {
            AppError::new(ErrorCode::OrderItemNotFound).with_detail("item_id", item_id)
        })?;
    if item.kitchen_status != shared::kitchen::KitchenStatus::Pending {
        return Err(AppError::new(ErrorCode::ItemAlreadyInKitchen)
            .with_detail("item_id", item_id)
            .with_detail("kitchen_status", item.kitchen_status.as_str())
            .into());
    }

    db::table_orders::delete_item(&mut *tx, item.id).await?;
    let total = db::table_orders::recompute_total(&mut *tx, order.id).await?;
    let items = db::table_orders::list_items(&mut *tx, &[order.id]).await?;
    tx.commit().await?;

    state
        .realtime
        .notify(store_id, Entity::TableOrderItem, ChangeAction::Delete, item.id);
    state
        .realtime
        .notify(store_id, Entity::TableOrder, ChangeAction::Update, order.id);

    Ok(TableOrderDetail {
        order: TableOrder { total, ..order },
        items,
    })
}

/// Close every open order of a table and free it, returning the bill.
pub async fn close_table(state: &AppState, store_id: i64, table_id: i64) -> ServiceResult<TableBill> {
    let now = shared::util::now_millis();
    let mut tx = state.pool.begin().await?;

    let table: DiningTable = db::tables::lock(&mut *tx, store_id, table_id)
        .await?
        .ok_or_else(|| table_not_found(table_id))?;

    let open = db::table_orders::lock_open_for_table(&mut *tx, store_id, table.id).await?;
    if open.is_empty() && table.status == TableStatus::Free {
        return Err(AppError::new(ErrorCode::TableNotOccupied)
            .with_detail("table_id", table.id)
            .into());
    }

    let ids: Vec<i64> = open.iter().map(|o| o.id).collect();
    let items = db::table_orders::list_items(&mut *tx, &ids).await?;
    let closed = db::table_orders::finish(&mut *tx, &ids, TableOrderStatus::Closed, now).await?;
    db::tables::set_status(&mut *tx, table.id, TableStatus::Free).await?;
    tx.commit().await?;

    // `finish` returns rows in arbitrary order; keep the opening order
    let mut closed_by_id: HashMap<i64, TableOrder> = closed.into_iter().map(|o| (o.id, o)).collect();
    let orders: Vec<TableOrder> = ids
        .iter()
        .filter_map(|id| closed_by_id.remove(id))
        .collect();
    let total: Decimal = orders.iter().map(|o| o.total).sum();

    tracing::info!(
        store_id,
        table_id = table.id,
        orders = orders.len(),
        total = %total,
        "Table closed"
    );
    for order in &orders {
        state
            .realtime
            .notify(store_id, Entity::TableOrder, ChangeAction::Update, order.id);
    }
    state
        .realtime
        .notify(store_id, Entity::DiningTable, ChangeAction::Update, table.id);

    Ok(TableBill {
        table_id: table.id,
        table_number: table.number,
        orders: group_items(orders, items),
        total,
        closed_at: now,
    })
}

/// Cancel one open table order; the table is freed when it was the last one.
pub async fn cancel_order(
    state: &AppState,
    store_id: i64,
    order_id: i64,
) -> ServiceResult<TableOrder> {
    let now = shared::util::now_millis();
    let mut tx = state.pool.begin().await?;

    let order = lock_order(&mut tx, store_id, order_id).await?;

    let cancelled = db::table_orders::finish(
        &mut *tx,
        &[order.id],
        TableOrderStatus::Cancelled,
        now,
    )
    .await?
    .pop()
    .ok_or_else(|| order_not_found(order_id))?;

    let freed = db::table_orders::count_open_for_table(&mut *tx, order.table_id).await? == 0;
    if freed {
        db::tables::set_status(&mut *tx, order.table_id, TableStatus::Free).await?;
    }
    tx.commit().await?;

    tracing::info!(
        store_id,
        table_order_id = order.id,
        table_freed = freed,
        "Table order cancelled"
    );
    state
        .realtime
        .notify(store_id, Entity::TableOrder, ChangeAction::Update, order.id);
    if freed {
        state
            .realtime
            .notify(store_id, Entity::DiningTable, ChangeAction::Update, order.table_id);
    }

    Ok(cancelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;
    use shared::kitchen::KitchenStatus;

    fn order(id: i64) -> TableOrder {
        TableOrder {
            id,
            store_id: 1,
            table_id: 5,
            status: TableOrderStatus::Open,
            customer_name: None,
            total: dec!(0),
            created_at: id,
            closed_at: None,
        }
    }

    fn item(id: i64, order_id: i64) -> TableOrderItem {
        TableOrderItem {
            id,
            table_order_id: order_id,
            product_id: Some(1),
            product_name: "Coxinha".into(),
            quantity: 1,
            unit_price: dec!(7.50),
            notes: None,
            kitchen_status: KitchenStatus::Pending,
            created_at: id,
        }
    }

    #[test]
    fn group_items_keeps_order_sequence() {
        let grouped = group_items(
            vec![order(2), order(1), order(3)],
            vec![item(10, 1), item(11, 2), item(12, 1)],
        );
        let ids: Vec<i64> = grouped.iter().map(|d| d.order.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(grouped[1].items.len(), 2);
        assert_eq!(grouped[0].items[0].id, 11);
        assert!(grouped[2].items.is_empty());
    }

    #[test]
    fn closed_orders_reject_changes() {
        let mut o = order(1);
        assert!(ensure_open(&o).is_ok());
        o.status = TableOrderStatus::Closed;
        assert_eq!(ensure_open(&o).unwrap_err().code, ErrorCode::TableOrderClosed);
    }

    mod with_db {
        use super::*;
        use crate::services::{kitchen, test_support as fx, test_support::error_code};
        use shared::kitchen::OrderSource;
        use shared::models::OrderLineInput;
        use sqlx::PgPool;

        fn items(lines: &[(i64, i32)]) -> AddItemsRequest {
            AddItemsRequest {
                items: lines
                    .iter()
                    .map(|(product_id, quantity)| OrderLineInput {
                        product_id: *product_id,
                        quantity: *quantity,
                        notes: None,
                    })
                    .collect(),
            }
        }

        async fn table_status(state: &AppState, store_id: i64, table_id: i64) -> TableStatus {
            list_tables(state, store_id)
                .await
                .unwrap()
                .into_iter()
                .find(|t| t.table.id == table_id)
                .unwrap()
                .table
                .status
        }

        #[sqlx::test(migrations = "./migrations")]
        async fn close_table_bills_every_open_order(pool: PgPool) {
            let store_id = fx::store(&pool).await;
            let table_id = fx::table(&pool, store_id, 4).await;
            let beer = fx::product(&pool, store_id, "Chopp", dec!(12.00)).await;
            let fries = fx::product(&pool, store_id, "Fritas", dec!(22.50)).await;
            let state = fx::state(pool);

            let first = open_table(&state, store_id, table_id, &OpenTableRequest::default())
                .await
                .unwrap();
            let second = open_table(
                &state,
                store_id,
                table_id,
                &OpenTableRequest {
                    customer_name: Some("Bia".into()),
                },
            )
            .await
            .unwrap();
            assert_eq!(table_status(&state, store_id, table_id).await, TableStatus::Occupied);

            let added = add_items(&state, store_id, first.order.id, &items(&[(beer, 3), (fries, 1)]))
                .await
                .unwrap();
            assert_eq!(added.order.total, dec!(58.50));
            add_items(&state, store_id, second.order.id, &items(&[(beer, 1)]))
                .await
                .unwrap();

            let bill = close_table(&state, store_id, table_id).await.unwrap();
            assert_eq!(bill.table_number, 4);
            assert_eq!(bill.orders.len(), 2);
            let first_bill = bill.orders.iter().find(|o| o.order.id == first.order.id).unwrap();
            assert_eq!(first_bill.items.len(), 2);
            assert_eq!(bill.total, dec!(70.50));
            assert!(
                bill.orders
                    .iter()
                    .all(|o| o.order.status == TableOrderStatus::Closed)
            );

            assert_eq!(table_status(&state, store_id, table_id).await, TableStatus::Free);
            assert!(table_orders(&state, store_id, table_id).await.unwrap().is_empty());
            assert_eq!(
                error_code(add_items(&state, store_id, first.order.id, &items(&[(beer, 1)])).await),
                ErrorCode::TableOrderClosed
            );
            assert_eq!(
                error_code(close_table(&state, store_id, table_id).await),
                ErrorCode::TableNotOccupied
            );
        }

        #[sqlx::test(migrations = "./migrations")]
        async fn only_pending_items_can_be_removed(pool: PgPool) {
            let store_id = fx::store(&pool).await;
            let table_id = fx::table(&pool, store_id, 1).await;
            let soup = fx::product(&pool, store_id, "Caldo verde", dec!(18.00)).await;
            let bread = fx::product(&pool, store_id, "Pão de alho", dec!(9.00)).await;
            let state = fx::state(pool);

            let order = open_table(&state, store_id, table_id, &OpenTableRequest::default())
                .await
                .unwrap()
                .order;
            let detail = add_items(&state, store_id, order.id, &items(&[(soup, 1), (bread, 2)]))
                .await
                .unwrap();
            let soup_line = detail.items.iter().find(|i| i.product_name == "Caldo verde").unwrap();
            let bread_line = detail.items.iter().find(|i| i.product_name == "Pão de alho").unwrap();

            kitchen::set_item_status(
                &state,
                store_id,
                OrderSource::Table,
                soup_line.id,
                KitchenStatus::Preparing,
            )
            .await
            .unwrap();

            assert_eq!(
                error_code(remove_item(&state, store_id, order.id, soup_line.id).await),
                ErrorCode::ItemAlreadyInKitchen
            );

            let after = remove_item(&state, store_id, order.id, bread_line.id).await.unwrap();
            assert_eq!(after.items.len(), 1);
            assert_eq!(after.order.total, dec!(18.00));
        }

        #[sqlx::test(migrations = "./migrations")]
        async fn cancelling_the_last_order_frees_the_table(pool: PgPool) {
            let store_id = fx::store(&pool).await;
            let table_id = fx::table(&pool, store_id, 2).await;
            let state = fx::state(pool);

            let a = open_table(&state, store_id, table_id, &OpenTableRequest::default())
                .await
                .unwrap()
                .order;
            let b = open_table(&state, store_id, table_id, &OpenTableRequest::default())
                .await
                .unwrap()
                .order;

            let cancelled = cancel_order(&state, store_id, a.id).await.unwrap();
            assert_eq!(cancelled.status, TableOrderStatus::Cancelled);
            assert_eq!(table_status(&state, store_id, table_id).await, TableStatus::Occupied);

            cancel_order(&state, store_id, b.id).await.unwrap();
            assert_eq!(table_status(&state, store_id, table_id).await, TableStatus::Free);
            assert_eq!(
                error_code(cancel_order(&state, store_id, b.id).await),
                ErrorCode::TableOrderClosed
            );
        }
    
        #[sqlx::test(migrations = "./migrations")]
        async fn cancel_and_close_race_without_deadlock(pool: PgPool) {
            let store_id = fx::store(&pool).await;
            let table_id = fx::table(&pool, store_id, 9).await;
            let state = fx::state(pool);

            for _ in 0..20 {
                let a = open_table(&state, store_id, table_id, &OpenTableRequest::default())
                    .await
                    .unwrap()
                    .order;
                open_table(&state, store_id, table_id, &OpenTableRequest::default())
                    .await
                    .unwrap();

                let (cancelled, closed) = tokio::join!(
                    cancel_order(&state, store_id, a.id),
                    close_table(&state, store_id, table_id),
                );
                assert!(closed.is_ok());
                if let Err(e) = cancelled {
                    assert_eq!(AppError::from(e).code, ErrorCode::TableOrderClosed);
                }
                assert_eq!(table_status(&state, store_id, table_id).await, TableStatus::Free);
            }
        }

        #[sqlx::test(migrations = "./migrations")]
        async fn bill_lines_match_bill_total_under_concurrent_adds(pool: PgPool) {
            let store_id = fx::store(&pool).await;
            let table_id = fx::table(&pool, store_id, 10).await;
            let water = fx::product(&pool, store_id, "Água", dec!(4.00)).await;
            let state = fx::state(pool);

            for _ in 0..20 {
                let order = open_table(&state, store_id, table_id, &OpenTableRequest::default())
                    .await
                    .unwrap()
                    .order;
                add_items(&state, store_id, order.id, &items(&[(water, 1)]))
                    .await
                    .unwrap();

                let more = items(&[(water, 2)]);
                let (added, bill) = tokio::join!(
                    add_items(&state, store_id, order.id, &more),
                    close_table(&state, store_id, table_id),
                );
                let bill = bill.unwrap();
                let billed: Decimal = bill
                    .orders
                    .iter()
                    .flat_map(|o| &o.items)
                    .map(|i| i.unit_price * Decimal::from(i.quantity))
                    .sum();
                assert_eq!(billed, bill.total);
                if let Err(e) = added {
                    assert_eq!(AppError::from(e).code, ErrorCode::TableOrderClosed);
                }
            }
        }
    }
}
