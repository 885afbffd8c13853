//! Public menu and online ordering

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    CouponValidateRequest, CouponValidateResponse, DeliveryZone, Fulfillment, Order, OrderDetail,
    PlaceOrderRequest, PublicMenu, Store, normalize_code,
};
use sqlx::PgConnection;
use shared::pricing::{self, OrderTotals};
use shared::realtime::{ChangeAction, Entity};

use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_lines,
    validate_money, validate_optional_text, validate_required_text,
};

/// Attempts at drawing an unused public order code
const ORDER_CODE_ATTEMPTS: usize = 8;

async fn store_by_slug(state: &AppState, slug: &str) -> ServiceResult<Store> {
    db::stores::find_by_slug(&state.pool, slug)
        .await?
        .ok_or_else(|| {
            AppError::new(ErrorCode::StoreNotFound)
                .with_detail("slug", slug)
                .into()
        })
}

/// Store info with active categories and available products
pub async fn public_menu(state: &AppState, slug: &str) -> ServiceResult<PublicMenu> {
    let store = store_by_slug(state, slug).await?;
    menu_of(state, store).await
}

/// The same menu for staff screens (PDV), resolved from the staff's store
pub async fn store_menu(state: &AppState, store_id: i64) -> ServiceResult<PublicMenu> {
    let store = db::stores::find_by_id(&state.pool, store_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::StoreNotFound))?;
    menu_of(state, store).await
}

async fn menu_of(state: &AppState, store: Store) -> ServiceResult<PublicMenu> {
    let categories = db::menu::list_categories(&state.pool, store.id, true).await?;
    let products = db::menu::list_products(&state.pool, store.id, true).await?;

    // Products of hidden categories are hidden too
    let visible: std::collections::HashSet<i64> = categories.iter().map(|c| c.id).collect();
    let products = products
        .into_iter()
        .filter(|p| p.category_id.is_none_or(|c| visible.contains(&c)))
        .collect();

    Ok(PublicMenu {
        store,
        categories,
        products,
    })
}

pub async fn public_zones(state: &AppState, slug: &str) -> ServiceResult<Vec<DeliveryZone>> {
    let store = store_by_slug(state, slug).await?;
    Ok(db::zones::list(&state.pool, store.id, true).await?)
}

/// Check a coupon code against a cart subtotal without consuming it
pub async fn validate_coupon(
    state: &AppState,
    slug: &str,
    req: &CouponValidateRequest,
) -> ServiceResult<CouponValidateResponse> {
    validate_money(req.subtotal, "subtotal")?;
    let store = store_by_slug(state, slug).await?;
    let code = normalize_code(&req.code);
    let coupon = db::coupons::find_by_code(&state.pool, store.id, &code)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CouponNotFound).with_detail("code", code.clone()))?;

    let discount = pricing::coupon_discount(&coupon, req.subtotal, shared::util::now_millis())?;
    Ok(CouponValidateResponse {
        code: coupon.code,
        kind: coupon.kind,
        discount,
    })
}

fn check_minimum(subtotal: Decimal, minimum: Option<Decimal>, scope: &str) -> Result<(), AppError> {
    if let Some(min) = minimum
        && subtotal < min
    {
        return Err(AppError::new(ErrorCode::BelowMinimumOrder)
            .with_detail("scope", scope)
            .with_detail("minimum", min.to_string())
            .with_detail("subtotal", subtotal.to_string()));
    }
    Ok(())
}

fn validate_request(req: &PlaceOrderRequest) -> Result<(), AppError> {
    validate_required_text(&req.customer_name, "customer_name", MAX_NAME_LEN)?;
    validate_required_text(&req.customer_phone, "customer_phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&req.notes, "notes", MAX_NOTE_LEN)?;
    validate_optional_text(&req.coupon_code, "coupon_code", MAX_SHORT_TEXT_LEN)?;
    validate_lines(&req.items)?;

    if req.fulfillment == Fulfillment::Delivery {
        match &req.address {
            Some(address) => validate_required_text(address, "address", MAX_ADDRESS_LEN)?,
            None => {
                return Err(AppError::validation("address is required for delivery")
                    .with_detail("field", "address"));
            }
        }
        if req.delivery_zone_id.is_none() {
            return Err(AppError::new(ErrorCode::DeliveryZoneRequired));
        }
    }
    Ok(())
}

/// Place a delivery or pickup order.
///
/// Prices come from the products table, the zone fee and both minimums are
/// enforced and the coupon (if any) is consumed, all in one transaction.
pub async fn place_order(
    state: &AppState,
    slug: &str,
    req: &PlaceOrderRequest,
) -> ServiceResult<OrderDetail> {
    validate_request(req)?;
    let store = store_by_slug(state, slug).await?;

    if !store.is_open {
        return Err(AppError::new(ErrorCode::StoreClosed).into());
    }
    match req.fulfillment {
        Fulfillment::Delivery if !store.delivery_enabled => {
            return Err(AppError::new(ErrorCode::DeliveryDisabled).into());
        }
        Fulfillment::Pickup if !store.pickup_enabled => {
            return Err(AppError::new(ErrorCode::PickupDisabled).into());
        }
        _ => {}
    }

    let now = shared::util::now_millis();
    let mut tx = state.pool.begin().await?;

    let lines = super::price_lines(&mut *tx, store.id, &req.items).await?;
    let subtotal = pricing::subtotal(lines.iter().map(|l| (l.unit_price, l.quantity)));
    check_minimum(subtotal, Some(store.min_order_value), "store")?;

    let (zone_id, delivery_fee) = match req.fulfillment {
        Fulfillment::Delivery => {
            let zone_id = req
                .delivery_zone_id
                .ok_or_else(|| AppError::new(ErrorCode::DeliveryZoneRequired))?;
            let zone = db::zones::find(&mut *tx, store.id, zone_id)
                .await?
                .ok_or_else(|| {
                    AppError::new(ErrorCode::DeliveryZoneNotFound).with_detail("zone_id", zone_id)
                })?;
            if !zone.is_active {
                return Err(AppError::new(ErrorCode::DeliveryZoneInactive)
                    .with_detail("zone_id", zone_id)
                    .into());
            }
            check_minimum(subtotal, zone.min_order_value, "zone")?;
            (Some(zone.id), zone.fee)
        }
        Fulfillment::Pickup => (None, Decimal::ZERO),
    };

    let coupon_code = req
        .coupon_code
        .as_deref()
        .map(normalize_code)
        .filter(|c| !c.is_empty());
    let discount = match &coupon_code {
        Some(code) => {
            let coupon = db::coupons::lock_by_code(&mut *tx, store.id, code)
                .await?
                .ok_or_else(|| {
                    AppError::new(ErrorCode::CouponNotFound).with_detail("code", code.clone())
                })?;
            let discount = pricing::coupon_discount(&coupon, subtotal, now)?;
            db::coupons::increment_use(&mut *tx, coupon.id).await?;
            discount
        }
        None => Decimal::ZERO,
    };

    let totals = OrderTotals::compute(subtotal, discount, delivery_fee);
    let address = match req.fulfillment {
        Fulfillment::Delivery => req.address.as_deref().map(str::trim),
        Fulfillment::Pickup => None,
    };

    let new_order = db::orders::NewOrder {
        store_id: store.id,
        // drawn by insert_with_code
        code: "",
        customer_name: req.customer_name.trim(),
        customer_phone: req.customer_phone.trim(),
        fulfillment: req.fulfillment,
        address,
        delivery_zone_id: zone_id,
        payment_method: req.payment_method,
        subtotal: totals.subtotal,
        delivery_fee: totals.delivery_fee,
        discount: totals.discount,
        total: totals.total,
        coupon_code: coupon_code.as_deref(),
        notes: req.notes.as_deref(),
        now,
    };
    let order = insert_with_code(&mut tx, new_order, shared::util::order_code).await?;

    let items = db::orders::insert_items(&mut *tx, order.id, &lines, now).await?;
    tx.commit().await?;

    tracing::info!(
        store_id = store.id,
        order_id = order.id,
        code = %order.code,
        fulfillment = %order.fulfillment,
        total = %order.total,
        "Online order placed"
    );
    state
        .realtime
        .notify(store.id, Entity::Order, ChangeAction::Insert, order.id);

    Ok(OrderDetail { order, items })
}

/// Insert `order` under the first code from `next_code` not yet used in the store
async fn insert_with_code(
    conn: &mut PgConnection,
    order: db::orders::NewOrder<'_>,
    mut next_code: impl FnMut() -> String,
) -> ServiceResult<Order> {
    for _ in 0..ORDER_CODE_ATTEMPTS {
        let code = next_code();
        let attempt = db::orders::NewOrder {
            code: &code,
            ..order
        };
        if let Some(row) = db::orders::insert(&mut *conn, &attempt).await? {
            return Ok(row);
        }
        tracing::debug!(store_id = order.store_id, code = %code, "Order code collision, retrying");
    }
    Err(AppError::internal("Could not allocate an order code").into())
}

/// Order tracking by public code
pub async fn track_order(state: &AppState, code: &str) -> ServiceResult<OrderDetail> {
    let code = normalize_code(code.trim_start_matches('#'));
    let order = db::orders::find_by_code(&state.pool, &code)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound).with_detail("code", code.clone()))?;
    let items = db::orders::list_items(&state.pool, order.id).await?;
    Ok(OrderDetail { order, items })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;
    use shared::models::{OrderLineInput, PaymentMethod};

    fn request(fulfillment: Fulfillment) -> PlaceOrderRequest {
        PlaceOrderRequest {
            customer_name: "Joana".into(),
            customer_phone: "+55 11 99999-0000".into(),
            fulfillment,
            address: None,
            delivery_zone_id: None,
            payment_method: PaymentMethod::Pix,
            coupon_code: None,
            notes: None,
            items: vec![OrderLineInput {
                product_id: 1,
                quantity: 2,
                notes: None,
            }],
        }
    }

    #[test]
    fn pickup_needs_no_address() {
        assert!(validate_request(&request(Fulfillment::Pickup)).is_ok());
    }

    #[test]
    fn delivery_needs_address_and_zone() {
        let mut req = request(Fulfillment::Delivery);
        assert_eq!(
            validate_request(&req).unwrap_err().code,
            ErrorCode::ValidationFailed
        );

        req.address = Some("Rua das Flores, 10".into());
        assert_eq!(
            validate_request(&req).unwrap_err().code,
            ErrorCode::DeliveryZoneRequired
        );

        req.delivery_zone_id = Some(3);
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn empty_cart_is_rejected() {
        let mut req = request(Fulfillment::Pickup);
        req.items.clear();
        assert_eq!(validate_request(&req).unwrap_err().code, ErrorCode::OrderEmpty);
    }

    #[test]
    fn minimum_order_value() {
        assert!(check_minimum(dec!(30), Some(dec!(30)), "store").is_ok());
        assert!(check_minimum(dec!(30), None, "zone").is_ok());
        let err = check_minimum(dec!(29.99), Some(dec!(30)), "zone").unwrap_err();
        assert_eq!(err.code, ErrorCode::BelowMinimumOrder);
        assert_eq!(
            err.details.unwrap().get("scope"),
            Some(&serde_json::json!("zone"))
        );
    }

    mod with_db {
        use super::*;
        use crate::services::test_support::{self as fx, SLUG, error_code};
        use sqlx::PgPool;

        fn line(product_id: i64, quantity: i32) -> OrderLineInput {
            OrderLineInput {
                product_id,
                quantity,
                notes: None,
            }
        }

        fn pickup(product_id: i64, coupon: Option<&str>) -> PlaceOrderRequest {
            PlaceOrderRequest {
                coupon_code: coupon.map(str::to_string),
                items: vec![line(product_id, 2)],
                ..request(Fulfillment::Pickup)
            }
        }

        #[sqlx::test(migrations = "./migrations")]
        async fn coupon_is_consumed_once_per_order(pool: PgPool) {
            let store_id = fx::store(&pool).await;
            let burger = fx::product(&pool, store_id, "X-Burger", dec!(25.00)).await;
            let coupon = fx::coupon(&pool, store_id, "PRIMEIRA", dec!(10), 1).await;
            let state = fx::state(pool.clone());

            let placed = place_order(&state, SLUG, &pickup(burger, Some(" primeira ")))
                .await
                .unwrap();
            assert_eq!(placed.order.subtotal, dec!(50.00));
            assert_eq!(placed.order.discount, dec!(5.00));
            assert_eq!(placed.order.total, dec!(45.00));
            assert_eq!(placed.order.coupon_code.as_deref(), Some("PRIMEIRA"));
            assert_eq!(fx::coupon_uses(&pool, coupon).await, 1);

            let again = place_order(&state, SLUG, &pickup(burger, Some("PRIMEIRA"))).await;
            assert_eq!(error_code(again), ErrorCode::CouponExhausted);
            assert_eq!(fx::coupon_uses(&pool, coupon).await, 1);

            let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE store_id = $1")
                .bind(store_id)
                .fetch_one(&pool)
                .await
                .unwrap();
            assert_eq!(orders, 1);
        }

        #[sqlx::test(migrations = "./migrations")]
        async fn delivery_adds_zone_fee(pool: PgPool) {
            let store_id = fx::store(&pool).await;
            let pizza = fx::product(&pool, store_id, "Pizza", dec!(40.00)).await;
            let zone = fx::zone(&pool, store_id, dec!(7.50)).await;
            let state = fx::state(pool);

            let req = PlaceOrderRequest {
                address: Some("Rua Augusta, 500".into()),
                delivery_zone_id: Some(zone),
                items: vec![line(pizza, 1)],
                ..request(Fulfillment::Delivery)
            };
            let placed = place_order(&state, SLUG, &req).await.unwrap();
            assert_eq!(placed.order.delivery_fee, dec!(7.50));
            assert_eq!(placed.order.total, dec!(47.50));
            assert_eq!(placed.items.len(), 1);

            let tracked = track_order(&state, &format!("#{}", placed.order.code.to_lowercase()))
                .await
                .unwrap();
            assert_eq!(tracked.order.id, placed.order.id);
        }

        #[sqlx::test(migrations = "./migrations")]
        async fn taken_codes_are_redrawn(pool: PgPool) {
            let store_id = fx::store(&pool).await;
            let soda = fx::product(&pool, store_id, "Guaraná", dec!(6.00)).await;
            let state = fx::state(pool.clone());
            let first = place_order(&state, SLUG, &pickup(soda, None)).await.unwrap();
            let taken = first.order.code.clone();

            let template = db::orders::NewOrder {
                store_id,
                code: "",
                customer_name: "Rafa",
                customer_phone: "11977776666",
                fulfillment: Fulfillment::Pickup,
                address: None,
                delivery_zone_id: None,
                payment_method: PaymentMethod::Cash,
                subtotal: dec!(6.00),
                delivery_fee: Decimal::ZERO,
                discount: Decimal::ZERO,
                total: dec!(6.00),
                coupon_code: None,
                notes: None,
                now: 1,
            };

            let mut conn = pool.acquire().await.unwrap();
            let mut draws = vec!["K7P2QX".to_string(), taken.clone(), taken.clone()];
            let order = insert_with_code(&mut conn, template, || draws.pop().unwrap())
                .await
                .unwrap();
            assert_eq!(order.code, "K7P2QX");

            let always_taken = insert_with_code(&mut conn, template, || taken.clone()).await;
            assert_eq!(error_code(always_taken), ErrorCode::InternalError);
        }

        #[sqlx::test(migrations = "./migrations")]
        async fn coupon_check_rejects_huge_subtotal(pool: PgPool) {
            let store_id = fx::store(&pool).await;
            fx::coupon(&pool, store_id, "METADE", dec!(50), 10).await;
            let state = fx::state(pool);

            let req = CouponValidateRequest {
                code: "METADE".into(),
                subtotal: Decimal::MAX,
            };
            assert_eq!(
                error_code(validate_coupon(&state, SLUG, &req).await),
                ErrorCode::ValueOutOfRange
            );

            let req = CouponValidateRequest {
                code: "metade".into(),
                subtotal: dec!(30),
            };
            let checked = validate_coupon(&state, SLUG, &req).await.unwrap();
            assert_eq!(checked.discount, dec!(15.00));
        }
    }
}
