use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{Coupon, CouponCreate, CouponKind, CouponUpdate, normalize_code};
use shared::realtime::{ChangeAction, Entity};

use crate::api::ApiResult;
use crate::auth::StaffIdentity;
use crate::db::coupons;
use crate::error::on_unique_violation;
use crate::state::AppState;
use crate::validation::{MAX_SHORT_TEXT_LEN, validate_money, validate_required_text};

use super::{Deleted, internal};

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::CouponNotFound).with_detail("coupon_id", id)
}

/// Percent coupons take (0, 100]; fixed coupons any positive amount
fn check_value(kind: CouponKind, value: Decimal) -> Result<(), AppError> {
    validate_money(value, "value")?;
    let in_range = match kind {
        CouponKind::Percent => value > Decimal::ZERO && value <= Decimal::ONE_HUNDRED,
        CouponKind::Fixed => value > Decimal::ZERO,
    };
    if !in_range {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("Invalid {kind} coupon value"),
        )
        .with_detail("field", "value")
        .with_detail("value", value.to_string()));
    }
    Ok(())
}

fn check_limits(min_order_value: Option<Decimal>, max_uses: Option<i32>) -> Result<(), AppError> {
    if let Some(min) = min_order_value {
        validate_money(min, "min_order_value")?;
    }
    if let Some(max) = max_uses
        && max <= 0
    {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "max_uses must be positive",
        )
        .with_detail("field", "max_uses"));
    }
    Ok(())
}

pub async fn list_coupons(
    State(state): State<AppState>,
    identity: StaffIdentity,
) -> ApiResult<Vec<Coupon>> {
    let coupons = coupons::list(&state.pool, identity.store_id)
        .await
        .map_err(internal)?;
    Ok(Json(coupons))
}

pub async fn create_coupon(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Json(data): Json<CouponCreate>,
) -> ApiResult<Coupon> {
    let code = normalize_code(&data.code);
    validate_required_text(&code, "code", MAX_SHORT_TEXT_LEN)?;
    check_value(data.kind, data.value)?;
    check_limits(data.min_order_value, data.max_uses)?;

    let coupon = coupons::create(&state.pool, identity.store_id, &code, &data)
        .await
        .map_err(|e| {
            AppError::from(on_unique_violation(e, || {
                AppError::new(ErrorCode::CouponCodeExists).with_detail("code", code.clone())
            }))
        })?;
    tracing::info!(store_id = identity.store_id, code = %coupon.code, "Coupon created");
    state.realtime.notify(
        identity.store_id,
        Entity::Coupon,
        ChangeAction::Insert,
        coupon.id,
    );
    Ok(Json(coupon))
}

/// Code and kind are fixed once created
pub async fn update_coupon(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(id): Path<i64>,
    Json(data): Json<CouponUpdate>,
) -> ApiResult<Coupon> {
    check_limits(data.min_order_value, data.max_uses)?;
    if let Some(value) = data.value {
        let current = coupons::find(&state.pool, identity.store_id, id)
            .await
            .map_err(internal)?
            .ok_or_else(|| not_found(id))?;
        check_value(current.kind, value)?;
    }

    let coupon = coupons::update(&state.pool, identity.store_id, id, &data)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(id))?;
    state
        .realtime
        .notify(identity.store_id, Entity::Coupon, ChangeAction::Update, id);
    Ok(Json(coupon))
}

pub async fn delete_coupon(
    State(state): State<AppState>,
    identity: StaffIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Deleted> {
    if !coupons::delete(&state.pool, identity.store_id, id)
        .await
        .map_err(internal)?
    {
        return Err(not_found(id));
    }
    state
        .realtime
        .notify(identity.store_id, Entity::Coupon, ChangeAction::Delete, id);
    Ok(Json(Deleted::new(id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn percent_coupons_stay_within_a_hundred() {
        assert!(check_value(CouponKind::Percent, dec!(10)).is_ok());
        assert!(check_value(CouponKind::Percent, dec!(100)).is_ok());
        assert!(check_value(CouponKind::Percent, dec!(0)).is_err());
        assert_eq!(
            check_value(CouponKind::Percent, dec!(100.5)).unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
    }

    #[test]
    fn fixed_coupons_take_any_positive_amount() {
        assert!(check_value(CouponKind::Fixed, dec!(150.00)).is_ok());
        assert!(check_value(CouponKind::Fixed, dec!(0)).is_err());
        assert!(check_value(CouponKind::Fixed, dec!(2.555)).is_err());
    }

    #[test]
    fn usage_limits() {
        assert!(check_limits(None, Some(1)).is_ok());
        assert!(check_limits(None, Some(0)).is_err());
        assert!(check_limits(Some(dec!(-1)), None).is_err());
    }
}
