//! Order pricing: line totals, coupon discounts and delivery fees
//!
//! All amounts are `Decimal` rounded to 2 places (banker's rounding is
//! avoided; midpoint goes away from zero like a till would).

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorCode};
use crate::models::{Coupon, CouponKind};

/// Round a money amount to cents
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Price of `quantity` units
pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    round_money(unit_price * Decimal::from(quantity))
}

/// Sum of line totals over `(unit_price, quantity)` pairs
pub fn subtotal<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (Decimal, i32)>,
{
    lines
        .into_iter()
        .map(|(price, qty)| line_total(price, qty))
        .sum()
}

/// Check a coupon against a subtotal at `now` and compute its discount.
///
/// The discount never exceeds the subtotal.
pub fn coupon_discount(coupon: &Coupon, subtotal: Decimal, now: i64) -> Result<Decimal, AppError> {
    if !coupon.is_active {
        return Err(AppError::new(ErrorCode::CouponInactive).with_detail("code", coupon.code.clone()));
    }
    if coupon.expires_at.is_some_and(|exp| exp <= now) {
        return Err(AppError::new(ErrorCode::CouponExpired).with_detail("code", coupon.code.clone()));
    }
    if coupon.max_uses.is_some_and(|max| coupon.used_count >= max) {
        return Err(
            AppError::new(ErrorCode::CouponExhausted).with_detail("code", coupon.code.clone())
        );
    }
    if let Some(min) = coupon.min_order_value
        && subtotal < min
    {
        return Err(AppError::new(ErrorCode::CouponMinimumNotMet)
            .with_detail("minimum", min.to_string()));
    }

    let raw = match coupon.kind {
        CouponKind::Percent => subtotal
            .checked_mul(coupon.value)
            .ok_or_else(|| {
                AppError::new(ErrorCode::ValueOutOfRange).with_detail("subtotal", subtotal.to_string())
            })?
            / Decimal::ONE_HUNDRED,
        CouponKind::Fixed => coupon.value,
    };
    Ok(round_money(raw).min(subtotal).max(Decimal::ZERO))
}

/// Final amounts of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    pub fn compute(subtotal: Decimal, discount: Decimal, delivery_fee: Decimal) -> Self {
        let discount = discount.min(subtotal);
        Self {
            subtotal,
            discount,
            delivery_fee,
            total: round_money(subtotal - discount + delivery_fee),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    fn coupon(kind: CouponKind, value: Decimal) -> Coupon {
        Coupon {
            id: 1,
            store_id: 1,
            code: "BEMVINDO".into(),
            kind,
            value,
            min_order_value: None,
            max_uses: None,
            used_count: 0,
            expires_at: None,
            is_active: true,
        }
    }

    #[test]
    fn subtotal_sums_lines() {
        let s = subtotal([(dec!(12.50), 2), (dec!(3.33), 3)]);
        assert_eq!(s, dec!(34.99));
    }

    #[test]
    fn percent_coupon_rounds_to_cents() {
        let c = coupon(CouponKind::Percent, dec!(15));
        assert_eq!(coupon_discount(&c, dec!(33.33), 0).unwrap(), dec!(5.00));
        assert_eq!(coupon_discount(&c, dec!(10.10), 0).unwrap(), dec!(1.52));
    }

    #[test]
    fn fixed_coupon_is_capped_at_subtotal() {
        let c = coupon(CouponKind::Fixed, dec!(20));
        assert_eq!(coupon_discount(&c, dec!(50), 0).unwrap(), dec!(20));
        assert_eq!(coupon_discount(&c, dec!(12.40), 0).unwrap(), dec!(12.40));
    }

    #[test]
    fn coupon_rejections() {
        let mut c = coupon(CouponKind::Fixed, dec!(5));
        c.is_active = false;
        assert_eq!(
            coupon_discount(&c, dec!(50), 0).unwrap_err().code,
            ErrorCode::CouponInactive
        );

        let mut c = coupon(CouponKind::Fixed, dec!(5));
        c.expires_at = Some(1_000);
        assert!(coupon_discount(&c, dec!(50), 999).is_ok());
        assert_eq!(
            coupon_discount(&c, dec!(50), 1_000).unwrap_err().code,
            ErrorCode::CouponExpired
        );

        let mut c = coupon(CouponKind::Fixed, dec!(5));
        c.max_uses = Some(3);
        c.used_count = 3;
        assert_eq!(
            coupon_discount(&c, dec!(50), 0).unwrap_err().code,
            ErrorCode::CouponExhausted
        );

        let mut c = coupon(CouponKind::Fixed, dec!(5));
        c.min_order_value = Some(dec!(40));
        assert_eq!(
            coupon_discount(&c, dec!(39.99), 0).unwrap_err().code,
            ErrorCode::CouponMinimumNotMet
        );
        assert!(coupon_discount(&c, dec!(40), 0).is_ok());
    }

    #[test]
    fn oversized_subtotal_is_rejected() {
        let c = coupon(CouponKind::Percent, dec!(50));
        let err = coupon_discount(&c, Decimal::MAX, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
    }

    #[test]
    fn totals_add_fee_after_discount() {
        let t = OrderTotals::compute(dec!(80), dec!(8), dec!(6.50));
        assert_eq!(t.total, dec!(78.50));

        let t = OrderTotals::compute(dec!(10), dec!(15), dec!(5));
        assert_eq!(t.discount, dec!(10));
        assert_eq!(t.total, dec!(5));
    }
}
