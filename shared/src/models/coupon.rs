//! Coupon Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

crate::text_enum! {
    /// How a coupon discounts the subtotal
    pub enum CouponKind {
        /// `value` is a percentage of the subtotal
        Percent => "percent",
        /// `value` is a fixed amount
        Fixed => "fixed",
    }
}

/// Discount coupon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Coupon {
    pub id: i64,
    pub store_id: i64,
    /// Upper-case code typed by the customer, unique per store
    pub code: String,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub kind: CouponKind,
    pub value: Decimal,
    pub min_order_value: Option<Decimal>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub expires_at: Option<i64>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponCreate {
    pub code: String,
    pub kind: CouponKind,
    pub value: Decimal,
    pub min_order_value: Option<Decimal>,
    pub max_uses: Option<i32>,
    pub expires_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CouponUpdate {
    pub value: Option<Decimal>,
    pub min_order_value: Option<Decimal>,
    pub max_uses: Option<i32>,
    pub expires_at: Option<i64>,
    pub is_active: Option<bool>,
}

/// Public coupon check from the checkout screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponValidateRequest {
    pub code: String,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponValidateResponse {
    pub code: String,
    pub kind: CouponKind,
    pub discount: Decimal,
}

/// Canonical form of a typed coupon code
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
