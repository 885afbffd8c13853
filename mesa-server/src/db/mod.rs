//! Database access layer
//!
//! Plain data access over sqlx. Every query is scoped by `store_id`; multi-row
//! business operations compose these functions inside one transaction in
//! `crate::services`.

pub mod coupons;
pub mod drivers;
pub mod kitchen;
pub mod menu;
pub mod orders;
pub mod stores;
pub mod table_orders;
pub mod tables;
pub mod users;
pub mod zones;

pub use crate::error::BoxError;

/// A priced line ready to insert into `table_order_items` or `order_items`
#[derive(Debug, Clone)]
pub struct NewLine {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: rust_decimal::Decimal,
    pub notes: Option<String>,
}

/// Column arrays for an `UNNEST` batch insert
pub(crate) struct LineColumns {
    pub ids: Vec<i64>,
    pub product_ids: Vec<i64>,
    pub names: Vec<String>,
    pub quantities: Vec<i32>,
    pub prices: Vec<rust_decimal::Decimal>,
    pub notes: Vec<Option<String>>,
}

impl LineColumns {
    pub fn from_lines(lines: &[NewLine]) -> Self {
        Self {
            ids: lines.iter().map(|_| shared::util::snowflake_id()).collect(),
            product_ids: lines.iter().map(|l| l.product_id).collect(),
            names: lines.iter().map(|l| l.product_name.clone()).collect(),
            quantities: lines.iter().map(|l| l.quantity).collect(),
            prices: lines.iter().map(|l| l.unit_price).collect(),
            notes: lines.iter().map(|l| l.notes.clone()).collect(),
        }
    }
}
