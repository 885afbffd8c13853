//! Driver Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::{Fulfillment, OrderStatus, PaymentMethod};

/// Delivery driver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Driver {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverCreate {
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriverUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

/// What a driver sees for one of their deliveries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DriverOrder {
    pub id: i64,
    pub code: String,
    pub customer_name: String,
    pub customer_phone: String,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub fulfillment: Fulfillment,
    pub address: Option<String>,
    pub zone_name: Option<String>,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub status: OrderStatus,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub payment_method: PaymentMethod,
    pub total: Decimal,
    pub notes: Option<String>,
    pub created_at: i64,
}
