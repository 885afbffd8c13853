//! Delivery Zone Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Area served by delivery, with its own fee
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DeliveryZone {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub fee: Decimal,
    pub min_order_value: Option<Decimal>,
    pub estimated_minutes: Option<i32>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryZoneCreate {
    pub name: String,
    pub fee: Decimal,
    pub min_order_value: Option<Decimal>,
    pub estimated_minutes: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryZoneUpdate {
    pub name: Option<String>,
    pub fee: Option<Decimal>,
    pub min_order_value: Option<Decimal>,
    pub estimated_minutes: Option<i32>,
    pub is_active: Option<bool>,
}
