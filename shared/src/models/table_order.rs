//! Table service (PDV) order models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::kitchen::KitchenStatus;

crate::text_enum! {
    /// Lifecycle of a table order
    pub enum TableOrderStatus {
        Open => "open",
        Closed => "closed",
        Cancelled => "cancelled",
    }
}

/// An order running on a dining table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TableOrder {
    pub id: i64,
    pub store_id: i64,
    pub table_id: i64,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub status: TableOrderStatus,
    pub customer_name: Option<String>,
    pub total: Decimal,
    pub created_at: i64,
    pub closed_at: Option<i64>,
}

/// One line of a table order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TableOrderItem {
    pub id: i64,
    pub table_order_id: i64,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub notes: Option<String>,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub kitchen_status: KitchenStatus,
    pub created_at: i64,
}

/// A product line requested by a waiter or a customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineInput {
    pub product_id: i64,
    pub quantity: i32,
    pub notes: Option<String>,
}

/// Open table payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenTableRequest {
    pub customer_name: Option<String>,
}

/// Add items payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddItemsRequest {
    pub items: Vec<OrderLineInput>,
}

/// Table order with its lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableOrderDetail {
    pub order: TableOrder,
    pub items: Vec<TableOrderItem>,
}

/// Bill produced when a table is closed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableBill {
    pub table_id: i64,
    pub table_number: i32,
    pub orders: Vec<TableOrderDetail>,
    pub total: Decimal,
    pub closed_at: i64,
}
