//! Dining Table Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

crate::text_enum! {
    /// Table occupancy
    pub enum TableStatus {
        Free => "free",
        Occupied => "occupied",
    }
}

/// Dining table entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    pub store_id: i64,
    /// Number printed on the table, unique per store
    pub number: i32,
    pub name: Option<String>,
    pub capacity: i32,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub status: TableStatus,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub number: i32,
    pub name: Option<String>,
    pub capacity: Option<i32>,
}

/// Update dining table payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiningTableUpdate {
    pub number: Option<i32>,
    pub name: Option<String>,
    pub capacity: Option<i32>,
}

/// PDV floor view: a table plus what is running on it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TableOverview {
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub table: DiningTable,
    pub open_orders: i64,
    pub open_total: Decimal,
    /// Oldest open order on the table, if any
    pub occupied_since: Option<i64>,
}
