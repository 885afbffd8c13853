//! Store Model (the tenant)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Store entity. Every other row is scoped by `store_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Store {
    pub id: i64,
    /// Public URL segment of the digital menu
    pub slug: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
    /// Accepting online orders right now
    pub is_open: bool,
    pub delivery_enabled: bool,
    pub pickup_enabled: bool,
    /// Minimum subtotal for online orders
    pub min_order_value: Decimal,
    pub created_at: i64,
}

/// Store signup payload (creates the store and its first admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreRegister {
    pub name: String,
    pub slug: String,
    pub admin_name: String,
    pub admin_email: String,
    pub admin_password: String,
}

/// Update store settings payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
    pub is_open: Option<bool>,
    pub delivery_enabled: Option<bool>,
    pub pickup_enabled: Option<bool>,
    pub min_order_value: Option<Decimal>,
}

/// Checks a slug: 3-48 chars of `[a-z0-9-]`, no leading/trailing dash
pub fn is_valid_slug(slug: &str) -> bool {
    (3..=48).contains(&slug.len())
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}
