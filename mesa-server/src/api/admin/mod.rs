//! Store configuration API (admin only)
//!
//! Each write operation:
//! 1. Validate the payload
//! 2. Write to PG, scoped to the caller's store
//! 3. Publish a change event so open screens refetch

pub mod coupons;
pub mod drivers;
pub mod menu;
pub mod staff;
pub mod store;
pub mod tables;
pub mod zones;

use axum::{
    Router, middleware,
    routing::{delete, get, put},
};
use shared::error::AppError;
use shared::models::StaffRole;

use crate::auth::require_role;
use crate::error::ServiceError;
use crate::state::AppState;

/// Admin routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/admin/categories",
            get(menu::list_categories).post(menu::create_category),
        )
        .route(
            "/api/admin/categories/{id}",
            put(menu::update_category).delete(menu::delete_category),
        )
        .route(
            "/api/admin/products",
            get(menu::list_products).post(menu::create_product),
        )
        .route(
            "/api/admin/products/{id}",
            put(menu::update_product).delete(menu::delete_product),
        )
        .route(
            "/api/admin/tables",
            get(tables::list_tables).post(tables::create_table),
        )
        .route(
            "/api/admin/tables/{id}",
            put(tables::update_table).delete(tables::delete_table),
        )
        .route(
            "/api/admin/drivers",
            get(drivers::list_drivers).post(drivers::create_driver),
        )
        .route(
            "/api/admin/drivers/{id}",
            put(drivers::update_driver).delete(drivers::delete_driver),
        )
        .route(
            "/api/admin/coupons",
            get(coupons::list_coupons).post(coupons::create_coupon),
        )
        .route(
            "/api/admin/coupons/{id}",
            put(coupons::update_coupon).delete(coupons::delete_coupon),
        )
        .route(
            "/api/admin/zones",
            get(zones::list_zones).post(zones::create_zone),
        )
        .route(
            "/api/admin/zones/{id}",
            put(zones::update_zone).delete(zones::delete_zone),
        )
        .route(
            "/api/admin/store",
            get(store::get_store).put(store::update_store),
        )
        .route(
            "/api/admin/staff",
            get(staff::list_staff).post(staff::create_staff),
        )
        .route("/api/admin/staff/{id}", delete(staff::delete_staff))
        .route("/api/admin/staff/{id}/active", put(staff::set_active))
        .route_layer(middleware::from_fn(require_role(StaffRole::Admin)))
}

/// Storage failure → logged `DatabaseError`
fn internal(e: impl Into<ServiceError>) -> AppError {
    AppError::from(e.into())
}

/// Body of a successful delete
#[derive(Debug, serde::Serialize)]
pub struct Deleted {
    pub id: i64,
    pub deleted: bool,
}

impl Deleted {
    fn new(id: i64) -> Self {
        Self { id, deleted: true }
    }
}
