//! Staff user model and auth payloads

use serde::{Deserialize, Serialize};

crate::text_enum! {
    /// Staff role, decides which screens/APIs a user may reach
    pub enum StaffRole {
        /// Store configuration and everything else
        Admin => "admin",
        /// PDV (table service)
        Waiter => "waiter",
        /// Kitchen display
        Kitchen => "kitchen",
        /// Driver dashboard
        Driver => "driver",
    }
}

impl StaffRole {
    /// Whether this role may act on screens meant for `required`.
    /// Admins may act everywhere.
    pub fn allows(&self, required: StaffRole) -> bool {
        *self == StaffRole::Admin || *self == required
    }
}

/// Staff user (password hash never leaves the server)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StaffUser {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub email: String,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub role: StaffRole,
    /// Linked driver record for `driver` users
    pub driver_id: Option<i64>,
    pub is_active: bool,
}

/// Create staff user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffUserCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: StaffRole,
    pub driver_id: Option<i64>,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub store_slug: String,
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: i64,
    pub user: StaffUser,
}
