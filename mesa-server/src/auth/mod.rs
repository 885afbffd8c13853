//! Staff authentication: JWT tokens, password hashing and route guards

pub mod account_cache;
pub mod jwt;
pub mod password;
pub mod staff_auth;

pub use account_cache::{AccountCache, ensure_active};
pub use staff_auth::{StaffIdentity, require_any_role, require_role, staff_auth_middleware};
