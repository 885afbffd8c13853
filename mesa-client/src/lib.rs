//! Mesa Client - HTTP client for the mesa-server API
//!
//! Typed calls for staff screens plus the driver new-order watcher.

pub mod config;
pub mod driver;
pub mod error;
pub mod http;

pub use config::{ClientConfig, WatcherConfig};
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;

// Re-export shared types for convenience
pub use shared::models::{DriverOrder, LoginResponse, StaffUser};
