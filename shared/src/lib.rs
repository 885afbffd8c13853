//! Shared types for the Mesa platform
//!
//! Models, error codes, pricing rules, kitchen ticket aggregation and
//! realtime messages used by mesa-server and mesa-client.

pub mod error;
pub mod kitchen;
pub mod models;
pub mod pricing;
pub mod realtime;
pub mod util;

pub use error::{ApiResponse, AppError, ErrorCode};
