//! Client error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::driver::SeenStoreError;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a structured error
    #[error("API error {}: {}", .0.code, .0.message)]
    Api(AppError),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Seen-order store failed
    #[error("Storage error: {0}")]
    Storage(#[from] SeenStoreError),
}

impl ClientError {
    /// Error code of an API error
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Api(e) => Some(e.code),
            _ => None,
        }
    }

    /// Token missing, invalid or expired
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.code(),
            Some(
                ErrorCode::NotAuthenticated
                    | ErrorCode::TokenExpired
                    | ErrorCode::TokenInvalid
                    | ErrorCode::AccountDisabled
            )
        )
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
