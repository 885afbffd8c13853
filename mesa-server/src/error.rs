//! Service-layer error type
//!
//! `ServiceError` bridges DB-layer errors (`sqlx::Error`, `BoxError`) and the
//! API-layer error (`AppError`) so handlers can use `?` on both.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// - `Db`: database/infrastructure errors (logged, mapped to InternalError)
/// - `App`: business-rule errors (passed through to the client)
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Map a unique-constraint violation to a business error, everything else to `Db`.
pub fn on_unique_violation(e: sqlx::Error, conflict: impl FnOnce() -> AppError) -> ServiceError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => ServiceError::App(conflict()),
        _ => ServiceError::from(e),
    }
}

/// Map a foreign-key violation to a business error, everything else to `Db`.
pub fn on_foreign_key_violation(
    e: sqlx::Error,
    conflict: impl FnOnce() -> AppError,
) -> ServiceError {
    match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            ServiceError::App(conflict())
        }
        _ => ServiceError::from(e),
    }
}
