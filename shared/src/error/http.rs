//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::StoreNotFound
            | Self::OrderNotFound
            | Self::OrderItemNotFound
            | Self::CouponNotFound
            | Self::ProductNotFound
            | Self::CategoryNotFound
            | Self::TableNotFound
            | Self::TableOrderNotFound
            | Self::DriverNotFound
            | Self::DeliveryZoneNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::StoreSlugExists
            | Self::InvalidStatusTransition
            | Self::OrderAlreadyCompleted
            | Self::OrderAlreadyCancelled
            | Self::ItemAlreadyInKitchen
            | Self::CouponCodeExists
            | Self::CategoryHasProducts
            | Self::TableNumberExists
            | Self::TableHasOpenOrders
            | Self::TableOrderClosed => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::RoleRequired
            | Self::AdminRequired
            | Self::DriverNotAssigned => StatusCode::FORBIDDEN,

            // 422 Unprocessable (request is well-formed, business rule refuses it)
            Self::StoreClosed
            | Self::DeliveryDisabled
            | Self::PickupDisabled
            | Self::BelowMinimumOrder
            | Self::CouponInactive
            | Self::CouponExpired
            | Self::CouponExhausted
            | Self::CouponMinimumNotMet
            | Self::ProductUnavailable
            | Self::DriverInactive
            | Self::DeliveryZoneInactive => StatusCode::UNPROCESSABLE_ENTITY,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::NetworkError | Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::StorageError
            | Self::Unknown => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_status() {
        assert_eq!(ErrorCode::Success.http_status(), StatusCode::OK);
    }

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::StoreNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::TableOrderNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::DeliveryZoneNotFound.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_status() {
        assert_eq!(
            ErrorCode::InvalidStatusTransition.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ErrorCode::TableNumberExists.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::CouponCodeExists.http_status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_auth_statuses() {
        assert_eq!(
            ErrorCode::NotAuthenticated.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorCode::TokenExpired.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::AdminRequired.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::DriverNotAssigned.http_status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_business_rule_status() {
        assert_eq!(
            ErrorCode::StoreClosed.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorCode::CouponExhausted.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_system_statuses() {
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::TimeoutError.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_bad_request_default() {
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorCode::OrderEmpty.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidQuantity.http_status(), StatusCode::BAD_REQUEST);
    }
}
