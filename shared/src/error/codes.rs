//! Unified error codes for the Mesa platform
//!
//! Error codes are shared by mesa-server, mesa-client and the frontends.
//! They are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Store errors
//! - 4xxx: Order errors
//! - 5xxx: Coupon errors
//! - 6xxx: Menu errors
//! - 7xxx: Table errors
//! - 8xxx: Delivery errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for compact serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1005,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 3xxx: Store ====================
    /// Store not found
    StoreNotFound = 3001,
    /// Store is not accepting orders
    StoreClosed = 3002,
    /// Delivery is disabled for this store
    DeliveryDisabled = 3003,
    /// Pickup is disabled for this store
    PickupDisabled = 3004,
    /// Order subtotal below the store or zone minimum
    BelowMinimumOrder = 3005,
    /// Store slug already taken
    StoreSlugExists = 3006,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order item not found
    OrderItemNotFound = 4002,
    /// Order is empty
    OrderEmpty = 4003,
    /// Status transition not allowed
    InvalidStatusTransition = 4004,
    /// Order has already been delivered
    OrderAlreadyCompleted = 4005,
    /// Order has already been cancelled
    OrderAlreadyCancelled = 4006,
    /// Item has already been picked up by the kitchen
    ItemAlreadyInKitchen = 4007,
    /// Quantity must be positive
    InvalidQuantity = 4008,

    // ==================== 5xxx: Coupon ====================
    /// Coupon not found
    CouponNotFound = 5001,
    /// Coupon is inactive
    CouponInactive = 5002,
    /// Coupon has expired
    CouponExpired = 5003,
    /// Coupon usage limit reached
    CouponExhausted = 5004,
    /// Subtotal below the coupon minimum
    CouponMinimumNotMet = 5005,
    /// Coupon code already exists
    CouponCodeExists = 5006,

    // ==================== 6xxx: Menu ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product is not available
    ProductUnavailable = 6002,
    /// Product has invalid price
    ProductInvalidPrice = 6003,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category has products
    CategoryHasProducts = 6102,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table is not occupied
    TableNotOccupied = 7002,
    /// Table number already exists
    TableNumberExists = 7003,
    /// Table has open orders
    TableHasOpenOrders = 7004,
    /// Table order not found
    TableOrderNotFound = 7005,
    /// Table order is no longer open
    TableOrderClosed = 7006,

    // ==================== 8xxx: Delivery ====================
    /// Driver not found
    DriverNotFound = 8001,
    /// Driver is inactive
    DriverInactive = 8002,
    /// Order is not assigned to this driver
    DriverNotAssigned = 8003,
    /// Delivery zone not found
    DeliveryZoneNotFound = 8101,
    /// Delivery zone is inactive
    DeliveryZoneInactive = 8102,
    /// Delivery orders need a delivery zone
    DeliveryZoneRequired = 8103,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Local storage error
    StorageError = 9006,
}

impl ErrorCode {
    /// Every defined code, in declaration order
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::Success,
        ErrorCode::Unknown,
        ErrorCode::ValidationFailed,
        ErrorCode::NotFound,
        ErrorCode::AlreadyExists,
        ErrorCode::InvalidRequest,
        ErrorCode::InvalidFormat,
        ErrorCode::RequiredField,
        ErrorCode::ValueOutOfRange,
        ErrorCode::NotAuthenticated,
        ErrorCode::InvalidCredentials,
        ErrorCode::TokenExpired,
        ErrorCode::TokenInvalid,
        ErrorCode::AccountDisabled,
        ErrorCode::PermissionDenied,
        ErrorCode::RoleRequired,
        ErrorCode::AdminRequired,
        ErrorCode::StoreNotFound,
        ErrorCode::StoreClosed,
        ErrorCode::DeliveryDisabled,
        ErrorCode::PickupDisabled,
        ErrorCode::BelowMinimumOrder,
        ErrorCode::StoreSlugExists,
        ErrorCode::OrderNotFound,
        ErrorCode::OrderItemNotFound,
        ErrorCode::OrderEmpty,
        ErrorCode::InvalidStatusTransition,
        ErrorCode::OrderAlreadyCompleted,
        ErrorCode::OrderAlreadyCancelled,
        ErrorCode::ItemAlreadyInKitchen,
        ErrorCode::InvalidQuantity,
        ErrorCode::CouponNotFound,
        ErrorCode::CouponInactive,
        ErrorCode::CouponExpired,
        ErrorCode::CouponExhausted,
        ErrorCode::CouponMinimumNotMet,
        ErrorCode::CouponCodeExists,
        ErrorCode::ProductNotFound,
        ErrorCode::ProductUnavailable,
        ErrorCode::ProductInvalidPrice,
        ErrorCode::CategoryNotFound,
        ErrorCode::CategoryHasProducts,
        ErrorCode::TableNotFound,
        ErrorCode::TableNotOccupied,
        ErrorCode::TableNumberExists,
        ErrorCode::TableHasOpenOrders,
        ErrorCode::TableOrderNotFound,
        ErrorCode::TableOrderClosed,
        ErrorCode::DriverNotFound,
        ErrorCode::DriverInactive,
        ErrorCode::DriverNotAssigned,
        ErrorCode::DeliveryZoneNotFound,
        ErrorCode::DeliveryZoneInactive,
        ErrorCode::DeliveryZoneRequired,
        ErrorCode::InternalError,
        ErrorCode::DatabaseError,
        ErrorCode::NetworkError,
        ErrorCode::TimeoutError,
        ErrorCode::ConfigError,
        ErrorCode::StorageError,
    ];

    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Store
            ErrorCode::StoreNotFound => "Store not found",
            ErrorCode::StoreClosed => "Store is closed",
            ErrorCode::DeliveryDisabled => "Delivery is not available for this store",
            ErrorCode::PickupDisabled => "Pickup is not available for this store",
            ErrorCode::BelowMinimumOrder => "Order subtotal is below the minimum order value",
            ErrorCode::StoreSlugExists => "Store slug already exists",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderItemNotFound => "Order item not found",
            ErrorCode::OrderEmpty => "Order is empty",
            ErrorCode::InvalidStatusTransition => "Status transition is not allowed",
            ErrorCode::OrderAlreadyCompleted => "Order has already been delivered",
            ErrorCode::OrderAlreadyCancelled => "Order has already been cancelled",
            ErrorCode::ItemAlreadyInKitchen => "Item is already being prepared",
            ErrorCode::InvalidQuantity => "Quantity must be greater than zero",

            // Coupon
            ErrorCode::CouponNotFound => "Coupon not found",
            ErrorCode::CouponInactive => "Coupon is inactive",
            ErrorCode::CouponExpired => "Coupon has expired",
            ErrorCode::CouponExhausted => "Coupon usage limit reached",
            ErrorCode::CouponMinimumNotMet => "Subtotal is below the coupon minimum",
            ErrorCode::CouponCodeExists => "Coupon code already exists",

            // Menu
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductUnavailable => "Product is not available",
            ErrorCode::ProductInvalidPrice => "Product has invalid price",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryHasProducts => "Category has associated products",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableNotOccupied => "Table is not occupied",
            ErrorCode::TableNumberExists => "Table number already exists",
            ErrorCode::TableHasOpenOrders => "Table has open orders",
            ErrorCode::TableOrderNotFound => "Table order not found",
            ErrorCode::TableOrderClosed => "Table order is no longer open",

            // Delivery
            ErrorCode::DriverNotFound => "Driver not found",
            ErrorCode::DriverInactive => "Driver is inactive",
            ErrorCode::DriverNotAssigned => "Order is not assigned to this driver",
            ErrorCode::DeliveryZoneNotFound => "Delivery zone not found",
            ErrorCode::DeliveryZoneInactive => "Delivery zone is inactive",
            ErrorCode::DeliveryZoneRequired => "Delivery zone is required for delivery orders",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::StorageError => "Local storage error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.code() == value)
            .ok_or(InvalidErrorCode(value))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
