//! Unified error codes for the OmniOrder platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Tenant errors
//! - 4xxx: Order errors
//! - 6xxx: Catalog errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the storefront, the
/// kitchen display and the admin console can share one table.
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
    /// Invalid format (malformed id, bad JSON value)
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Rate limit exceeded
    TooManyRequests = 9,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Platform administrator required
    AdminRequired = 2003,
    /// Operation only allowed on sandbox partitions
    SandboxOnly = 2006,

    // ==================== 3xxx: Tenant ====================
    /// Request resolved to the shared namespace, which holds no tenant data
    TenantNotSelected = 3001,
    /// No tenant for host / partition
    TenantNotFound = 3002,
    /// Identity provider could not be reached
    IdentityProviderUnavailable = 3012,
    /// Partition handle is not a valid identifier
    PartitionInvalid = 3022,
    /// Public hostname already assigned to another tenant
    DomainTaken = 3023,
    /// Partition handle already owned by another tenant
    PartitionTaken = 3024,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been completed
    OrderAlreadyCompleted = 4003,
    /// Order is empty after resolution
    OrderEmpty = 4007,
    /// Status transition not allowed by the order state machine
    InvalidStatusTransition = 4008,
    /// Quantity outside the accepted range
    InvalidQuantity = 4009,
    /// Order total does not fit the amount type
    AmountOverflow = 4010,

    // ==================== 6xxx: Catalog ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Menu item exists but is not available
    MenuItemUnavailable = 6003,
    /// Modifier option unknown or not attached to the item
    ModifierOptionInvalid = 6301,
    /// Modifier group selection count outside min/max
    ModifierSelectionInvalid = 6302,

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
}

impl ErrorCode {
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
            ErrorCode::TooManyRequests => "Too many requests, try again later",

            // Auth
            ErrorCode::NotAuthenticated => "Authentication required",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Not authorized for platform admin",
            ErrorCode::SandboxOnly => "Operation is only allowed on sandbox partitions",

            // Tenant
            ErrorCode::TenantNotSelected => "No tenant partition selected",
            ErrorCode::TenantNotFound => "Tenant not found",
            ErrorCode::IdentityProviderUnavailable => {
                "Could not verify identity provider availability"
            }
            ErrorCode::PartitionInvalid => "Invalid partition handle",
            ErrorCode::DomainTaken => "Domain already taken",
            ErrorCode::PartitionTaken => "A tenant with this name already exists",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyCompleted => "Order has already been completed",
            ErrorCode::OrderEmpty => "Order cannot be empty",
            ErrorCode::InvalidStatusTransition => "Order status transition is not allowed",
            ErrorCode::InvalidQuantity => "Invalid quantity",
            ErrorCode::AmountOverflow => "Order amount is out of range",

            // Catalog
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemUnavailable => "Menu item is not available",
            ErrorCode::ModifierOptionInvalid => "Modifier option is not valid for this item",
            ErrorCode::ModifierSelectionInvalid => "Modifier selection count is out of range",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => ErrorCode::Success,
            1 => ErrorCode::Unknown,
            2 => ErrorCode::ValidationFailed,
            3 => ErrorCode::NotFound,
            4 => ErrorCode::AlreadyExists,
            5 => ErrorCode::InvalidRequest,
            6 => ErrorCode::InvalidFormat,
            7 => ErrorCode::RequiredField,
            8 => ErrorCode::ValueOutOfRange,
            9 => ErrorCode::TooManyRequests,

            1001 => ErrorCode::NotAuthenticated,
            1003 => ErrorCode::TokenExpired,
            1004 => ErrorCode::TokenInvalid,

            2001 => ErrorCode::PermissionDenied,
            2003 => ErrorCode::AdminRequired,
            2006 => ErrorCode::SandboxOnly,

            3001 => ErrorCode::TenantNotSelected,
            3002 => ErrorCode::TenantNotFound,
            3012 => ErrorCode::IdentityProviderUnavailable,
            3022 => ErrorCode::PartitionInvalid,
            3023 => ErrorCode::DomainTaken,
            3024 => ErrorCode::PartitionTaken,

            4001 => ErrorCode::OrderNotFound,
            4003 => ErrorCode::OrderAlreadyCompleted,
            4007 => ErrorCode::OrderEmpty,
            4008 => ErrorCode::InvalidStatusTransition,
            4009 => ErrorCode::InvalidQuantity,
            4010 => ErrorCode::AmountOverflow,

            6001 => ErrorCode::MenuItemNotFound,
            6003 => ErrorCode::MenuItemUnavailable,
            6301 => ErrorCode::ModifierOptionInvalid,
            6302 => ErrorCode::ModifierSelectionInvalid,

            9001 => ErrorCode::InternalError,
            9002 => ErrorCode::DatabaseError,
            9003 => ErrorCode::NetworkError,
            9004 => ErrorCode::TimeoutError,
            9005 => ErrorCode::ConfigError,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}
