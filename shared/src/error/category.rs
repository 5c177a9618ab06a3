//! Error category and kind classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Tenant errors
/// - 4xxx: Order errors
/// - 6xxx: Catalog errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Tenant errors (3xxx)
    Tenant,
    /// Order errors (4xxx)
    Order,
    /// Catalog errors (6xxx)
    Catalog,
    /// System errors (9xxx and anything unassigned)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Tenant,
            4000..5000 => Self::Order,
            6000..7000 => Self::Catalog,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Tenant => "tenant",
            Self::Order => "order",
            Self::Catalog => "catalog",
            Self::System => "system",
        }
    }
}

/// Machine-readable error kind exposed to API callers
///
/// Every [`ErrorCode`] belongs to exactly one kind; the kind decides the
/// HTTP status and the WebSocket close code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    TooManyRequests,
    InternalError,
    ServiceUnavailable,
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }

    /// Get the caller-facing kind for this error code
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound
            | Self::TenantNotFound
            | Self::OrderNotFound => ErrorKind::NotFound,

            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                ErrorKind::Unauthorized
            }

            Self::PermissionDenied
            | Self::AdminRequired
            | Self::SandboxOnly
            | Self::TenantNotSelected => ErrorKind::Forbidden,

            Self::AlreadyExists
            | Self::DomainTaken
            | Self::PartitionTaken
            | Self::OrderAlreadyCompleted
            | Self::InvalidStatusTransition => ErrorKind::Conflict,

            Self::TooManyRequests => ErrorKind::TooManyRequests,

            Self::IdentityProviderUnavailable | Self::NetworkError | Self::TimeoutError => {
                ErrorKind::ServiceUnavailable
            }

            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError => ErrorKind::InternalError,

            Self::Success
            | Self::ValidationFailed
            | Self::InvalidRequest
            | Self::InvalidFormat
            | Self::RequiredField
            | Self::ValueOutOfRange
            | Self::PartitionInvalid
            | Self::OrderEmpty
            | Self::InvalidQuantity
            | Self::AmountOverflow
            | Self::MenuItemNotFound
            | Self::MenuItemUnavailable
            | Self::ModifierOptionInvalid
            | Self::ModifierSelectionInvalid => ErrorKind::BadRequest,
        }
    }
}
