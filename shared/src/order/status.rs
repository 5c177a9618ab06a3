//! Order lifecycle state machine
//!
//! ```text
//! PENDING ──► QUEUED ──► PREPARING ──► READY ──► COMPLETED
//!    │           └──────────┴────────────┴──────────▲
//!    └───────────────────────────────────────────────┘
//! ```
//!
//! Every move goes strictly forward. `QUEUED` is optional, and kitchens may
//! jump ahead (a display that marks a ticket READY straight from PENDING).
//! `COMPLETED` is terminal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Queued,
    Preparing,
    Ready,
    Completed,
}

/// Why a status change was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("order is already completed")]
    AlreadyCompleted,
    #[error("cannot move order from {from} to {to}")]
    NotForward { from: OrderStatus, to: OrderStatus },
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Queued,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Queued => "QUEUED",
            Self::Preparing => "PREPARING",
            Self::Ready => "READY",
            Self::Completed => "COMPLETED",
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Queued => 1,
            Self::Preparing => 2,
            Self::Ready => 3,
            Self::Completed => 4,
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Still visible on the kitchen display
    pub const fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Validate a move to `next` against the transition table
    pub fn transition_to(self, next: OrderStatus) -> Result<OrderStatus, TransitionError> {
        if self.is_terminal() {
            return Err(TransitionError::AlreadyCompleted);
        }
        if next.rank() <= self.rank() {
            return Err(TransitionError::NotForward {
                from: self,
                to: next,
            });
        }
        Ok(next)
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self.transition_to(next).is_ok()
    }
}

impl From<TransitionError> for crate::error::AppError {
    fn from(e: TransitionError) -> Self {
        use crate::error::{AppError, ErrorCode};
        match e {
            TransitionError::AlreadyCompleted => AppError::new(ErrorCode::OrderAlreadyCompleted),
            TransitionError::NotForward { from, to } => {
                AppError::with_message(ErrorCode::InvalidStatusTransition, e.to_string())
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
            }
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "QUEUED" => Ok(Self::Queued),
            "PREPARING" => Ok(Self::Preparing),
            "READY" => Ok(Self::Ready),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}
