//! Order status machine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order status
///
/// ```text
/// PENDING ─→ PREPARING ─→ COMPLETED ─→ SERVED ─→ PAID
///    │           │             │                  ↑
///    │           └─────────────┴──────────────────┤ (early payment)
///    └──→ CANCELLED ←── PREPARING                 │
///    └────────────────────────────────────────────┘
/// ```
///
/// PAID and CANCELLED are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Completed,
    Served,
    Paid,
    Cancelled,
}

impl OrderStatus {
    /// Statuses that keep a table occupied
    pub const ACTIVE: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Completed,
        OrderStatus::Served,
    ];

    /// Statuses shown on the kitchen display
    pub const KITCHEN_QUEUE: [OrderStatus; 2] = [OrderStatus::Pending, OrderStatus::Preparing];

    pub const fn is_active(self) -> bool {
        matches!(
            self,
            Self::Pending | Self::Preparing | Self::Completed | Self::Served
        )
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }

    /// Lines may only be removed before the kitchen finishes the order
    pub const fn lines_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Preparing)
    }

    /// Explicit transition table. Same-state moves are rejected.
    pub const fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Pending, Preparing) | (Preparing, Completed) | (Completed, Served) => true,
            (Pending | Preparing | Completed | Served, Paid) => true,
            (Pending | Preparing, Cancelled) => true,
            _ => false,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Preparing => "PREPARING",
            Self::Completed => "COMPLETED",
            Self::Served => "SERVED",
            Self::Paid => "PAID",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown status string (e.g. a corrupted database row)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct ParseOrderStatusError(pub String);

impl FromStr for OrderStatus {
    type Err = ParseOrderStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PREPARING" => Ok(Self::Preparing),
            "COMPLETED" => Ok(Self::Completed),
            "SERVED" => Ok(Self::Served),
            "PAID" => Ok(Self::Paid),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(ParseOrderStatusError(other.to_string())),
        }
    }
}
