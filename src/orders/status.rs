//! Order & Payment Status

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fulfilment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    OutForDelivery,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    /// Whether the order may move directly to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Confirmed, Self::Processing)
                | (Self::Processing, Self::Shipped)
                | (Self::Shipped, Self::OutForDelivery)
                | (Self::OutForDelivery, Self::Delivered)
                | (Self::Pending | Self::Confirmed, Self::Cancelled)
        ) || (matches!(next, Self::Refunded) && !matches!(self, Self::Refunded))
    }

    /// Validate a move to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::Illegal`] if the graph has no such edge.
    pub fn transition(self, next: Self) -> Result<Self, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError::Illegal {
                from: self,
                to: next,
            })
        }
    }

    /// Validate a customer initiated cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::NotCancellable`] unless the order is
    /// pending or confirmed.
    pub fn cancel_by_customer(self) -> Result<Self, TransitionError> {
        match self {
            Self::Pending | Self::Confirmed => Ok(Self::Cancelled),
            other => Err(TransitionError::NotCancellable(other)),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value {
            "pending" => Self::Pending,
            "confirmed" => Self::Confirmed,
            "processing" => Self::Processing,
            "shipped" => Self::Shipped,
            "out_for_delivery" => Self::OutForDelivery,
            "delivered" => Self::Delivered,
            "cancelled" => Self::Cancelled,
            "refunded" => Self::Refunded,
            other => return Err(UnknownStatus(other.to_string())),
        })
    }
}

/// Payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    /// Payment status once the order has moved to `order_status`.
    #[must_use]
    pub const fn after_order_status(self, order_status: OrderStatus) -> Self {
        match (self, order_status) {
            (Self::Completed, OrderStatus::Refunded) => Self::Refunded,
            (current, _) => current,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value {
            "pending" => Self::Pending,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            "refunded" => Self::Refunded,
            other => return Err(UnknownStatus(other.to_string())),
        })
    }
}

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// PhonePe hosted payment page.
    #[serde(rename = "phonepe")]
    PhonePe,

    /// Cash on delivery.
    #[serde(rename = "cod")]
    CashOnDelivery,
}

impl PaymentMethod {
    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PhonePe => "phonepe",
            Self::CashOnDelivery => "cod",
        }
    }

    /// Whether payment goes through the online gateway.
    #[must_use]
    pub const fn uses_gateway(self) -> bool {
        matches!(self, Self::PhonePe)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "phonepe" => Ok(Self::PhonePe),
            "cod" => Ok(Self::CashOnDelivery),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Raised when parsing an unknown status or method name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown status \"{0}\"")]
pub struct UnknownStatus(pub String);

/// Rejected status transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The status graph has no edge between these states.
    #[error("order cannot move from {from} to {to}")]
    Illegal {
        /// Current status
        from: OrderStatus,

        /// Requested status
        to: OrderStatus,
    },

    /// Customers may only cancel pending or confirmed orders.
    #[error("order is {0} and can no longer be cancelled")]
    NotCancellable(OrderStatus),
}
