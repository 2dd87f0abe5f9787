//! Payment Reconciliation
//!
//! Decisions only: callers apply the returned outcome as a conditional
//! update so a poll and a callback racing on the same transaction resolve
//! to exactly one transition.

use thiserror::Error;

use crate::orders::{OrderStatus, PaymentMethod, PaymentStatus};

/// Transaction state as reported by the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayState {
    Completed,
    Failed,
    Pending,

    /// Any state this service does not act on.
    Other(String),
}

impl GatewayState {
    /// Gateway wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Pending => "PENDING",
            Self::Other(state) => state,
        }
    }
}

impl From<&str> for GatewayState {
    fn from(value: &str) -> Self {
        match value {
            "COMPLETED" => Self::Completed,
            "FAILED" => Self::Failed,
            "PENDING" => Self::Pending,
            other => Self::Other(other.to_string()),
        }
    }
}

/// What to do with an order given a gateway state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Mark the payment completed, confirm the order and clear the cart.
    Complete,

    /// Mark the payment failed and cancel the order.
    Fail,

    /// Leave everything as it is.
    Unchanged,
}

impl Reconciliation {
    /// Decide the transition for an order whose payment is `current`.
    ///
    /// Only pending payments move; anything already terminal is left alone.
    #[must_use]
    pub fn decide(current: PaymentStatus, state: &GatewayState) -> Self {
        match (current, state) {
            (PaymentStatus::Pending, GatewayState::Completed) => Self::Complete,
            (PaymentStatus::Pending, GatewayState::Failed) => Self::Fail,
            _ => Self::Unchanged,
        }
    }

    /// Order and payment status after the transition, if one fires.
    #[must_use]
    pub const fn target(self) -> Option<(OrderStatus, PaymentStatus)> {
        match self {
            Self::Complete => Some((OrderStatus::Confirmed, PaymentStatus::Completed)),
            Self::Fail => Some((OrderStatus::Cancelled, PaymentStatus::Failed)),
            Self::Unchanged => None,
        }
    }
}

/// Reasons an order cannot be sent to the gateway.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// Only pending orders can be paid.
    #[error("order is {0} and cannot be paid")]
    OrderNotPending(OrderStatus),

    /// The order has already been paid.
    #[error("order has already been paid")]
    AlreadyPaid,

    /// The order is not paid online.
    #[error("orders paid by {0} cannot be paid online")]
    OfflineMethod(PaymentMethod),
}

/// Check that an order may start a gateway payment.
///
/// # Errors
///
/// Returns a [`PaymentError`] describing why the order is not payable.
pub fn ensure_payable(
    order_status: OrderStatus,
    payment_status: PaymentStatus,
    method: PaymentMethod,
) -> Result<(), PaymentError> {
    if !method.uses_gateway() {
        return Err(PaymentError::OfflineMethod(method));
    }

    if order_status != OrderStatus::Pending {
        return Err(PaymentError::OrderNotPending(order_status));
    }

    if matches!(payment_status, PaymentStatus::Completed | PaymentStatus::Refunded) {
        return Err(PaymentError::AlreadyPaid);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_confirms_pending_payment() {
        let decision = Reconciliation::decide(PaymentStatus::Pending, &GatewayState::Completed);

        assert_eq!(decision, Reconciliation::Complete);
        assert_eq!(
            decision.target(),
            Some((OrderStatus::Confirmed, PaymentStatus::Completed))
        );
    }

    #[test]
    fn failed_cancels_pending_payment() {
        let decision = Reconciliation::decide(PaymentStatus::Pending, &GatewayState::Failed);

        assert_eq!(
            decision.target(),
            Some((OrderStatus::Cancelled, PaymentStatus::Failed))
        );
    }

    #[test]
    fn terminal_payments_are_never_reapplied() {
        for current in [
            PaymentStatus::Completed,
            PaymentStatus::Failed,
            PaymentStatus::Refunded,
        ] {
            for state in [GatewayState::Completed, GatewayState::Failed] {
                assert_eq!(
                    Reconciliation::decide(current, &state),
                    Reconciliation::Unchanged,
                    "{current} with {state:?}"
                );
            }
        }
    }

    #[test]
    fn non_terminal_states_change_nothing() {
        for state in ["PENDING", "PAYMENT_PENDING", "INTERNAL_SERVER_ERROR"] {
            assert_eq!(
                Reconciliation::decide(PaymentStatus::Pending, &GatewayState::from(state)),
                Reconciliation::Unchanged,
                "{state}"
            );
        }
    }

    #[test]
    fn gateway_state_keeps_unknown_names() {
        let state = GatewayState::from("PAYMENT_DECLINED");

        assert_eq!(state.as_str(), "PAYMENT_DECLINED");
        assert_eq!(GatewayState::from("COMPLETED"), GatewayState::Completed);
    }

    #[test]
    fn only_pending_online_orders_are_payable() {
        assert_eq!(
            ensure_payable(OrderStatus::Pending, PaymentStatus::Pending, PaymentMethod::PhonePe),
            Ok(())
        );
        assert_eq!(
            ensure_payable(OrderStatus::Pending, PaymentStatus::Failed, PaymentMethod::PhonePe),
            Ok(())
        );
        assert_eq!(
            ensure_payable(OrderStatus::Confirmed, PaymentStatus::Completed, PaymentMethod::PhonePe),
            Err(PaymentError::OrderNotPending(OrderStatus::Confirmed))
        );
        assert_eq!(
            ensure_payable(
                OrderStatus::Pending,
                PaymentStatus::Pending,
                PaymentMethod::CashOnDelivery
            ),
            Err(PaymentError::OfflineMethod(PaymentMethod::CashOnDelivery))
        );
    }
}
