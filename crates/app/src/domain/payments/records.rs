//! Payment Records

use jiff::Timestamp;
use storefront::{
    orders::{OrderNumber, OrderStatus, PaymentStatus, TransactionId},
    payments::GatewayState,
};

use crate::domain::orders::records::OrderRecord;

/// A started gateway payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentInitiation {
    pub order_number: OrderNumber,
    pub transaction_id: TransactionId,

    /// Hosted payment page to send the customer to.
    pub redirect_url: String,
}

/// Result of reconciling a gateway state against an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub order_number: OrderNumber,
    pub transaction_id: TransactionId,
    pub gateway_state: GatewayState,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub paid_at: Option<Timestamp>,

    /// Whether this reconciliation changed the order.
    pub applied: bool,
}

impl PaymentOutcome {
    pub(crate) fn from_order(
        order: OrderRecord,
        transaction_id: TransactionId,
        gateway_state: GatewayState,
        applied: bool,
    ) -> Self {
        Self {
            order_number: order.order_number,
            transaction_id,
            gateway_state,
            order_status: order.order_status,
            payment_status: order.payment.status,
            paid_at: order.payment.paid_at,
            applied,
        }
    }
}
