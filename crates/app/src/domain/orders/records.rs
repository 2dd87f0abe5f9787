//! Order Records

use jiff::Timestamp;
use storefront::{
    orders::{OrderItemSnapshot, OrderStatus, PaymentMethod, PaymentStatus, ShippingAddress},
    promotions::AppliedPromo,
    users::UserUuid,
};

pub use storefront::orders::{OrderNumber, OrderUuid, TransactionId};

/// Payment details of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentInfo {
    pub method: PaymentMethod,
    pub status: PaymentStatus,

    /// Gateway correlation id, set once a payment is initiated.
    pub transaction_id: Option<TransactionId>,
    pub paid_at: Option<Timestamp>,
}

/// Order Record
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub order_number: OrderNumber,
    pub user_uuid: UserUuid,
    pub items: Vec<OrderItemSnapshot>,
    pub shipping_address: ShippingAddress,
    pub order_status: OrderStatus,
    pub payment: PaymentInfo,
    pub promo: Option<AppliedPromo>,
    pub subtotal: u64,
    pub discount: u64,
    pub shipping_fee: u64,
    pub total_amount: u64,
    pub tracking_number: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
