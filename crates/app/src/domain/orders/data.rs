//! Order Data

use storefront::orders::OrderStatus;

pub use storefront::orders::{NewOrder, ShippingAddress};

/// Administrative status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: OrderStatus,

    /// Replaces the stored tracking number when set.
    pub tracking_number: Option<String>,
}
