//! Cart Records

use jiff::Timestamp;
use storefront::carts::Cart;

pub use storefront::carts::{CartItemUuid, CartUuid};

/// Cart Record
///
/// `cart` holds only lines for active products, with totals computed over
/// those lines.
#[derive(Debug, Clone)]
pub struct CartRecord {
    pub cart: Cart,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
