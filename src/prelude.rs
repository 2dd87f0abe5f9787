//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    bundles::{Bundle, BundlePricing, UnknownBundle},
    carts::{
        Cart, CartChange, CartError, CartItem, CartItemUpdate, CartItemUuid, CartUuid,
        MAX_QUANTITY, MIN_QUANTITY, NewCartItem, clamp_quantity,
    },
    catalog::{Catalog, CatalogProduct, ProductIndex, ProductUuid},
    orders::{
        NewOrder, OrderDraft, OrderError, OrderItemSnapshot, OrderItemUuid, OrderNumber,
        OrderStatus, OrderUuid, PaymentMethod, PaymentStatus, ShippingAddress, TransactionId,
        TransitionError, UnknownStatus, materialize,
    },
    payments::{GatewayState, PaymentError, Reconciliation, ensure_payable},
    promotions::{AppliedPromo, DiscountType, PromoError, PromoRegistry, apply_discount},
    users::{User, UserUuid},
    uuids::TypedUuid,
};
