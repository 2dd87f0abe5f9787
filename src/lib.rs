//! Storefront
//!
//! Settlement rules for an online store: bundle pricing, promo codes, cart
//! aggregation, order materialisation and payment reconciliation decisions.

pub mod bundles;
pub mod carts;
pub mod catalog;
pub mod orders;
pub mod payments;
pub mod prelude;
pub mod promotions;
pub mod users;
pub mod uuids;
