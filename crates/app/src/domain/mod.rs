//! Storefront Domain Concerns

pub mod carts;
pub mod orders;
pub mod payments;
pub mod products;
