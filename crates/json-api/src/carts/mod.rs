//! Cart

mod errors;
mod handlers;
pub(crate) mod items;
pub(crate) mod promo;

pub(crate) use handlers::*;
