//! Cart Promo Codes

mod handlers;

pub(crate) use handlers::*;
