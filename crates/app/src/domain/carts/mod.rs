//! Carts

pub mod errors;
pub mod records;
mod repositories;
pub mod service;

pub use errors::CartsServiceError;
pub(crate) use repositories::{CartRow, PgCartItemsRepository, PgCartsRepository};
pub use service::*;
