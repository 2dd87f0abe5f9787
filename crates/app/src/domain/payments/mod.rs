//! Payments

pub mod errors;
pub mod records;
pub mod service;

pub use errors::PaymentsServiceError;
pub use service::*;
