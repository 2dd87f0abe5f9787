//! Orders

pub(crate) mod admin;
mod errors;
mod handlers;

pub(crate) use handlers::*;
