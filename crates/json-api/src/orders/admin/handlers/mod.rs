//! Order Administration Handlers

pub(crate) mod get;
pub(crate) mod status;
