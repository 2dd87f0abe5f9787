//! Users

use crate::uuids::TypedUuid;

/// Marker for identifiers issued by the identity boundary.
#[derive(Debug)]
pub struct User;

/// User Uuid
pub type UserUuid = TypedUuid<User>;
