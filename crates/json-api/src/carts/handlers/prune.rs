//! Prune Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    carts::{errors::into_status_error, get::CartResponse},
    extensions::*,
    state::State,
};

/// Prune Cart Handler
///
/// Deletes stored lines whose product has been deactivated. Reading the cart
/// only hides them.
#[endpoint(
    tags("cart"),
    summary = "Prune Inactive Cart Items",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Inactive items removed"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let cart = state
        .app
        .carts
        .prune_inactive_items(principal.user_uuid)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
