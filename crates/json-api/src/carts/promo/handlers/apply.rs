//! Apply Promo Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    carts::{errors::into_status_error, get::CartResponse},
    extensions::*,
    state::State,
};

/// Apply Promo Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ApplyPromoRequest {
    /// Promo code; case and surrounding whitespace are ignored
    pub code: String,
}

/// Apply Promo Handler
///
/// Replaces any promo already on the cart.
#[endpoint(
    tags("cart"),
    summary = "Apply Promo Code",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Promo applied"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid promo code"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<ApplyPromoRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let cart = state
        .app
        .carts
        .apply_promo(principal.user_uuid, json.into_inner().code)
        .await
        .map_err(into_status_error)?;

    if let Some(promo) = cart.cart.applied_promo() {
        info!(user_uuid = %principal.user_uuid, code = %promo.code, "applied promo");
    }

    Ok(Json(cart.into()))
}
