//! Create Cart Item Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use storefront::{
    bundles::Bundle,
    carts::{CartItemUuid, NewCartItem},
};

use crate::{
    carts::{errors::into_status_error, get::CartResponse},
    extensions::*,
    state::State,
};

fn default_quantity() -> i64 {
    1
}

/// Create Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateCartItemRequest {
    /// Uuid for the new line; generated when omitted
    pub uuid: Option<Uuid>,
    pub product_uuid: Uuid,

    /// `single`, `double` or `triple`
    pub bundle: String,
    pub brand: String,
    pub model: String,

    /// Clamped to 1..=10
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

impl CreateCartItemRequest {
    fn into_new_item(self) -> Result<NewCartItem, StatusError> {
        let bundle = self
            .bundle
            .parse::<Bundle>()
            .or_400("bundle must be one of single, double or triple")?;

        let brand = self.brand.trim();
        let model = self.model.trim();

        if brand.is_empty() || model.is_empty() {
            return Err(StatusError::bad_request().brief("brand and model are required"));
        }

        Ok(NewCartItem {
            uuid: self
                .uuid
                .map_or_else(CartItemUuid::new, CartItemUuid::from_uuid),
            product_uuid: self.product_uuid.into(),
            bundle,
            brand: brand.to_string(),
            model: model.to_string(),
            quantity: self.quantity,
        })
    }
}

/// Create Cart Item Handler
///
/// Adds a product line at its current bundle price. A line with the same
/// product, bundle, brand and model has its quantity increased instead.
#[endpoint(
    tags("cart"),
    summary = "Add Item to Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "New line added"),
        (status_code = StatusCode::OK, description = "Existing line incremented"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::CONFLICT, description = "Product no longer available"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateCartItemRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let item = json.into_inner().into_new_item()?;
    let item_uuid = item.uuid;
    let product_uuid = item.product_uuid;

    let cart = state
        .app
        .carts
        .add_item(principal.user_uuid, item)
        .await
        .map_err(into_status_error)?;

    let inserted = cart
        .cart
        .items()
        .iter()
        .any(|line| line.uuid == item_uuid);

    info!(
        user_uuid = %principal.user_uuid,
        product_uuid = %product_uuid,
        inserted,
        "added item to cart"
    );

    if inserted {
        res.add_header(LOCATION, format!("/cart/items/{item_uuid}"), true)
            .or_500("failed to set location header")?
            .status_code(StatusCode::CREATED);
    }

    Ok(Json(cart.into()))
}
