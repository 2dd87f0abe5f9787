//! Get Cart Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront::{carts::CartItem, promotions::AppliedPromo};
use storefront_app::domain::carts::records::CartRecord;

use crate::{carts::errors::into_status_error, extensions::*, state::State};

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    /// The unique identifier of the cart
    pub uuid: Uuid,

    /// Lines for products that can still be bought
    pub items: Vec<CartItemResponse>,

    /// Promo code applied to the cart
    pub applied_promo: Option<AppliedPromoResponse>,

    /// Sum of line totals in whole rupees
    pub total_amount: u64,

    /// Total after the promo discount in whole rupees
    pub final_amount: u64,

    /// The date and time the cart was created
    pub created_at: String,

    /// The date and time the cart was last updated
    pub updated_at: String,
}

impl From<CartRecord> for CartResponse {
    fn from(record: CartRecord) -> Self {
        let cart = record.cart;

        CartResponse {
            uuid: cart.uuid().into_uuid(),
            items: cart
                .items()
                .iter()
                .map(CartItemResponse::from)
                .collect(),
            applied_promo: cart.applied_promo().map(AppliedPromoResponse::from),
            total_amount: cart.total_amount(),
            final_amount: cart.final_amount(),
            created_at: record.created_at.to_string(),
            updated_at: record.updated_at.to_string(),
        }
    }
}

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartItemResponse {
    /// The unique identifier of the cart item
    pub uuid: Uuid,

    /// The product in the cart item
    pub product_uuid: Uuid,

    /// Bundle tier: `single`, `double` or `triple`
    pub bundle: String,

    /// Device brand the accessory is for
    pub brand: String,

    /// Device model the accessory is for
    pub model: String,

    /// Number of bundles, between 1 and 10
    pub quantity: u32,

    /// Bundle price captured when the item was added
    pub unit_price: u64,

    /// `unit_price × quantity`
    pub line_total: u64,
}

impl From<&CartItem> for CartItemResponse {
    fn from(item: &CartItem) -> Self {
        Self {
            uuid: item.uuid.into_uuid(),
            product_uuid: item.product_uuid.into_uuid(),
            bundle: item.bundle.to_string(),
            brand: item.brand.clone(),
            model: item.model.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total(),
        }
    }
}

/// Applied Promo Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AppliedPromoResponse {
    pub code: String,

    /// Percentage points or whole rupees, depending on `discount_type`
    pub discount: u64,

    /// `percentage` or `fixed`
    pub discount_type: String,
}

impl From<&AppliedPromo> for AppliedPromoResponse {
    fn from(promo: &AppliedPromo) -> Self {
        Self {
            code: promo.code.clone(),
            discount: promo.discount,
            discount_type: promo.discount_type.to_string(),
        }
    }
}

/// Get Cart Handler
///
/// Returns the caller's cart, creating an empty one on first access.
#[endpoint(
    tags("cart"),
    summary = "Get Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Cart"),
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
        .get_cart(principal.user_uuid)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
