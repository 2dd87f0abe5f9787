//! Get Product Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use storefront::bundles::BundlePricing;
use uuid::Uuid;

use storefront_app::domain::products::records::ProductRecord;

use crate::{extensions::*, products::errors::into_status_error, state::State};

/// Bundle Pricing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BundlePricingResponse {
    /// One unit
    pub single: u64,

    /// Two units, 5% off
    pub double: u64,

    /// Three units, 10% off
    pub triple: u64,
}

impl From<BundlePricing> for BundlePricingResponse {
    fn from(pricing: BundlePricing) -> Self {
        Self {
            single: pricing.single,
            double: pricing.double,
            triple: pricing.triple,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProductResponse {
    /// The unique identifier of the product
    pub uuid: Uuid,

    /// Display name
    pub name: String,

    /// Image URL
    pub image: Option<String>,

    /// Unit price in whole rupees
    pub base_price: u64,

    /// Price of each bundle tier in whole rupees
    pub bundle_pricing: BundlePricingResponse,

    /// Whether the product can be bought
    pub is_active: bool,

    /// The date and time the product was created
    pub created_at: String,

    /// The date and time the product was last updated
    pub updated_at: String,
}

impl From<ProductRecord> for ProductResponse {
    fn from(product: ProductRecord) -> Self {
        ProductResponse {
            uuid: product.uuid.into_uuid(),
            name: product.name,
            image: product.image,
            base_price: product.base_price,
            bundle_pricing: product.bundle_pricing.into(),
            is_active: product.is_active,
            created_at: product.created_at.to_string(),
            updated_at: product.updated_at.to_string(),
        }
    }
}

/// Get Product Handler
///
/// Returns a product, including deactivated ones so old order lines still
/// resolve.
#[endpoint(
    tags("products"),
    summary = "Get Product",
    responses(
        (status_code = StatusCode::OK, description = "Product found"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let product = state
        .app
        .products
        .get_product(product.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(product.into()))
}
