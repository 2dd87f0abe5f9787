//! Cart Errors

use salvo::http::StatusError;
use tracing::error;

use storefront::{carts::CartError, promotions::PromoError};
use storefront_app::domain::carts::CartsServiceError;

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::Cart(CartError::ItemNotFound(_)) => {
            StatusError::not_found().brief("Cart item not found")
        }
        CartsServiceError::Cart(CartError::ProductNotFound(_)) => {
            StatusError::not_found().brief("Product not found")
        }
        CartsServiceError::Cart(unavailable @ CartError::ProductUnavailable { .. }) => {
            StatusError::conflict().brief(unavailable.to_string())
        }
        CartsServiceError::Promo(PromoError::InvalidCode) => {
            StatusError::bad_request().brief("Invalid promo code")
        }
        CartsServiceError::Promo(source) => {
            error!("promo registry error: {source}");

            StatusError::internal_server_error()
        }
        CartsServiceError::AlreadyExists => StatusError::conflict().brief("Cart already exists"),
        CartsServiceError::InvalidReference
        | CartsServiceError::MissingRequiredData
        | CartsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid cart payload")
        }
        CartsServiceError::NotFound => StatusError::not_found().brief("Cart not found"),
        CartsServiceError::Sql(source) => {
            error!("cart storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
