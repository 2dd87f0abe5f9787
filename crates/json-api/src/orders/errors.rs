//! Order Errors

use salvo::http::StatusError;
use tracing::error;

use storefront::orders::OrderError;
use storefront_app::domain::orders::OrdersServiceError;

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::Order(OrderError::EmptyCart) => {
            StatusError::bad_request().brief("Cart is empty")
        }
        OrdersServiceError::Order(missing @ OrderError::MissingAddressField(_)) => {
            StatusError::bad_request().brief(missing.to_string())
        }
        OrdersServiceError::Order(unavailable @ OrderError::ProductUnavailable { .. }) => {
            StatusError::conflict().brief(unavailable.to_string())
        }
        OrdersServiceError::Transition(transition) => {
            StatusError::conflict().brief(transition.to_string())
        }
        OrdersServiceError::Conflict => {
            StatusError::conflict().brief("Order was modified, please retry")
        }
        OrdersServiceError::AlreadyExists => StatusError::conflict().brief("Order already exists"),
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::InvalidReference
        | OrdersServiceError::MissingRequiredData
        | OrdersServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid order payload")
        }
        OrdersServiceError::Sql(source) => {
            error!("order storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
