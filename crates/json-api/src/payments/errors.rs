//! Payment Errors

use salvo::http::StatusError;
use tracing::{error, warn};

use storefront_app::{domain::payments::PaymentsServiceError, gateway::GatewayError};

pub(crate) fn into_status_error(error: PaymentsServiceError) -> StatusError {
    match error {
        PaymentsServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        PaymentsServiceError::Forbidden => {
            StatusError::forbidden().brief("Transaction belongs to another user")
        }
        PaymentsServiceError::NotPayable(reason) => {
            StatusError::conflict().brief(reason.to_string())
        }
        PaymentsServiceError::Conflict => {
            StatusError::conflict().brief("Order was modified, please retry")
        }
        PaymentsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Payment already exists")
        }
        PaymentsServiceError::InvalidReference
        | PaymentsServiceError::MissingRequiredData
        | PaymentsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid payment payload")
        }
        PaymentsServiceError::Gateway(gateway) => gateway_status_error(gateway),
        PaymentsServiceError::Sql(source) => {
            error!("payment storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}

fn gateway_status_error(error: GatewayError) -> StatusError {
    match error {
        GatewayError::Timeout => {
            warn!("payment gateway timed out");

            StatusError::gateway_timeout().brief("Payment gateway timed out, please retry")
        }
        GatewayError::InvalidChecksum => {
            warn!("rejected callback with invalid checksum");

            StatusError::unauthorized().brief("Invalid checksum")
        }
        GatewayError::InvalidPayload(reason) => {
            warn!("rejected callback payload: {reason}");

            StatusError::bad_request().brief("Invalid callback payload")
        }
        other => {
            error!("payment gateway error: {other}");

            StatusError::bad_gateway().brief("Payment gateway unavailable")
        }
    }
}
