//! Initiate Payment Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use storefront::orders::OrderNumber;
use storefront_app::domain::payments::records::PaymentInitiation;

use crate::{extensions::*, payments::errors::into_status_error, state::State};

/// Payment Initiation Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentInitiationResponse {
    pub order_number: String,

    /// Id to poll with `GET /payments/{transaction}`
    pub transaction_id: String,

    /// Hosted payment page to send the customer to
    pub redirect_url: String,
}

impl From<PaymentInitiation> for PaymentInitiationResponse {
    fn from(initiation: PaymentInitiation) -> Self {
        Self {
            order_number: initiation.order_number.to_string(),
            transaction_id: initiation.transaction_id.to_string(),
            redirect_url: initiation.redirect_url,
        }
    }
}

/// Initiate Payment Handler
///
/// Starts a PhonePe payment for a pending order. Each call issues a new
/// transaction id.
#[endpoint(
    tags("payments"),
    summary = "Initiate Payment",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Payment initiated"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order cannot be paid"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Payment gateway error"),
        (status_code = StatusCode::GATEWAY_TIMEOUT, description = "Payment gateway timed out"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<String>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<PaymentInitiationResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let initiation = state
        .app
        .payments
        .initiate_payment(principal.user_uuid, OrderNumber::from(order.into_inner()))
        .await
        .map_err(into_status_error)?;

    info!(
        order_number = %initiation.order_number,
        transaction_id = %initiation.transaction_id,
        "initiated payment"
    );

    res.add_header(
        LOCATION,
        format!("/payments/{}", initiation.transaction_id),
        true,
    )
    .or_500("failed to set location header")?
    .status_code(StatusCode::CREATED);

    Ok(Json(initiation.into()))
}
