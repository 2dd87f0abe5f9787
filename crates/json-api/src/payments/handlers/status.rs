//! Payment Status Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use storefront::orders::TransactionId;
use storefront_app::domain::payments::records::PaymentOutcome;

use crate::{
    extensions::*,
    observability::{self, PaymentSource},
    payments::errors::into_status_error,
    state::State,
};

/// Payment Status Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentStatusResponse {
    pub order_number: String,
    pub transaction_id: String,

    /// State reported by the gateway, e.g. `COMPLETED`, `FAILED` or `PENDING`
    pub gateway_state: String,
    pub order_status: String,
    pub payment_status: String,
    pub paid_at: Option<String>,
}

impl From<PaymentOutcome> for PaymentStatusResponse {
    fn from(outcome: PaymentOutcome) -> Self {
        Self {
            order_number: outcome.order_number.to_string(),
            transaction_id: outcome.transaction_id.to_string(),
            gateway_state: outcome.gateway_state.as_str().to_string(),
            order_status: outcome.order_status.to_string(),
            payment_status: outcome.payment_status.to_string(),
            paid_at: outcome.paid_at.map(|at| at.to_string()),
        }
    }
}

/// Payment Status Handler
///
/// Polls the gateway and applies the result to the order.
#[endpoint(
    tags("payments"),
    summary = "Get Payment Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Payment status"),
        (status_code = StatusCode::FORBIDDEN, description = "Transaction belongs to another user"),
        (status_code = StatusCode::NOT_FOUND, description = "Transaction not found"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Payment gateway error"),
        (status_code = StatusCode::GATEWAY_TIMEOUT, description = "Payment gateway timed out"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    transaction: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<PaymentStatusResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let outcome = state
        .app
        .payments
        .get_payment_status(
            principal.user_uuid,
            TransactionId::from(transaction.into_inner()),
        )
        .await
        .map_err(into_status_error)?;

    observability::record_payment_reconciliation(
        PaymentSource::Poll,
        outcome.gateway_state.as_str(),
        outcome.applied,
    );

    Ok(Json(outcome.into()))
}
