//! Payment Callback Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    extensions::*,
    observability::{self, PaymentSource},
    payments::{errors::into_status_error, status::PaymentStatusResponse},
    state::State,
};

const X_VERIFY: &str = "x-verify";

/// Gateway Callback Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CallbackRequest {
    /// Base64 encoded JSON payload
    pub response: String,
}

/// Payment Callback Handler
///
/// Server-to-server notification from PhonePe. The `X-VERIFY` header is
/// checked against the payload before anything is applied. Errors other
/// than a bad signature or payload answer 5xx so the gateway retries.
#[endpoint(
    tags("payments"),
    summary = "Payment Gateway Callback",
    responses(
        (status_code = StatusCode::OK, description = "Callback applied"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid payload"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid checksum"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CallbackRequest>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<PaymentStatusResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let Some(x_verify) = req
        .headers()
        .get(X_VERIFY)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
    else {
        return Err(StatusError::bad_request().brief("Missing X-VERIFY header"));
    };

    let outcome = state
        .app
        .payments
        .handle_callback(json.into_inner().response, x_verify)
        .await
        .map_err(into_status_error)?;

    observability::record_payment_reconciliation(
        PaymentSource::Callback,
        outcome.gateway_state.as_str(),
        outcome.applied,
    );

    info!(
        order_number = %outcome.order_number,
        transaction_id = %outcome.transaction_id,
        gateway_state = outcome.gateway_state.as_str(),
        applied = outcome.applied,
        "processed payment callback"
    );

    Ok(Json(outcome.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use storefront::{
        orders::{OrderNumber, OrderStatus, PaymentStatus, TransactionId},
        payments::GatewayState,
    };
    use storefront_app::{
        domain::payments::{MockPaymentsService, PaymentsServiceError, records::PaymentOutcome},
        gateway::GatewayError,
    };

    use crate::test_helpers::{Mocks, service_with};

    use super::*;

    fn make_service(payments: MockPaymentsService) -> Service {
        service_with(
            Mocks {
                payments,
                ..Mocks::default()
            },
            None,
            Router::with_path("payments/callback").post(handler),
        )
    }

    #[tokio::test]
    async fn test_failed_callback_cancels_order() -> TestResult {
        let mut repo = MockPaymentsService::new();

        repo.expect_handle_callback()
            .once()
            .withf(|response, x_verify| response == "eyJkYXRhIjp7fX0=" && x_verify == "abc###1")
            .return_once(|_, _| {
                Ok(PaymentOutcome {
                    order_number: OrderNumber::from("ORD12345678ABCDEF".to_string()),
                    transaction_id: TransactionId::from("TXN1767225600000123456".to_string()),
                    gateway_state: GatewayState::Failed,
                    order_status: OrderStatus::Cancelled,
                    payment_status: PaymentStatus::Failed,
                    paid_at: None,
                    applied: true,
                })
            });

        let mut res = TestClient::post("http://example.com/payments/callback")
            .add_header("X-VERIFY", "abc###1", true)
            .json(&json!({ "response": "eyJkYXRhIjp7fX0=" }))
            .send(&make_service(repo))
            .await;

        let body: PaymentStatusResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.order_status, "cancelled");
        assert_eq!(body.payment_status, "failed");

        Ok(())
    }

    #[tokio::test]
    async fn test_bad_checksum_returns_401() -> TestResult {
        let mut repo = MockPaymentsService::new();

        repo.expect_handle_callback()
            .once()
            .return_once(|_, _| Err(PaymentsServiceError::Gateway(GatewayError::InvalidChecksum)));

        let res = TestClient::post("http://example.com/payments/callback")
            .add_header("X-VERIFY", "forged###1", true)
            .json(&json!({ "response": "eyJkYXRhIjp7fX0=" }))
            .send(&make_service(repo))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_signature_returns_400() -> TestResult {
        let mut repo = MockPaymentsService::new();

        repo.expect_handle_callback().never();

        let res = TestClient::post("http://example.com/payments/callback")
            .json(&json!({ "response": "eyJkYXRhIjp7fX0=" }))
            .send(&make_service(repo))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
