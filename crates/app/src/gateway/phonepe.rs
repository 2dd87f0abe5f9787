//! PhonePe hosted payment page client.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use storefront::{orders::TransactionId, payments::GatewayState};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::gateway::{
    GatewayError, PayPage, PayRequest, PaymentGateway, TransactionStatus,
    checksum::{decode_payload, encode_payload, sign, verify},
};

const PAY_ENDPOINT: &str = "/pg/v1/pay";
const STATUS_ENDPOINT: &str = "/pg/v1/status";
const X_VERIFY: &str = "X-VERIFY";
const X_MERCHANT_ID: &str = "X-MERCHANT-ID";

/// Configuration for the PhonePe client.
#[derive(Clone)]
pub struct PhonePeConfig {
    /// API base, e.g. `"https://api-preprod.phonepe.com/apis/pg-sandbox"`.
    pub base_url: String,
    pub merchant_id: String,
    pub salt_key: Zeroizing<String>,
    pub salt_index: u32,

    /// Where the customer lands after paying.
    pub redirect_url: String,

    /// Server-to-server callback endpoint.
    pub callback_url: String,
    pub timeout: Duration,
}

impl fmt::Debug for PhonePeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhonePeConfig")
            .field("base_url", &self.base_url)
            .field("merchant_id", &self.merchant_id)
            .field("salt_key", &"<redacted>")
            .field("salt_index", &self.salt_index)
            .field("redirect_url", &self.redirect_url)
            .field("callback_url", &self.callback_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// PhonePe pay page and status client.
#[derive(Debug, Clone)]
pub struct PhonePeClient {
    config: PhonePeConfig,
    http: Client,
}

impl PhonePeClient {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: PhonePeConfig) -> Result<Self, GatewayError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { config, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn sign(&self, body: &str, endpoint: &str) -> String {
        sign(
            body,
            endpoint,
            &self.config.salt_key,
            self.config.salt_index,
        )
    }

    fn pay_payload<'a>(&'a self, request: &'a PayRequest) -> PayPayload<'a> {
        PayPayload {
            merchant_id: &self.config.merchant_id,
            merchant_transaction_id: request.transaction_id.as_str(),
            merchant_user_id: request.user_uuid.into_uuid().simple().to_string(),
            amount: request.amount.saturating_mul(100),
            redirect_url: &self.config.redirect_url,
            redirect_mode: "POST",
            callback_url: &self.config.callback_url,
            mobile_number: request.mobile_number.as_deref(),
            payment_instrument: PaymentInstrument {
                instrument_type: "PAY_PAGE",
            },
        }
    }
}

#[async_trait]
impl PaymentGateway for PhonePeClient {
    #[tracing::instrument(
        name = "gateway.phonepe.initiate",
        skip(self, request),
        fields(transaction_id = %request.transaction_id, amount = request.amount),
        err
    )]
    async fn initiate(&self, request: PayRequest) -> Result<PayPage, GatewayError> {
        let payload = encode_payload(&self.pay_payload(&request))?;
        let x_verify = self.sign(&payload, PAY_ENDPOINT);

        let response = self
            .http
            .post(self.url(PAY_ENDPOINT))
            .header(X_VERIFY, x_verify)
            .json(&serde_json::json!({ "request": payload }))
            .send()
            .await?;

        let parsed: GatewayResponse<PayData> = parse(response, "pay").await?;

        if !parsed.success {
            return Err(GatewayError::Rejected {
                code: parsed.code,
                message: parsed.message,
            });
        }

        let redirect_url = parsed
            .data
            .and_then(|data| data.instrument_response)
            .and_then(|instrument| instrument.redirect_info)
            .map(|redirect| redirect.url)
            .ok_or_else(|| {
                GatewayError::UnexpectedResponse("pay response has no redirect url".to_string())
            })?;

        debug!("created pay page");

        Ok(PayPage {
            transaction_id: request.transaction_id,
            redirect_url,
        })
    }

    #[tracing::instrument(
        name = "gateway.phonepe.status",
        skip(self),
        fields(transaction_id = %transaction),
        err
    )]
    async fn status(&self, transaction: TransactionId) -> Result<TransactionStatus, GatewayError> {
        let path = format!(
            "{STATUS_ENDPOINT}/{}/{}",
            self.config.merchant_id,
            transaction.as_str()
        );
        let x_verify = self.sign("", &path);

        let response = self
            .http
            .get(self.url(&path))
            .header(X_VERIFY, x_verify)
            .header(X_MERCHANT_ID, &self.config.merchant_id)
            .send()
            .await?;

        let parsed: GatewayResponse<StatusData> = parse(response, "status").await?;

        Ok(parsed.into_status(transaction))
    }

    fn verify_callback(
        &self,
        response: &str,
        x_verify: &str,
    ) -> Result<TransactionStatus, GatewayError> {
        if !verify(
            x_verify,
            response,
            "",
            &self.config.salt_key,
            self.config.salt_index,
        ) {
            warn!("callback checksum mismatch");

            return Err(GatewayError::InvalidChecksum);
        }

        let parsed: GatewayResponse<StatusData> = decode_payload(response)?;

        let transaction = parsed
            .data
            .as_ref()
            .map(|data| TransactionId::from(data.merchant_transaction_id.clone()))
            .ok_or_else(|| {
                GatewayError::InvalidPayload("callback has no transaction".to_string())
            })?;

        Ok(parsed.into_status(transaction))
    }
}

async fn parse<T>(response: Response, operation: &str) -> Result<T, GatewayError>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();

        return Err(GatewayError::UnexpectedResponse(format!(
            "{operation} request failed with status {status}: {text}"
        )));
    }

    let body = response.bytes().await?;

    serde_json::from_slice(&body).map_err(|e| {
        GatewayError::UnexpectedResponse(format!("{operation} response is not valid: {e}"))
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PayPayload<'a> {
    merchant_id: &'a str,
    merchant_transaction_id: &'a str,
    merchant_user_id: String,

    /// Paise
    amount: u64,
    redirect_url: &'a str,
    redirect_mode: &'a str,
    callback_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mobile_number: Option<&'a str>,
    payment_instrument: PaymentInstrument<'a>,
}

#[derive(Debug, Serialize)]
struct PaymentInstrument<'a> {
    #[serde(rename = "type")]
    instrument_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct GatewayResponse<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

impl GatewayResponse<StatusData> {
    /// A missing `state` leaves the transaction as reported by `code`, which
    /// never drives a transition.
    fn into_status(self, transaction: TransactionId) -> TransactionStatus {
        let (state, gateway_reference) = match self.data {
            Some(StatusData {
                state: Some(state),
                transaction_id,
                ..
            }) => (GatewayState::from(state.as_str()), transaction_id),
            Some(StatusData { transaction_id, .. }) => {
                (GatewayState::Other(self.code), transaction_id)
            }
            None => (GatewayState::Other(self.code), None),
        };

        TransactionStatus {
            transaction_id: transaction,
            state,
            gateway_reference,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayData {
    instrument_response: Option<InstrumentResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstrumentResponse {
    redirect_info: Option<RedirectInfo>,
}

#[derive(Debug, Deserialize)]
struct RedirectInfo {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusData {
    merchant_transaction_id: String,
    transaction_id: Option<String>,
    state: Option<String>,
}

#[cfg(test)]
mod tests {
    use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
    use storefront::users::UserUuid;
    use testresult::TestResult;

    use super::*;

    fn client() -> Result<PhonePeClient, GatewayError> {
        PhonePeClient::new(PhonePeConfig {
            base_url: "https://gateway.test/".to_string(),
            merchant_id: "MERCHANTUAT".to_string(),
            salt_key: Zeroizing::new("salt-key".to_string()),
            salt_index: 1,
            redirect_url: "https://shop.test/payment/return".to_string(),
            callback_url: "https://api.shop.test/payments/callback".to_string(),
            timeout: Duration::from_secs(15),
        })
    }

    fn callback(state: &str) -> String {
        BASE64.encode(
            serde_json::json!({
                "success": true,
                "code": "PAYMENT_SUCCESS",
                "data": {
                    "merchantId": "MERCHANTUAT",
                    "merchantTransactionId": "TXN1718048213377abcDEF",
                    "transactionId": "T2406101234",
                    "amount": 26800,
                    "state": state,
                }
            })
            .to_string(),
        )
    }

    #[test]
    fn pay_payload_uses_paise_and_pay_page() -> TestResult {
        let client = client()?;
        let request = PayRequest {
            transaction_id: TransactionId::from("TXN1".to_string()),
            user_uuid: UserUuid::new(),
            amount: 268,
            mobile_number: None,
        };

        let payload = serde_json::to_value(client.pay_payload(&request))?;

        assert_eq!(payload["merchantId"], "MERCHANTUAT");
        assert_eq!(payload["merchantTransactionId"], "TXN1");
        assert_eq!(payload["amount"], 26800);
        assert_eq!(payload["redirectMode"], "POST");
        assert_eq!(payload["paymentInstrument"]["type"], "PAY_PAGE");
        assert!(payload.get("mobileNumber").is_none());

        Ok(())
    }

    #[test]
    fn url_joins_base_and_path() -> TestResult {
        let client = client()?;

        assert_eq!(client.url(PAY_ENDPOINT), "https://gateway.test/pg/v1/pay");

        Ok(())
    }

    #[test]
    fn verified_callback_is_decoded() -> TestResult {
        let client = client()?;
        let response = callback("COMPLETED");
        let x_verify = sign(&response, "", "salt-key", 1);

        let status = client.verify_callback(&response, &x_verify)?;

        assert_eq!(status.transaction_id.as_str(), "TXN1718048213377abcDEF");
        assert_eq!(status.state, GatewayState::Completed);
        assert_eq!(status.gateway_reference.as_deref(), Some("T2406101234"));

        Ok(())
    }

    #[test]
    fn callback_with_wrong_checksum_is_rejected() -> TestResult {
        let client = client()?;
        let response = callback("COMPLETED");
        let x_verify = sign(&response, "", "other-salt", 1);

        let result = client.verify_callback(&response, &x_verify);

        assert!(
            matches!(result, Err(GatewayError::InvalidChecksum)),
            "expected InvalidChecksum, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn signed_but_undecodable_callback_is_invalid() -> TestResult {
        let client = client()?;
        let response = BASE64.encode(b"{\"data\": 42}");
        let x_verify = sign(&response, "", "salt-key", 1);

        let result = client.verify_callback(&response, &x_verify);

        assert!(
            matches!(result, Err(GatewayError::InvalidPayload(_))),
            "expected InvalidPayload, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn missing_state_never_drives_a_transition() {
        let response: GatewayResponse<StatusData> = GatewayResponse {
            success: false,
            code: "INTERNAL_SERVER_ERROR".to_string(),
            message: String::new(),
            data: None,
        };

        let status = response.into_status(TransactionId::from("TXN1".to_string()));

        assert_eq!(
            status.state,
            GatewayState::Other("INTERNAL_SERVER_ERROR".to_string())
        );
    }
}
