//! Payment Gateway

use async_trait::async_trait;
use mockall::automock;
use storefront::{orders::TransactionId, payments::GatewayState, users::UserUuid};

pub mod checksum;
mod errors;
mod phonepe;

pub use errors::GatewayError;
pub use phonepe::{PhonePeClient, PhonePeConfig};

/// A payment to start on the hosted payment page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayRequest {
    pub transaction_id: TransactionId,
    pub user_uuid: UserUuid,

    /// Amount in whole rupees.
    pub amount: u64,
    pub mobile_number: Option<String>,
}

/// Where to send the customer to pay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayPage {
    pub transaction_id: TransactionId,
    pub redirect_url: String,
}

/// Gateway view of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionStatus {
    pub transaction_id: TransactionId,
    pub state: GatewayState,

    /// The gateway's own reference, once it has one.
    pub gateway_reference: Option<String>,
}

#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted payment page for `request`.
    async fn initiate(&self, request: PayRequest) -> Result<PayPage, GatewayError>;

    /// Fetch the current state of a transaction.
    async fn status(&self, transaction: TransactionId) -> Result<TransactionStatus, GatewayError>;

    /// Verify and decode a server-to-server callback.
    fn verify_callback(
        &self,
        response: &str,
        x_verify: &str,
    ) -> Result<TransactionStatus, GatewayError>;
}
