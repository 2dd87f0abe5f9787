//! Payment Gateway Config

use std::time::Duration;

use clap::Args;
use storefront_app::gateway::PhonePeConfig;
use zeroize::Zeroizing;

/// PhonePe gateway settings.
#[derive(Debug, Args)]
pub struct PaymentGatewayConfig {
    /// PhonePe API base URL
    #[arg(long, env = "PHONEPE_BASE_URL")]
    pub phonepe_base_url: String,

    /// PhonePe merchant id
    #[arg(long, env = "PHONEPE_MERCHANT_ID")]
    pub phonepe_merchant_id: String,

    /// PhonePe salt key used to sign requests
    #[arg(long, env = "PHONEPE_SALT_KEY", hide_env_values = true)]
    pub phonepe_salt_key: String,

    /// PhonePe salt key index
    #[arg(long, env = "PHONEPE_SALT_INDEX", default_value_t = 1_u32)]
    pub phonepe_salt_index: u32,

    /// Where customers land after paying
    #[arg(long, env = "PHONEPE_REDIRECT_URL")]
    pub phonepe_redirect_url: String,

    /// Server-to-server callback URL, normally `/payments/callback`
    #[arg(long, env = "PHONEPE_CALLBACK_URL")]
    pub phonepe_callback_url: String,

    /// Gateway request timeout in seconds
    #[arg(long, env = "PHONEPE_TIMEOUT_SECONDS", default_value_t = 15_u64)]
    pub phonepe_timeout_seconds: u64,
}

impl PaymentGatewayConfig {
    /// Client configuration for the gateway.
    #[must_use]
    pub fn phonepe_config(&self) -> PhonePeConfig {
        PhonePeConfig {
            base_url: self.phonepe_base_url.clone(),
            merchant_id: self.phonepe_merchant_id.clone(),
            salt_key: Zeroizing::new(self.phonepe_salt_key.clone()),
            salt_index: self.phonepe_salt_index,
            redirect_url: self.phonepe_redirect_url.clone(),
            callback_url: self.phonepe_callback_url.clone(),
            timeout: Duration::from_secs(self.phonepe_timeout_seconds),
        }
    }
}
