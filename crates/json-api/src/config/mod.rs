//! Server configuration module

use clap::Parser;
use storefront_app::context::AppSettings;

use crate::config::{
    db::DatabaseConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    orders::OrdersConfig,
    payments::PaymentGatewayConfig,
    server::ServerRuntimeConfig,
};

pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod orders;
pub(crate) mod payments;
pub(crate) mod server;

/// Storefront JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "storefront-json", about = "Storefront JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Observability (traces/metrics) settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// PhonePe gateway settings.
    #[command(flatten)]
    pub payments: PaymentGatewayConfig,

    /// Order pricing settings.
    #[command(flatten)]
    pub orders: OrdersConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }

    /// Settings for building the application services.
    #[must_use]
    pub fn app_settings(&self) -> AppSettings {
        AppSettings {
            database_url: self.database.database_url.clone(),
            database_max_connections: self.database.database_max_connections,
            phonepe: self.payments.phonepe_config(),
            shipping_fee: self.orders.shipping_fee,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use testresult::TestResult;

    use crate::config::observability::LogFormat;

    use super::*;

    const REQUIRED: [&str; 13] = [
        "storefront-json",
        "--database-url",
        "postgres://localhost/storefront",
        "--phonepe-base-url",
        "https://api-preprod.phonepe.com/apis/pg-sandbox",
        "--phonepe-merchant-id",
        "MERCHANTUAT",
        "--phonepe-salt-key",
        "salt",
        "--phonepe-redirect-url",
        "https://shop.example.com/payment/return",
        "--phonepe-callback-url",
        "https://api.example.com/payments/callback",
    ];

    #[test]
    fn defaults_apply_to_optional_settings() -> TestResult {
        let config = ServerConfig::try_parse_from(REQUIRED)?;

        assert_eq!(config.socket_addr(), "0.0.0.0:8698");
        assert_eq!(config.payments.phonepe_salt_index, 1);
        assert_eq!(config.orders.shipping_fee, 0);
        assert!(!config.observability.otel_enabled, "export is opt-in");
        assert_eq!(config.logging.log_format, LogFormat::Compact);

        let settings = config.app_settings();

        assert_eq!(settings.database_url, "postgres://localhost/storefront");
        assert_eq!(settings.database_max_connections, 10);
        assert_eq!(settings.phonepe.merchant_id, "MERCHANTUAT");
        assert_eq!(settings.phonepe.timeout, Duration::from_secs(15));

        Ok(())
    }

    #[test]
    fn missing_gateway_settings_are_rejected() {
        let result = ServerConfig::try_parse_from(&REQUIRED[..3]);

        assert!(result.is_err(), "expected missing PhonePe settings to fail");
    }
}
