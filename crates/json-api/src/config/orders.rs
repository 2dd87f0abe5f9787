//! Orders Config

use clap::Args;

/// Order pricing settings.
#[derive(Debug, Args)]
pub struct OrdersConfig {
    /// Flat shipping fee added to every order, in whole rupees
    #[arg(long = "order-shipping-fee", env = "ORDER_SHIPPING_FEE", default_value_t = 0_u64)]
    pub shipping_fee: u64,
}
