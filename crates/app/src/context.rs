//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::{AuthService, PgAuthService},
    database::{self, Db},
    domain::{
        carts::{CartsService, PgCartsService},
        orders::{OrdersService, PgOrdersService},
        payments::{PaymentsService, PgPaymentsService},
        products::{PgProductsService, ProductsService},
    },
    gateway::{GatewayError, PhonePeClient, PhonePeConfig},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to build payment gateway client")]
    Gateway(#[source] GatewayError),
}

/// Everything the HTTP layer calls into.
#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub carts: Arc<dyn CartsService>,
    pub orders: Arc<dyn OrdersService>,
    pub payments: Arc<dyn PaymentsService>,
    pub auth: Arc<dyn AuthService>,
}

/// Settings needed to wire the services together.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub database_url: String,
    pub database_max_connections: u32,
    pub phonepe: PhonePeConfig,

    /// Flat shipping fee added to every order.
    pub shipping_fee: u64,
}

impl AppContext {
    /// Connect to the database and build every service.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or
    /// building the gateway client fails.
    pub async fn from_settings(settings: AppSettings) -> Result<Self, AppInitError> {
        let pool = database::connect_pool(&settings.database_url, settings.database_max_connections)
            .await
            .map_err(AppInitError::Database)?;

        let gateway = PhonePeClient::new(settings.phonepe).map_err(AppInitError::Gateway)?;

        let db = Db::new(pool.clone());

        Ok(Self {
            products: Arc::new(PgProductsService::new(db.clone())),
            carts: Arc::new(PgCartsService::new(db.clone())),
            orders: Arc::new(PgOrdersService::new(db.clone(), settings.shipping_fee)),
            payments: Arc::new(PgPaymentsService::new(db, Arc::new(gateway))),
            auth: Arc::new(PgAuthService::new(pool)),
        })
    }
}
