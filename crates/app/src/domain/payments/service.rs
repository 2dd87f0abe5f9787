//! Payments service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use storefront::{
    orders::{OrderNumber, TransactionId},
    payments::{GatewayState, Reconciliation, ensure_payable},
    users::UserUuid,
};
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        carts::{PgCartItemsRepository, PgCartsRepository},
        orders::PgOrdersRepository,
        payments::{
            errors::PaymentsServiceError,
            records::{PaymentInitiation, PaymentOutcome},
        },
    },
    gateway::{PayRequest, PaymentGateway, TransactionStatus},
};

#[derive(Clone)]
pub struct PgPaymentsService {
    db: Db,
    gateway: Arc<dyn PaymentGateway>,
    orders_repository: PgOrdersRepository,
    carts_repository: PgCartsRepository,
    cart_items_repository: PgCartItemsRepository,
}

impl fmt::Debug for PgPaymentsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgPaymentsService")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

impl PgPaymentsService {
    #[must_use]
    pub fn new(db: Db, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            db,
            gateway,
            orders_repository: PgOrdersRepository::new(),
            carts_repository: PgCartsRepository::new(),
            cart_items_repository: PgCartItemsRepository::new(),
        }
    }

    /// Apply a gateway state to the order holding `status.transaction_id`.
    ///
    /// Payment, order and cart change in one transaction; the conditional
    /// updates make repeated or racing reports a no-op.
    async fn reconcile(
        &self,
        status: TransactionStatus,
    ) -> Result<PaymentOutcome, PaymentsServiceError> {
        let TransactionStatus {
            transaction_id,
            state,
            ..
        } = status;

        let mut tx = self.db.begin().await?;

        let current = self
            .orders_repository
            .get_order_by_transaction(&mut tx, &transaction_id)
            .await?;

        let decision = Reconciliation::decide(current.payment.status, &state);

        let updated = match decision {
            Reconciliation::Complete => {
                let updated = self
                    .orders_repository
                    .complete_payment(&mut tx, &transaction_id)
                    .await?;

                if updated.is_some() {
                    let cart = self
                        .carts_repository
                        .reset_cart(&mut tx, current.user_uuid)
                        .await?;

                    if let Some(cart) = cart {
                        self.cart_items_repository
                            .clear_cart_items(&mut tx, cart)
                            .await?;
                    }
                }

                updated
            }
            Reconciliation::Fail => {
                self.orders_repository
                    .fail_payment(&mut tx, &transaction_id)
                    .await?
            }
            Reconciliation::Unchanged => None,
        };

        let applied = updated.is_some();

        let order = match updated {
            Some(order) => order,
            None if decision == Reconciliation::Unchanged => current,
            None => {
                self.orders_repository
                    .get_order_by_transaction(&mut tx, &transaction_id)
                    .await?
            }
        };

        tx.commit().await?;

        if applied {
            info!(
                order_number = %order.order_number,
                transaction_id = %transaction_id,
                gateway_state = state.as_str(),
                order_status = %order.order_status,
                payment_status = %order.payment.status,
                "reconciled payment"
            );
        }

        Ok(PaymentOutcome::from_order(order, transaction_id, state, applied))
    }
}

#[async_trait]
impl PaymentsService for PgPaymentsService {
    #[tracing::instrument(
        name = "payments.service.initiate_payment",
        skip(self),
        fields(user_uuid = %user, order_number = %order),
        err
    )]
    async fn initiate_payment(
        &self,
        user: UserUuid,
        order: OrderNumber,
    ) -> Result<PaymentInitiation, PaymentsServiceError> {
        let transaction_id = TransactionId::generate(Timestamp::now(), &mut rand::thread_rng());

        let mut tx = self.db.begin().await?;

        let record = self
            .orders_repository
            .get_user_order(&mut tx, user, &order)
            .await?;

        ensure_payable(
            record.order_status,
            record.payment.status,
            record.payment.method,
        )?;

        let rows_affected = self
            .orders_repository
            .assign_transaction(&mut tx, record.uuid, &transaction_id)
            .await?;

        if rows_affected == 0 {
            return Err(PaymentsServiceError::Conflict);
        }

        tx.commit().await?;

        let page = self
            .gateway
            .initiate(PayRequest {
                transaction_id: transaction_id.clone(),
                user_uuid: user,
                amount: record.total_amount,
                mobile_number: Some(record.shipping_address.phone.clone()),
            })
            .await?;

        info!(transaction_id = %transaction_id, "started gateway payment");

        Ok(PaymentInitiation {
            order_number: record.order_number,
            transaction_id,
            redirect_url: page.redirect_url,
        })
    }

    #[tracing::instrument(
        name = "payments.service.get_payment_status",
        skip(self),
        fields(user_uuid = %user, transaction_id = %transaction),
        err
    )]
    async fn get_payment_status(
        &self,
        user: UserUuid,
        transaction: TransactionId,
    ) -> Result<PaymentOutcome, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self
            .orders_repository
            .get_order_by_transaction(&mut tx, &transaction)
            .await?;

        tx.commit().await?;

        if record.user_uuid != user {
            return Err(PaymentsServiceError::Forbidden);
        }

        let status = self.gateway.status(transaction).await?;

        self.reconcile(status).await
    }

    #[tracing::instrument(name = "payments.service.handle_callback", skip_all, err)]
    async fn handle_callback(
        &self,
        response: String,
        x_verify: String,
    ) -> Result<PaymentOutcome, PaymentsServiceError> {
        let status = self
            .gateway
            .verify_callback(&response, &x_verify)
            .inspect_err(|error| warn!(%error, "rejected gateway callback"))?;

        if matches!(status.state, GatewayState::Other(_)) {
            info!(
                transaction_id = %status.transaction_id,
                gateway_state = status.state.as_str(),
                "ignoring non-terminal callback state"
            );
        }

        self.reconcile(status).await
    }
}

#[automock]
#[async_trait]
pub trait PaymentsService: Send + Sync {
    /// Start a gateway payment for one of the user's pending online orders.
    async fn initiate_payment(
        &self,
        user: UserUuid,
        order: OrderNumber,
    ) -> Result<PaymentInitiation, PaymentsServiceError>;

    /// Poll the gateway for a transaction and apply the result.
    async fn get_payment_status(
        &self,
        user: UserUuid,
        transaction: TransactionId,
    ) -> Result<PaymentOutcome, PaymentsServiceError>;

    /// Verify a gateway callback and apply the reported state.
    async fn handle_callback(
        &self,
        response: String,
        x_verify: String,
    ) -> Result<PaymentOutcome, PaymentsServiceError>;
}
