//! Orders service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rustc_hash::FxHashMap;
use sqlx::{Postgres, Transaction};
use storefront::{
    carts::Cart,
    catalog::ProductUuid,
    orders::{NewOrder, OrderError, OrderNumber, OrderStatus, OrderUuid, materialize},
    users::UserUuid,
};
use tracing::info;

use crate::{
    database::Db,
    domain::{
        carts::{PgCartItemsRepository, PgCartsRepository},
        orders::{
            data::StatusUpdate,
            errors::OrdersServiceError,
            records::OrderRecord,
            repositories::{PgOrderItemsRepository, PgOrdersRepository},
        },
        products::PgProductsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    shipping_fee: u64,
    orders_repository: PgOrdersRepository,
    items_repository: PgOrderItemsRepository,
    carts_repository: PgCartsRepository,
    cart_items_repository: PgCartItemsRepository,
    products_repository: PgProductsRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db, shipping_fee: u64) -> Self {
        Self {
            db,
            shipping_fee,
            orders_repository: PgOrdersRepository::new(),
            items_repository: PgOrderItemsRepository::new(),
            carts_repository: PgCartsRepository::new(),
            cart_items_repository: PgCartItemsRepository::new(),
            products_repository: PgProductsRepository::new(),
        }
    }

    /// Fill in the item snapshots of the given orders.
    async fn attach_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &mut [OrderRecord],
    ) -> Result<(), sqlx::Error> {
        if orders.is_empty() {
            return Ok(());
        }

        let uuids: Vec<OrderUuid> = orders.iter().map(|order| order.uuid).collect();

        let mut by_order: FxHashMap<OrderUuid, &mut OrderRecord> =
            orders.iter_mut().map(|order| (order.uuid, order)).collect();

        for (order_uuid, item) in self.items_repository.get_order_items(tx, &uuids).await? {
            if let Some(order) = by_order.get_mut(&order_uuid) {
                order.items.push(item);
            }
        }

        Ok(())
    }

    /// Validate and apply a status change under the order's current status.
    ///
    /// Fails with `Conflict` if the order or its payment changed since
    /// `current` was read.
    async fn apply_transition<F>(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        current: OrderRecord,
        tracking_number: Option<&str>,
        transition: F,
    ) -> Result<OrderRecord, OrdersServiceError>
    where
        F: FnOnce(&OrderRecord) -> Result<OrderStatus, OrdersServiceError> + Send,
    {
        let next = transition(&current)?;
        let payment_status = current.payment.status.after_order_status(next);

        let mut updated = self
            .orders_repository
            .update_order_status(
                tx,
                current.uuid,
                current.order_status,
                current.payment.status,
                next,
                payment_status,
                tracking_number,
            )
            .await?
            .ok_or(OrdersServiceError::Conflict)?;

        self.attach_items(tx, std::slice::from_mut(&mut updated))
            .await?;

        Ok(updated)
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.create_order",
        skip(self, order),
        fields(user_uuid = %user, payment_method = %order.payment_method),
        err
    )]
    async fn create_order(
        &self,
        user: UserUuid,
        order: NewOrder,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let order_number = OrderNumber::generate(Timestamp::now(), &mut rand::thread_rng());

        let mut tx = self.db.begin().await?;

        let row = self
            .carts_repository
            .lock_cart(&mut tx, user)
            .await?
            .ok_or(OrderError::EmptyCart)?;

        let items = self
            .cart_items_repository
            .get_cart_items(&mut tx, row.uuid)
            .await?;

        let mut products: Vec<ProductUuid> = items.iter().map(|item| item.product_uuid).collect();
        products.sort_unstable();
        products.dedup();

        let catalog = self
            .products_repository
            .get_catalog(&mut tx, &products)
            .await?;

        let cart = Cart::new(row.uuid, row.user_uuid, items, row.promo);

        let draft = materialize(&cart, &catalog, order, self.shipping_fee, order_number)?;

        let mut created = self.orders_repository.create_order(&mut tx, &draft).await?;

        self.items_repository
            .create_order_items(&mut tx, draft.uuid, &draft.items)
            .await?;

        tx.commit().await?;

        created.items = draft.items;

        info!(
            order_number = %created.order_number,
            total_amount = created.total_amount,
            items = created.items.len(),
            "created order"
        );

        Ok(created)
    }

    async fn list_orders(&self, user: UserUuid) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let mut orders = self
            .orders_repository
            .list_user_orders(&mut tx, user)
            .await?;

        self.attach_items(&mut tx, &mut orders).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn get_order(
        &self,
        user: UserUuid,
        order: OrderNumber,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let mut record = self
            .orders_repository
            .get_user_order(&mut tx, user, &order)
            .await?;

        self.attach_items(&mut tx, std::slice::from_mut(&mut record))
            .await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "orders.service.cancel_order",
        skip(self),
        fields(user_uuid = %user, order_number = %order),
        err
    )]
    async fn cancel_order(
        &self,
        user: UserUuid,
        order: OrderNumber,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self
            .orders_repository
            .get_user_order(&mut tx, user, &order)
            .await?;

        let cancelled = self
            .apply_transition(&mut tx, current, None, |current| {
                Ok(current.order_status.cancel_by_customer()?)
            })
            .await?;

        tx.commit().await?;

        info!("cancelled order");

        Ok(cancelled)
    }

    async fn get_order_for_admin(
        &self,
        order: OrderNumber,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let mut record = self.orders_repository.get_order(&mut tx, &order).await?;

        self.attach_items(&mut tx, std::slice::from_mut(&mut record))
            .await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "orders.service.update_order_status",
        skip(self, update),
        fields(order_number = %order, status = %update.status),
        err
    )]
    async fn update_order_status(
        &self,
        order: OrderNumber,
        update: StatusUpdate,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.orders_repository.get_order(&mut tx, &order).await?;
        let from = current.order_status;

        let updated = self
            .apply_transition(
                &mut tx,
                current,
                update.tracking_number.as_deref(),
                |current| Ok(current.order_status.transition(update.status)?),
            )
            .await?;

        tx.commit().await?;

        info!(
            from = %from,
            payment_status = %updated.payment.status,
            "updated order status"
        );

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Snapshot the user's cart into a pending order.
    ///
    /// The cart is left as it is; it is cleared once payment completes.
    async fn create_order(
        &self,
        user: UserUuid,
        order: NewOrder,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// The user's orders, newest first.
    async fn list_orders(&self, user: UserUuid) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// One of the user's orders.
    async fn get_order(
        &self,
        user: UserUuid,
        order: OrderNumber,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Cancel one of the user's pending or confirmed orders.
    async fn cancel_order(
        &self,
        user: UserUuid,
        order: OrderNumber,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Any user's order.
    async fn get_order_for_admin(&self, order: OrderNumber)
    -> Result<OrderRecord, OrdersServiceError>;

    /// Move an order along the status graph.
    async fn update_order_status(
        &self,
        order: OrderNumber,
        update: StatusUpdate,
    ) -> Result<OrderRecord, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use sqlx::query;
    use storefront::{
        bundles::Bundle,
        orders::{PaymentMethod, PaymentStatus, TransitionError},
    };
    use testresult::TestResult;

    use crate::{
        domain::{
            carts::CartsService,
            products::{ProductsService, data::ProductUpdate},
        },
        test::{
            TestContext,
            helpers::{add_item, checkout, create_product},
        },
    };

    use super::*;

    #[tokio::test]
    async fn create_order_snapshots_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Silicone Case", 149).await?;

        add_item(&ctx, product.uuid, Bundle::Single, 2).await?;
        ctx.carts
            .apply_promo(ctx.user_uuid, "WELCOME10".to_string())
            .await?;

        let order = ctx
            .orders
            .create_order(ctx.user_uuid, checkout(PaymentMethod::PhonePe))
            .await?;

        assert!(order.order_number.as_str().starts_with("ORD"));
        assert_eq!(order.order_status, OrderStatus::Pending);
        assert_eq!(order.payment.status, PaymentStatus::Pending);
        assert_eq!(order.subtotal, 298);
        assert_eq!(order.discount, 30);
        assert_eq!(order.total_amount, 268);
        assert_eq!(order.items.len(), 1);

        let cart = ctx.carts.get_cart(ctx.user_uuid).await?;

        assert_eq!(cart.cart.items().len(), 1, "cart survives order creation");

        let fetched = ctx
            .orders
            .get_order(ctx.user_uuid, order.order_number.clone())
            .await?;

        assert_eq!(fetched, order);

        Ok(())
    }

    #[tokio::test]
    async fn placed_order_ignores_later_product_edits() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Silicone Case", 149).await?;

        add_item(&ctx, product.uuid, Bundle::Double, 1).await?;

        let order = ctx
            .orders
            .create_order(ctx.user_uuid, checkout(PaymentMethod::PhonePe))
            .await?;

        ctx.products
            .update_product(
                product.uuid,
                ProductUpdate {
                    name: Some("Leather Case".to_string()),
                    image: Some("https://cdn.example.test/leather.png".to_string()),
                    base_price: Some(999),
                },
            )
            .await?;

        let stored = ctx
            .orders
            .get_order(ctx.user_uuid, order.order_number.clone())
            .await?;

        let item = stored.items.first().ok_or("Expected an order item")?;

        assert_eq!(item.name, "Silicone Case");
        assert_eq!(item.image, None);
        assert_eq!(item.unit_price, 283);
        assert_eq!(stored.subtotal, 283);
        assert_eq!(stored.total_amount, order.total_amount);

        Ok(())
    }

    #[tokio::test]
    async fn shipping_fee_is_added_after_promo() -> TestResult {
        let ctx = TestContext::new().await;
        let orders = PgOrdersService::new(Db::new(ctx.db.pool().clone()), 40);
        let product = create_product(&ctx, "Charger", 500).await?;

        add_item(&ctx, product.uuid, Bundle::Single, 1).await?;
        ctx.carts
            .apply_promo(ctx.user_uuid, "FLAT100".to_string())
            .await?;

        let order = orders
            .create_order(ctx.user_uuid, checkout(PaymentMethod::CashOnDelivery))
            .await?;

        assert_eq!(order.shipping_fee, 40);
        assert_eq!(order.total_amount, 440);

        Ok(())
    }

    #[tokio::test]
    async fn empty_cart_cannot_be_ordered() {
        let ctx = TestContext::new().await;

        let result = ctx
            .orders
            .create_order(ctx.user_uuid, checkout(PaymentMethod::PhonePe))
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::Order(OrderError::EmptyCart))),
            "expected EmptyCart, got {result:?}"
        );
    }

    #[tokio::test]
    async fn inactive_product_blocks_order_and_persists_nothing() -> TestResult {
        let ctx = TestContext::new().await;
        let kept = create_product(&ctx, "Case", 149).await?;
        let retired = create_product(&ctx, "Charger", 499).await?;

        add_item(&ctx, kept.uuid, Bundle::Single, 1).await?;
        add_item(&ctx, retired.uuid, Bundle::Single, 1).await?;

        ctx.products.deactivate_product(retired.uuid).await?;

        let result = ctx
            .orders
            .create_order(ctx.user_uuid, checkout(PaymentMethod::PhonePe))
            .await;

        assert!(
            matches!(
                &result,
                Err(OrdersServiceError::Order(OrderError::ProductUnavailable { name, .. })) if name == "Charger"
            ),
            "expected ProductUnavailable, got {result:?}"
        );

        let orders = ctx.orders.list_orders(ctx.user_uuid).await?;

        assert!(orders.is_empty(), "no order may be written");

        Ok(())
    }

    #[tokio::test]
    async fn orders_are_scoped_to_their_owner() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Case", 149).await?;

        add_item(&ctx, product.uuid, Bundle::Single, 1).await?;

        let order = ctx
            .orders
            .create_order(ctx.user_uuid, checkout(PaymentMethod::PhonePe))
            .await?;

        let result = ctx
            .orders
            .get_order(UserUuid::new(), order.order_number.clone())
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        let admin_view = ctx
            .orders
            .get_order_for_admin(order.order_number.clone())
            .await?;

        assert_eq!(admin_view.uuid, order.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn list_orders_returns_newest_first() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Case", 149).await?;

        add_item(&ctx, product.uuid, Bundle::Single, 1).await?;

        let first = ctx
            .orders
            .create_order(ctx.user_uuid, checkout(PaymentMethod::PhonePe))
            .await?;
        let second = ctx
            .orders
            .create_order(ctx.user_uuid, checkout(PaymentMethod::CashOnDelivery))
            .await?;

        let orders = ctx.orders.list_orders(ctx.user_uuid).await?;
        let numbers: Vec<_> = orders.iter().map(|order| &order.order_number).collect();

        assert_eq!(numbers, vec![&second.order_number, &first.order_number]);
        assert!(orders.iter().all(|order| order.items.len() == 1));

        Ok(())
    }

    #[tokio::test]
    async fn customer_can_cancel_pending_order() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Case", 149).await?;

        add_item(&ctx, product.uuid, Bundle::Single, 1).await?;

        let order = ctx
            .orders
            .create_order(ctx.user_uuid, checkout(PaymentMethod::PhonePe))
            .await?;

        let cancelled = ctx
            .orders
            .cancel_order(ctx.user_uuid, order.order_number)
            .await?;

        assert_eq!(cancelled.order_status, OrderStatus::Cancelled);
        assert_eq!(cancelled.items.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn shipped_orders_cannot_be_cancelled() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Case", 149).await?;

        add_item(&ctx, product.uuid, Bundle::Single, 1).await?;

        let order = ctx
            .orders
            .create_order(ctx.user_uuid, checkout(PaymentMethod::CashOnDelivery))
            .await?;

        for status in [
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
        ] {
            ctx.orders
                .update_order_status(
                    order.order_number.clone(),
                    StatusUpdate {
                        status,
                        tracking_number: None,
                    },
                )
                .await?;
        }

        let result = ctx
            .orders
            .cancel_order(ctx.user_uuid, order.order_number)
            .await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::Transition(TransitionError::NotCancellable(
                    OrderStatus::Shipped
                )))
            ),
            "expected NotCancellable, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn admin_updates_follow_the_status_graph() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Case", 149).await?;

        add_item(&ctx, product.uuid, Bundle::Single, 1).await?;

        let order = ctx
            .orders
            .create_order(ctx.user_uuid, checkout(PaymentMethod::CashOnDelivery))
            .await?;

        let result = ctx
            .orders
            .update_order_status(
                order.order_number.clone(),
                StatusUpdate {
                    status: OrderStatus::Delivered,
                    tracking_number: None,
                },
            )
            .await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::Transition(TransitionError::Illegal { .. }))
            ),
            "expected Illegal, got {result:?}"
        );

        let confirmed = ctx
            .orders
            .update_order_status(
                order.order_number,
                StatusUpdate {
                    status: OrderStatus::Confirmed,
                    tracking_number: Some("AWB123".to_string()),
                },
            )
            .await?;

        assert_eq!(confirmed.order_status, OrderStatus::Confirmed);
        assert_eq!(confirmed.tracking_number.as_deref(), Some("AWB123"));

        Ok(())
    }

    #[tokio::test]
    async fn refunding_moves_completed_payment_to_refunded() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Case", 149).await?;

        add_item(&ctx, product.uuid, Bundle::Single, 1).await?;

        let order = ctx
            .orders
            .create_order(ctx.user_uuid, checkout(PaymentMethod::PhonePe))
            .await?;

        query(
            "UPDATE orders SET order_status = 'confirmed', payment_status = 'completed', paid_at = now() WHERE uuid = $1",
        )
        .bind(order.uuid.into_uuid())
        .execute(ctx.db.pool())
        .await?;

        let refunded = ctx
            .orders
            .update_order_status(
                order.order_number,
                StatusUpdate {
                    status: OrderStatus::Refunded,
                    tracking_number: None,
                },
            )
            .await?;

        assert_eq!(refunded.order_status, OrderStatus::Refunded);
        assert_eq!(refunded.payment.status, PaymentStatus::Refunded);

        Ok(())
    }

    #[tokio::test]
    async fn status_update_from_stale_read_conflicts_with_payment_change() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Case", 149).await?;

        add_item(&ctx, product.uuid, Bundle::Single, 1).await?;

        let order = ctx
            .orders
            .create_order(ctx.user_uuid, checkout(PaymentMethod::PhonePe))
            .await?;

        ctx.orders
            .cancel_order(ctx.user_uuid, order.order_number.clone())
            .await?;

        let stale = ctx
            .orders
            .get_order_for_admin(order.order_number.clone())
            .await?;

        assert_eq!(stale.payment.status, PaymentStatus::Pending);

        // The gateway's completion lands after the admin read the order.
        query("UPDATE orders SET payment_status = 'completed', paid_at = now() WHERE uuid = $1")
            .bind(order.uuid.into_uuid())
            .execute(ctx.db.pool())
            .await?;

        let mut tx = ctx.db.pool().begin().await?;

        let result = ctx
            .orders
            .apply_transition(&mut tx, stale, None, |current| {
                Ok(current.order_status.transition(OrderStatus::Refunded)?)
            })
            .await;

        tx.rollback().await?;

        assert!(
            matches!(result, Err(OrdersServiceError::Conflict)),
            "expected Conflict, got {result:?}"
        );

        let refunded = ctx
            .orders
            .update_order_status(
                order.order_number,
                StatusUpdate {
                    status: OrderStatus::Refunded,
                    tracking_number: None,
                },
            )
            .await?;

        assert_eq!(refunded.order_status, OrderStatus::Refunded);
        assert_eq!(
            refunded.payment.status,
            PaymentStatus::Refunded,
            "completed payment must not be reset to pending"
        );

        Ok(())
    }

    #[tokio::test]
    async fn unknown_order_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .orders
            .get_order_for_admin(OrderNumber::from("ORD00000000AAAAAA".to_string()))
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
