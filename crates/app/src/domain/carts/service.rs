//! Carts service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use storefront::{
    carts::{Cart, CartChange, CartItemUpdate, CartItemUuid, CartUuid, NewCartItem},
    catalog::{ProductIndex, ProductUuid},
    promotions::PromoRegistry,
    users::UserUuid,
};
use tracing::info;

use crate::{
    database::Db,
    domain::{
        carts::{
            errors::CartsServiceError,
            records::CartRecord,
            repositories::{CartRow, PgCartItemsRepository, PgCartsRepository},
        },
        products::PgProductsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    promos: PromoRegistry,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
    products_repository: PgProductsRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self::with_promos(db, PromoRegistry::default())
    }

    #[must_use]
    pub fn with_promos(db: Db, promos: PromoRegistry) -> Self {
        Self {
            db,
            promos,
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
            products_repository: PgProductsRepository::new(),
        }
    }

    /// Load the cart's items and the catalog entries they reference.
    async fn load(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        row: &CartRow,
        extra: Option<ProductUuid>,
    ) -> Result<(Cart, ProductIndex), CartsServiceError> {
        let items = self.items_repository.get_cart_items(tx, row.uuid).await?;

        let mut products: Vec<ProductUuid> = items.iter().map(|item| item.product_uuid).collect();
        products.extend(extra);
        products.sort_unstable();
        products.dedup();

        let catalog = self.products_repository.get_catalog(tx, &products).await?;

        let cart = Cart::new(row.uuid, row.user_uuid, items, row.promo.clone());

        Ok((cart, catalog))
    }

    /// Run a cart mutation under the cart's row lock.
    ///
    /// Lines for inactive products are pruned before `op` runs, and the
    /// resulting changes and totals are written in the same transaction.
    async fn mutate<F>(
        &self,
        user: UserUuid,
        extra: Option<ProductUuid>,
        op: F,
    ) -> Result<CartRecord, CartsServiceError>
    where
        F: FnOnce(&mut Cart, &ProductIndex) -> Result<Vec<CartChange>, CartsServiceError> + Send,
    {
        let mut tx = self.db.begin().await?;

        self.carts_repository.ensure_cart(&mut tx, user).await?;

        let row = self
            .carts_repository
            .lock_cart(&mut tx, user)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        let (mut cart, catalog) = self.load(&mut tx, &row, extra).await?;

        let pruned = cart.prune_inactive(&catalog);

        if !pruned.is_empty() {
            self.items_repository
                .delete_cart_items(&mut tx, cart.uuid(), &pruned)
                .await?;

            info!(cart_uuid = %cart.uuid(), pruned = pruned.len(), "pruned inactive cart items");
        }

        let changes = op(&mut cart, &catalog)?;

        for change in changes {
            self.persist_change(&mut tx, cart.uuid(), change).await?;
        }

        let row = self.carts_repository.update_cart(&mut tx, &cart).await?;

        tx.commit().await?;

        Ok(CartRecord {
            cart,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    async fn persist_change(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        change: CartChange,
    ) -> Result<(), sqlx::Error> {
        match change {
            CartChange::Inserted(item) => {
                self.items_repository
                    .create_cart_item(tx, cart, &item)
                    .await?;
            }
            CartChange::Updated(item) => {
                self.items_repository
                    .update_cart_item(tx, cart, &item)
                    .await?;
            }
            CartChange::Removed(item) => {
                self.items_repository
                    .delete_cart_items(tx, cart, &[item])
                    .await?;
            }
            CartChange::Merged { kept, removed } => {
                self.items_repository
                    .delete_cart_items(tx, cart, &[removed])
                    .await?;

                self.items_repository
                    .update_cart_item(tx, cart, &kept)
                    .await?;
            }
            CartChange::Cleared => {
                self.items_repository.clear_cart_items(tx, cart).await?;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        self.carts_repository.ensure_cart(&mut tx, user).await?;

        let row = self.carts_repository.get_cart(&mut tx, user).await?;

        let (cart, catalog) = self.load(&mut tx, &row, None).await?;

        tx.commit().await?;

        Ok(CartRecord {
            cart: cart.view(&catalog),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self, item),
        fields(user_uuid = %user, product_uuid = %item.product_uuid, bundle = %item.bundle),
        err
    )]
    async fn add_item(
        &self,
        user: UserUuid,
        item: NewCartItem,
    ) -> Result<CartRecord, CartsServiceError> {
        let product = item.product_uuid;

        let record = self
            .mutate(user, Some(product), |cart, catalog| {
                Ok(vec![cart.add_item(item, catalog)?])
            })
            .await?;

        info!(total_amount = record.cart.total_amount(), "added cart item");

        Ok(record)
    }

    #[tracing::instrument(
        name = "carts.service.update_item",
        skip(self, update),
        fields(user_uuid = %user, item_uuid = %item),
        err
    )]
    async fn update_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
        update: CartItemUpdate,
    ) -> Result<CartRecord, CartsServiceError> {
        let record = self
            .mutate(user, None, |cart, catalog| {
                Ok(vec![cart.update_item(item, update, catalog)?])
            })
            .await?;

        info!(total_amount = record.cart.total_amount(), "updated cart item");

        Ok(record)
    }

    #[tracing::instrument(
        name = "carts.service.remove_item",
        skip(self),
        fields(user_uuid = %user, item_uuid = %item),
        err
    )]
    async fn remove_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
    ) -> Result<CartRecord, CartsServiceError> {
        let record = self
            .mutate(user, None, |cart, _| Ok(vec![cart.remove_item(item)?]))
            .await?;

        info!(total_amount = record.cart.total_amount(), "removed cart item");

        Ok(record)
    }

    #[tracing::instrument(
        name = "carts.service.clear_cart",
        skip(self),
        fields(user_uuid = %user),
        err
    )]
    async fn clear_cart(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError> {
        let record = self
            .mutate(user, None, |cart, _| Ok(vec![cart.clear()]))
            .await?;

        info!("cleared cart");

        Ok(record)
    }

    async fn prune_inactive_items(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError> {
        self.mutate(user, None, |_, _| Ok(Vec::new())).await
    }

    #[tracing::instrument(
        name = "carts.service.apply_promo",
        skip(self, code),
        fields(user_uuid = %user),
        err
    )]
    async fn apply_promo(
        &self,
        user: UserUuid,
        code: String,
    ) -> Result<CartRecord, CartsServiceError> {
        let promos = &self.promos;

        let record = self
            .mutate(user, None, |cart, _| {
                cart.apply_promo(promos, &code)?;

                Ok(Vec::new())
            })
            .await?;

        info!(
            promo_code = record.cart.applied_promo().map(|promo| promo.code.as_str()),
            final_amount = record.cart.final_amount(),
            "applied promo"
        );

        Ok(record)
    }

    async fn remove_promo(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError> {
        self.mutate(user, None, |cart, _| {
            cart.remove_promo();

            Ok(Vec::new())
        })
        .await
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve the user's cart, creating it on first access.
    ///
    /// Lines for inactive products are left out of the result but stay
    /// stored until the next mutation or an explicit prune.
    async fn get_cart(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError>;

    /// Add a product, incrementing a matching line if there is one.
    async fn add_item(&self, user: UserUuid, item: NewCartItem)
    -> Result<CartRecord, CartsServiceError>;

    /// Change a line's quantity, brand or model.
    async fn update_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
        update: CartItemUpdate,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Remove a line.
    async fn remove_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Remove every line and the applied promo.
    async fn clear_cart(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError>;

    /// Delete lines whose product has been deactivated.
    async fn prune_inactive_items(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError>;

    /// Apply a promo code, replacing any already applied.
    async fn apply_promo(&self, user: UserUuid, code: String)
    -> Result<CartRecord, CartsServiceError>;

    /// Remove the applied promo. Succeeds when there is none.
    async fn remove_promo(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError>;
}
