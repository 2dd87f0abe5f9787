//! Cart Aggregation
//!
//! A cart's totals are always derived from its items and applied promo.
//! Every mutation recomputes them before returning.

use thiserror::Error;

use crate::{
    bundles::Bundle,
    catalog::{Catalog, ProductUuid},
    promotions::{AppliedPromo, PromoError, PromoRegistry},
    users::UserUuid,
    uuids::TypedUuid,
};

/// Cart Uuid
pub type CartUuid = TypedUuid<Cart>;

/// Cart Item Uuid
pub type CartItemUuid = TypedUuid<CartItem>;

/// Smallest quantity a cart line may hold.
pub const MIN_QUANTITY: u32 = 1;

/// Largest quantity a cart line may hold.
pub const MAX_QUANTITY: u32 = 10;

/// Clamp a requested quantity into `MIN_QUANTITY..=MAX_QUANTITY`.
#[must_use]
pub fn clamp_quantity(quantity: i64) -> u32 {
    let clamped = quantity.clamp(i64::from(MIN_QUANTITY), i64::from(MAX_QUANTITY));

    u32::try_from(clamped).unwrap_or(MIN_QUANTITY)
}

/// Errors raised by cart mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// No item with this uuid in the cart.
    #[error("cart item {0} not found")]
    ItemNotFound(CartItemUuid),

    /// The product does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductUuid),

    /// The product exists but has been deactivated.
    #[error("{name} is no longer available")]
    ProductUnavailable {
        /// Product uuid
        product: ProductUuid,

        /// Product name, for customer facing messages
        name: String,
    },
}

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub uuid: CartItemUuid,
    pub product_uuid: ProductUuid,
    pub quantity: u32,
    pub bundle: Bundle,
    pub brand: String,
    pub model: String,

    /// Bundle price captured when the line was added.
    pub unit_price: u64,
}

impl CartItem {
    /// `unit_price × quantity`
    #[must_use]
    pub fn line_total(&self) -> u64 {
        self.unit_price.saturating_mul(u64::from(self.quantity))
    }

    fn is_line(&self, product_uuid: ProductUuid, bundle: Bundle, brand: &str, model: &str) -> bool {
        self.product_uuid == product_uuid
            && self.bundle == bundle
            && self.brand == brand
            && self.model == model
    }
}

/// Request to add a product to the cart.
#[derive(Debug, Clone)]
pub struct NewCartItem {
    /// Uuid for the line if a new one is created.
    pub uuid: CartItemUuid,
    pub product_uuid: ProductUuid,
    pub bundle: Bundle,
    pub brand: String,
    pub model: String,
    pub quantity: i64,
}

/// Partial update of an existing cart line.
#[derive(Debug, Clone, Default)]
pub struct CartItemUpdate {
    /// New quantity; `<= 0` removes the line.
    pub quantity: Option<i64>,
    pub brand: Option<String>,
    pub model: Option<String>,
}

/// Item-level effect of a mutation, used to persist it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartChange {
    /// A new line was appended.
    Inserted(CartItem),

    /// An existing line changed.
    Updated(CartItem),

    /// A line was removed.
    Removed(CartItemUuid),

    /// An updated line collided with another and was folded into it.
    Merged {
        /// The surviving line
        kept: CartItem,

        /// The line that was folded away
        removed: CartItemUuid,
    },

    /// Every line was removed and the promo reset.
    Cleared,
}

/// A customer's cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    uuid: CartUuid,
    user_uuid: UserUuid,
    items: Vec<CartItem>,
    applied_promo: Option<AppliedPromo>,
    total_amount: u64,
    final_amount: u64,
}

impl Cart {
    /// Assemble a cart, deriving its totals.
    #[must_use]
    pub fn new(
        uuid: CartUuid,
        user_uuid: UserUuid,
        items: Vec<CartItem>,
        applied_promo: Option<AppliedPromo>,
    ) -> Self {
        let mut cart = Self {
            uuid,
            user_uuid,
            items,
            applied_promo,
            total_amount: 0,
            final_amount: 0,
        };

        cart.recompute();

        cart
    }

    pub fn uuid(&self) -> CartUuid {
        self.uuid
    }

    pub fn user_uuid(&self) -> UserUuid {
        self.user_uuid
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn applied_promo(&self) -> Option<&AppliedPromo> {
        self.applied_promo.as_ref()
    }

    /// `Σ(unit_price × quantity)`
    pub fn total_amount(&self) -> u64 {
        self.total_amount
    }

    /// Total after the applied promo, if any.
    pub fn final_amount(&self) -> u64 {
        self.final_amount
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a product, incrementing a matching line if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ProductNotFound`] if the catalog has no such
    /// product and [`CartError::ProductUnavailable`] if it is inactive.
    pub fn add_item(
        &mut self,
        item: NewCartItem,
        catalog: &impl Catalog,
    ) -> Result<CartChange, CartError> {
        let product = catalog
            .product(item.product_uuid)
            .ok_or(CartError::ProductNotFound(item.product_uuid))?;

        if !product.is_active {
            return Err(CartError::ProductUnavailable {
                product: product.uuid,
                name: product.name.clone(),
            });
        }

        let unit_price = product.bundle_pricing.price_for(item.bundle);
        let quantity = clamp_quantity(item.quantity);

        let existing = self.items.iter_mut().find(|line| {
            line.is_line(item.product_uuid, item.bundle, &item.brand, &item.model)
        });

        let change = if let Some(line) = existing {
            line.quantity = clamp_quantity(i64::from(line.quantity) + i64::from(quantity));
            line.unit_price = unit_price;

            CartChange::Updated(line.clone())
        } else {
            let line = CartItem {
                uuid: item.uuid,
                product_uuid: item.product_uuid,
                quantity,
                bundle: item.bundle,
                brand: item.brand,
                model: item.model,
                unit_price,
            };

            self.items.push(line.clone());

            CartChange::Inserted(line)
        };

        self.recompute();

        Ok(change)
    }

    /// Change a line's quantity, brand or model.
    ///
    /// A line whose new brand and model match another line of the same
    /// product and bundle is merged into it, at the current tier price.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the cart has no such line and
    /// [`CartError::ProductNotFound`] if its product is not in `catalog`.
    pub fn update_item(
        &mut self,
        uuid: CartItemUuid,
        update: CartItemUpdate,
        catalog: &impl Catalog,
    ) -> Result<CartChange, CartError> {
        if update.quantity.is_some_and(|quantity| quantity <= 0) {
            return self.remove_item(uuid);
        }

        let line = self
            .items
            .iter_mut()
            .find(|line| line.uuid == uuid)
            .ok_or(CartError::ItemNotFound(uuid))?;

        let current_price = catalog
            .product(line.product_uuid)
            .ok_or(CartError::ProductNotFound(line.product_uuid))?
            .bundle_pricing
            .price_for(line.bundle);

        if let Some(quantity) = update.quantity {
            line.quantity = clamp_quantity(quantity);
        }

        if let Some(brand) = update.brand {
            line.brand = brand;
        }

        if let Some(model) = update.model {
            line.model = model;
        }

        let updated = line.clone();

        let colliding = self
            .items
            .iter()
            .find(|other| {
                other.uuid != uuid
                    && other.is_line(
                        updated.product_uuid,
                        updated.bundle,
                        &updated.brand,
                        &updated.model,
                    )
            })
            .map(|other| other.uuid);

        let change = match colliding {
            Some(kept_uuid) => {
                self.items.retain(|line| line.uuid != uuid);

                let kept = self
                    .items
                    .iter_mut()
                    .find(|line| line.uuid == kept_uuid)
                    .ok_or(CartError::ItemNotFound(kept_uuid))?;

                kept.quantity =
                    clamp_quantity(i64::from(kept.quantity) + i64::from(updated.quantity));
                kept.unit_price = current_price;

                CartChange::Merged {
                    kept: kept.clone(),
                    removed: uuid,
                }
            }
            None => CartChange::Updated(updated),
        };

        self.recompute();

        Ok(change)
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the cart has no such line.
    pub fn remove_item(&mut self, uuid: CartItemUuid) -> Result<CartChange, CartError> {
        let before = self.items.len();

        self.items.retain(|line| line.uuid != uuid);

        if self.items.len() == before {
            return Err(CartError::ItemNotFound(uuid));
        }

        self.recompute();

        Ok(CartChange::Removed(uuid))
    }

    /// Empty the cart and reset its promo.
    pub fn clear(&mut self) -> CartChange {
        self.items.clear();
        self.applied_promo = None;

        self.recompute();

        CartChange::Cleared
    }

    /// Apply a promo code, replacing any already applied.
    ///
    /// # Errors
    ///
    /// Returns [`PromoError::InvalidCode`] and leaves the cart unchanged if
    /// the code is unknown.
    pub fn apply_promo(
        &mut self,
        registry: &PromoRegistry,
        code: &str,
    ) -> Result<&AppliedPromo, PromoError> {
        let promo = registry.lookup(code)?;

        self.applied_promo = Some(promo);
        self.recompute();

        self.applied_promo.as_ref().ok_or(PromoError::InvalidCode)
    }

    /// Remove the applied promo, returning it if there was one.
    pub fn remove_promo(&mut self) -> Option<AppliedPromo> {
        let removed = self.applied_promo.take();

        self.recompute();

        removed
    }

    /// Drop lines whose product is missing or inactive.
    ///
    /// Returns the uuids of the dropped lines.
    pub fn prune_inactive(&mut self, catalog: &impl Catalog) -> Vec<CartItemUuid> {
        let (kept, pruned): (Vec<_>, Vec<_>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|line| catalog.is_available(line.product_uuid));

        self.items = kept;
        self.recompute();

        pruned.into_iter().map(|line| line.uuid).collect()
    }

    /// A copy of the cart without lines for inactive products.
    #[must_use]
    pub fn view(&self, catalog: &impl Catalog) -> Self {
        let mut view = self.clone();

        view.prune_inactive(catalog);

        view
    }

    fn recompute(&mut self) {
        self.total_amount = self
            .items
            .iter()
            .map(CartItem::line_total)
            .fold(0, u64::saturating_add);

        self.final_amount = self
            .applied_promo
            .as_ref()
            .map_or(self.total_amount, |promo| promo.apply(self.total_amount));
    }
}
