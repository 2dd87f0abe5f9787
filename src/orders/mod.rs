//! Orders
//!
//! Turning a cart into an immutable, priced order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    bundles::Bundle,
    carts::Cart,
    catalog::{Catalog, ProductUuid},
    promotions::AppliedPromo,
    users::UserUuid,
    uuids::TypedUuid,
};

pub mod numbers;
pub mod status;

pub use numbers::{OrderNumber, TransactionId};
pub use status::{OrderStatus, PaymentMethod, PaymentStatus, TransitionError, UnknownStatus};

/// Order Uuid
pub type OrderUuid = TypedUuid<OrderDraft>;

/// Order Item Uuid
pub type OrderItemUuid = TypedUuid<OrderItemSnapshot>;

/// Errors raised while materialising an order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// The cart has no items.
    #[error("cart is empty")]
    EmptyCart,

    /// A cart item's product is missing or inactive.
    #[error("{name} is no longer available")]
    ProductUnavailable {
        /// Product uuid
        product: ProductUuid,

        /// Product name, for customer facing messages
        name: String,
    },

    /// A required shipping address field is blank.
    #[error("shipping address {0} is required")]
    MissingAddressField(&'static str),
}

/// Delivery address captured on the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingAddress {
    /// Check that every required field has content.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::MissingAddressField`] naming the first blank
    /// field.
    pub fn validate(&self) -> Result<(), OrderError> {
        let required = [
            ("full_name", &self.full_name),
            ("phone", &self.phone),
            ("line1", &self.line1),
            ("city", &self.city),
            ("state", &self.state),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ];

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(OrderError::MissingAddressField(*field)),
            None => Ok(()),
        }
    }
}

/// Customer choices made at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
}

/// Denormalised copy of a cart line at order time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemSnapshot {
    pub uuid: OrderItemUuid,
    pub product_uuid: ProductUuid,
    pub name: String,
    pub image: Option<String>,
    pub unit_price: u64,
    pub quantity: u32,
    pub bundle: Bundle,
    pub brand: String,
    pub model: String,
}

impl OrderItemSnapshot {
    /// `unit_price × quantity`
    #[must_use]
    pub fn line_total(&self) -> u64 {
        self.unit_price.saturating_mul(u64::from(self.quantity))
    }
}

/// A fully priced order, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub uuid: OrderUuid,
    pub order_number: OrderNumber,
    pub user_uuid: UserUuid,
    pub items: Vec<OrderItemSnapshot>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub promo: Option<AppliedPromo>,

    /// Sum of line totals before any promo.
    pub subtotal: u64,

    /// Amount taken off by the promo.
    pub discount: u64,
    pub shipping_fee: u64,

    /// Amount charged: discounted subtotal plus shipping.
    pub total_amount: u64,
}

/// Snapshot a cart into an order.
///
/// The cart itself is left untouched.
///
/// # Errors
///
/// - [`OrderError::EmptyCart`] if the cart has no items.
/// - [`OrderError::ProductUnavailable`] for the first item whose product is
///   missing or inactive.
/// - [`OrderError::MissingAddressField`] if the shipping address is
///   incomplete.
pub fn materialize(
    cart: &Cart,
    catalog: &impl Catalog,
    order: NewOrder,
    shipping_fee: u64,
    order_number: OrderNumber,
) -> Result<OrderDraft, OrderError> {
    if cart.is_empty() {
        return Err(OrderError::EmptyCart);
    }

    order.shipping_address.validate()?;

    let items = cart
        .items()
        .iter()
        .map(|line| {
            let product = catalog
                .product(line.product_uuid)
                .ok_or_else(|| OrderError::ProductUnavailable {
                    product: line.product_uuid,
                    name: format!("Product {}", line.product_uuid),
                })?;

            if !product.is_active {
                return Err(OrderError::ProductUnavailable {
                    product: product.uuid,
                    name: product.name.clone(),
                });
            }

            Ok(OrderItemSnapshot {
                uuid: OrderItemUuid::new(),
                product_uuid: line.product_uuid,
                name: product.name.clone(),
                image: product.image.clone(),
                unit_price: line.unit_price,
                quantity: line.quantity,
                bundle: line.bundle,
                brand: line.brand.clone(),
                model: line.model.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let subtotal = items
        .iter()
        .map(OrderItemSnapshot::line_total)
        .fold(0, u64::saturating_add);

    let promo = cart.applied_promo().cloned();
    let discounted = promo
        .as_ref()
        .map_or(subtotal, |promo| promo.apply(subtotal));

    Ok(OrderDraft {
        uuid: OrderUuid::new(),
        order_number,
        user_uuid: cart.user_uuid(),
        items,
        shipping_address: order.shipping_address,
        payment_method: order.payment_method,
        promo,
        subtotal,
        discount: subtotal.saturating_sub(discounted),
        shipping_fee,
        total_amount: discounted.saturating_add(shipping_fee),
    })
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::{
        bundles::BundlePricing,
        carts::{CartItemUuid, CartUuid, NewCartItem},
        catalog::{CatalogProduct, ProductIndex},
        promotions::PromoRegistry,
    };

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Asha Rao".to_string(),
            phone: "9999999999".to_string(),
            line1: "12 MG Road".to_string(),
            line2: None,
            city: "Bengaluru".to_string(),
            state: "KA".to_string(),
            postal_code: "560001".to_string(),
            country: "IN".to_string(),
        }
    }

    fn checkout() -> NewOrder {
        NewOrder {
            shipping_address: address(),
            payment_method: PaymentMethod::PhonePe,
        }
    }

    fn product(name: &str, base_price: u64) -> CatalogProduct {
        CatalogProduct {
            uuid: ProductUuid::new(),
            name: name.to_string(),
            image: Some(format!("https://cdn.example.com/{name}.png")),
            is_active: true,
            bundle_pricing: BundlePricing::from_base_price(base_price),
        }
    }

    fn cart_with(products: &[(&CatalogProduct, i64)]) -> Result<(Cart, ProductIndex), crate::carts::CartError> {
        let catalog: ProductIndex = products.iter().map(|(p, _)| (*p).clone()).collect();
        let mut cart = Cart::new(CartUuid::new(), UserUuid::new(), Vec::new(), None);

        for (product, quantity) in products {
            cart.add_item(
                NewCartItem {
                    uuid: CartItemUuid::new(),
                    product_uuid: product.uuid,
                    bundle: Bundle::Single,
                    brand: "Apple".to_string(),
                    model: "iPhone 15".to_string(),
                    quantity: *quantity,
                },
                &catalog,
            )?;
        }

        Ok((cart, catalog))
    }

    fn number() -> OrderNumber {
        OrderNumber::from("ORD00000001ABCDEF".to_string())
    }

    #[test]
    fn empty_cart_cannot_be_ordered() {
        let cart = Cart::new(CartUuid::new(), UserUuid::new(), Vec::new(), None);

        let result = materialize(&cart, &ProductIndex::default(), checkout(), 0, number());

        assert_eq!(result, Err(OrderError::EmptyCart));
    }

    #[test]
    fn totals_apply_promo_then_shipping() -> TestResult {
        let case = product("Case", 149);
        let (mut cart, catalog) = cart_with(&[(&case, 2)])?;
        cart.apply_promo(&PromoRegistry::default(), "WELCOME10")?;

        let order = materialize(&cart, &catalog, checkout(), 40, number())?;

        assert_eq!(order.subtotal, 298);
        assert_eq!(order.discount, 30);
        assert_eq!(order.shipping_fee, 40);
        assert_eq!(order.total_amount, 308);
        assert_eq!(order.promo.map(|promo| promo.code), Some("WELCOME10".to_string()));

        Ok(())
    }

    #[test]
    fn items_are_snapshotted_with_product_details() -> TestResult {
        let case = product("Case", 149);
        let (cart, catalog) = cart_with(&[(&case, 2)])?;

        let order = materialize(&cart, &catalog, checkout(), 0, number())?;

        assert_eq!(order.items.len(), 1);
        let item = order.items.first().ok_or("Expected an order item")?;

        assert_eq!(item.name, "Case");
        assert_eq!(item.image, case.image);
        assert_eq!(item.unit_price, 149);
        assert_eq!(item.quantity, 2);
        assert_eq!(order.user_uuid, cart.user_uuid());

        Ok(())
    }

    #[test]
    fn inactive_product_names_the_product() -> TestResult {
        let case = product("Case", 149);
        let mut charger = product("Charger", 499);
        let (cart, _) = cart_with(&[(&case, 1), (&charger, 1)])?;

        charger.is_active = false;
        let catalog: ProductIndex = [case, charger.clone()].into_iter().collect();

        let result = materialize(&cart, &catalog, checkout(), 0, number());

        assert_eq!(
            result,
            Err(OrderError::ProductUnavailable {
                product: charger.uuid,
                name: "Charger".to_string(),
            })
        );
        assert_eq!(
            result.map_err(|error| error.to_string()),
            Err("Charger is no longer available".to_string())
        );

        Ok(())
    }

    #[test]
    fn blank_address_field_is_rejected() -> TestResult {
        let case = product("Case", 149);
        let (cart, catalog) = cart_with(&[(&case, 1)])?;

        let mut order = checkout();
        order.shipping_address.city = "  ".to_string();

        let result = materialize(&cart, &catalog, order, 0, number());

        assert_eq!(result, Err(OrderError::MissingAddressField("city")));

        Ok(())
    }
}
