//! Test Helpers

use storefront::{
    bundles::Bundle,
    carts::{CartItemUuid, NewCartItem},
    catalog::ProductUuid,
    orders::{NewOrder, PaymentMethod, ShippingAddress},
};

use crate::{
    domain::{
        carts::{CartsService, CartsServiceError, records::CartRecord},
        products::{
            ProductsService, ProductsServiceError, data::NewProduct, records::ProductRecord,
        },
    },
    test::TestContext,
};

pub(crate) async fn create_product(
    ctx: &TestContext,
    name: &str,
    base_price: u64,
) -> Result<ProductRecord, ProductsServiceError> {
    ctx.products
        .create_product(NewProduct {
            uuid: ProductUuid::new(),
            name: name.to_string(),
            image: None,
            base_price,
        })
        .await
}

/// Add an iPhone 15 case line to the default user's cart.
pub(crate) async fn add_item(
    ctx: &TestContext,
    product: ProductUuid,
    bundle: Bundle,
    quantity: i64,
) -> Result<CartRecord, CartsServiceError> {
    ctx.carts
        .add_item(
            ctx.user_uuid,
            NewCartItem {
                uuid: CartItemUuid::new(),
                product_uuid: product,
                bundle,
                brand: "Apple".to_string(),
                model: "iPhone 15".to_string(),
                quantity,
            },
        )
        .await
}

pub(crate) fn checkout(payment_method: PaymentMethod) -> NewOrder {
    NewOrder {
        shipping_address: ShippingAddress {
            full_name: "Asha Rao".to_string(),
            phone: "9876543210".to_string(),
            line1: "12 MG Road".to_string(),
            line2: None,
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            postal_code: "560001".to_string(),
            country: "India".to_string(),
        },
        payment_method,
    }
}
