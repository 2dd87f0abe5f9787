//! End-to-end settlement flow over the pure rules: price a product, fill a
//! cart, apply a promo, materialise the order and reconcile its payment.

use jiff::Timestamp;
use testresult::TestResult;

use storefront::prelude::*;

fn product(name: &str, base_price: u64) -> CatalogProduct {
    CatalogProduct {
        uuid: ProductUuid::new(),
        name: name.to_string(),
        image: None,
        is_active: true,
        bundle_pricing: BundlePricing::from_base_price(base_price),
    }
}

fn add(product: &CatalogProduct, bundle: Bundle, quantity: i64) -> NewCartItem {
    NewCartItem {
        uuid: CartItemUuid::new(),
        product_uuid: product.uuid,
        bundle,
        brand: "OnePlus".to_string(),
        model: "12R".to_string(),
        quantity,
    }
}

fn checkout(payment_method: PaymentMethod) -> NewOrder {
    NewOrder {
        shipping_address: ShippingAddress {
            full_name: "Ravi Kumar".to_string(),
            phone: "9876543210".to_string(),
            line1: "4 Park Street".to_string(),
            line2: Some("Flat 2B".to_string()),
            city: "Kolkata".to_string(),
            state: "WB".to_string(),
            postal_code: "700016".to_string(),
            country: "IN".to_string(),
        },
        payment_method,
    }
}

fn order_number() -> OrderNumber {
    OrderNumber::generate(Timestamp::now(), &mut rand::thread_rng())
}

#[test]
fn bundle_tiers_are_derived_from_base_price() {
    let pricing = BundlePricing::from_base_price(149);

    assert_eq!(pricing.price_for(Bundle::Single), 149);
    assert_eq!(pricing.price_for(Bundle::Double), 283);
    assert_eq!(pricing.price_for(Bundle::Triple), 402);
}

#[test]
fn welcome_promo_discounts_two_singles() -> TestResult {
    let case = product("Silicone Case", 149);
    let catalog: ProductIndex = [case.clone()].into_iter().collect();
    let mut cart = Cart::new(CartUuid::new(), UserUuid::new(), Vec::new(), None);

    cart.add_item(add(&case, Bundle::Single, 2), &catalog)?;
    assert_eq!(cart.total_amount(), 298);

    cart.apply_promo(&PromoRegistry::default(), " welcome10 ")?;
    assert_eq!(cart.final_amount(), 268);

    Ok(())
}

#[test]
fn deactivated_product_blocks_order_creation() -> TestResult {
    let mut case = product("Silicone Case", 149);
    let glass = product("Tempered Glass", 99);
    let catalog: ProductIndex = [case.clone(), glass.clone()].into_iter().collect();
    let mut cart = Cart::new(CartUuid::new(), UserUuid::new(), Vec::new(), None);

    cart.add_item(add(&case, Bundle::Single, 1), &catalog)?;
    cart.add_item(add(&glass, Bundle::Double, 1), &catalog)?;
    let before = cart.clone();

    case.is_active = false;
    let catalog: ProductIndex = [case, glass].into_iter().collect();

    let result = materialize(
        &cart,
        &catalog,
        checkout(PaymentMethod::PhonePe),
        0,
        order_number(),
    );

    assert!(
        matches!(&result, Err(OrderError::ProductUnavailable { name, .. }) if name == "Silicone Case"),
        "expected the inactive product to be named, got {result:?}"
    );
    assert_eq!(cart, before, "a failed order must not touch the cart");

    Ok(())
}

#[test]
fn completed_payment_confirms_once() -> TestResult {
    let case = product("Silicone Case", 149);
    let catalog: ProductIndex = [case.clone()].into_iter().collect();
    let mut cart = Cart::new(CartUuid::new(), UserUuid::new(), Vec::new(), None);
    cart.add_item(add(&case, Bundle::Triple, 1), &catalog)?;

    let order = materialize(
        &cart,
        &catalog,
        checkout(PaymentMethod::PhonePe),
        0,
        order_number(),
    )?;
    assert_eq!(order.total_amount, 402);
    ensure_payable(OrderStatus::Pending, PaymentStatus::Pending, order.payment_method)?;

    let first = Reconciliation::decide(PaymentStatus::Pending, &GatewayState::Completed);
    let (order_status, payment_status) = first.target().ok_or("Expected a transition")?;
    assert_eq!(order_status, OrderStatus::Confirmed);
    assert_eq!(payment_status, PaymentStatus::Completed);

    cart.clear();
    assert!(cart.is_empty(), "cart is cleared on completion");

    let replay = Reconciliation::decide(payment_status, &GatewayState::Completed);
    assert_eq!(replay, Reconciliation::Unchanged, "replays must be no-ops");

    Ok(())
}

#[test]
fn confirmed_orders_cannot_be_paid_again() {
    let result = ensure_payable(
        OrderStatus::Confirmed,
        PaymentStatus::Completed,
        PaymentMethod::PhonePe,
    );

    assert_eq!(
        result,
        Err(PaymentError::OrderNotPending(OrderStatus::Confirmed))
    );
}

#[test]
fn order_prices_come_from_cart_snapshot_not_catalog() -> TestResult {
    let mut case = product("Silicone Case", 149);
    let mut cart = Cart::new(CartUuid::new(), UserUuid::new(), Vec::new(), None);
    cart.add_item(
        add(&case, Bundle::Single, 1),
        &[case.clone()].into_iter().collect::<ProductIndex>(),
    )?;

    case.bundle_pricing = BundlePricing::from_base_price(999);
    let repriced: ProductIndex = [case.clone()].into_iter().collect();

    let order = materialize(
        &cart,
        &repriced,
        checkout(PaymentMethod::CashOnDelivery),
        25,
        order_number(),
    )?;

    let item = order.items.first().ok_or("Expected an order item")?;
    assert_eq!(item.unit_price, 149);
    assert_eq!(order.subtotal, 149);
    assert_eq!(order.total_amount, 174);

    Ok(())
}
