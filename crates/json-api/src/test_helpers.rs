//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use storefront::{
    bundles::{Bundle, BundlePricing},
    carts::{Cart, CartItem, CartItemUuid, CartUuid},
    orders::{
        OrderItemSnapshot, OrderItemUuid, OrderNumber, OrderStatus, OrderUuid, PaymentMethod,
        PaymentStatus, ShippingAddress,
    },
    users::UserUuid,
};
use storefront_app::{
    auth::{MockAuthService, Principal, Role},
    context::AppContext,
    domain::{
        carts::{MockCartsService, records::CartRecord},
        orders::{
            MockOrdersService,
            records::{OrderRecord, PaymentInfo},
        },
        payments::MockPaymentsService,
        products::{
            MockProductsService,
            records::{ProductRecord, ProductUuid},
        },
    },
};
use uuid::Uuid;

use crate::{extensions::*, state::State};

pub(crate) const TEST_USER_UUID: UserUuid = UserUuid::from_uuid(Uuid::nil());
pub(crate) const TEST_ADMIN_UUID: UserUuid = UserUuid::from_uuid(Uuid::from_u128(1));

pub(crate) const TEST_CUSTOMER: Principal = Principal {
    user_uuid: TEST_USER_UUID,
    role: Role::Customer,
};

pub(crate) const TEST_ADMIN: Principal = Principal {
    user_uuid: TEST_ADMIN_UUID,
    role: Role::Admin,
};

/// Hoop that stands in for the auth middleware.
#[derive(Debug, Clone, Copy)]
pub(crate) struct InjectPrincipal(pub(crate) Principal);

#[salvo::handler]
impl InjectPrincipal {
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        depot.insert_principal(self.0);
        ctrl.call_next(req, depot, res).await;
    }
}

/// Mocks for every service; each panics if called without an expectation.
pub(crate) struct Mocks {
    pub(crate) products: MockProductsService,
    pub(crate) carts: MockCartsService,
    pub(crate) orders: MockOrdersService,
    pub(crate) payments: MockPaymentsService,
    pub(crate) auth: MockAuthService,
}

impl Default for Mocks {
    fn default() -> Self {
        Self {
            products: MockProductsService::new(),
            carts: MockCartsService::new(),
            orders: MockOrdersService::new(),
            payments: MockPaymentsService::new(),
            auth: MockAuthService::new(),
        }
    }
}

impl From<Mocks> for AppContext {
    fn from(mocks: Mocks) -> Self {
        Self {
            products: Arc::new(mocks.products),
            carts: Arc::new(mocks.carts),
            orders: Arc::new(mocks.orders),
            payments: Arc::new(mocks.payments),
            auth: Arc::new(mocks.auth),
        }
    }
}

pub(crate) fn state_with_auth(auth: MockAuthService) -> Arc<State> {
    State::from_app_context(
        Mocks {
            auth,
            ..Mocks::default()
        }
        .into(),
    )
}

/// Serve `route` with `mocks`, authenticated as `principal` when given.
pub(crate) fn service_with(mocks: Mocks, principal: Option<Principal>, route: Router) -> Service {
    let mut router = Router::new().hoop(inject(State::from_app_context(mocks.into())));

    if let Some(principal) = principal {
        router = router.hoop(InjectPrincipal(principal));
    }

    Service::new(router.push(route))
}

pub(crate) fn products_service(products: MockProductsService, route: Router) -> Service {
    service_with(
        Mocks {
            products,
            ..Mocks::default()
        },
        Some(TEST_ADMIN),
        route,
    )
}

pub(crate) fn carts_service(carts: MockCartsService, route: Router) -> Service {
    service_with(
        Mocks {
            carts,
            ..Mocks::default()
        },
        Some(TEST_CUSTOMER),
        route,
    )
}

pub(crate) fn orders_service(orders: MockOrdersService, route: Router) -> Service {
    service_with(
        Mocks {
            orders,
            ..Mocks::default()
        },
        Some(TEST_CUSTOMER),
        route,
    )
}

pub(crate) fn admin_orders_service(orders: MockOrdersService, route: Router) -> Service {
    service_with(
        Mocks {
            orders,
            ..Mocks::default()
        },
        Some(TEST_ADMIN),
        route,
    )
}

pub(crate) fn payments_service(payments: MockPaymentsService, route: Router) -> Service {
    service_with(
        Mocks {
            payments,
            ..Mocks::default()
        },
        Some(TEST_CUSTOMER),
        route,
    )
}

pub(crate) fn make_product(uuid: ProductUuid) -> ProductRecord {
    ProductRecord {
        uuid,
        name: "Tempered Glass".to_string(),
        image: Some("https://cdn.example.com/glass.png".to_string()),
        base_price: 149,
        bundle_pricing: BundlePricing::from_base_price(149),
        is_active: true,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
        deleted_at: None,
    }
}

pub(crate) fn make_cart_item(product_uuid: ProductUuid, quantity: u32) -> CartItem {
    CartItem {
        uuid: CartItemUuid::new(),
        product_uuid,
        quantity,
        bundle: Bundle::Double,
        brand: "Apple".to_string(),
        model: "iPhone 15".to_string(),
        unit_price: 283,
    }
}

pub(crate) fn make_cart(items: Vec<CartItem>) -> CartRecord {
    CartRecord {
        cart: Cart::new(CartUuid::new(), TEST_USER_UUID, items, None),
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Asha Rao".to_string(),
        phone: "9876543210".to_string(),
        line1: "12 MG Road".to_string(),
        line2: None,
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        postal_code: "560001".to_string(),
        country: "India".to_string(),
    }
}

pub(crate) fn make_order(order_number: &str, order_status: OrderStatus) -> OrderRecord {
    let product_uuid = ProductUuid::new();

    OrderRecord {
        uuid: OrderUuid::new(),
        order_number: OrderNumber::from(order_number.to_string()),
        user_uuid: TEST_USER_UUID,
        items: vec![OrderItemSnapshot {
            uuid: OrderItemUuid::new(),
            product_uuid,
            name: "Tempered Glass".to_string(),
            image: None,
            unit_price: 283,
            quantity: 2,
            bundle: Bundle::Double,
            brand: "Apple".to_string(),
            model: "iPhone 15".to_string(),
        }],
        shipping_address: make_address(),
        order_status,
        payment: PaymentInfo {
            method: PaymentMethod::PhonePe,
            status: PaymentStatus::Pending,
            transaction_id: None,
            paid_at: None,
        },
        promo: None,
        subtotal: 566,
        discount: 0,
        shipping_fee: 0,
        total_amount: 566,
        tracking_number: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}
