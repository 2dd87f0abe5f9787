//! Get Order Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront::orders::{OrderItemSnapshot, OrderNumber, ShippingAddress};
use storefront_app::domain::orders::records::{OrderRecord, PaymentInfo};

use crate::{
    carts::get::AppliedPromoResponse, extensions::*, orders::errors::into_status_error,
    state::State,
};

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    /// The unique identifier of the order
    pub uuid: Uuid,

    /// Customer facing order number, `ORD` followed by 14 characters
    pub order_number: String,

    /// Lines copied from the cart at checkout
    pub items: Vec<OrderItemResponse>,
    pub shipping_address: ShippingAddressPayload,

    /// `pending`, `confirmed`, `processing`, `shipped`, `out_for_delivery`,
    /// `delivered`, `cancelled` or `refunded`
    pub order_status: String,
    pub payment: PaymentResponse,
    pub promo: Option<AppliedPromoResponse>,

    /// Sum of line totals in whole rupees
    pub subtotal: u64,
    pub discount: u64,
    pub shipping_fee: u64,

    /// `subtotal - discount + shipping_fee`
    pub total_amount: u64,
    pub tracking_number: Option<String>,

    /// The date and time the order was placed
    pub created_at: String,

    /// The date and time the order was last updated
    pub updated_at: String,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        Self {
            uuid: order.uuid.into_uuid(),
            order_number: order.order_number.to_string(),
            items: order.items.iter().map(OrderItemResponse::from).collect(),
            shipping_address: order.shipping_address.into(),
            order_status: order.order_status.to_string(),
            payment: order.payment.into(),
            promo: order.promo.as_ref().map(AppliedPromoResponse::from),
            subtotal: order.subtotal,
            discount: order.discount,
            shipping_fee: order.shipping_fee,
            total_amount: order.total_amount,
            tracking_number: order.tracking_number,
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

/// Order Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderItemResponse {
    pub uuid: Uuid,
    pub product_uuid: Uuid,

    /// Product name at checkout
    pub name: String,
    pub image: Option<String>,
    pub bundle: String,
    pub brand: String,
    pub model: String,
    pub quantity: u32,
    pub unit_price: u64,
    pub line_total: u64,
}

impl From<&OrderItemSnapshot> for OrderItemResponse {
    fn from(item: &OrderItemSnapshot) -> Self {
        Self {
            uuid: item.uuid.into_uuid(),
            product_uuid: item.product_uuid.into_uuid(),
            name: item.name.clone(),
            image: item.image.clone(),
            bundle: item.bundle.to_string(),
            brand: item.brand.clone(),
            model: item.model.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total(),
        }
    }
}

/// Shipping Address
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct ShippingAddressPayload {
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl From<ShippingAddress> for ShippingAddressPayload {
    fn from(address: ShippingAddress) -> Self {
        Self {
            full_name: address.full_name,
            phone: address.phone,
            line1: address.line1,
            line2: address.line2,
            city: address.city,
            state: address.state,
            postal_code: address.postal_code,
            country: address.country,
        }
    }
}

impl From<ShippingAddressPayload> for ShippingAddress {
    fn from(payload: ShippingAddressPayload) -> Self {
        Self {
            full_name: payload.full_name,
            phone: payload.phone,
            line1: payload.line1,
            line2: payload.line2.filter(|line| !line.trim().is_empty()),
            city: payload.city,
            state: payload.state,
            postal_code: payload.postal_code,
            country: payload.country,
        }
    }
}

/// Payment Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentResponse {
    /// `phonepe` or `cod`
    pub method: String,

    /// `pending`, `completed`, `failed` or `refunded`
    pub status: String,
    pub transaction_id: Option<String>,
    pub paid_at: Option<String>,
}

impl From<PaymentInfo> for PaymentResponse {
    fn from(payment: PaymentInfo) -> Self {
        Self {
            method: payment.method.to_string(),
            status: payment.status.to_string(),
            transaction_id: payment.transaction_id.map(|id| id.to_string()),
            paid_at: payment.paid_at.map(|at| at.to_string()),
        }
    }
}

/// Get Order Handler
///
/// Orders of other users are reported as missing.
#[endpoint(
    tags("orders"),
    summary = "Get Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order found"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let order = state
        .app
        .orders
        .get_order(principal.user_uuid, OrderNumber::from(order.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}
