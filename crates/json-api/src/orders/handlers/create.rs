//! Create Order Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use storefront::orders::{NewOrder, PaymentMethod};

use crate::{
    extensions::*,
    observability,
    orders::{
        errors::into_status_error,
        get::{OrderResponse, ShippingAddressPayload},
    },
    state::State,
};

/// Create Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateOrderRequest {
    pub shipping_address: ShippingAddressPayload,

    /// `phonepe` or `cod`
    pub payment_method: String,
}

impl CreateOrderRequest {
    fn into_new_order(self) -> Result<NewOrder, StatusError> {
        let payment_method = self
            .payment_method
            .parse::<PaymentMethod>()
            .or_400("payment_method must be `phonepe` or `cod`")?;

        Ok(NewOrder {
            shipping_address: self.shipping_address.into(),
            payment_method,
        })
    }
}

/// Create Order Handler
///
/// Checks out the caller's cart into a pending order.
#[endpoint(
    tags("orders"),
    summary = "Create Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Empty cart or invalid address"),
        (status_code = StatusCode::CONFLICT, description = "A product is no longer available"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let new_order = json.into_inner().into_new_order()?;

    let order = state
        .app
        .orders
        .create_order(principal.user_uuid, new_order)
        .await
        .map_err(into_status_error)?;

    info!(
        order_number = %order.order_number,
        user_uuid = %principal.user_uuid,
        total_amount = order.total_amount,
        "created order"
    );

    observability::record_order_created(order.payment.method.as_str());

    res.add_header(LOCATION, format!("/orders/{}", order.order_number), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(order.into()))
}
