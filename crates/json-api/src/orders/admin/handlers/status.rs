//! Update Order Status Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::{Span, info};

use storefront::orders::{OrderNumber, OrderStatus};
use storefront_app::domain::orders::data::StatusUpdate;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, get::OrderResponse},
    state::State,
};

/// Update Order Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateOrderStatusRequest {
    /// Target status
    pub status: String,

    /// Carrier tracking number, usually sent with `shipped`
    pub tracking_number: Option<String>,
}

impl UpdateOrderStatusRequest {
    fn into_status_update(self) -> Result<StatusUpdate, StatusError> {
        let status = self
            .status
            .parse::<OrderStatus>()
            .or_400("status is not a known order status")?;

        Ok(StatusUpdate {
            status,
            tracking_number: self
                .tracking_number
                .map(|tracking| tracking.trim().to_string())
                .filter(|tracking| !tracking.is_empty()),
        })
    }
}

/// Update Order Status Handler
///
/// Moves an order along the status graph.
#[endpoint(
    tags("admin"),
    summary = "Update Order Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order status updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown status"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Transition not allowed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.update_status",
    skip(order, json, depot),
    fields(order_number = tracing::field::Empty, status = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    order: PathParam<String>,
    json: JsonBody<UpdateOrderStatusRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let admin = depot.admin_or_403()?;
    let update = json.into_inner().into_status_update()?;
    let status = update.status;
    let order_number = OrderNumber::from(order.into_inner());

    let span = Span::current();

    span.record("order_number", order_number.as_str());
    span.record("status", tracing::field::display(status));

    let order = state
        .app
        .orders
        .update_order_status(order_number, update)
        .await
        .map_err(into_status_error)?;

    info!(
        order_number = %order.order_number,
        admin_uuid = %admin.user_uuid,
        %status,
        "updated order status"
    );

    Ok(Json(order.into()))
}
