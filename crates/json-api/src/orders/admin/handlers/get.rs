//! Admin Get Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};

use storefront::orders::OrderNumber;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, get::OrderResponse},
    state::State,
};

/// Admin Get Order Handler
///
/// Any user's order.
#[endpoint(
    tags("admin"),
    summary = "Get Any Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order found"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    depot.admin_or_403()?;

    let order = state
        .app
        .orders
        .get_order_for_admin(OrderNumber::from(order.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use storefront::orders::OrderStatus;
    use storefront_app::domain::orders::MockOrdersService;

    use crate::test_helpers::{admin_orders_service, make_order, orders_service};

    use super::*;

    const ORDER: &str = "ORD12345678ABCDEF";

    fn route() -> Router {
        Router::with_path("admin/orders/{order}").get(handler)
    }

    #[tokio::test]
    async fn test_admin_reads_any_order() -> TestResult {
        let mut repo = MockOrdersService::new();

        repo.expect_get_order_for_admin()
            .once()
            .withf(|order| order.as_str() == ORDER)
            .return_once(|_| Ok(make_order(ORDER, OrderStatus::Shipped)));

        repo.expect_get_order().never();

        let mut res = TestClient::get(format!("http://example.com/admin/orders/{ORDER}"))
            .send(&admin_orders_service(repo, route()))
            .await;

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.order_status, "shipped");

        Ok(())
    }

    #[tokio::test]
    async fn test_customer_is_forbidden() -> TestResult {
        let mut repo = MockOrdersService::new();

        repo.expect_get_order_for_admin().never();

        let res = TestClient::get(format!("http://example.com/admin/orders/{ORDER}"))
            .send(&orders_service(repo, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
