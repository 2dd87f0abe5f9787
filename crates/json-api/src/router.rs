//! App Router

use salvo::Router;

use crate::{auth, carts, healthcheck, observability::metrics_handler, orders, payments, products};

/// Public routes plus the bearer-authenticated API.
pub fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(metrics_handler))
        .push(
            Router::with_path("products")
                .get(products::index::handler)
                .push(Router::with_path("{product}").get(products::get::handler)),
        )
        .push(Router::with_path("payments/callback").post(payments::callback::handler))
        .push(authenticated_router())
}

fn authenticated_router() -> Router {
    Router::new()
        .hoop(auth::middleware::handler)
        .push(
            Router::with_path("products")
                .post(products::create::handler)
                .push(
                    Router::with_path("{product}")
                        .put(products::update::handler)
                        .delete(products::delete::handler),
                ),
        )
        .push(
            Router::with_path("cart")
                .get(carts::get::handler)
                .delete(carts::clear::handler)
                .push(Router::with_path("prune").post(carts::prune::handler))
                .push(
                    Router::with_path("items")
                        .post(carts::items::create::handler)
                        .push(
                            Router::with_path("{item}")
                                .put(carts::items::update::handler)
                                .delete(carts::items::delete::handler),
                        ),
                )
                .push(
                    Router::with_path("promo")
                        .post(carts::promo::apply::handler)
                        .delete(carts::promo::remove::handler),
                ),
        )
        .push(
            Router::with_path("orders")
                .get(orders::index::handler)
                .post(orders::create::handler)
                .push(
                    Router::with_path("{order}")
                        .get(orders::get::handler)
                        .push(Router::with_path("cancel").post(orders::cancel::handler))
                        .push(Router::with_path("payments").post(payments::initiate::handler)),
                ),
        )
        .push(Router::with_path("payments/{transaction}").get(payments::status::handler))
        .push(
            Router::with_path("admin/orders/{order}")
                .get(orders::admin::get::handler)
                .push(Router::with_path("status").put(orders::admin::status::handler)),
        )
}

#[cfg(test)]
mod tests {
    use salvo::{
        affix_state::inject,
        oapi::OpenApi,
        prelude::*,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use storefront_app::domain::products::{MockProductsService, records::ProductUuid};

    use crate::{
        state::State,
        test_helpers::{Mocks, make_product},
    };

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(State::from_app_context(mocks.into())))
                .push(app_router()),
        )
    }

    #[tokio::test]
    async fn test_catalog_is_public() -> TestResult {
        let mut products = MockProductsService::new();

        products
            .expect_list_products()
            .once()
            .return_once(|| Ok(vec![make_product(ProductUuid::new())]));

        let mut res = TestClient::get("http://example.com/products")
            .send(&make_service(Mocks {
                products,
                ..Mocks::default()
            }))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body = res.take_string().await?;

        assert!(body.contains("Tempered Glass"), "expected product in {body}");

        Ok(())
    }

    #[tokio::test]
    async fn test_cart_requires_bearer_token() -> TestResult {
        let res = TestClient::get("http://example.com/cart")
            .send(&make_service(Mocks::default()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_creating_products_requires_bearer_token() -> TestResult {
        let res = TestClient::post("http://example.com/products")
            .send(&make_service(Mocks::default()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[test]
    fn test_openapi_documents_amounts_in_whole_rupees() -> TestResult {
        let json = OpenApi::new("Storefront API", "test")
            .merge_router(&app_router())
            .to_json()?;

        for description in [
            "Unit price in whole rupees",
            "Sum of line totals in whole rupees",
            "Total after the promo discount in whole rupees",
        ] {
            assert!(json.contains(description), "expected {description:?}");
        }

        assert!(
            !json.contains("paise"),
            "minor units are a gateway detail, not part of the API"
        );

        Ok(())
    }
}
