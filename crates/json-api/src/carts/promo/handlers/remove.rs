//! Remove Promo Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    carts::{errors::into_status_error, get::CartResponse},
    extensions::*,
    state::State,
};

/// Remove Promo Handler
///
/// Succeeds when no promo is applied.
#[endpoint(
    tags("cart"),
    summary = "Remove Promo Code",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Promo removed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let cart = state
        .app
        .carts
        .remove_promo(principal.user_uuid)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use storefront::catalog::ProductUuid;
    use storefront_app::domain::carts::MockCartsService;

    use crate::test_helpers::{TEST_USER_UUID, carts_service, make_cart, make_cart_item};

    use super::*;

    #[tokio::test]
    async fn test_remove_promo_restores_full_amount() -> TestResult {
        let cart = make_cart(vec![make_cart_item(ProductUuid::new(), 1)]);

        let mut repo = MockCartsService::new();

        repo.expect_remove_promo()
            .once()
            .withf(|user| *user == TEST_USER_UUID)
            .return_once(move |_| Ok(cart));

        repo.expect_apply_promo().never();

        let mut res = TestClient::delete("http://example.com/cart/promo")
            .send(&carts_service(
                repo,
                Router::with_path("cart/promo").delete(handler),
            ))
            .await;

        let body: CartResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.applied_promo.is_none(), "expected promo to be removed");
        assert_eq!(body.final_amount, body.total_amount);

        Ok(())
    }
}
