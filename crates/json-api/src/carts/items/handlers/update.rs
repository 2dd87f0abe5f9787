//! Update Cart Item Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront::carts::CartItemUpdate;

use crate::{
    carts::{errors::into_status_error, get::CartResponse},
    extensions::*,
    state::State,
};

/// Update Cart Item Request
///
/// Omitted fields are left as they are.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateCartItemRequest {
    /// New quantity, clamped to 10; zero or less removes the line
    pub quantity: Option<i64>,
    pub brand: Option<String>,
    pub model: Option<String>,
}

impl From<UpdateCartItemRequest> for CartItemUpdate {
    fn from(request: UpdateCartItemRequest) -> Self {
        CartItemUpdate {
            quantity: request.quantity,
            brand: request.brand.map(|brand| brand.trim().to_string()),
            model: request.model.map(|model| model.trim().to_string()),
        }
    }
}

/// Update Cart Item Handler
///
/// A line that ends up matching another line is merged into it.
#[endpoint(
    tags("cart"),
    summary = "Update Cart Item",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Cart item updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart item not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    item: PathParam<Uuid>,
    json: JsonBody<UpdateCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let request = json.into_inner();

    let blank = |value: &Option<String>| value.as_deref().is_some_and(|v| v.trim().is_empty());

    if blank(&request.brand) || blank(&request.model) {
        return Err(StatusError::bad_request().brief("brand and model cannot be blank"));
    }

    let cart = state
        .app
        .carts
        .update_item(principal.user_uuid, item.into_inner().into(), request.into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use storefront::carts::{CartError, CartItemUuid};
    use storefront_app::domain::carts::{CartsServiceError, MockCartsService};

    use crate::test_helpers::{TEST_USER_UUID, carts_service, make_cart};

    use super::*;

    fn make_service(repo: MockCartsService) -> Service {
        carts_service(repo, Router::with_path("cart/items/{item}").put(handler))
    }

    #[tokio::test]
    async fn test_update_forwards_partial_changes() -> TestResult {
        let item = CartItemUuid::new();

        let mut repo = MockCartsService::new();

        repo.expect_update_item()
            .once()
            .withf(move |user, i, update| {
                *user == TEST_USER_UUID
                    && *i == item
                    && update.quantity == Some(0)
                    && update.brand.is_none()
                    && update.model.as_deref() == Some("iPhone 15 Pro")
            })
            .return_once(|_, _, _| Ok(make_cart(vec![])));

        repo.expect_add_item().never();
        repo.expect_remove_item().never();

        let mut res = TestClient::put(format!("http://example.com/cart/items/{item}"))
            .json(&json!({ "quantity": 0, "model": "iPhone 15 Pro " }))
            .send(&make_service(repo))
            .await;

        let body: CartResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.items.is_empty(), "zero quantity removes the line");

        Ok(())
    }

    #[tokio::test]
    async fn test_update_unknown_item_returns_404() -> TestResult {
        let item = CartItemUuid::new();

        let mut repo = MockCartsService::new();

        repo.expect_update_item()
            .once()
            .return_once(move |_, _, _| Err(CartsServiceError::Cart(CartError::ItemNotFound(item))));

        let res = TestClient::put(format!("http://example.com/cart/items/{item}"))
            .json(&json!({ "quantity": 2 }))
            .send(&make_service(repo))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_blank_brand_returns_400() -> TestResult {
        let mut repo = MockCartsService::new();

        repo.expect_update_item().never();

        let res = TestClient::put(format!("http://example.com/cart/items/{}", Uuid::now_v7()))
            .json(&json!({ "brand": "" }))
            .send(&make_service(repo))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
