//! Carts Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use storefront::{
    carts::{Cart, CartUuid},
    promotions::AppliedPromo,
    users::UserUuid,
};
use uuid::Uuid;

use crate::database::{amount_to_i64, promo_binds, try_get_promo};

const ENSURE_CART_SQL: &str = include_str!("../sql/ensure_cart.sql");
const GET_CART_SQL: &str = include_str!("../sql/get_cart.sql");
const LOCK_CART_SQL: &str = include_str!("../sql/lock_cart.sql");
const UPDATE_CART_SQL: &str = include_str!("../sql/update_cart.sql");
const RESET_CART_SQL: &str = include_str!("../sql/reset_cart.sql");

/// Stored cart header, without its items.
#[derive(Debug, Clone)]
pub(crate) struct CartRow {
    pub(crate) uuid: CartUuid,
    pub(crate) user_uuid: UserUuid,
    pub(crate) promo: Option<AppliedPromo>,
    pub(crate) created_at: Timestamp,
    pub(crate) updated_at: Timestamp,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Create the user's cart unless one exists.
    pub(crate) async fn ensure_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<(), sqlx::Error> {
        query(ENSURE_CART_SQL)
            .bind(CartUuid::new().into_uuid())
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn get_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<CartRow, sqlx::Error> {
        query_as::<Postgres, CartRow>(GET_CART_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch the user's cart and hold its row lock until the transaction
    /// ends.
    pub(crate) async fn lock_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Option<CartRow>, sqlx::Error> {
        query_as::<Postgres, CartRow>(LOCK_CART_SQL)
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Persist the cart's promo and totals.
    pub(crate) async fn update_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: &Cart,
    ) -> Result<CartRow, sqlx::Error> {
        let (promo_code, promo_discount, promo_discount_type) = promo_binds(cart.applied_promo())?;

        query_as::<Postgres, CartRow>(UPDATE_CART_SQL)
            .bind(cart.uuid().into_uuid())
            .bind(promo_code)
            .bind(promo_discount)
            .bind(promo_discount_type)
            .bind(amount_to_i64(cart.total_amount(), "total_amount")?)
            .bind(amount_to_i64(cart.final_amount(), "final_amount")?)
            .fetch_one(&mut **tx)
            .await
    }

    /// Drop the promo and zero the totals of the user's cart, returning the
    /// cart uuid if the user has one.
    pub(crate) async fn reset_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Option<CartUuid>, sqlx::Error> {
        let uuid: Option<Uuid> = query_scalar(RESET_CART_SQL)
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        Ok(uuid.map(CartUuid::from_uuid))
    }
}

impl<'r> FromRow<'r, PgRow> for CartRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CartUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            promo: try_get_promo(row)?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
