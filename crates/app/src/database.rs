//! Database connection management

use std::{error::Error as StdError, str::FromStr};

use sqlx::{
    PgPool, Postgres, Row, Transaction,
    migrate::MigrateError,
    postgres::{PgPoolOptions, PgRow},
};
use storefront::promotions::{AppliedPromo, DiscountType};

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction fails.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Connect to `PostgreSQL` with a bounded pool.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Apply pending schema migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// Read a non-negative `BIGINT` amount column.
pub(crate) fn try_get_amount(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let amount_i64: i64 = row.try_get(col)?;

    u64::try_from(amount_i64).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Read an optional non-negative `BIGINT` amount column.
pub(crate) fn try_get_optional_amount(row: &PgRow, col: &str) -> Result<Option<u64>, sqlx::Error> {
    let amount_i64: Option<i64> = row.try_get(col)?;

    amount_i64
        .map(u64::try_from)
        .transpose()
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: col.to_string(),
            source: Box::new(e),
        })
}

/// Convert an amount for binding to a `BIGINT` column.
pub(crate) fn amount_to_i64(amount: u64, col: &str) -> Result<i64, sqlx::Error> {
    i64::try_from(amount).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Read a `TEXT` column holding an enum's storage name.
pub(crate) fn try_get_parsed<T>(row: &PgRow, col: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    let value: String = row.try_get(col)?;

    value.parse().map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Read the `promo_code`, `promo_discount` and `promo_discount_type` columns.
pub(crate) fn try_get_promo(row: &PgRow) -> Result<Option<AppliedPromo>, sqlx::Error> {
    let code: Option<String> = row.try_get("promo_code")?;
    let discount = try_get_optional_amount(row, "promo_discount")?;
    let discount_type: Option<String> = row.try_get("promo_discount_type")?;

    let (Some(code), Some(discount), Some(discount_type)) = (code, discount, discount_type) else {
        return Ok(None);
    };

    let discount_type =
        discount_type
            .parse::<DiscountType>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "promo_discount_type".to_string(),
                source: Box::new(e),
            })?;

    Ok(Some(AppliedPromo {
        code,
        discount,
        discount_type,
    }))
}

/// Promo columns ready for binding, in `code, discount, type` order.
pub(crate) fn promo_binds(
    promo: Option<&AppliedPromo>,
) -> Result<(Option<String>, Option<i64>, Option<&'static str>), sqlx::Error> {
    let Some(promo) = promo else {
        return Ok((None, None, None));
    };

    Ok((
        Some(promo.code.clone()),
        Some(amount_to_i64(promo.discount, "promo_discount")?),
        Some(promo.discount_type.as_str()),
    ))
}
