//! Products Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use storefront::{
    bundles::BundlePricing,
    catalog::{CatalogProduct, ProductIndex},
};
use uuid::Uuid;

use crate::{
    database::{amount_to_i64, try_get_amount},
    domain::products::{
        data::{NewProduct, ProductUpdate},
        records::{ProductRecord, ProductUuid},
    },
};

const LIST_PRODUCTS_SQL: &str = include_str!("sql/list_products.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const GET_PRODUCTS_SQL: &str = include_str!("sql/get_products.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("sql/update_product.sql");
const DEACTIVATE_PRODUCT_SQL: &str = include_str!("sql/deactivate_product.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(LIST_PRODUCTS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch products by uuid, holding a share lock until the transaction ends.
    pub(crate) async fn get_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        products: &[ProductUuid],
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        let uuids: Vec<Uuid> = products.iter().map(|uuid| uuid.into_uuid()).collect();

        query_as::<Postgres, ProductRecord>(GET_PRODUCTS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await
    }

    /// Load the given products into a catalog, share locked.
    pub(crate) async fn get_catalog(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        products: &[ProductUuid],
    ) -> Result<ProductIndex, sqlx::Error> {
        if products.is_empty() {
            return Ok(ProductIndex::default());
        }

        let records = self.get_products(tx, products).await?;

        Ok(records.into_iter().map(CatalogProduct::from).collect())
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: &NewProduct,
    ) -> Result<ProductRecord, sqlx::Error> {
        let pricing = BundlePricing::from_base_price(product.base_price);

        query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(&product.name)
            .bind(&product.image)
            .bind(amount_to_i64(product.base_price, "base_price")?)
            .bind(amount_to_i64(pricing.single, "single_price")?)
            .bind(amount_to_i64(pricing.double, "double_price")?)
            .bind(amount_to_i64(pricing.triple, "triple_price")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        update: &ProductUpdate,
    ) -> Result<ProductRecord, sqlx::Error> {
        let base_price = update
            .base_price
            .map(|price| amount_to_i64(price, "base_price"))
            .transpose()?;

        let (single, double, triple) = match update.base_price.map(BundlePricing::from_base_price) {
            Some(pricing) => (
                Some(amount_to_i64(pricing.single, "single_price")?),
                Some(amount_to_i64(pricing.double, "double_price")?),
                Some(amount_to_i64(pricing.triple, "triple_price")?),
            ),
            None => (None, None, None),
        };

        query_as::<Postgres, ProductRecord>(UPDATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(&update.name)
            .bind(&update.image)
            .bind(base_price)
            .bind(single)
            .bind(double)
            .bind(triple)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn deactivate_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DEACTIVATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            image: row.try_get("image")?,
            base_price: try_get_amount(row, "base_price")?,
            bundle_pricing: BundlePricing {
                single: try_get_amount(row, "single_price")?,
                double: try_get_amount(row, "double_price")?,
                triple: try_get_amount(row, "triple_price")?,
            },
            is_active: row.try_get("is_active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
