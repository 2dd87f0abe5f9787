//! Order Items Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use storefront::{
    bundles::Bundle,
    catalog::ProductUuid,
    orders::{OrderItemSnapshot, OrderItemUuid, OrderUuid},
};
use uuid::Uuid;

use crate::database::{amount_to_i64, try_get_amount, try_get_parsed};

const CREATE_ORDER_ITEM_SQL: &str = include_str!("../sql/create_order_item.sql");
const GET_ORDER_ITEMS_SQL: &str = include_str!("../sql/get_order_items.sql");

/// Row wrapper carrying the owning order.
struct OrderItemRow {
    order_uuid: OrderUuid,
    item: OrderItemSnapshot,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrderItemsRepository;

impl PgOrderItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        items: &[OrderItemSnapshot],
    ) -> Result<(), sqlx::Error> {
        for (position, item) in items.iter().enumerate() {
            let position = i32::try_from(position).map_err(|e| sqlx::Error::ColumnDecode {
                index: "position".to_string(),
                source: Box::new(e),
            })?;

            let quantity = i32::try_from(item.quantity).map_err(|e| sqlx::Error::ColumnDecode {
                index: "quantity".to_string(),
                source: Box::new(e),
            })?;

            query(CREATE_ORDER_ITEM_SQL)
                .bind(item.uuid.into_uuid())
                .bind(order.into_uuid())
                .bind(position)
                .bind(item.product_uuid.into_uuid())
                .bind(&item.name)
                .bind(&item.image)
                .bind(amount_to_i64(item.unit_price, "unit_price")?)
                .bind(quantity)
                .bind(item.bundle.as_str())
                .bind(&item.brand)
                .bind(&item.model)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    /// Items of the given orders, in order then position order.
    pub(crate) async fn get_order_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &[OrderUuid],
    ) -> Result<Vec<(OrderUuid, OrderItemSnapshot)>, sqlx::Error> {
        let uuids: Vec<Uuid> = orders.iter().map(|uuid| uuid.into_uuid()).collect();

        let rows = query_as::<Postgres, OrderItemRow>(GET_ORDER_ITEMS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.order_uuid, row.item))
            .collect())
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity: i32 = row.try_get("quantity")?;

        Ok(Self {
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            item: OrderItemSnapshot {
                uuid: OrderItemUuid::from_uuid(row.try_get("uuid")?),
                product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
                name: row.try_get("name")?,
                image: row.try_get("image")?,
                unit_price: try_get_amount(row, "unit_price")?,
                quantity: u32::try_from(quantity).map_err(|e| sqlx::Error::ColumnDecode {
                    index: "quantity".to_string(),
                    source: Box::new(e),
                })?,
                bundle: try_get_parsed::<Bundle>(row, "bundle")?,
                brand: row.try_get("brand")?,
                model: row.try_get("model")?,
            },
        })
    }
}
