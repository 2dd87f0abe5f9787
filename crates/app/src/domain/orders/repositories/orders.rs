//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{
    FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json,
};
use storefront::{
    orders::{
        OrderDraft, OrderNumber, OrderStatus, OrderUuid, PaymentMethod, PaymentStatus,
        ShippingAddress, TransactionId,
    },
    users::UserUuid,
};

use crate::{
    database::{amount_to_i64, promo_binds, try_get_amount, try_get_parsed, try_get_promo},
    domain::orders::records::{OrderRecord, PaymentInfo},
};

const CREATE_ORDER_SQL: &str = include_str!("../sql/create_order.sql");
const GET_ORDER_SQL: &str = include_str!("../sql/get_order.sql");
const GET_USER_ORDER_SQL: &str = include_str!("../sql/get_user_order.sql");
const LIST_USER_ORDERS_SQL: &str = include_str!("../sql/list_user_orders.sql");
const GET_ORDER_BY_TRANSACTION_SQL: &str = include_str!("../sql/get_order_by_transaction.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("../sql/update_order_status.sql");
const ASSIGN_TRANSACTION_SQL: &str = include_str!("../sql/assign_transaction.sql");
const COMPLETE_PAYMENT_SQL: &str = include_str!("../sql/complete_payment.sql");
const FAIL_PAYMENT_SQL: &str = include_str!("../sql/fail_payment.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &OrderDraft,
    ) -> Result<OrderRecord, sqlx::Error> {
        let (promo_code, promo_discount, promo_discount_type) = promo_binds(order.promo.as_ref())?;

        query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.order_number.as_str())
            .bind(order.user_uuid.into_uuid())
            .bind(Json(&order.shipping_address))
            .bind(order.payment_method.as_str())
            .bind(promo_code)
            .bind(promo_discount)
            .bind(promo_discount_type)
            .bind(amount_to_i64(order.subtotal, "subtotal")?)
            .bind(amount_to_i64(order.discount, "discount")?)
            .bind(amount_to_i64(order.shipping_fee, "shipping_fee")?)
            .bind(amount_to_i64(order.total_amount, "total_amount")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &OrderNumber,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_user_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        order: &OrderNumber,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_USER_ORDER_SQL)
            .bind(user.into_uuid())
            .bind(order.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_user_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_USER_ORDERS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_order_by_transaction(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        transaction: &TransactionId,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_BY_TRANSACTION_SQL)
            .bind(transaction.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    /// Move an order from `expected` to `next`, and its payment from
    /// `expected_payment` to `payment_status`.
    ///
    /// Returns `None` if either status has moved on since it was read.
    #[expect(clippy::too_many_arguments, reason = "both prior states guard the update")]
    pub(crate) async fn update_order_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        expected: OrderStatus,
        expected_payment: PaymentStatus,
        next: OrderStatus,
        payment_status: PaymentStatus,
        tracking_number: Option<&str>,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(expected.as_str())
            .bind(next.as_str())
            .bind(payment_status.as_str())
            .bind(tracking_number)
            .bind(expected_payment.as_str())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Make `transaction` the current gateway transaction of a pending
    /// online order.
    ///
    /// Earlier transactions stay mapped to the order so their outcomes
    /// still reconcile.
    pub(crate) async fn assign_transaction(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        transaction: &TransactionId,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(ASSIGN_TRANSACTION_SQL)
            .bind(order.into_uuid())
            .bind(transaction.as_str())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Mark a pending payment completed and confirm a pending order.
    ///
    /// Any transaction issued for the order may complete it; the completing
    /// one becomes the order's transaction.
    ///
    /// Returns `None` if the payment had already left `pending`.
    pub(crate) async fn complete_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        transaction: &TransactionId,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(COMPLETE_PAYMENT_SQL)
            .bind(transaction.as_str())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Mark a pending payment failed and cancel the order if it still can
    /// be.
    ///
    /// Only the order's current transaction can fail it. Returns `None` if
    /// the payment had already left `pending` or `transaction` has been
    /// superseded.
    pub(crate) async fn fail_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        transaction: &TransactionId,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(FAIL_PAYMENT_SQL)
            .bind(transaction.as_str())
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let order_number: String = row.try_get("order_number")?;
        let transaction_id: Option<String> = row.try_get("payment_transaction_id")?;
        let shipping_address: Json<ShippingAddress> = row.try_get("shipping_address")?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            order_number: OrderNumber::from(order_number),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            items: Vec::new(),
            shipping_address: shipping_address.0,
            order_status: try_get_parsed::<OrderStatus>(row, "order_status")?,
            payment: PaymentInfo {
                method: try_get_parsed::<PaymentMethod>(row, "payment_method")?,
                status: try_get_parsed::<PaymentStatus>(row, "payment_status")?,
                transaction_id: transaction_id.map(TransactionId::from),
                paid_at: row
                    .try_get::<Option<SqlxTimestamp>, _>("paid_at")?
                    .map(SqlxTimestamp::to_jiff),
            },
            promo: try_get_promo(row)?,
            subtotal: try_get_amount(row, "subtotal")?,
            discount: try_get_amount(row, "discount")?,
            shipping_fee: try_get_amount(row, "shipping_fee")?,
            total_amount: try_get_amount(row, "total_amount")?,
            tracking_number: row.try_get("tracking_number")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
