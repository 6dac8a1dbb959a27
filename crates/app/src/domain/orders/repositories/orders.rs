//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::domain::{
    coupons::records::CouponUuid,
    orders::{
        number::OrderNumber,
        records::{OrderRecord, OrderStatus, OrderUuid},
    },
    users::records::UserUuid,
};

const CREATE_ORDER_SQL: &str = include_str!("../sql/create_order.sql");
const LIST_USER_ORDERS_SQL: &str = include_str!("../sql/list_user_orders.sql");
const LIST_ALL_ORDERS_SQL: &str = include_str!("../sql/list_all_orders.sql");
const GET_USER_ORDER_BY_NUMBER_SQL: &str = include_str!("../sql/get_user_order_by_number.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("../sql/update_order_status.sql");

/// Order header as inserted at checkout.
#[derive(Debug, Clone)]
pub(crate) struct NewOrderRow<'a> {
    pub(crate) uuid: OrderUuid,
    pub(crate) user_uuid: UserUuid,
    pub(crate) coupon_uuid: Option<CouponUuid>,
    pub(crate) total: Decimal,
    pub(crate) shipping_address: &'a str,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert the order under `number`. Returns `None` when that number is already taken.
    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &NewOrderRow<'_>,
        number: &OrderNumber,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(number.as_str())
            .bind(order.user_uuid.into_uuid())
            .bind(OrderStatus::Pending.as_str())
            .bind(order.coupon_uuid.map(CouponUuid::into_uuid))
            .bind(order.total)
            .bind(order.shipping_address)
            .fetch_optional(&mut **tx)
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

    pub(crate) async fn list_all_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_ALL_ORDERS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_user_order_by_number(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        number: &OrderNumber,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_USER_ORDER_BY_NUMBER_SQL)
            .bind(user.into_uuid())
            .bind(number.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_order_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let number: String = row.try_get("number")?;

        let number = number.parse().map_err(|e| sqlx::Error::ColumnDecode {
            index: "number".to_string(),
            source: Box::new(e),
        })?;

        let status: String = row.try_get("status")?;

        let status = status.parse().map_err(|e| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            number,
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            status,
            coupon_uuid: row
                .try_get::<Option<Uuid>, _>("coupon_uuid")?
                .map(CouponUuid::from_uuid),
            total: row.try_get("total")?,
            shipping_address: row.try_get("shipping_address")?,
            lines: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
