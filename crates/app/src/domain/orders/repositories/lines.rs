//! Order Lines Repository

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::{
    domain::{
        books::records::BookUuid,
        orders::{
            checkout::ReservedLine,
            records::{OrderLineRecord, OrderLineUuid, OrderRecord, OrderUuid},
        },
    },
    uuids::raw_uuids,
};

const CREATE_ORDER_LINES_SQL: &str = include_str!("../sql/create_order_lines.sql");
const LIST_ORDER_LINES_SQL: &str = include_str!("../sql/list_order_lines.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrderLinesRepository;

impl PgOrderLinesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert every line of `order` in one statement, keeping their given order.
    #[tracing::instrument(
        name = "orders.repository.create_order_lines",
        skip(self, tx, lines),
        fields(order_uuid = %order, line_count = lines.len()),
        err
    )]
    pub(crate) async fn create_order_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        lines: &[ReservedLine],
    ) -> Result<Vec<OrderLineRecord>, sqlx::Error> {
        let mut uuids: Vec<Uuid> = Vec::with_capacity(lines.len());
        let mut book_uuids: Vec<Uuid> = Vec::with_capacity(lines.len());
        let mut titles: Vec<&str> = Vec::with_capacity(lines.len());
        let mut quantities: Vec<i32> = Vec::with_capacity(lines.len());
        let mut unit_prices: Vec<Decimal> = Vec::with_capacity(lines.len());
        let mut positions: Vec<i32> = Vec::with_capacity(lines.len());

        for (position, line) in lines.iter().enumerate() {
            uuids.push(OrderLineUuid::new().into_uuid());
            book_uuids.push(line.book_uuid.into_uuid());
            titles.push(&line.title);
            quantities.push(to_int(line.quantity)?);
            unit_prices.push(line.unit_price);
            positions.push(to_int(position)?);
        }

        let rows: Vec<PositionedLine> = query_as(CREATE_ORDER_LINES_SQL)
            .bind(order.into_uuid())
            .bind(&uuids)
            .bind(&book_uuids)
            .bind(&titles)
            .bind(&quantities)
            .bind(&unit_prices)
            .bind(&positions)
            .fetch_all(&mut **tx)
            .await?;

        let mut created: Vec<(i32, OrderLineRecord)> = rows
            .into_iter()
            .map(|row| (row.position, row.line))
            .collect();

        created.sort_by_key(|(position, _)| *position);

        Ok(created.into_iter().map(|(_, line)| line).collect())
    }

    /// Load the lines of every order in `orders` into place.
    pub(crate) async fn attach_order_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &mut [OrderRecord],
    ) -> Result<(), sqlx::Error> {
        if orders.is_empty() {
            return Ok(());
        }

        let order_uuids: Vec<OrderUuid> = orders.iter().map(|order| order.uuid).collect();

        let rows: Vec<PositionedLine> = query_as(LIST_ORDER_LINES_SQL)
            .bind(raw_uuids(&order_uuids))
            .fetch_all(&mut **tx)
            .await?;

        let mut by_order: FxHashMap<OrderUuid, Vec<OrderLineRecord>> = FxHashMap::default();

        for row in rows {
            by_order.entry(row.line.order_uuid).or_default().push(row.line);
        }

        for order in orders {
            order.lines = by_order.remove(&order.uuid).unwrap_or_default();
        }

        Ok(())
    }
}

fn to_int<T>(value: T) -> Result<i32, sqlx::Error>
where
    i32: TryFrom<T, Error = std::num::TryFromIntError>,
{
    i32::try_from(value).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

/// An order line with its position, as stored.
struct PositionedLine {
    position: i32,
    line: OrderLineRecord,
}

impl<'r> FromRow<'r, PgRow> for PositionedLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity: i32 = row.try_get("quantity")?;

        let quantity = u32::try_from(quantity).map_err(|e| sqlx::Error::ColumnDecode {
            index: "quantity".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            position: row.try_get("position")?,
            line: OrderLineRecord {
                uuid: OrderLineUuid::from_uuid(row.try_get("uuid")?),
                order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
                book_uuid: BookUuid::from_uuid(row.try_get("book_uuid")?),
                title: row.try_get("title")?,
                quantity,
                unit_price: row.try_get("unit_price")?,
            },
        })
    }
}
