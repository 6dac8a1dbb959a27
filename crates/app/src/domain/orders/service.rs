//! Orders service.
//!
//! Checkout runs as one transaction: the cart is read, the books it holds are row-locked in
//! ascending UUID order, every line is checked against the locked stock, and only then are the
//! order, its lines, the stock decrements and the emptied cart written. Any failure drops the
//! transaction, so a rejected checkout leaves no trace. The confirmation message is sent after
//! commit and its failure is only logged.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};
use tracing::{Span, info, warn};

use crate::{
    database::Db,
    domain::{
        books::{records::BookUuid, repository::PgBooksRepository},
        carts::repositories::{PgCartItemsRepository, PgCartsRepository},
        coupons::{records::CouponUuid, repository::PgCouponsRepository},
        orders::{
            checkout::{
                CheckoutPreview, CheckoutReceipt, CheckoutStage, ReservedLine, order_total,
                reserve, resolve_coupon, round_to_cents,
            },
            data::PlaceOrder,
            errors::OrdersServiceError,
            number::OrderNumber,
            records::{OrderRecord, OrderStatus, OrderUuid},
            repositories::{NewOrderRow, PgOrderLinesRepository, PgOrdersRepository},
        },
        users::{records::UserUuid, repository::PgUsersRepository},
    },
    notifications::Notifier,
};

/// How many fresh order numbers to try before giving up.
const ORDER_NUMBER_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct PgOrdersService {
    db: Db,
    notifier: Arc<dyn Notifier>,
    orders: PgOrdersRepository,
    lines: PgOrderLinesRepository,
    carts: PgCartsRepository,
    items: PgCartItemsRepository,
    books: PgBooksRepository,
    coupons: PgCouponsRepository,
    users: PgUsersRepository,
}

impl Debug for PgOrdersService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PgOrdersService")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db,
            notifier,
            orders: PgOrdersRepository::new(),
            lines: PgOrderLinesRepository::new(),
            carts: PgCartsRepository::new(),
            items: PgCartItemsRepository::new(),
            books: PgBooksRepository::new(),
            coupons: PgCouponsRepository::new(),
            users: PgUsersRepository::new(),
        }
    }

    /// Insert the order under the first number from `next_number` that is not taken.
    async fn insert_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &NewOrderRow<'_>,
        mut next_number: impl FnMut() -> OrderNumber + Send,
    ) -> Result<OrderRecord, OrdersServiceError> {
        for attempt in 1..=ORDER_NUMBER_ATTEMPTS {
            let number = next_number();

            if let Some(created) = self.orders.create_order(tx, order, &number).await? {
                return Ok(created);
            }

            warn!(attempt, %number, "order number collision, retrying");
        }

        Err(OrdersServiceError::OrderNumberExhausted)
    }

    async fn take_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        lines: &[ReservedLine],
    ) -> Result<(), OrdersServiceError> {
        for line in lines {
            if !self
                .books
                .decrement_stock(tx, line.book_uuid, line.quantity)
                .await?
            {
                let available = self.books.get_book_stock(tx, line.book_uuid).await?.stock;

                return Err(OrdersServiceError::InsufficientStock {
                    book_uuid: line.book_uuid,
                    title: line.title.clone(),
                    requested: line.quantity,
                    available,
                });
            }
        }

        Ok(())
    }
}

fn record_stage(stage: CheckoutStage) {
    Span::current().record("stage", stage.as_str());
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.preview_checkout",
        skip(self, now),
        fields(user_uuid = %user, total = tracing::field::Empty),
        err
    )]
    async fn preview_checkout(
        &self,
        user: UserUuid,
        coupon: Option<CouponUuid>,
        now: Timestamp,
    ) -> Result<CheckoutPreview, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let mut cart = self.carts.get_or_create_cart(&mut tx, user).await?;
        let items = self.items.list_cart_items(&mut tx, cart.uuid).await?;

        let found = match coupon {
            Some(coupon) => self.coupons.get_coupon(&mut tx, coupon).await?,
            None => None,
        };

        tx.commit().await?;

        cart.items.extend(items);

        let (coupon, warning) = resolve_coupon(coupon, found, now);

        let total = round_to_cents(match &coupon {
            Some(coupon) => cart.total_with_coupon(coupon, now),
            None => cart.total(),
        });

        Span::current().record("total", tracing::field::display(total));

        Ok(CheckoutPreview {
            cart,
            coupon,
            total,
            warnings: warning.into_iter().collect(),
        })
    }

    #[tracing::instrument(
        name = "orders.service.checkout",
        skip(self, order, now),
        fields(
            user_uuid = %user,
            stage = tracing::field::Empty,
            order_uuid = tracing::field::Empty,
            order_number = tracing::field::Empty,
            line_count = tracing::field::Empty,
            total = tracing::field::Empty
        ),
        err
    )]
    async fn checkout(
        &self,
        user: UserUuid,
        order: PlaceOrder,
        now: Timestamp,
    ) -> Result<CheckoutReceipt, OrdersServiceError> {
        record_stage(CheckoutStage::Collecting);

        let mut tx = self.db.begin().await?;

        let customer = self.users.get_user(&mut tx, user).await?;
        let cart = self.carts.get_or_create_cart(&mut tx, user).await?;
        let items = self.items.list_cart_items(&mut tx, cart.uuid).await?;

        if items.is_empty() {
            record_stage(CheckoutStage::Aborted);
            info!("checkout rejected: cart is empty");

            return Err(OrdersServiceError::EmptyCart);
        }

        let found = match order.coupon {
            Some(coupon) => self.coupons.get_coupon(&mut tx, coupon).await?,
            None => None,
        };

        let (coupon, warning) = resolve_coupon(order.coupon, found, now);

        if let Some(warning) = &warning {
            warn!(%warning, "applied coupon dropped at checkout");
        }

        record_stage(CheckoutStage::Reserving);

        let mut book_uuids: Vec<BookUuid> = items.iter().map(|item| item.book_uuid).collect();

        book_uuids.sort_unstable();
        book_uuids.dedup();

        let locked = self.books.lock_books(&mut tx, &book_uuids).await?;

        let reserved = match reserve(&items, &locked) {
            Ok(reserved) => reserved,
            Err(error) => {
                record_stage(CheckoutStage::Aborted);
                warn!(%error, "checkout aborted");

                return Err(error);
            }
        };

        let total: Decimal = order_total(&reserved, coupon.as_ref());

        let mut created = self
            .insert_order(
                &mut tx,
                &NewOrderRow {
                    uuid: OrderUuid::new(),
                    user_uuid: user,
                    coupon_uuid: coupon.as_ref().map(|coupon| coupon.uuid),
                    total,
                    shipping_address: &order.shipping_address,
                },
                OrderNumber::generate,
            )
            .await?;

        created.lines = self
            .lines
            .create_order_lines(&mut tx, created.uuid, &reserved)
            .await?;

        if let Err(error) = self.take_stock(&mut tx, &reserved).await {
            record_stage(CheckoutStage::Aborted);
            warn!(%error, "checkout aborted while taking stock");

            return Err(error);
        }

        self.items.clear_cart_items(&mut tx, cart.uuid).await?;

        tx.commit().await?;

        record_stage(CheckoutStage::Committed);

        let span = Span::current();

        span.record("order_uuid", tracing::field::display(created.uuid));
        span.record("order_number", tracing::field::display(&created.number));
        span.record("line_count", created.lines.len());
        span.record("total", tracing::field::display(created.total));

        info!("order placed");

        let body = format!(
            "Your order {} has been placed. Total: {}",
            created.number, created.total
        );

        let notification_sent = match self.notifier.notify(&customer.email, &body).await {
            Ok(()) => true,
            Err(error) => {
                warn!(error = %error, order_number = %created.number, "order confirmation not delivered");

                false
            }
        };

        Ok(CheckoutReceipt {
            order: created,
            warnings: warning.into_iter().collect(),
            coupon_cleared: order.coupon.is_some(),
            notification_sent,
        })
    }

    #[tracing::instrument(
        name = "orders.service.list_orders",
        skip(self),
        fields(user_uuid = %user),
        err
    )]
    async fn list_orders(&self, user: UserUuid) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let mut orders = self.orders.list_user_orders(&mut tx, user).await?;

        self.lines.attach_order_lines(&mut tx, &mut orders).await?;

        tx.commit().await?;

        Ok(orders)
    }

    #[tracing::instrument(
        name = "orders.service.get_order",
        skip(self, number),
        fields(user_uuid = %user, order_number = %number),
        err
    )]
    async fn get_order(
        &self,
        user: UserUuid,
        number: OrderNumber,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let order = self
            .orders
            .get_user_order_by_number(&mut tx, user, &number)
            .await?;

        let mut orders = [order];

        self.lines.attach_order_lines(&mut tx, &mut orders).await?;

        tx.commit().await?;

        let [order] = orders;

        Ok(order)
    }

    #[tracing::instrument(name = "orders.service.list_all_orders", skip(self), err)]
    async fn list_all_orders(&self) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let mut orders = self.orders.list_all_orders(&mut tx).await?;

        self.lines.attach_order_lines(&mut tx, &mut orders).await?;

        tx.commit().await?;

        Ok(orders)
    }

    #[tracing::instrument(
        name = "orders.service.update_status",
        skip(self),
        fields(order_uuid = %order, status = %status),
        err
    )]
    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self.orders.update_order_status(&mut tx, order, status).await?;

        let mut orders = [updated];

        self.lines.attach_order_lines(&mut tx, &mut orders).await?;

        tx.commit().await?;

        let [updated] = orders;

        info!(order_number = %updated.number, "order status updated");

        Ok(updated)
    }
}

#[automock]
#[async_trait]
/// Checkout and order history.
pub trait OrdersService: Send + Sync {
    /// What checkout would charge now, without reserving or writing anything.
    async fn preview_checkout(
        &self,
        user: UserUuid,
        coupon: Option<CouponUuid>,
        now: Timestamp,
    ) -> Result<CheckoutPreview, OrdersServiceError>;

    /// Turn the user's cart into an order, taking the books out of stock.
    ///
    /// Fails with `EmptyCart` or `InsufficientStock` without changing anything. A coupon that
    /// is no longer valid is dropped with a warning rather than failing the checkout.
    async fn checkout(
        &self,
        user: UserUuid,
        order: PlaceOrder,
        now: Timestamp,
    ) -> Result<CheckoutReceipt, OrdersServiceError>;

    /// The user's orders, newest first.
    async fn list_orders(&self, user: UserUuid) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// One of the user's orders. Other users' orders are reported as not found.
    async fn get_order(
        &self,
        user: UserUuid,
        number: OrderNumber,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Every order, newest first.
    async fn list_all_orders(&self) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Move an order to any status.
    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError>;
}
