//! Checkout planning.
//!
//! The database work of a checkout lives in the orders service. This module holds the parts that
//! only look at values already loaded inside the checkout transaction: which coupon still
//! applies, whether every cart line fits in the locked stock, and what the order totals to.

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy};
use rustc_hash::FxHashMap;

use crate::domain::{
    books::records::{BookStock, BookUuid},
    carts::records::{CartItemRecord, CartRecord},
    coupons::records::{CouponRecord, CouponUuid},
    orders::{errors::OrdersServiceError, records::OrderRecord},
};

/// Where a checkout is in its workflow. Recorded on the checkout span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStage {
    /// Reading the cart and the applied coupon.
    Collecting,

    /// Holding row locks on the books being bought.
    Reserving,

    Committed,
    Aborted,
}

impl CheckoutStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Collecting => "collecting",
            Self::Reserving => "reserving",
            Self::Committed => "committed",
            Self::Aborted => "aborted",
        }
    }
}

impl Display for CheckoutStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Non-fatal conditions reported alongside a checkout or preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutWarning {
    /// The applied coupon is unknown, inactive or outside its window, so no discount was given.
    CouponDropped {
        coupon_uuid: CouponUuid,
        code: Option<String>,
    },
}

impl Display for CheckoutWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::CouponDropped {
                code: Some(code), ..
            } => write!(f, "coupon `{code}` is no longer valid and was not applied"),
            Self::CouponDropped { coupon_uuid, .. } => {
                write!(f, "coupon {coupon_uuid} does not exist and was not applied")
            }
        }
    }
}

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    pub order: OrderRecord,
    pub warnings: Vec<CheckoutWarning>,

    /// Whether the caller's applied coupon has been used up and must be forgotten.
    pub coupon_cleared: bool,

    /// Whether the confirmation message was delivered. Delivery failures never fail checkout.
    pub notification_sent: bool,
}

/// What checkout would charge right now, without reserving anything.
#[derive(Debug, Clone)]
pub struct CheckoutPreview {
    pub cart: CartRecord,

    /// The applied coupon, if it is still valid.
    pub coupon: Option<CouponRecord>,

    pub total: Decimal,
    pub warnings: Vec<CheckoutWarning>,
}

/// One cart line confirmed against locked stock, priced at the locked book's current price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedLine {
    pub book_uuid: BookUuid,
    pub title: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// Decide whether the applied coupon still counts at `now`.
///
/// `found` is the stored coupon for `requested`, if it exists.
#[must_use]
pub fn resolve_coupon(
    requested: Option<CouponUuid>,
    found: Option<CouponRecord>,
    now: Timestamp,
) -> (Option<CouponRecord>, Option<CheckoutWarning>) {
    let Some(coupon_uuid) = requested else {
        return (None, None);
    };

    match found {
        Some(coupon) if coupon.is_valid_at(now) => (Some(coupon), None),
        Some(coupon) => (
            None,
            Some(CheckoutWarning::CouponDropped {
                coupon_uuid,
                code: Some(coupon.code),
            }),
        ),
        None => (
            None,
            Some(CheckoutWarning::CouponDropped {
                coupon_uuid,
                code: None,
            }),
        ),
    }
}

/// Check every cart item, in cart order, against the locked stock.
///
/// # Errors
///
/// `InsufficientStock` for the first item that asks for more than its book holds. A book that
/// has disappeared from the catalog counts as having no stock.
pub fn reserve(
    items: &[CartItemRecord],
    locked: &[BookStock],
) -> Result<Vec<ReservedLine>, OrdersServiceError> {
    let books: FxHashMap<BookUuid, &BookStock> =
        locked.iter().map(|book| (book.uuid, book)).collect();

    items
        .iter()
        .map(|item| {
            let Some(book) = books.get(&item.book_uuid) else {
                return Err(OrdersServiceError::InsufficientStock {
                    book_uuid: item.book_uuid,
                    title: item.title.clone(),
                    requested: item.quantity,
                    available: 0,
                });
            };

            if item.quantity > book.stock {
                return Err(OrdersServiceError::InsufficientStock {
                    book_uuid: book.uuid,
                    title: book.title.clone(),
                    requested: item.quantity,
                    available: book.stock,
                });
            }

            Ok(ReservedLine {
                book_uuid: book.uuid,
                title: book.title.clone(),
                quantity: item.quantity,
                unit_price: book.price,
            })
        })
        .collect()
}

/// Round an amount to cents, halves away from zero.
#[must_use]
pub fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// The amount the order is charged: the reserved lines, discounted by `coupon`, in cents.
#[must_use]
pub fn order_total(lines: &[ReservedLine], coupon: Option<&CouponRecord>) -> Decimal {
    let total: Decimal = lines
        .iter()
        .map(|line| line.unit_price * Decimal::from(line.quantity))
        .sum();

    let total = coupon.map_or(total, |coupon| coupon.discounted(total));

    round_to_cents(total)
}
