//! Cart Data

use crate::domain::books::records::BookUuid;

/// Request to put a book in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartItem {
    pub book_uuid: BookUuid,

    /// Units to add on top of whatever the cart already holds for this book.
    pub quantity: u32,
}
