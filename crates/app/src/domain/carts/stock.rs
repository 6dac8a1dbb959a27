//! Stock checks applied before any cart mutation.
//!
//! These are plain functions over the values already loaded by the service so the rules can be
//! exercised without a database. A failed check means the cart must be left untouched.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("`{title}` is out of stock")]
    OutOfStock { title: String },

    #[error("only {available} of `{title}` in stock, {requested} requested")]
    StockExceeded {
        title: String,
        requested: u32,
        available: u32,
    },
}

/// Quantity the cart should hold after adding `requested` units to the `existing` item, if any.
///
/// # Errors
///
/// `OutOfStock` when the book has no stock at all, `StockExceeded` when the new quantity would
/// be more than the book holds.
pub fn check_add(
    title: &str,
    stock: u32,
    existing: Option<u32>,
    requested: u32,
) -> Result<u32, StockError> {
    if stock == 0 {
        return Err(StockError::OutOfStock {
            title: title.to_string(),
        });
    }

    let target = existing.unwrap_or(0).saturating_add(requested);

    check_quantity(title, stock, target)
}

/// Check an absolute quantity against the book's stock.
///
/// # Errors
///
/// `StockExceeded` when `quantity` is more than `stock`.
pub fn check_quantity(title: &str, stock: u32, quantity: u32) -> Result<u32, StockError> {
    if quantity > stock {
        return Err(StockError::StockExceeded {
            title: title.to_string(),
            requested: quantity,
            available: stock,
        });
    }

    Ok(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_to_out_of_stock_book_fails() {
        let result = check_add("Dune", 0, None, 1);

        assert_eq!(
            result,
            Err(StockError::OutOfStock {
                title: "Dune".to_string()
            })
        );
    }

    #[test]
    fn new_item_within_stock_is_accepted() {
        assert_eq!(check_add("Dune", 5, None, 1), Ok(1));
        assert_eq!(check_add("Dune", 5, None, 5), Ok(5));
    }

    #[test]
    fn new_item_above_stock_is_rejected() {
        let result = check_add("Dune", 2, None, 3);

        assert!(
            matches!(
                result,
                Err(StockError::StockExceeded {
                    requested: 3,
                    available: 2,
                    ..
                })
            ),
            "expected StockExceeded, got {result:?}"
        );
    }

    #[test]
    fn increments_stop_at_stock() {
        let mut quantity = 1;

        for _ in 0..10 {
            match check_add("Dune", 5, Some(quantity), 1) {
                Ok(next) => quantity = next,
                Err(error) => {
                    assert!(matches!(error, StockError::StockExceeded { .. }));
                }
            }
        }

        assert_eq!(quantity, 5);
    }

    #[test]
    fn increment_does_not_overflow() {
        let result = check_add("Dune", u32::MAX - 1, Some(u32::MAX - 1), u32::MAX);

        assert!(
            matches!(result, Err(StockError::StockExceeded { .. })),
            "expected StockExceeded, got {result:?}"
        );
    }

    #[test]
    fn quantity_equal_to_stock_is_accepted() {
        assert_eq!(check_quantity("Dune", 3, 3), Ok(3));
    }

    #[test]
    fn quantity_above_stock_names_the_book() {
        let result = check_quantity("Dune", 3, 4);

        let Err(error) = result else {
            panic!("expected StockExceeded, got {result:?}");
        };

        assert_eq!(error.to_string(), "only 3 of `Dune` in stock, 4 requested");
    }
}
