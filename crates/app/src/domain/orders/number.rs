//! Order numbers.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use thiserror::Error;
use uuid::Uuid;

/// Number of characters in every order number.
pub const ORDER_NUMBER_LEN: usize = 10;

/// Customer-facing order reference: ten uppercase hexadecimal characters taken from a random
/// UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderNumber(String);

#[derive(Debug, Error)]
#[error("order numbers are {ORDER_NUMBER_LEN} hexadecimal characters, got `{0}`")]
pub struct InvalidOrderNumber(pub String);

impl OrderNumber {
    /// Draw a fresh random number. Uniqueness is enforced by the database, not here.
    #[must_use]
    pub fn generate() -> Self {
        let mut buffer = Uuid::encode_buffer();
        let hex = Uuid::new_v4().simple().encode_upper(&mut buffer);

        Self(hex.chars().take(ORDER_NUMBER_LEN).collect())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Parsing is case-insensitive; the stored form is always uppercase.
impl FromStr for OrderNumber {
    type Err = InvalidOrderNumber;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.len() != ORDER_NUMBER_LEN || !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidOrderNumber(value.to_string()));
        }

        Ok(Self(value.to_ascii_uppercase()))
    }
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashSet;

    use super::*;

    #[test]
    fn generated_numbers_are_ten_uppercase_hex_characters() {
        let number = OrderNumber::generate();

        assert_eq!(number.as_str().len(), ORDER_NUMBER_LEN);
        assert!(
            number
                .as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()),
            "expected uppercase hex, got {number}"
        );
    }

    #[test]
    fn generated_numbers_do_not_repeat() {
        let numbers: FxHashSet<OrderNumber> = (0..1_000).map(|_| OrderNumber::generate()).collect();

        assert_eq!(numbers.len(), 1_000);
    }

    #[test]
    fn parse_normalises_case() -> Result<(), InvalidOrderNumber> {
        let number: OrderNumber = "0a1b2c3d4e".parse()?;

        assert_eq!(number.as_str(), "0A1B2C3D4E");

        Ok(())
    }

    #[test]
    fn parse_rejects_wrong_length_and_non_hex() {
        assert!("ABC".parse::<OrderNumber>().is_err());
        assert!("0A1B2C3D4E5".parse::<OrderNumber>().is_err());
        assert!("0A1B2C3D-E".parse::<OrderNumber>().is_err());
        assert!("ZZZZZZZZZZ".parse::<OrderNumber>().is_err());
    }
}
