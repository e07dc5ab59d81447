//! Validated line-item quantity.
//!
//! A line item never stores zero or negative quantities (removal deletes the
//! line instead), so quantities are validated once at the boundary and carried
//! as this type afterwards.

use serde::Serialize;
use thiserror::Error;

/// Error validating a requested quantity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantityError {
    /// Zero or negative quantity.
    #[error("quantity must be a positive integer (got {0})")]
    NotPositive(i64),

    /// Larger than any realistic order, and larger than the storage type.
    #[error("quantity {0} is out of range")]
    OutOfRange(i64),
}

/// A strictly positive line-item quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(i32);

impl Quantity {
    /// Validate a caller-supplied quantity.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::NotPositive` for values below one and
    /// `QuantityError::OutOfRange` for values that do not fit the storage
    /// type.
    pub fn parse(value: i64) -> Result<Self, QuantityError> {
        if value < 1 {
            return Err(QuantityError::NotPositive(value));
        }
        let value = i32::try_from(value).map_err(|_| QuantityError::OutOfRange(value))?;
        Ok(Self(value))
    }

    /// Get the underlying i32 value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Quantity> for i32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_positive_values() {
        assert_eq!(Quantity::parse(1).unwrap().as_i32(), 1);
        assert_eq!(Quantity::parse(250).unwrap().as_i32(), 250);
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        assert_eq!(Quantity::parse(0), Err(QuantityError::NotPositive(0)));
        assert_eq!(Quantity::parse(-3), Err(QuantityError::NotPositive(-3)));
    }

    #[test]
    fn test_rejects_values_beyond_storage_type() {
        let too_big = i64::from(i32::MAX) + 1;
        assert_eq!(
            Quantity::parse(too_big),
            Err(QuantityError::OutOfRange(too_big))
        );
    }
}
