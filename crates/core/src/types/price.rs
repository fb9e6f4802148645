//! Type-safe recipe price using decimal arithmetic.
//!
//! Prices are stored as `NUMERIC(5, 2)`: up to 999.99, never negative,
//! never more than two decimal places. Serialized values always carry two
//! decimal places (`"7.00"`).

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount has more than two decimal places.
    #[error("ensure that there are no more than {max} decimal places")]
    TooPrecise {
        /// Maximum decimal places.
        max: u32,
    },
    /// The amount is larger than the column allows.
    #[error("ensure that there are no more than 5 digits in total (max {max})")]
    TooLarge {
        /// Largest accepted amount.
        max: Decimal,
    },
}

/// A non-negative amount with two decimal places.
///
/// ```
/// use recipe_core::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::new(Decimal::new(7, 0)).unwrap();
/// assert_eq!(price.to_string(), "7.00");
/// assert!(Price::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Decimal places kept for every price.
    pub const DECIMAL_PLACES: u32 = 2;

    /// Largest accepted amount (`999.99`).
    #[must_use]
    pub fn max_amount() -> Decimal {
        Decimal::new(99_999, Self::DECIMAL_PLACES)
    }

    /// Validate an amount and fix its scale to two decimal places.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative`, `PriceError::TooPrecise` or
    /// `PriceError::TooLarge` when the amount does not fit `NUMERIC(5, 2)`.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        if amount.normalize().scale() > Self::DECIMAL_PLACES {
            return Err(PriceError::TooPrecise {
                max: Self::DECIMAL_PLACES,
            });
        }
        let max = Self::max_amount();
        if amount > max {
            return Err(PriceError::TooLarge { max });
        }

        let mut fixed = amount.abs();
        fixed.rescale(Self::DECIMAL_PLACES);
        Ok(Self(fixed))
    }

    /// Returns the amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
