//! Two-decimal monetary amounts.
//!
//! Every amount the marketplace settles is a non-negative decimal in a
//! currency's standard unit (dollars, not cents) with at most two fractional
//! digits. [`Amount`] enforces that on construction, so the commission engine
//! never has to re-validate its input.

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing an [`Amount`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The value is below zero.
    #[error("amount cannot be negative (got {0})")]
    Negative(Decimal),
    /// The value is NaN or infinite.
    #[error("amount must be a finite number")]
    NonFinite,
    /// The value has more fractional digits than the currency allows.
    #[error("amount {value} has more than {max} decimal places")]
    TooPrecise {
        /// The rejected value.
        value: Decimal,
        /// Maximum allowed decimal places.
        max: u32,
    },
    /// The value is too large to be held with cent precision.
    #[error("amount {0} is too large")]
    OutOfRange(Decimal),
    /// The input string is not a decimal number.
    #[error("amount is not a decimal number: {0:?}")]
    Unparseable(String),
}

/// A non-negative currency amount with cent precision.
///
/// ## Constraints
///
/// - Value is `>= 0`
/// - At most 2 decimal places (smallest unit is 0.01)
///
/// The stored value is always rescaled to exactly two decimal places, so it
/// displays and serializes as `"15.00"` rather than `"15"`.
///
/// ## Examples
///
/// ```
/// use marketplace_core::Amount;
/// use rust_decimal::Decimal;
///
/// assert!(Amount::new(Decimal::new(1999, 2)).is_ok());  // 19.99
/// assert!(Amount::new(Decimal::new(-1, 0)).is_err());   // negative
/// assert!(Amount::new(Decimal::new(1005, 3)).is_err()); // 1.005
/// assert_eq!(Amount::from_cents(1500).to_string(), "15.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Number of fractional digits in the currency.
    pub const SCALE: u32 = 2;

    /// Rounding applied wherever a derived value must be brought back to cents.
    pub const ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::from_parts(0, 0, 0, false, 2));

    /// Create an amount from a decimal value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is negative or has more than two
    /// significant decimal places. Trailing zeros (`"1.500"`) are accepted.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_zero() {
            return Ok(Self::ZERO);
        }

        if value.is_sign_negative() {
            return Err(AmountError::Negative(value));
        }

        if value.normalize().scale() > Self::SCALE {
            return Err(AmountError::TooPrecise {
                value,
                max: Self::SCALE,
            });
        }

        Self::at_cent_scale(value).ok_or(AmountError::OutOfRange(value))
    }

    /// Create an amount from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: u64) -> Self {
        Self(Decimal::from_i128_with_scale(i128::from(cents), Self::SCALE))
    }

    /// Create an amount from a floating point value.
    ///
    /// Floats cannot represent most cent values exactly, so the value is
    /// rounded to cents (half away from zero) after conversion.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is NaN, infinite, out of decimal range,
    /// or negative.
    pub fn from_f64(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::NonFinite);
        }

        let decimal = Decimal::try_from(value).map_err(|_| AmountError::NonFinite)?;
        Self::new(decimal.round_dp_with_strategy(Self::SCALE, Self::ROUNDING))
    }

    /// Returns the amount as a decimal.
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Subtract `rhs`, clamping at zero.
    #[must_use]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        if rhs.0 >= self.0 {
            Self::ZERO
        } else {
            // Both operands are at cent scale, so the difference is too.
            Self(self.0 - rhs.0)
        }
    }

    /// Add two amounts, returning `None` when the sum no longer fits at cent
    /// precision.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).and_then(Self::at_cent_scale)
    }

    /// Round an arbitrary non-negative decimal to cents.
    ///
    /// Callers must only pass values that are already known to be `>= 0` and
    /// no larger than an existing `Amount`; such values always fit at cent
    /// scale.
    pub(crate) fn round_from(value: Decimal) -> Self {
        let mut rounded = value.round_dp_with_strategy(Self::SCALE, Self::ROUNDING);
        if rounded.is_zero() {
            return Self::ZERO;
        }
        rounded.rescale(Self::SCALE);
        Self(rounded)
    }

    /// Rescale to cents, or `None` if the value is too large to carry two
    /// decimal places (`rescale` leaves the scale untouched in that case).
    fn at_cent_scale(mut value: Decimal) -> Option<Self> {
        value.rescale(Self::SCALE);
        (value.scale() == Self::SCALE).then_some(Self(value))
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value =
            Decimal::from_str(s.trim()).map_err(|_| AmountError::Unparseable(s.to_owned()))?;
        Self::new(value)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}
