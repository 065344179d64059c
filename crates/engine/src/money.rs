use std::{
    fmt,
    ops::{Add, AddAssign, Neg, Sub},
    str::FromStr,
};

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::{EngineError, ResultEngine};

/// Signed exact decimal amount.
///
/// Use this type for **all** monetary values in the engine (balances,
/// transaction amounts, deltas) to avoid floating-point drift. It wraps a
/// [`Decimal`] and never carries more than [`Amount::SCALE`] fractional
/// digits, so it can be persisted losslessly as an integer number of
/// ten-thousandths (see [`Amount::to_units`]).
///
/// # Examples
///
/// ```rust
/// use engine::Amount;
///
/// let amount: Amount = "12.3".parse().unwrap();
/// assert_eq!(amount.to_units().unwrap(), 123_000);
/// assert_eq!(amount.to_fixed(2), "12.30");
/// assert_eq!((-amount).to_fixed(2), "-12.30");
/// ```
///
/// Malformed input is rejected:
///
/// ```rust
/// use engine::Amount;
///
/// assert!("abc".parse::<Amount>().is_err());
/// assert!("1.23456".parse::<Amount>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Fractional digits kept in storage.
    pub const SCALE: u32 = 4;

    const UNITS_PER_ONE: i64 = 10_000;

    /// Wraps a decimal, rejecting values with more than [`Amount::SCALE`]
    /// fractional digits or outside the storable range.
    pub fn new(value: Decimal) -> ResultEngine<Self> {
        let value = value.normalize();
        if value.scale() > Self::SCALE {
            return Err(EngineError::InvalidAmount(format!(
                "at most {} decimal places are allowed",
                Self::SCALE
            )));
        }
        let amount = Self(value);
        amount.to_units()?;
        Ok(amount)
    }

    /// Rebuilds an amount from its stored representation.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::new(units, Self::SCALE).normalize())
    }

    /// Returns the stored representation: the amount in ten-thousandths.
    pub fn to_units(self) -> ResultEngine<i64> {
        (self.0 * Decimal::from(Self::UNITS_PER_ONE))
            .trunc()
            .to_i64()
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))
    }

    /// Returns the underlying decimal.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Renders with exactly `dp` fractional digits, rounding half away from
    /// zero.
    #[must_use]
    pub fn to_fixed(self, dp: u32) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
        // Avoid printing "-0.00".
        let rounded = if rounded.is_zero() {
            Decimal::ZERO
        } else {
            rounded
        };
        format!("{rounded:.prec$}", prec = dp as usize)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fixed(2))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Self::Output {
        Amount(-self.0)
    }
}

impl FromStr for Amount {
    type Err = EngineError;

    /// Parses a decimal string such as `"100"`, `"-12.5"` or `"0.0001"`.
    ///
    /// Rejects empty strings, anything that is not a plain base-10 number and
    /// values with more than [`Amount::SCALE`] fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidAmount("empty amount".to_string()));
        }
        let digits = trimmed.strip_prefix(['-', '+']).unwrap_or(trimmed);
        if digits.is_empty()
            || !digits.chars().all(|c| c.is_ascii_digit() || c == '.')
            || digits.starts_with('.')
            || digits.ends_with('.')
        {
            return Err(EngineError::InvalidAmount(format!(
                "invalid amount: {trimmed}"
            )));
        }
        let value = Decimal::from_str(trimmed)
            .map_err(|_| EngineError::InvalidAmount(format!("invalid amount: {trimmed}")))?;
        Self::new(value)
    }
}
