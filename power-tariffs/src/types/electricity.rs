use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use super::number::{Factor, Number};

/// A value of kilo watt hours.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Default)]
#[serde(transparent)]
pub struct Kwh(Number);

impl Kwh {
    pub(crate) fn zero() -> Self {
        Self(Number::default())
    }

    /// Whether no energy was metered at all.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Saturating addition
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }

    /// The mean power over a one hour bucket.
    ///
    /// Readings are hourly, so the energy of a bucket in kWh numerically
    /// equals the mean draw in kW during that hour.
    #[must_use]
    pub fn mean_power_over_hour(self) -> Kw {
        Kw(self.0)
    }
}

impl FromStr for Kwh {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(rust_decimal::Decimal::from_str(s)?.into()))
    }
}

impl From<Kwh> for rust_decimal::Decimal {
    fn from(value: Kwh) -> Self {
        value.0.into()
    }
}

impl From<Kwh> for Number {
    fn from(value: Kwh) -> Self {
        value.0
    }
}

impl Display for Kwh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// A value of kilo watts.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Default)]
#[serde(transparent)]
pub struct Kw(Number);

impl Kw {
    pub(crate) fn zero() -> Self {
        Self(Number::default())
    }
}

impl From<Number> for Kw {
    fn from(value: Number) -> Self {
        Self(value)
    }
}

impl From<Kw> for Number {
    fn from(value: Kw) -> Self {
        value.0
    }
}

impl From<Kw> for rust_decimal::Decimal {
    fn from(value: Kw) -> Self {
        value.0.into()
    }
}

impl std::ops::Mul<Factor> for Kw {
    type Output = Kw;

    fn mul(self, rhs: Factor) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl Display for Kw {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
