use std::{
    fmt::Display,
    ops::{Add, AddAssign, Mul},
};

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{
    electricity::{Kw, Kwh},
    number::Number,
};

/// A monetary amount, the currency is dependent on the price model.
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(transparent)]
pub struct Money(Number);

impl Money {
    /// Whether this amount is exactly zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0 + rhs.0;
    }
}

impl Mul<Number> for Money {
    type Output = Money;

    fn mul(self, rhs: Number) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Mul<Money> for Number {
    type Output = Money;

    fn mul(self, rhs: Money) -> Self::Output {
        rhs * self
    }
}

impl Mul<Kwh> for Money {
    type Output = Money;

    fn mul(self, rhs: Kwh) -> Self::Output {
        Self(self.0 * Number::from(rhs))
    }
}

impl Mul<Money> for Kwh {
    type Output = Money;

    fn mul(self, rhs: Money) -> Self::Output {
        rhs * self
    }
}

impl Mul<Kw> for Money {
    type Output = Money;

    fn mul(self, rhs: Kw) -> Self::Output {
        Self(self.0 * Number::from(rhs))
    }
}

impl Mul<Money> for Kw {
    type Output = Money;

    fn mul(self, rhs: Money) -> Self::Output {
        rhs * self
    }
}

impl From<Money> for rust_decimal::Decimal {
    fn from(value: Money) -> Self {
        value.0.into()
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// A VAT rate stored as a fraction, `0.25` meaning 25%.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Deserialize, Serialize)]
#[serde(transparent)]
pub struct VatRate(Number);

impl VatRate {
    pub(crate) fn is_negative(self) -> bool {
        self.0.is_negative()
    }

    /// The multiplier that turns a configured rate into its pre-tax value.
    ///
    /// Rates configured inclusive of VAT carry the tax inside them and are
    /// divided by `1 + rate`; rates configured exclusive of VAT pass through
    /// unchanged.
    pub(crate) fn pretax_factor(self, prices_include_vat: bool) -> Number {
        if prices_include_vat {
            Number::ONE / (Number::ONE + self.0)
        } else {
            Number::ONE
        }
    }

    /// The VAT amount due over a pre-tax amount.
    pub(crate) fn vat_on(self, amount: Money) -> Money {
        amount * self.0
    }

    /// This rate as a percentage, for display.
    #[must_use]
    pub fn percentage(self) -> rust_decimal::Decimal {
        rust_decimal::Decimal::from(self.0 * Number::from(dec!(100))).normalize()
    }
}

impl From<VatRate> for rust_decimal::Decimal {
    fn from(value: VatRate) -> Self {
        value.0.into()
    }
}
