//! # Power tariffs library
//!
//! Functionality to compute an itemized electricity bill from a price model
//! and an hourly usage series. Use the [`pricer::Pricer`] to perform the
//! actual calculation.

use std::fmt;

use serde::{Deserialize, Deserializer};

/// The stored price-model documents describing fees and tariffs.
pub mod model;

/// Module containing the functionality to price a usage series with a
/// provided model.
pub mod pricer;

/// Hourly readings and their per-day grouping.
pub mod series;

/// Billing rules compiled for evaluation.
pub mod tariff;

mod window;

/// Module for generating human readable price models.
pub mod explain;

/// Numeric types used for calculations, serializing and deserializing.
pub mod types;

type Result<T> = std::result::Result<T, Error>;

/// Possible configuration errors in a price model.
///
/// The evaluation itself is total: rules that match no readings and readings
/// that match no rule produce zeros, never errors. Everything that can go
/// wrong is a property of the model and is reported before evaluation.
#[derive(Debug)]
pub enum Error {
    /// A month in a time window lies outside 1–12.
    ///
    /// Stored models number months 1 (January) through 12 (December).
    /// Documents written against the historical zero-based numbering are
    /// rejected instead of being reinterpreted.
    MonthOutOfRange {
        /// The offending month number.
        month: u32,
    },
    /// A demand tariff requests the average of zero peaks.
    ZeroTopPeaks {
        /// Name of the offending tariff.
        tariff: String,
    },
    /// A reduction factor lies outside `[0, 1]`.
    ReductionFactorOutOfRange {
        /// Name of the offending tariff.
        tariff: String,
    },
    /// The VAT rate is negative.
    NegativeVatRate,
    /// Two rules of the same kind share a name.
    DuplicateRuleName {
        /// The name used twice.
        name: String,
    },
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MonthOutOfRange { month } => {
                write!(f, "month {month} lies outside 1-12 (January is 1)")
            }
            Self::ZeroTopPeaks { tariff } => {
                write!(
                    f,
                    "power tariff `{tariff}` requests the average of zero peaks"
                )
            }
            Self::ReductionFactorOutOfRange { tariff } => {
                write!(
                    f,
                    "power tariff `{tariff}` has a reduction factor outside 0-1"
                )
            }
            Self::NegativeVatRate => f.write_str("the VAT rate is negative"),
            Self::DuplicateRuleName { name } => {
                write!(f, "the rule name `{name}` is used more than once")
            }
        }
    }
}

fn null_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    T: Default + Deserialize<'de>,
    D: Deserializer<'de>,
{
    let opt = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}
