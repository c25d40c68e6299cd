//! The stored price-model documents describing a supplier's fees and tariffs.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{
    money::{Money, VatRate},
    number::Factor,
    time::TimeOfDay,
};
use crate::{Error, Result};

/// A complete price model as published by a supplier.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PriceModel {
    /// Display name of this model, unique among loaded models.
    pub name: String,

    /// Currency of this model, ISO 4217 Code
    pub currency: String,

    /// VAT rate as a fraction, `0.25` for 25%.
    pub vat_rate: VatRate,

    /// Whether the configured rates already include VAT.
    ///
    /// If set, every rate is divided by `1 + vat_rate` to recover its
    /// pre-tax value before the bill is composed.
    #[serde(rename = "prices_include_tax")]
    pub prices_include_vat: bool,

    /// Fixed fee billed once per month.
    pub fixed_fee_per_month: Money,

    /// Per-kWh fees over metered usage.
    #[serde(default, deserialize_with = "crate::null_default")]
    pub usage_fees: Vec<UsageFee>,

    /// Peak demand tariffs.
    #[serde(default, deserialize_with = "crate::null_default")]
    pub power_tariffs: Vec<PowerTariff>,

    /// Link to the supplier's published price sheet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A per-kWh charge over all, or time-windowed, metered usage.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UsageFee {
    /// Name of this fee, unique within the model.
    pub name: String,

    /// Rate per kWh of matched usage.
    pub fee_per_kwh: Money,

    /// When this fee applies. Absent means all the time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limits: Option<TimeLimits>,
}

/// A per-kW charge over the average of the highest daily power peaks.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PowerTariff {
    /// Name of this tariff, unique within the model.
    pub name: String,

    /// Rate per kW of averaged peak power.
    pub fee_per_kw: Money,

    /// How many of the highest daily peaks are averaged.
    pub number_of_top_peaks_to_average: u32,

    /// When this tariff applies. Absent means all the time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limits: Option<TimeLimits>,

    /// Off-peak discount on peak values, for example night-time demand
    /// relief. Absent means peaks count in full.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduction: Option<Reduction>,
}

/// A recurring daily interval, optionally restricted to calendar months.
///
/// `start_time >= end_time` means the interval wraps past midnight, for
/// example `22:00`–`06:00`. Both bounds must be present to restrict the
/// hours; a missing bound leaves the whole day covered.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimeLimits {
    /// Start time of day, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<TimeOfDay>,

    /// End time of day, exclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<TimeOfDay>,

    /// Calendar months in which the window applies. Empty means every month.
    #[serde(default, deserialize_with = "crate::null_default")]
    pub months: Months,
}

impl TimeLimits {
    fn validate(&self) -> Result<()> {
        match self.months.0.iter().find(|&&month| !(1..=12).contains(&month)) {
            Some(&month) => Err(Error::MonthOutOfRange { month }),
            None => Ok(()),
        }
    }
}

/// A set of calendar months.
///
/// Stored models number months 1 (January) through 12 (December). Documents
/// written against the historical zero-based numbering are rejected at
/// validation instead of being reinterpreted.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Months(Vec<u32>);

impl Months {
    /// Whether `month` (1–12) is covered. An empty set covers every month.
    #[must_use]
    pub fn permits(&self, month: u32) -> bool {
        self.0.is_empty() || self.0.contains(&month)
    }

    /// Whether this set restricts anything at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The configured months in document order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

impl From<Vec<u32>> for Months {
    fn from(months: Vec<u32>) -> Self {
        Self(months)
    }
}

/// A time-of-day interval during which peak values are multiplied by
/// `factor` before entering the daily-peak comparison.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Reduction {
    /// Start time of day, inclusive. Wrap semantics as in [`TimeLimits`].
    pub start_time: TimeOfDay,

    /// End time of day, exclusive.
    pub end_time: TimeOfDay,

    /// Multiplier in `[0, 1]` applied to peaks inside the interval.
    pub factor: Factor,
}

impl PriceModel {
    /// Check this model for configuration errors.
    ///
    /// The evaluation engine is total over a valid model; everything that
    /// could make a bill meaningless is rejected here, before any reading is
    /// looked at.
    pub fn validate(&self) -> Result<()> {
        if self.vat_rate.is_negative() {
            return Err(Error::NegativeVatRate);
        }

        let mut fee_names = HashSet::new();
        for fee in &self.usage_fees {
            if !fee_names.insert(fee.name.as_str()) {
                return Err(Error::DuplicateRuleName {
                    name: fee.name.clone(),
                });
            }

            if let Some(limits) = &fee.time_limits {
                limits.validate()?;
            }
        }

        let mut tariff_names = HashSet::new();
        for tariff in &self.power_tariffs {
            if !tariff_names.insert(tariff.name.as_str()) {
                return Err(Error::DuplicateRuleName {
                    name: tariff.name.clone(),
                });
            }

            if tariff.number_of_top_peaks_to_average == 0 {
                return Err(Error::ZeroTopPeaks {
                    tariff: tariff.name.clone(),
                });
            }

            if let Some(limits) = &tariff.time_limits {
                limits.validate()?;
            }

            if let Some(reduction) = &tariff.reduction {
                if !reduction.factor.in_unit_interval() {
                    return Err(Error::ReductionFactorOutOfRange {
                        tariff: tariff.name.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
