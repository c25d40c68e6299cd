//! Billing rules compiled from a price model, and their evaluation over a
//! usage series.
//!
//! The two rule kinds have disjoint algorithms: a usage fee sums every
//! matching reading, a demand tariff extracts one peak per day and averages
//! the highest ones. Each is a pure mapping from (series, rule) to a scalar.

use chrono::NaiveDate;

use crate::model;
use crate::series::{DaySeries, UsageSeries};
use crate::types::electricity::{Kw, Kwh};
use crate::types::money::Money;
use crate::types::number::{Factor, Number};
use crate::types::time::TimeOfDay;
use crate::window::{HourWindow, Window};

/// A per-kWh usage fee compiled for evaluation.
#[derive(Debug, Clone)]
pub struct UsageFee {
    /// Name of the fee in the model.
    pub name: String,
    /// Configured rate per kWh, before any VAT correction.
    pub rate: Money,
    window: Window,
}

impl UsageFee {
    pub(crate) fn new(fee: &model::UsageFee) -> Self {
        Self {
            name: fee.name.clone(),
            rate: fee.fee_per_kwh,
            window: Window::from_limits(fee.time_limits.as_ref()),
        }
    }

    /// Total energy of all readings inside this fee's window.
    ///
    /// Every matching reading contributes additively; no readings matching
    /// means zero, never an error.
    #[must_use]
    pub fn total_usage(&self, series: &UsageSeries) -> Kwh {
        series
            .records()
            .iter()
            .filter(|record| self.window.permits(record.timestamp))
            .fold(Kwh::zero(), |total, record| {
                total.saturating_add(record.energy)
            })
    }
}

/// A peak demand tariff compiled for evaluation.
#[derive(Debug, Clone)]
pub struct DemandTariff {
    /// Name of the tariff in the model.
    pub name: String,
    /// Configured rate per kW, before any VAT correction.
    pub rate: Money,
    /// How many daily peaks the average is requested over.
    pub top_peaks: usize,
    window: Window,
    reduction: Option<Reduction>,
}

#[derive(Debug, Clone)]
struct Reduction {
    hours: HourWindow,
    factor: Factor,
}

impl Reduction {
    fn new(reduction: &model::Reduction) -> Self {
        Self {
            hours: HourWindow::new(Some(reduction.start_time), Some(reduction.end_time)),
            factor: reduction.factor,
        }
    }

    /// Scale `power` down when its hour falls inside the reduction window.
    fn apply(&self, time: TimeOfDay, power: Kw) -> Kw {
        if self.hours.contains(time) {
            power * self.factor
        } else {
            power
        }
    }
}

impl DemandTariff {
    pub(crate) fn new(tariff: &model::PowerTariff) -> Self {
        Self {
            name: tariff.name.clone(),
            rate: tariff.fee_per_kw,
            top_peaks: tariff.number_of_top_peaks_to_average as usize,
            window: Window::from_limits(tariff.time_limits.as_ref()),
            reduction: tariff.reduction.as_ref().map(Reduction::new),
        }
    }

    /// The highest qualifying hourly draw of one day.
    ///
    /// Hours outside the tariff window are skipped and reduced hours count
    /// at their reduced value. A day where no hour qualifies still yields a
    /// zero peak, so it stays in the top-N pool. The month filter is a
    /// per-day concern handled by [`Self::daily_peaks`].
    fn day_peak(&self, day: &DaySeries) -> Kw {
        let mut peak: Option<Kw> = None;

        for hour in 0..24 {
            let time = TimeOfDay::from_hour(hour);
            if !self.window.permits_time(time) {
                continue;
            }

            let mut power = day.hour(hour as usize).mean_power_over_hour();
            if let Some(reduction) = &self.reduction {
                power = reduction.apply(time, power);
            }

            if peak.map(|current| power > current).unwrap_or(true) {
                peak = Some(power);
            }
        }

        peak.unwrap_or_else(Kw::zero)
    }

    /// The peak of every day whose month this tariff covers, in date order.
    #[must_use]
    pub fn daily_peaks(&self, series: &UsageSeries) -> Vec<(NaiveDate, Kw)> {
        series
            .days()
            .iter()
            .filter(|day| self.window.permits_month(day.month()))
            .map(|day| (day.date(), self.day_peak(day)))
            .collect()
    }

    /// Average power of the `top_peaks` highest daily peaks.
    ///
    /// When fewer days qualify than requested all of them are averaged; no
    /// qualifying days at all produce zero.
    #[must_use]
    pub fn average_top_peaks(&self, series: &UsageSeries) -> Kw {
        let mut peaks: Vec<Kw> = self
            .daily_peaks(series)
            .into_iter()
            .map(|(_, peak)| peak)
            .collect();

        peaks.sort_unstable_by(|a, b| b.cmp(a));
        peaks.truncate(self.top_peaks);

        if peaks.is_empty() {
            return Kw::zero();
        }

        let total = peaks
            .iter()
            .fold(Number::default(), |total, &peak| total + Number::from(peak));

        Kw::from(total / Number::from(peaks.len()))
    }
}
