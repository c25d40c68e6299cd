use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::types::electricity::Kwh;

/// A single metered reading: the energy used during the hour starting at
/// `timestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct UsageRecord {
    /// Start of the hour this reading covers, in the calendar the meter
    /// reports in.
    pub timestamp: NaiveDateTime,
    /// Metered energy during that hour.
    pub energy: Kwh,
}

/// An hourly usage series prepared for evaluation.
///
/// The raw rows are kept next to the per-day grouping: usage fees sum over
/// individual readings while demand tariffs work on hour buckets per
/// calendar day.
#[derive(Debug, Clone, Default)]
pub struct UsageSeries {
    records: Vec<UsageRecord>,
    days: Vec<DaySeries>,
}

/// All readings of one calendar day collapsed into 24 hour buckets.
#[derive(Debug, Clone)]
pub struct DaySeries {
    date: NaiveDate,
    hours: [Kwh; 24],
}

impl DaySeries {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            hours: [Kwh::zero(); 24],
        }
    }

    /// The calendar day these buckets belong to.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub(crate) fn month(&self) -> u32 {
        self.date.month()
    }

    /// The summed energy of the bucket for `hour` (0–23). Hours without a
    /// reading are zero.
    pub(crate) fn hour(&self, hour: usize) -> Kwh {
        self.hours[hour]
    }
}

impl UsageSeries {
    /// Group readings by calendar day, summing per hour bucket.
    ///
    /// The day key is the full calendar date of the timestamp, never a
    /// string prefix. Duplicate readings within one hour are summed, which
    /// also absorbs partial rows an upstream source may produce.
    #[must_use]
    pub fn new(records: Vec<UsageRecord>) -> Self {
        let mut days: BTreeMap<NaiveDate, DaySeries> = BTreeMap::new();

        for record in &records {
            let date = record.timestamp.date();
            let day = days.entry(date).or_insert_with(|| DaySeries::new(date));
            let hour = record.timestamp.hour() as usize;
            day.hours[hour] = day.hours[hour].saturating_add(record.energy);
        }

        Self {
            records,
            days: days.into_values().collect(),
        }
    }

    /// The raw readings in input order.
    #[must_use]
    pub fn records(&self) -> &[UsageRecord] {
        &self.records
    }

    pub(crate) fn days(&self) -> &[DaySeries] {
        &self.days
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Total metered energy over the whole series.
    #[must_use]
    pub fn total_energy(&self) -> Kwh {
        self.records
            .iter()
            .fold(Kwh::zero(), |total, record| total.saturating_add(record.energy))
    }

    /// The calendar months whose days are fully covered by the series, in
    /// chronological order.
    #[must_use]
    pub fn complete_months(&self) -> Vec<(i32, u32)> {
        let (Some(first), Some(last)) = (self.records.first(), self.records.last()) else {
            return Vec::new();
        };

        let first = first.timestamp.date();
        let last = last.timestamp.date();

        let mut months = Vec::new();
        let mut cursor = NaiveDate::from_ymd_opt(first.year(), first.month(), 1)
            .unwrap_or(first);

        while cursor <= last {
            let next = next_month(cursor);
            let last_day = next.pred_opt().unwrap_or(cursor);

            if first <= cursor && last_day <= last {
                months.push((cursor.year(), cursor.month()));
            }

            cursor = next;
        }

        months
    }

    /// Restrict the series to a single calendar month.
    #[must_use]
    pub fn select_month(&self, year: i32, month: u32) -> Self {
        Self::new(
            self.records
                .iter()
                .copied()
                .filter(|record| {
                    record.timestamp.year() == year && record.timestamp.month() == month
                })
                .collect(),
        )
    }
}

fn next_month(first_of_month: NaiveDate) -> NaiveDate {
    let (year, month) = if first_of_month.month() == 12 {
        (first_of_month.year() + 1, 1)
    } else {
        (first_of_month.year(), first_of_month.month() + 1)
    };

    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(first_of_month)
}
