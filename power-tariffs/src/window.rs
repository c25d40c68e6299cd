use chrono::{Datelike, NaiveDateTime};

use crate::model::{Months, TimeLimits};
use crate::types::time::TimeOfDay;

/// The hour-of-day bounds of a window, decided once at construction.
///
/// The wrapping case is an explicit variant rather than modular arithmetic so
/// the half-open boundary behavior stays auditable on its own.
#[derive(Debug, Clone, Copy)]
pub(crate) enum HourWindow {
    /// No bounds configured, every hour qualifies.
    FullDay,
    /// `start < end`, a single interval within one day.
    Between { start: TimeOfDay, end: TimeOfDay },
    /// `start >= end`, the interval wraps past midnight.
    Wrapping { start: TimeOfDay, end: TimeOfDay },
}

impl HourWindow {
    pub(crate) fn new(start: Option<TimeOfDay>, end: Option<TimeOfDay>) -> Self {
        match (start, end) {
            (Some(start), Some(end)) if start >= end => Self::Wrapping { start, end },
            (Some(start), Some(end)) => Self::Between { start, end },
            _ => Self::FullDay,
        }
    }

    /// Whether `time` falls inside the window. Both variants with bounds are
    /// half-open: the start is covered, the end is not.
    pub(crate) fn contains(self, time: TimeOfDay) -> bool {
        match self {
            Self::FullDay => true,
            Self::Between { start, end } => time >= start && time < end,
            Self::Wrapping { start, end } => time >= start || time < end,
        }
    }
}

/// A compiled time window: hour-of-day bounds plus a month-of-year filter.
#[derive(Debug, Clone)]
pub(crate) struct Window {
    hours: HourWindow,
    months: Months,
}

impl Window {
    pub(crate) fn from_limits(limits: Option<&TimeLimits>) -> Self {
        match limits {
            Some(limits) => Self {
                hours: HourWindow::new(limits.start_time, limits.end_time),
                months: limits.months.clone(),
            },
            None => Self {
                hours: HourWindow::FullDay,
                months: Months::default(),
            },
        }
    }

    pub(crate) fn permits_month(&self, month: u32) -> bool {
        self.months.permits(month)
    }

    pub(crate) fn permits_time(&self, time: TimeOfDay) -> bool {
        self.hours.contains(time)
    }

    /// Whether a reading at `timestamp` matches both the month and the hour
    /// filter.
    pub(crate) fn permits(&self, timestamp: NaiveDateTime) -> bool {
        self.permits_month(timestamp.month()) && self.permits_time(TimeOfDay::of(timestamp))
    }
}


#[cfg(test)]
mod window_tests {
    use chrono::NaiveDateTime;

    use super::Window;
    use crate::model::{Months, TimeLimits};

    fn timestamp(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn limits(start: &str, end: &str, months: Vec<u32>) -> TimeLimits {
        TimeLimits {
            start_time: Some(start.parse().unwrap()),
            end_time: Some(end.parse().unwrap()),
            months: Months::from(months),
        }
    }

    #[test]
    fn no_limits_permit_everything() {
        let window = Window::from_limits(None);
        assert!(window.permits(timestamp("2025-06-15 12:00")));
    }

    #[test]
    fn month_and_hour_must_both_match() {
        let limits = limits("06:00", "22:00", vec![11, 12, 1, 2, 3]);
        let window = Window::from_limits(Some(&limits));

        assert!(window.permits(timestamp("2025-01-15 12:00")));
        // right hour, summer month
        assert!(!window.permits(timestamp("2025-06-15 12:00")));
        // winter month, outside the hours
        assert!(!window.permits(timestamp("2025-01-15 23:00")));
    }

    #[test]
    fn empty_month_set_permits_every_month() {
        let limits = limits("00:00", "24:00", vec![]);
        let window = Window::from_limits(Some(&limits));
        for month in 1..=12 {
            assert!(window.permits_month(month));
        }
    }
}
