use std::{fmt::Display, str::FromStr};

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize, Serializer};

const MINS_IN_HOUR: u16 = 60;
const MINS_IN_DAY: u16 = 24 * MINS_IN_HOUR;

/// A time of day in the stored `"HH:MM"` format, as minutes from midnight.
///
/// Unlike a `chrono::NaiveTime` this admits `"24:00"`, which the stored
/// documents use as an end-of-day bound.
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// The start of an hour-of-day bucket.
    #[must_use]
    pub fn from_hour(hour: u32) -> Self {
        debug_assert!(hour < 24);
        Self(hour as u16 * MINS_IN_HOUR)
    }

    /// The time-of-day portion of a timestamp, minute exact.
    #[must_use]
    pub fn of(timestamp: NaiveDateTime) -> Self {
        Self((timestamp.hour() * 60 + timestamp.minute()) as u16)
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseTimeOfDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hours, minutes) = s.split_once(':').ok_or(ParseTimeOfDayError)?;
        let hours: u16 = hours.parse().map_err(|_| ParseTimeOfDayError)?;
        let minutes: u16 = minutes.parse().map_err(|_| ParseTimeOfDayError)?;

        if minutes >= MINS_IN_HOUR {
            return Err(ParseTimeOfDayError);
        }

        let total = hours * MINS_IN_HOUR + minutes;
        if total > MINS_IN_DAY {
            return Err(ParseTimeOfDayError);
        }

        Ok(Self(total))
    }
}

/// The error returned when a time string is not of the form `"HH:MM"` within
/// `00:00..=24:00`.
#[derive(Debug, PartialEq, Eq)]
pub struct ParseTimeOfDayError;

impl Display for ParseTimeOfDayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("expected a time of day between 00:00 and 24:00")
    }
}

impl std::error::Error for ParseTimeOfDayError {}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let s = <String as Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:0>2}:{:0>2}",
            self.0 / MINS_IN_HOUR,
            self.0 % MINS_IN_HOUR
        )
    }
}
