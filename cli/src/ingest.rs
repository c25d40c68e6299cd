//! CSV ingestion of hourly usage series.
//!
//! Meter exports differ in header wording and column order, so the header is
//! located by scanning for cells that mention time or usage. Individual rows
//! that fail to parse are skipped with a note; structural problems with the
//! series as a whole are errors, the engine never sees such a series.

use std::io::Read;

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord, Trim};
use power_tariffs::series::UsageRecord;

use crate::{error::Error, Result};

/// Minimum number of rows a series must have to be considered a real export.
pub const DEFAULT_MIN_ROWS: usize = 100;

/// Tolerated deviation from the expected one hour sampling interval.
const INTERVAL_TOLERANCE_SECS: i64 = 36;

const SECS_IN_HOUR: i64 = 3600;

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Read a usage series from semicolon separated CSV.
pub fn read_usage_csv(reader: impl Read, min_rows: usize) -> Result<Vec<UsageRecord>> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for row in csv_reader.records() {
        rows.push(row?);
    }

    let layout = Layout::detect(&rows);
    let mut records = Vec::new();

    for (index, row) in rows.iter().enumerate().skip(layout.data_start) {
        if row.iter().all(str::is_empty) {
            continue;
        }

        match layout.parse_row(row) {
            Ok(record) => records.push(record),
            Err(reason) => eprintln!("skipping row {}: {reason}", index + 1),
        }
    }

    validate_series(&records, min_rows)?;

    Ok(records)
}

/// Where the data starts and which columns carry the timestamp and the
/// usage value.
struct Layout {
    data_start: usize,
    timestamp_col: usize,
    usage_col: usize,
}

impl Layout {
    /// Scan for a header row. Exports may carry disclaimers above it; rows
    /// before the header are ignored. Without any header the first column is
    /// taken as the timestamp and the second as the usage.
    fn detect(rows: &[StringRecord]) -> Self {
        for (index, row) in rows.iter().enumerate() {
            let is_header = row.iter().any(|cell| {
                let cell = cell.to_lowercase();
                cell.contains("time") || cell.contains("usage") || cell.contains("consumption")
            });

            if !is_header {
                continue;
            }

            let mut timestamp_col = None;
            let mut usage_col = None;

            for (col, cell) in row.iter().enumerate() {
                let cell = cell.to_lowercase();
                if cell.contains("timestamp") || cell.contains("start") {
                    timestamp_col.get_or_insert(col);
                } else if cell.contains("usage") || cell.contains("consumption") {
                    usage_col.get_or_insert(col);
                }
            }

            return Self {
                data_start: index + 1,
                timestamp_col: timestamp_col.unwrap_or(0),
                usage_col: usage_col.unwrap_or(row.len().saturating_sub(1)),
            };
        }

        Self {
            data_start: 0,
            timestamp_col: 0,
            usage_col: 1,
        }
    }

    fn parse_row(&self, row: &StringRecord) -> std::result::Result<UsageRecord, String> {
        let timestamp = row
            .get(self.timestamp_col)
            .ok_or("missing timestamp column")?;
        let usage = row.get(self.usage_col).ok_or("missing usage column")?;

        let timestamp = parse_timestamp(timestamp)
            .ok_or_else(|| format!("invalid timestamp `{timestamp}`"))?;

        // meter exports written under continental locales use a decimal comma
        let energy = usage
            .replace(',', ".")
            .parse()
            .map_err(|_| format!("invalid usage value `{usage}`"))?;

        Ok(UsageRecord { timestamp, energy })
    }
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// The upstream contract the engine relies on: enough rows, chronological
/// order, and hourly spacing between the first two samples.
fn validate_series(records: &[UsageRecord], min_rows: usize) -> Result<()> {
    if records.len() < min_rows {
        return Err(Error::NotEnoughRows {
            found: records.len(),
            minimum: min_rows,
        });
    }

    for (index, pair) in records.windows(2).enumerate() {
        if pair[1].timestamp < pair[0].timestamp {
            return Err(Error::OutOfOrder { row: index + 2 });
        }
    }

    if let [first, second, ..] = records {
        let spacing = second.timestamp.signed_duration_since(first.timestamp);
        if (spacing.num_seconds() - SECS_IN_HOUR).abs() > INTERVAL_TOLERANCE_SECS {
            return Err(Error::UnexpectedInterval {
                minutes: spacing.num_minutes(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::read_usage_csv;
    use crate::error::Error;

    #[test]
    fn parses_a_headered_export() {
        let csv = "\
Start time;End time;Consumption kWh
2025-01-01 00:00;2025-01-01 01:00;1,5
2025-01-01 01:00;2025-01-01 02:00;2.25
";
        let records = read_usage_csv(csv.as_bytes(), 2).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].energy, "1.5".parse().unwrap());
        assert_eq!(records[1].energy, "2.25".parse().unwrap());
        assert_eq!(records[0].timestamp.to_string(), "2025-01-01 00:00:00");
    }

    #[test]
    fn header_columns_may_be_reordered() {
        let csv = "\
Usage;Timestamp
1.5;2025-01-01 00:00
2.5;2025-01-01 01:00
";
        let records = read_usage_csv(csv.as_bytes(), 2).unwrap();
        assert_eq!(records[0].energy, "1.5".parse().unwrap());
    }

    #[test]
    fn headerless_exports_use_the_first_two_columns() {
        let csv = "\
2025-01-01T00:00;0.8
2025-01-01T01:00;1.2
";
        let records = read_usage_csv(csv.as_bytes(), 2).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn disclaimer_lines_above_the_header_are_ignored() {
        let csv = "\
Exported from the meter portal
Customer;12345
Start time;Usage kWh
2025-01-01 00:00;1.0
2025-01-01 01:00;2.0
";
        let records = read_usage_csv(csv.as_bytes(), 2).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn malformed_rows_are_dropped_not_fatal() {
        let csv = "\
Start time;Usage kWh
2025-01-01 00:00;1.0
not a date;1.0
2025-01-01 01:00;garbage
2025-01-01 01:00;2.0
";
        let records = read_usage_csv(csv.as_bytes(), 2).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn too_few_rows_are_rejected() {
        let csv = "\
Start time;Usage kWh
2025-01-01 00:00;1.0
";
        let result = read_usage_csv(csv.as_bytes(), 100);
        assert!(matches!(
            result,
            Err(Error::NotEnoughRows {
                found: 1,
                minimum: 100
            })
        ));
    }

    #[test]
    fn out_of_order_timestamps_are_rejected() {
        let csv = "\
Start time;Usage kWh
2025-01-01 00:00;1.0
2025-01-01 01:00;1.0
2025-01-01 00:30;1.0
";
        let result = read_usage_csv(csv.as_bytes(), 2);
        assert!(matches!(result, Err(Error::OutOfOrder { row: 3 })));
    }

    #[test]
    fn wrong_sampling_interval_is_rejected() {
        let csv = "\
Start time;Usage kWh
2025-01-01 00:00;1.0
2025-01-01 00:15;1.0
";
        let result = read_usage_csv(csv.as_bytes(), 2);
        assert!(matches!(
            result,
            Err(Error::UnexpectedInterval { minutes: 15 })
        ));
    }

    #[test]
    fn slight_clock_drift_is_tolerated() {
        let csv = "\
Start time;Usage kWh
2025-01-01 00:00:00;1.0
2025-01-01 01:00:30;1.0
";
        assert!(read_usage_csv(csv.as_bytes(), 2).is_ok());
    }
}
