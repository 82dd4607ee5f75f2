use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;

use crate::error::{TransformError, TransformResult};

/// Accepted textual layouts, tried in order after RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Parse a textual timestamp into a naive date-time.
///
/// Offsets in RFC 3339 input are normalised to UTC. A bare date parses as
/// midnight.
///
/// # Example
/// ```
/// use chrono::Timelike;
/// use toll_rust::time::parse_timestamp;
///
/// let ts = parse_timestamp("2024-03-01 07:15:00").unwrap();
/// assert_eq!(ts.hour(), 7);
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Convert a physical Polars datetime value into a naive UTC date-time.
pub fn epoch_to_datetime(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let (per_second, nanos_per_unit) = match unit {
        TimeUnit::Nanoseconds => (1_000_000_000, 1),
        TimeUnit::Microseconds => (1_000_000, 1_000),
        TimeUnit::Milliseconds => (1_000, 1_000_000),
    };
    let seconds = value.div_euclid(per_second);
    let nanos = value.rem_euclid(per_second) * nanos_per_unit;
    DateTime::from_timestamp(seconds, nanos as u32).map(|dt| dt.naive_utc())
}

/// Read the named column of `df` as timestamps.
///
/// `Datetime` columns are read through their physical representation
/// (time-zone aware columns therefore yield UTC wall-clock values). String
/// columns are parsed with [`parse_timestamp`]; a value that does not parse
/// is a schema error naming its row. Nulls stay `None`.
pub fn timestamp_values(
    df: &DataFrame,
    name: &str,
) -> TransformResult<Vec<Option<NaiveDateTime>>> {
    let column = df.column(name)?;
    match column.dtype() {
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let physical = column.cast(&DataType::Int64)?;
            physical
                .i64()?
                .into_iter()
                .enumerate()
                .map(|(row, value)| match value {
                    Some(value) => epoch_to_datetime(value, unit).map(Some).ok_or_else(|| {
                        TransformError::Schema(format!(
                            "Column '{}' row {}: timestamp out of range",
                            name, row
                        ))
                    }),
                    None => Ok(None),
                })
                .collect()
        }
        DataType::String => column
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                Some(text) => parse_timestamp(text).map(Some).ok_or_else(|| {
                    TransformError::Schema(format!(
                        "Column '{}' row {}: cannot parse timestamp '{}'",
                        name, row, text
                    ))
                }),
                None => Ok(None),
            })
            .collect(),
        other => Err(TransformError::Schema(format!(
            "Column '{}' has dtype {:?}, expected datetimes or strings",
            name, other
        ))),
    }
}
