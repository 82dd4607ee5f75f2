use chrono::{NaiveDate, NaiveDateTime, Timelike};
use indexmap::IndexMap;
use log::debug;
use polars::prelude::*;
use std::collections::BTreeSet;

use crate::core::domain::columns::TIMESTAMP;
use crate::core::domain::{column_keys, Key};
use crate::error::TransformResult;
use crate::time::timestamp_values;
use crate::transformations::schema::require_columns;

pub const ID: &str = "id";
pub const ID_2: &str = "id_2";

/// Bit set with one bit per hour of the day.
const ALL_HOURS: u32 = (1 << 24) - 1;

/// Hours and dates observed for one (`id`, `id_2`) pair.
#[derive(Debug, Default, Clone)]
struct Coverage {
    hours: u32,
    dates: BTreeSet<NaiveDate>,
}

impl Coverage {
    fn observe(&mut self, timestamp: NaiveDateTime) {
        self.hours |= 1 << timestamp.hour();
        self.dates.insert(timestamp.date());
    }

    /// Every hour seen, and no calendar date missing between the first and
    /// last observed day. A day counts as present with a single reading.
    fn is_complete(&self) -> bool {
        if self.hours != ALL_HOURS {
            return false;
        }
        match (self.dates.first(), self.dates.last()) {
            (Some(first), Some(last)) => {
                let span = last.signed_duration_since(*first).num_days() + 1;
                span == self.dates.len() as i64
            }
            _ => false,
        }
    }
}

/// Check each (`id`, `id_2`) pair for full hour-of-day and date coverage
///
/// # Arguments
/// * `df` - DataFrame with `id`, `id_2` and `timestamp` columns; timestamps
///   may be a `Datetime` column or parseable strings
///
/// # Returns
/// One flag per distinct pair, in order of first appearance. Rows with a
/// null key or null timestamp contribute nothing.
pub fn time_check(df: &DataFrame) -> TransformResult<IndexMap<(Key, Key), bool>> {
    require_columns(df, &[ID, ID_2, TIMESTAMP])?;
    debug!("Checking time coverage over {} rows", df.height());

    let ids = column_keys(df, ID)?;
    let ids_2 = column_keys(df, ID_2)?;
    let timestamps = timestamp_values(df, TIMESTAMP)?;

    let mut groups: IndexMap<(Key, Key), Coverage> = IndexMap::new();
    for ((id, id_2), timestamp) in ids.into_iter().zip(ids_2).zip(timestamps) {
        let (Some(id), Some(id_2)) = (id, id_2) else {
            continue;
        };
        let coverage = groups.entry((id, id_2)).or_default();
        if let Some(timestamp) = timestamp {
            coverage.observe(timestamp);
        }
    }

    Ok(groups
        .into_iter()
        .map(|(pair, coverage)| (pair, coverage.is_complete()))
        .collect())
}
