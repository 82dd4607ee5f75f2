use chrono::Timelike;
use log::{debug, warn};
use polars::prelude::*;
use std::collections::BTreeSet;

use crate::config::{FlatRates, TimeWindowRates};
use crate::core::domain::columns::{DISTANCE, TIMESTAMP, VEHICLE_TYPE};
use crate::core::domain::{numeric_values, string_values};
use crate::error::{TransformError, TransformResult};
use crate::time::timestamp_values;
use crate::transformations::schema::require_columns;

pub const TOLL_RATE: &str = "toll_rate";
pub const TOLL_CHARGE: &str = "toll_charge";
pub const TIME_BASED_TOLL_RATE: &str = "time_based_toll_rate";
pub const TIME_BASED_TOLL_CHARGE: &str = "time_based_toll_charge";

fn with_rate_columns(
    df: &DataFrame,
    rate_name: &str,
    rates: Vec<f64>,
    charge_name: &str,
    charges: Vec<Option<f64>>,
) -> TransformResult<DataFrame> {
    let mut out = df.clone();
    out.with_column(Column::new(rate_name.into(), rates))?;
    out.with_column(Column::new(charge_name.into(), charges))?;
    Ok(out)
}

/// Add flat `toll_rate` and `toll_charge` columns
///
/// `toll_rate` is looked up by `vehicle_type`; `toll_charge` is
/// `distance * toll_rate` (null where the distance is null).
///
/// # Arguments
/// * `df` - Long-form DataFrame with `vehicle_type` and `distance`
/// * `rates` - Rate per vehicle type
///
/// # Returns
/// A copy of `df` with the two columns appended, rows in the same order.
/// Fails with `UnknownVehicleType` on the first type missing from `rates`.
pub fn calculate_toll_rate(df: &DataFrame, rates: &FlatRates) -> TransformResult<DataFrame> {
    require_columns(df, &[VEHICLE_TYPE, DISTANCE])?;
    debug!("Pricing {} records with flat rates", df.height());

    let vehicle_types = string_values(df, VEHICLE_TYPE)?;
    let distances = numeric_values(df, DISTANCE)?;

    let mut toll_rates = Vec::with_capacity(df.height());
    let mut charges = Vec::with_capacity(df.height());
    for (vehicle_type, distance) in vehicle_types.into_iter().zip(distances) {
        let rate = vehicle_type
            .and_then(|vt| rates.rate(vt))
            .ok_or_else(|| {
                TransformError::UnknownVehicleType(vehicle_type.unwrap_or("<null>").to_string())
            })?;
        toll_rates.push(rate);
        charges.push(distance.map(|d| d * rate));
    }

    with_rate_columns(df, TOLL_RATE, toll_rates, TOLL_CHARGE, charges)
}

/// Add `time_based_toll_rate` and `time_based_toll_charge` columns
///
/// Each record's rate comes from the time window containing the hour of its
/// `timestamp`. Vehicle types a window does not price get a rate of 0.0, as
/// do records with a null timestamp or vehicle type.
///
/// # Arguments
/// * `df` - Long-form DataFrame with `timestamp`, `vehicle_type`, `distance`
/// * `rates` - Time windows partitioning the day
///
/// # Returns
/// A copy of `df` with the two columns appended, rows in the same order
pub fn calculate_time_based_toll_rates(
    df: &DataFrame,
    rates: &TimeWindowRates,
) -> TransformResult<DataFrame> {
    require_columns(df, &[TIMESTAMP, VEHICLE_TYPE, DISTANCE])?;
    debug!("Pricing {} records with time windows", df.height());

    let timestamps = timestamp_values(df, TIMESTAMP)?;
    let vehicle_types = string_values(df, VEHICLE_TYPE)?;
    let distances = numeric_values(df, DISTANCE)?;

    let mut unpriced = BTreeSet::new();
    let mut toll_rates = Vec::with_capacity(df.height());
    let mut charges = Vec::with_capacity(df.height());
    for ((timestamp, vehicle_type), distance) in
        timestamps.into_iter().zip(vehicle_types).zip(distances)
    {
        let rate = match (timestamp, vehicle_type) {
            (Some(ts), Some(vt)) => rates.rate(ts.hour(), vt).unwrap_or_else(|| {
                unpriced.insert(vt);
                0.0
            }),
            _ => 0.0,
        };
        toll_rates.push(rate);
        charges.push(distance.map(|d| d * rate));
    }

    if !unpriced.is_empty() {
        warn!(
            "No time-based rate for vehicle type(s) {:?}, charged at 0.0",
            unpriced
        );
    }

    with_rate_columns(
        df,
        TIME_BASED_TOLL_RATE,
        toll_rates,
        TIME_BASED_TOLL_CHARGE,
        charges,
    )
}
