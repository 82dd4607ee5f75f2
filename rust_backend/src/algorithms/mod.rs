//! Route, vehicle and toll analytics.
//!
//! This module provides the aggregations, coverage checks and toll pricing
//! applied to vehicle and route tables.
//!
//! # Components
//!
//! - [`analysis`]: Value counts, outlier rows, route filtering, distance thresholds
//! - [`coverage`]: Per-pair check for full hour-of-day and date coverage
//! - [`tolls`]: Flat and time-window toll pricing
//!
//! # Example
//!
//! ```no_run
//! use toll_rust::algorithms::calculate_toll_rate;
//! use toll_rust::config::FlatRates;
//! use polars::prelude::*;
//!
//! # fn example(routes: &DataFrame) -> toll_rust::TransformResult<()> {
//! let priced = calculate_toll_rate(routes, &FlatRates::default())?;
//! println!("{}", priced);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod coverage;
pub mod tolls;

pub use analysis::{
    filter_routes, find_ids_within_percentage_threshold, find_ids_within_ten_percentage_threshold,
    get_bus_indexes, get_type_count,
};
pub use coverage::time_check;
pub use tolls::{calculate_time_based_toll_rates, calculate_toll_rate};
