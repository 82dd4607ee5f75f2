//! Toll-road route and vehicle analytics over Polars DataFrames.
//!
//! Every transform takes a `&DataFrame`, leaves it untouched, and returns a
//! new table or a derived collection. Failures are reported through
//! [`TransformError`].

#[cfg(feature = "python")]
use pyo3::prelude::*;

pub mod algorithms;
pub mod config;
pub mod core;
pub mod error;
pub mod io;
#[cfg(feature = "python")]
pub mod python;
pub mod time;
pub mod transformations;

pub use error::{TransformError, TransformResult};

/// Toll analytics - route matrices, vehicle statistics and toll pricing
#[cfg(feature = "python")]
#[pymodule]
fn toll_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Register matrix and distance transforms
    m.add_function(wrap_pyfunction!(python::py_generate_car_matrix, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_multiply_matrix, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_calculate_distance_matrix, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_unroll_distance_matrix, m)?)?;

    // Register statistics and coverage checks
    m.add_function(wrap_pyfunction!(python::py_get_type_count, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_get_bus_indexes, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_filter_routes, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_time_check, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_find_ids_within_percentage_threshold, m)?)?;

    // Register toll pricing
    m.add_function(wrap_pyfunction!(python::py_calculate_toll_rate, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_calculate_time_based_toll_rates, m)?)?;

    Ok(())
}
