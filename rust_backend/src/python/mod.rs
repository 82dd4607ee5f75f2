//! Python bindings for the toll and route transforms.
//!
//! Tables cross the boundary as JSON strings holding an array of row
//! objects, so any Python dataframe library can call in with
//! `df.to_json(orient="records")` and read the result back the same way.
//!
//! # Modules
//!
//! - [`transformations`]: Matrix construction, scaling, distances, unrolling
//! - [`algorithms`]: Counts, outliers, route filters, coverage, toll pricing
//!
//! # Python API
//!
//! All functions are available in the `toll_rust` Python module after installation.

pub mod algorithms;
pub mod transformations;

pub use algorithms::*;
pub use transformations::*;

use polars::prelude::DataFrame;
use pyo3::exceptions::{PyKeyError, PyOverflowError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::core::domain::Key;
use crate::error::TransformError;
use crate::io::loaders::{dataframe_to_json, TableLoader};

impl From<TransformError> for PyErr {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::UnknownVehicleType(_) => PyKeyError::new_err(err.to_string()),
            TransformError::Overflow(_) => PyOverflowError::new_err(err.to_string()),
            TransformError::Polars(_) => PyRuntimeError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

pub(crate) fn records_to_dataframe(records_json: &str) -> PyResult<DataFrame> {
    TableLoader::load_from_json_str(records_json)
        .map(|result| result.dataframe)
        .map_err(|e| PyValueError::new_err(format!("Failed to parse JSON: {:#}", e)))
}

pub(crate) fn dataframe_to_records(df: &DataFrame) -> PyResult<String> {
    dataframe_to_json(df)
        .map_err(|e| PyRuntimeError::new_err(format!("Failed to serialize result: {:#}", e)))
}

pub(crate) fn to_json_string<T: serde::Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value).map_err(|e| {
        PyRuntimeError::new_err(format!("Failed to serialize result: {}", e))
    })
}

pub(crate) fn key_from_py(value: &Bound<'_, PyAny>) -> PyResult<Key> {
    if let Ok(int) = value.extract::<i64>() {
        return Ok(Key::Int(int));
    }
    let text: String = value.extract()?;
    Ok(Key::Str(text))
}
