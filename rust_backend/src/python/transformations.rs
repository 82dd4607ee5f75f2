use pyo3::prelude::*;

use super::{dataframe_to_records, records_to_dataframe};
use crate::transformations::{distance, matrix};

/// Pivot `car` values into an `id_1` x `id_2` matrix
#[pyfunction]
pub fn py_generate_car_matrix(records_json: String) -> PyResult<String> {
    let df = records_to_dataframe(&records_json)?;
    let result = matrix::generate_car_matrix(&df)?;
    dataframe_to_records(&result)
}

/// Double even cells and triple odd cells
#[pyfunction]
#[pyo3(signature = (records_json, label_column=None))]
pub fn py_multiply_matrix(records_json: String, label_column: Option<&str>) -> PyResult<String> {
    let df = records_to_dataframe(&records_json)?;
    let result = matrix::multiply_matrix(&df, label_column)?;
    dataframe_to_records(&result)
}

/// Euclidean distance matrix over `latitude`/`longitude` rows
#[pyfunction]
pub fn py_calculate_distance_matrix(records_json: String) -> PyResult<String> {
    let df = records_to_dataframe(&records_json)?;
    let result = distance::calculate_distance_matrix(&df)?;
    dataframe_to_records(&result)
}

/// Unroll a distance matrix into `id_start`, `id_end`, `distance` records
#[pyfunction]
pub fn py_unroll_distance_matrix(records_json: String) -> PyResult<String> {
    let df = records_to_dataframe(&records_json)?;
    let result = distance::unroll_distance_matrix(&df)?;
    dataframe_to_records(&result)
}
