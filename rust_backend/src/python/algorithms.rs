use pyo3::prelude::*;
use serde_json::json;

use super::{dataframe_to_records, key_from_py, records_to_dataframe, to_json_string};
use crate::algorithms::{analysis, coverage, tolls};
use crate::config::TollConfig;

fn load_config(config_path: Option<&str>) -> PyResult<TollConfig> {
    let config = match config_path {
        Some(path) => TollConfig::from_file(path)?,
        None => TollConfig::load_default()?,
    };
    Ok(config)
}

/// Count `car` values, most frequent first
#[pyfunction]
pub fn py_get_type_count(records_json: String) -> PyResult<String> {
    let df = records_to_dataframe(&records_json)?;
    let counts = analysis::get_type_count(&df)?;
    let pairs: Vec<_> = counts
        .iter()
        .map(|(value, count)| json!({ "value": value, "count": count }))
        .collect();
    to_json_string(&pairs)
}

/// Row indices whose `bus` value exceeds twice the mean
#[pyfunction]
pub fn py_get_bus_indexes(records_json: String) -> PyResult<Vec<usize>> {
    let df = records_to_dataframe(&records_json)?;
    Ok(analysis::get_bus_indexes(&df)?)
}

/// Routes whose average `truck` value is greater than 7
#[pyfunction]
pub fn py_filter_routes(records_json: String) -> PyResult<String> {
    let df = records_to_dataframe(&records_json)?;
    to_json_string(&analysis::filter_routes(&df)?)
}

/// Per-pair completeness of hour-of-day and date coverage
#[pyfunction]
pub fn py_time_check(records_json: String) -> PyResult<String> {
    let df = records_to_dataframe(&records_json)?;
    let flags: Vec<_> = coverage::time_check(&df)?
        .into_iter()
        .map(|((id, id_2), complete)| json!({ "id": id, "id_2": id_2, "complete": complete }))
        .collect();
    to_json_string(&flags)
}

/// Ids whose average distance is within `fraction` of the reference id's
#[pyfunction]
#[pyo3(signature = (records_json, reference_id, fraction=analysis::DEFAULT_DISTANCE_THRESHOLD))]
pub fn py_find_ids_within_percentage_threshold(
    records_json: String,
    reference_id: &Bound<'_, PyAny>,
    fraction: f64,
) -> PyResult<String> {
    let df = records_to_dataframe(&records_json)?;
    let reference_id = key_from_py(reference_id)?;
    let ids = analysis::find_ids_within_percentage_threshold(&df, &reference_id, fraction)?;
    to_json_string(&ids)
}

/// Add flat `toll_rate` and `toll_charge` columns
#[pyfunction]
#[pyo3(signature = (records_json, config_path=None))]
pub fn py_calculate_toll_rate(records_json: String, config_path: Option<&str>) -> PyResult<String> {
    let df = records_to_dataframe(&records_json)?;
    let config = load_config(config_path)?;
    let result = tolls::calculate_toll_rate(&df, &config.flat_rates)?;
    dataframe_to_records(&result)
}

/// Add `time_based_toll_rate` and `time_based_toll_charge` columns
#[pyfunction]
#[pyo3(signature = (records_json, config_path=None))]
pub fn py_calculate_time_based_toll_rates(
    records_json: String,
    config_path: Option<&str>,
) -> PyResult<String> {
    let df = records_to_dataframe(&records_json)?;
    let windows = load_config(config_path)?.time_window_rates()?;
    let result = tolls::calculate_time_based_toll_rates(&df, &windows)?;
    dataframe_to_records(&result)
}
