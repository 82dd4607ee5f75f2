//! Domain values shared by the table transforms.
//!
//! Tables themselves are plain Polars `DataFrame`s. This module defines the
//! label type used for row/column keys and the helpers that pull typed cell
//! values out of a frame, reporting unusable dtypes as schema errors.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{TransformError, TransformResult};

/// Column names used across the long-form (unrolled) tables.
pub mod columns {
    pub const ID_START: &str = "id_start";
    pub const ID_END: &str = "id_end";
    pub const DISTANCE: &str = "distance";
    pub const VEHICLE_TYPE: &str = "vehicle_type";
    pub const TIMESTAMP: &str = "timestamp";
}

/// A row or column label taken from a key column.
///
/// Integer dtypes of any width are widened to `Int`; string columns produce
/// `Str`. Ordering puts every integer before every string, integers compare
/// numerically and strings lexically, so sorted label sets are deterministic
/// even for mixed inputs.
///
/// # Examples
///
/// ```
/// use toll_rust::core::domain::Key;
///
/// let mut labels = vec![Key::from("b"), Key::from(10), Key::from(2)];
/// labels.sort();
/// assert_eq!(labels, vec![Key::from(2), Key::from(10), Key::from("b")]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl Key {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Key::Int(value) => Some(*value),
            Key::Str(_) => None,
        }
    }

    /// Parses a rendered label back into a key of the same kind as the
    /// labels it sits next to. Used for matrix column names, which are
    /// always text.
    pub fn parse_label(text: &str, integer: bool) -> TransformResult<Key> {
        if integer {
            text.trim().parse::<i64>().map(Key::Int).map_err(|_| {
                TransformError::Schema(format!(
                    "Column label '{}' is not an integer like its row labels",
                    text
                ))
            })
        } else {
            Ok(Key::Str(text.to_string()))
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(value) => write!(f, "{}", value),
            Key::Str(value) => f.write_str(value),
        }
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value)
    }
}

/// A cell value counted by equality: an integer, a float or a string.
///
/// Floats compare and hash by bit pattern (with `-0.0` folded into `0.0`),
/// so every float value can be a map key. Integer and float variants never
/// compare equal to each other.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl CellValue {
    fn float_bits(value: f64) -> u64 {
        if value == 0.0 {
            0.0f64.to_bits()
        } else {
            value.to_bits()
        }
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => {
                Self::float_bits(*a) == Self::float_bits(*b)
            }
            (CellValue::Str(a), CellValue::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Int(value) => value.hash(state),
            CellValue::Float(value) => Self::float_bits(*value).hash(state),
            CellValue::Str(value) => value.hash(state),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(value) => write!(f, "{}", value),
            CellValue::Float(value) => write!(f, "{}", value),
            CellValue::Str(value) => f.write_str(value),
        }
    }
}

impl From<Key> for CellValue {
    fn from(key: Key) -> Self {
        match key {
            Key::Int(value) => CellValue::Int(value),
            Key::Str(value) => CellValue::Str(value),
        }
    }
}

/// Read the named column of `df` as countable cell values.
///
/// Integer columns widen to `Int`, float columns keep every value as
/// `Float`, string columns produce `Str`. Other dtypes are a schema error.
pub fn cell_values(df: &DataFrame, name: &str) -> TransformResult<Vec<Option<CellValue>>> {
    let column = df.column(name)?;
    let dtype = column.dtype();
    if dtype.is_float() {
        let floats = column.cast(&DataType::Float64)?;
        Ok(floats.f64()?.into_iter().map(|v| v.map(CellValue::Float)).collect())
    } else {
        Ok(column_to_keys(column)?
            .into_iter()
            .map(|v| v.map(CellValue::from))
            .collect())
    }
}

/// Read a key column as labels.
///
/// Float columns are accepted when every value is integral (CSV readers
/// often infer `1.0` for id-like columns); anything else is a schema error.
pub fn column_to_keys(column: &Column) -> TransformResult<Vec<Option<Key>>> {
    let dtype = column.dtype();
    if dtype.is_integer() {
        let ints = column.cast(&DataType::Int64)?;
        Ok(ints.i64()?.into_iter().map(|v| v.map(Key::Int)).collect())
    } else if dtype.is_float() {
        let floats = column.cast(&DataType::Float64)?;
        floats
            .f64()?
            .into_iter()
            .map(|v| match v {
                Some(v) if v.is_finite() && v.fract() == 0.0 => Ok(Some(Key::Int(v as i64))),
                Some(v) => Err(TransformError::Schema(format!(
                    "Column '{}' holds non-integral key {}",
                    column.name(),
                    v
                ))),
                None => Ok(None),
            })
            .collect()
    } else if dtype == &DataType::String {
        Ok(column
            .str()?
            .into_iter()
            .map(|v| v.map(|s| Key::Str(s.to_string())))
            .collect())
    } else {
        Err(TransformError::Schema(format!(
            "Column '{}' has dtype {:?}, expected integer or string keys",
            column.name(),
            dtype
        )))
    }
}

/// Read the named key column of `df` as labels.
pub fn column_keys(df: &DataFrame, name: &str) -> TransformResult<Vec<Option<Key>>> {
    column_to_keys(df.column(name)?)
}

/// Build a column from labels: `Int64` when every label is an integer,
/// `String` otherwise.
pub fn keys_to_column(name: &str, keys: &[Key]) -> Column {
    if keys.iter().all(|k| matches!(k, Key::Int(_))) {
        let values: Vec<i64> = keys.iter().filter_map(Key::as_int).collect();
        Column::new(name.into(), values)
    } else {
        let values: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        Column::new(name.into(), values)
    }
}

/// Read a numeric column as `f64` values.
pub fn column_to_f64(column: &Column) -> TransformResult<Vec<Option<f64>>> {
    let dtype = column.dtype();
    if !(dtype.is_integer() || dtype.is_float()) {
        return Err(TransformError::Schema(format!(
            "Column '{}' has dtype {:?}, expected a numeric column",
            column.name(),
            dtype
        )));
    }
    let floats = column.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().collect())
}

/// Read the named numeric column of `df` as `f64` values.
pub fn numeric_values(df: &DataFrame, name: &str) -> TransformResult<Vec<Option<f64>>> {
    column_to_f64(df.column(name)?)
}

/// Borrow the named string column of `df`.
pub fn string_values<'a>(df: &'a DataFrame, name: &str) -> TransformResult<Vec<Option<&'a str>>> {
    let column = df.column(name)?;
    if column.dtype() != &DataType::String {
        return Err(TransformError::Schema(format!(
            "Column '{}' has dtype {:?}, expected strings",
            name,
            column.dtype()
        )));
    }
    Ok(column.str()?.into_iter().collect())
}
