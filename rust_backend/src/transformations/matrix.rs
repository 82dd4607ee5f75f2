//! Square-matrix construction and elementwise transforms.
//!
//! A square matrix here is a `DataFrame` whose first column holds the row
//! labels and whose remaining columns are named after the column labels.

use log::{debug, warn};
use polars::prelude::*;
use std::collections::{BTreeSet, HashMap};

use crate::core::domain::{column_keys, keys_to_column, numeric_values, Key};
use crate::error::{TransformError, TransformResult};
use crate::transformations::schema::require_columns;

pub const ID_1: &str = "id_1";
pub const ID_2: &str = "id_2";
pub const CAR: &str = "car";

/// Cells of a pivot keyed by (row label, column label), with both label sets
/// kept sorted.
struct Pivot<T> {
    row_labels: Vec<Key>,
    col_labels: Vec<Key>,
    cells: HashMap<(Key, Key), T>,
}

impl<T: Copy + Default> Pivot<T> {
    fn build(rows: Vec<Option<Key>>, cols: Vec<Option<Key>>, values: Vec<Option<T>>) -> Self {
        let mut row_labels = BTreeSet::new();
        let mut col_labels = BTreeSet::new();
        let mut cells = HashMap::new();

        for ((row, col), value) in rows.into_iter().zip(cols).zip(values) {
            let (Some(row), Some(col)) = (row, col) else {
                continue;
            };
            row_labels.insert(row.clone());
            col_labels.insert(col.clone());
            let pair = (row, col);
            if cells.insert(pair.clone(), value.unwrap_or_default()).is_some() {
                warn!(
                    "Duplicate ({}, {}) pair in car matrix input, keeping the last value",
                    pair.0, pair.1
                );
            }
        }

        Pivot {
            row_labels: row_labels.into_iter().collect(),
            col_labels: col_labels.into_iter().collect(),
            cells,
        }
    }

    /// Assemble the matrix, building each value column with `make_column`.
    fn into_frame<F>(self, make_column: F) -> TransformResult<DataFrame>
    where
        F: Fn(&Key, Vec<T>) -> Column,
    {
        let mut columns = Vec::with_capacity(self.col_labels.len() + 1);
        columns.push(keys_to_column(ID_1, &self.row_labels));

        for col in &self.col_labels {
            let values: Vec<T> = self
                .row_labels
                .iter()
                .map(|row| {
                    self.cells
                        .get(&(row.clone(), col.clone()))
                        .copied()
                        .unwrap_or_default()
                })
                .collect();
            columns.push(make_column(col, values));
        }

        Ok(DataFrame::new(columns)?)
    }
}

/// Pivot `car` values into an `id_1` × `id_2` matrix.
///
/// Row and column labels are the distinct key values in ascending order.
/// Combinations absent from the input are 0. When a pair appears more than
/// once the last occurrence wins. Cells keep an integer dtype when `car` is
/// an integer column.
///
/// # Arguments
/// * `df` - DataFrame with `id_1`, `id_2` and `car` columns
///
/// # Returns
/// Matrix whose first column is `id_1` and whose other columns are named
/// after the `id_2` labels
pub fn generate_car_matrix(df: &DataFrame) -> TransformResult<DataFrame> {
    require_columns(df, &[ID_1, ID_2, CAR])?;
    debug!("Building car matrix from {} rows", df.height());

    let rows = column_keys(df, ID_1)?;
    let cols = column_keys(df, ID_2)?;
    let car = df.column(CAR)?;

    if car.dtype().is_integer() {
        let values: Vec<Option<i64>> = car.cast(&DataType::Int64)?.i64()?.into_iter().collect();
        Pivot::build(rows, cols, values)
            .into_frame(|col, values| Column::new(col.to_string().into(), values))
    } else {
        let values = numeric_values(df, CAR)?;
        Pivot::build(rows, cols, values)
            .into_frame(|col, values| Column::new(col.to_string().into(), values))
    }
}

fn scale_int(value: i64) -> Option<i64> {
    if value % 2 == 0 {
        value.checked_mul(2)
    } else {
        value.checked_mul(3)
    }
}

fn scale_float(value: f64) -> f64 {
    if value % 2.0 == 0.0 {
        value * 2.0
    } else {
        value * 3.0
    }
}

fn scale_column(column: &Column) -> TransformResult<Column> {
    let dtype = column.dtype();
    let name = column.name().clone();
    if dtype.is_integer() {
        let ints = column.cast(&DataType::Int64)?;
        let scaled = ints
            .i64()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                Some(v) => scale_int(v).map(Some).ok_or_else(|| {
                    TransformError::Overflow(format!(
                        "Column '{}' row {}: scaling {} exceeds the Int64 range",
                        name, row, v
                    ))
                }),
                None => Ok(None),
            })
            .collect::<TransformResult<Vec<Option<i64>>>>()?;
        Ok(Column::new(name, scaled))
    } else if dtype.is_float() {
        let floats = column.cast(&DataType::Float64)?;
        let scaled: Vec<Option<f64>> = floats
            .f64()?
            .into_iter()
            .map(|v| v.map(scale_float))
            .collect();
        Ok(Column::new(name, scaled))
    } else {
        Err(TransformError::Schema(format!(
            "Column '{}' has dtype {:?}, expected a numeric column",
            name, dtype
        )))
    }
}

/// Multiply every even cell by 2 and every odd cell by 3.
///
/// The shape and column order are unchanged. Integer columns come back as
/// `Int64`, float columns as `Float64`; nulls stay null. `label_column`, when
/// given, is copied through untouched (pass the first column of a matrix
/// built by [`generate_car_matrix`]).
///
/// Applying the transform twice keeps scaling: it has no fixed point for
/// non-zero cells.
pub fn multiply_matrix(matrix: &DataFrame, label_column: Option<&str>) -> TransformResult<DataFrame> {
    if let Some(label) = label_column {
        require_columns(matrix, &[label])?;
    }

    let columns = matrix
        .get_columns()
        .iter()
        .map(|column| {
            if Some(column.name().as_str()) == label_column {
                Ok(column.clone())
            } else {
                scale_column(column)
            }
        })
        .collect::<TransformResult<Vec<Column>>>()?;

    Ok(DataFrame::new(columns)?)
}
