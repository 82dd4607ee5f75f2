//! Distance matrices and their long-form (unrolled) representation.

use log::debug;
use polars::prelude::*;

use crate::core::domain::columns::{DISTANCE, ID_END, ID_START};
use crate::core::domain::{column_to_f64, column_to_keys, keys_to_column, numeric_values, Key};
use crate::error::{TransformError, TransformResult};
use crate::transformations::schema::require_columns;

pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";

/// Label column of matrices built by [`calculate_distance_matrix`].
pub const MATRIX_INDEX: &str = "id";

/// Pairwise Euclidean distances between the rows of `df`.
///
/// Locations are identified by row index. The result has an `id` column with
/// the indices `0..n` followed by one column per location named `"0"` to
/// `"n-1"`. Distances are in the units of the coordinates; the diagonal is 0
/// and the matrix is symmetric.
pub fn calculate_distance_matrix(df: &DataFrame) -> TransformResult<DataFrame> {
    require_columns(df, &[LATITUDE, LONGITUDE])?;
    debug!("Computing distance matrix for {} locations", df.height());

    let latitudes = numeric_values(df, LATITUDE)?;
    let longitudes = numeric_values(df, LONGITUDE)?;
    let points = latitudes
        .into_iter()
        .zip(longitudes)
        .enumerate()
        .map(|(row, coords)| match coords {
            (Some(lat), Some(lon)) => Ok((lat, lon)),
            _ => Err(TransformError::Schema(format!(
                "Missing coordinates at row {}",
                row
            ))),
        })
        .collect::<TransformResult<Vec<(f64, f64)>>>()?;

    let mut columns = Vec::with_capacity(points.len() + 1);
    let labels: Vec<i64> = (0..points.len() as i64).collect();
    columns.push(Column::new(MATRIX_INDEX.into(), labels));

    for (j, &(lat_j, lon_j)) in points.iter().enumerate() {
        let distances: Vec<f64> = points
            .iter()
            .map(|&(lat_i, lon_i)| (lat_i - lat_j).hypot(lon_i - lon_j))
            .collect();
        columns.push(Column::new(j.to_string().into(), distances));
    }

    Ok(DataFrame::new(columns)?)
}

/// Unroll a square matrix into `id_start`, `id_end`, `distance` records.
///
/// The first column of `matrix` holds the row labels. Records are emitted
/// row-major in the matrix's own row and column order; self-pairs and null
/// cells are skipped. Column names are read back as the same kind of label
/// as the rows, so an integer-labelled matrix unrolls to integer ids.
pub fn unroll_distance_matrix(matrix: &DataFrame) -> TransformResult<DataFrame> {
    let Some((label_column, value_columns)) = matrix.get_columns().split_first() else {
        return Err(TransformError::Schema(
            "Distance matrix has no label column".to_string(),
        ));
    };
    debug!(
        "Unrolling {}x{} distance matrix",
        matrix.height(),
        value_columns.len()
    );

    let row_labels = column_to_keys(label_column)?
        .into_iter()
        .enumerate()
        .map(|(row, label)| {
            label.ok_or_else(|| {
                TransformError::Schema(format!("Distance matrix row {} has no label", row))
            })
        })
        .collect::<TransformResult<Vec<Key>>>()?;
    // Integral float labels read as integers too, so go by the parsed keys
    let integer_labels = if row_labels.is_empty() {
        label_column.dtype().is_integer()
    } else {
        row_labels.iter().all(|label| matches!(label, Key::Int(_)))
    };

    let col_labels = value_columns
        .iter()
        .map(|column| Key::parse_label(column.name().as_str(), integer_labels))
        .collect::<TransformResult<Vec<Key>>>()?;
    let col_values = value_columns
        .iter()
        .map(column_to_f64)
        .collect::<TransformResult<Vec<Vec<Option<f64>>>>>()?;

    let mut starts = Vec::new();
    let mut ends = Vec::new();
    let mut distances = Vec::new();

    for (i, start) in row_labels.iter().enumerate() {
        for (end, values) in col_labels.iter().zip(&col_values) {
            if start == end {
                continue;
            }
            if let Some(distance) = values[i] {
                starts.push(start.clone());
                ends.push(end.clone());
                distances.push(distance);
            }
        }
    }

    Ok(DataFrame::new(vec![
        keys_to_column(ID_START, &starts),
        keys_to_column(ID_END, &ends),
        Column::new(DISTANCE.into(), distances),
    ])?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_distance_matrix() {
        let df = df!(
            "latitude" => &[0.0, 3.0, 0.0],
            "longitude" => &[0.0, 4.0, 1.0],
        )
        .unwrap();

        let matrix = calculate_distance_matrix(&df).unwrap();
        assert_eq!(matrix.shape(), (3, 4));

        let col0 = matrix.column("0").unwrap().f64().unwrap();
        assert_eq!(col0.get(0), Some(0.0));
        assert_eq!(col0.get(1), Some(5.0));
        assert_eq!(col0.get(2), Some(1.0));

        let col1 = matrix.column("1").unwrap().f64().unwrap();
        assert_eq!(col1.get(0), Some(5.0));
    }

    #[test]
    fn test_calculate_distance_matrix_rejects_null_coordinates() {
        let df = df!(
            "latitude" => &[Some(0.0), None],
            "longitude" => &[Some(0.0), Some(1.0)],
        )
        .unwrap();
        assert!(matches!(
            calculate_distance_matrix(&df),
            Err(TransformError::Schema(_))
        ));
    }

    #[test]
    fn test_unroll_string_labels() {
        let matrix = df!(
            "id" => &["A", "B"],
            "A" => &[0.0, 10.0],
            "B" => &[10.0, 0.0],
        )
        .unwrap();

        let unrolled = unroll_distance_matrix(&matrix).unwrap();
        assert_eq!(unrolled.height(), 2);

        let starts: Vec<Option<&str>> = unrolled.column("id_start").unwrap().str().unwrap().into_iter().collect();
        let ends: Vec<Option<&str>> = unrolled.column("id_end").unwrap().str().unwrap().into_iter().collect();
        let distances: Vec<Option<f64>> = unrolled.column("distance").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(starts, vec![Some("A"), Some("B")]);
        assert_eq!(ends, vec![Some("B"), Some("A")]);
        assert_eq!(distances, vec![Some(10.0), Some(10.0)]);
    }

    #[test]
    fn test_unroll_integer_labels_row_major() {
        let df = df!(
            "latitude" => &[0.0, 0.0, 0.0],
            "longitude" => &[0.0, 1.0, 3.0],
        )
        .unwrap();
        let matrix = calculate_distance_matrix(&df).unwrap();
        let unrolled = unroll_distance_matrix(&matrix).unwrap();

        assert_eq!(unrolled.height(), 6);
        let starts: Vec<Option<i64>> = unrolled.column("id_start").unwrap().i64().unwrap().into_iter().collect();
        let ends: Vec<Option<i64>> = unrolled.column("id_end").unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(starts, vec![Some(0), Some(0), Some(1), Some(1), Some(2), Some(2)]);
        assert_eq!(ends, vec![Some(1), Some(2), Some(0), Some(2), Some(0), Some(1)]);
        assert_eq!(unrolled.column("distance").unwrap().f64().unwrap().get(1), Some(3.0));
    }

    #[test]
    fn test_unroll_float_labels_skip_self_pairs() {
        let matrix = df!(
            "id" => &[0.0, 1.0],
            "0" => &[0.0, 5.0],
            "1" => &[5.0, 0.0],
        )
        .unwrap();

        let unrolled = unroll_distance_matrix(&matrix).unwrap();
        assert_eq!(unrolled.shape(), (2, 3));
        assert_eq!(unrolled.column("id_end").unwrap().dtype(), &DataType::Int64);
        let starts: Vec<Option<i64>> = unrolled.column("id_start").unwrap().i64().unwrap().into_iter().collect();
        let ends: Vec<Option<i64>> = unrolled.column("id_end").unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(starts, vec![Some(0), Some(1)]);
        assert_eq!(ends, vec![Some(1), Some(0)]);
    }

    #[test]
    fn test_unroll_rejects_non_integer_column_under_integer_rows() {
        let matrix = df!("id" => &[1i64], "x" => &[0.0]).unwrap();
        assert!(matches!(
            unroll_distance_matrix(&matrix),
            Err(TransformError::Schema(_))
        ));
    }
}
