use indexmap::IndexMap;
use log::debug;
use polars::prelude::*;

use crate::core::domain::columns::{DISTANCE, ID_END, ID_START};
use crate::core::domain::{cell_values, column_keys, numeric_values, CellValue, Key};
use crate::error::{TransformError, TransformResult};
use crate::transformations::schema::require_columns;

pub const CAR: &str = "car";
pub const BUS: &str = "bus";
pub const ROUTE: &str = "route";
pub const TRUCK: &str = "truck";

/// Routes whose mean `truck` value exceeds this are selected.
pub const ROUTE_TRUCK_MEAN_THRESHOLD: f64 = 7.0;

/// Fraction around the reference average used by
/// [`find_ids_within_ten_percentage_threshold`].
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 0.1;

/// Count occurrences of each `car` value
///
/// # Arguments
/// * `df` - DataFrame with a `car` column
///
/// # Returns
/// Map from value to count, iterated by descending count. Values with equal
/// counts keep the order in which they first appear. Nulls are not counted.
pub fn get_type_count(df: &DataFrame) -> TransformResult<IndexMap<CellValue, usize>> {
    require_columns(df, &[CAR])?;

    let mut counts: IndexMap<CellValue, usize> = IndexMap::new();
    for value in cell_values(df, CAR)?.into_iter().flatten() {
        *counts.entry(value).or_insert(0) += 1;
    }
    // Stable sort: ties stay in first-seen order
    counts.sort_by(|_, a, _, b| b.cmp(a));
    Ok(counts)
}

/// Row indices whose `bus` value is more than twice the column mean
///
/// # Arguments
/// * `df` - DataFrame with a numeric `bus` column
///
/// # Returns
/// Ascending row indices; fails with `EmptyInput` when `bus` has no values
pub fn get_bus_indexes(df: &DataFrame) -> TransformResult<Vec<usize>> {
    require_columns(df, &[BUS])?;

    let bus = numeric_values(df, BUS)?;
    let present: Vec<f64> = bus.iter().flatten().copied().collect();
    if present.is_empty() {
        return Err(TransformError::EmptyInput(
            "Mean of 'bus' is undefined for zero rows".to_string(),
        ));
    }
    let mean = present.iter().sum::<f64>() / present.len() as f64;
    let threshold = 2.0 * mean;
    debug!("bus mean {:.3}, selecting rows above {:.3}", mean, threshold);

    Ok(bus
        .into_iter()
        .enumerate()
        .filter_map(|(row, value)| value.filter(|&v| v > threshold).map(|_| row))
        .collect())
}

/// Routes whose average `truck` value is greater than 7
///
/// # Arguments
/// * `df` - DataFrame with `route` and numeric `truck` columns
///
/// # Returns
/// Selected route labels in ascending order
pub fn filter_routes(df: &DataFrame) -> TransformResult<Vec<Key>> {
    require_columns(df, &[ROUTE, TRUCK])?;
    // Validates the dtype before the lazy query sees it
    numeric_values(df, TRUCK)?;

    let means = df
        .clone()
        .lazy()
        .group_by([col(ROUTE)])
        .agg([col(TRUCK).cast(DataType::Float64).mean()])
        .filter(col(TRUCK).gt(lit(ROUTE_TRUCK_MEAN_THRESHOLD)))
        .collect()?;

    let mut routes: Vec<Key> = column_keys(&means, ROUTE)?.into_iter().flatten().collect();
    routes.sort();
    Ok(routes)
}

/// Ids whose average distance is within ten percent of the reference id's
///
/// See [`find_ids_within_percentage_threshold`].
pub fn find_ids_within_ten_percentage_threshold(
    df: &DataFrame,
    reference_id: &Key,
) -> TransformResult<Vec<Key>> {
    find_ids_within_percentage_threshold(df, reference_id, DEFAULT_DISTANCE_THRESHOLD)
}

/// Ids whose average distance lies within `fraction` of the reference average
///
/// The reference average is the mean `distance` over every record that
/// starts or ends at `reference_id`. Each `id_start` is averaged over its
/// own records and kept when the average falls in
/// `[reference * (1 - fraction), reference * (1 + fraction)]`, bounds
/// included.
///
/// # Arguments
/// * `df` - Long-form DataFrame with `id_start`, `id_end`, `distance`
/// * `reference_id` - Id whose average distance is the reference
/// * `fraction` - Relative half-width of the accepted band
///
/// # Returns
/// Selected `id_start` values in ascending order; fails with `EmptyInput`
/// when no record touches `reference_id`
pub fn find_ids_within_percentage_threshold(
    df: &DataFrame,
    reference_id: &Key,
    fraction: f64,
) -> TransformResult<Vec<Key>> {
    require_columns(df, &[ID_START, ID_END, DISTANCE])?;

    let starts = column_keys(df, ID_START)?;
    let ends = column_keys(df, ID_END)?;
    let distances = numeric_values(df, DISTANCE)?;

    let reference: Vec<f64> = starts
        .iter()
        .zip(&ends)
        .zip(&distances)
        .filter(|((start, end), _)| {
            start.as_ref() == Some(reference_id) || end.as_ref() == Some(reference_id)
        })
        .filter_map(|(_, distance)| *distance)
        .collect();
    if reference.is_empty() {
        return Err(TransformError::EmptyInput(format!(
            "No distances recorded for reference id {}",
            reference_id
        )));
    }

    let reference_avg = reference.iter().sum::<f64>() / reference.len() as f64;
    let threshold = fraction * reference_avg;
    let (lower, upper) = (reference_avg - threshold, reference_avg + threshold);
    debug!(
        "Reference id {} averages {:.3}, accepting [{:.3}, {:.3}]",
        reference_id, reference_avg, lower, upper
    );

    let averages = df
        .clone()
        .lazy()
        .group_by([col(ID_START)])
        .agg([col(DISTANCE).cast(DataType::Float64).mean()])
        .collect()?;

    let ids = column_keys(&averages, ID_START)?;
    let means = numeric_values(&averages, DISTANCE)?;
    let mut selected: Vec<Key> = ids
        .into_iter()
        .zip(means)
        .filter_map(|(id, mean)| match (id, mean) {
            (Some(id), Some(mean)) if lower <= mean && mean <= upper => Some(id),
            _ => None,
        })
        .collect();
    selected.sort();
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_type_count_orders_by_count_then_first_seen() {
        let df = df!("car" => &[3i64, 1, 2, 1, 2, 4]).unwrap();
        let counts = get_type_count(&df).unwrap();
        let ordered: Vec<(CellValue, usize)> = counts.into_iter().collect();
        assert_eq!(
            ordered,
            vec![
                (CellValue::Int(1), 2),
                (CellValue::Int(2), 2),
                (CellValue::Int(3), 1),
                (CellValue::Int(4), 1),
            ]
        );
    }

    #[test]
    fn test_get_type_count_strings() {
        let df = df!("car" => &["low", "high", "high"]).unwrap();
        let counts = get_type_count(&df).unwrap();
        assert_eq!(counts.get_index(0), Some((&CellValue::Str("high".into()), &2)));
        assert_eq!(counts[&CellValue::Str("low".into())], 1);
    }

    #[test]
    fn test_get_type_count_fractional_floats() {
        let df = df!("car" => &[1.5, 2.5, 1.5]).unwrap();
        let ordered: Vec<(CellValue, usize)> = get_type_count(&df).unwrap().into_iter().collect();
        assert_eq!(
            ordered,
            vec![(CellValue::Float(1.5), 2), (CellValue::Float(2.5), 1)]
        );
    }

    #[test]
    fn test_get_type_count_missing_column() {
        let df = df!("bus" => &[1i64]).unwrap();
        assert!(matches!(get_type_count(&df), Err(TransformError::Schema(_))));
    }

    #[test]
    fn test_get_bus_indexes() {
        // mean = 5, threshold = 10 (strict)
        let df = df!("bus" => &[1.0, 10.0, 2.0, 12.0, 0.0]).unwrap();
        assert_eq!(get_bus_indexes(&df).unwrap(), vec![3]);
    }

    #[test]
    fn test_get_bus_indexes_empty() {
        let df = df!("bus" => Vec::<f64>::new()).unwrap();
        assert!(matches!(
            get_bus_indexes(&df),
            Err(TransformError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_get_bus_indexes_missing_column() {
        let df = df!("car" => &[1i64]).unwrap();
        assert!(matches!(get_bus_indexes(&df), Err(TransformError::Schema(_))));
    }

    #[test]
    fn test_filter_routes_missing_column() {
        let df = df!("route" => &["A"]).unwrap();
        assert!(matches!(filter_routes(&df), Err(TransformError::Schema(_))));
    }

    #[test]
    fn test_filter_routes_float_routes_read_as_integers() {
        let df = df!(
            "route" => &[2.0, 1.0, 2.0],
            "truck" => &[8.0, 1.0, 9.0],
        )
        .unwrap();
        assert_eq!(filter_routes(&df).unwrap(), vec![Key::Int(2)]);
    }

    #[test]
    fn test_filter_routes() {
        let df = df!(
            "route" => &["B", "A", "B", "C", "A", "C"],
            "truck" => &[8i64, 10, 9, 7, 6, 7],
        )
        .unwrap();
        // A: 8.0, B: 8.5, C: 7.0 (not strictly above)
        assert_eq!(
            filter_routes(&df).unwrap(),
            vec![Key::from("A"), Key::from("B")]
        );
    }

    #[test]
    fn test_filter_routes_integer_routes() {
        let df = df!(
            "route" => &[20i64, 10, 30],
            "truck" => &[9.0, 8.0, 1.0],
        )
        .unwrap();
        assert_eq!(
            filter_routes(&df).unwrap(),
            vec![Key::Int(10), Key::Int(20)]
        );
    }

    fn threshold_frame() -> DataFrame {
        df!(
            "id_start" => &[1i64, 2, 3, 3, 4, 5],
            "id_end" => &[2i64, 1, 4, 5, 5, 4],
            "distance" => &[100.0, 100.0, 110.0, 110.0, 111.0, 90.0],
        )
        .unwrap()
    }

    #[test]
    fn test_threshold_bounds_are_inclusive() {
        let ids = find_ids_within_ten_percentage_threshold(&threshold_frame(), &Key::Int(1)).unwrap();
        // 1 and 2 average 100, 3 averages 110, 5 averages 90, 4 averages 111
        assert_eq!(ids, vec![Key::Int(1), Key::Int(2), Key::Int(3), Key::Int(5)]);
    }

    #[test]
    fn test_threshold_float_ids() {
        let df = df!(
            "id_start" => &[1.0, 2.0, 3.0],
            "id_end" => &[2.0, 1.0, 1.0],
            "distance" => &[100.0, 100.0, 200.0],
        )
        .unwrap();
        // Reference 2 averages 100 over its two records
        let ids = find_ids_within_percentage_threshold(&df, &Key::Int(2), 0.0).unwrap();
        assert_eq!(ids, vec![Key::Int(1), Key::Int(2)]);
    }

    #[test]
    fn test_threshold_custom_fraction() {
        let ids = find_ids_within_percentage_threshold(&threshold_frame(), &Key::Int(1), 0.0).unwrap();
        assert_eq!(ids, vec![Key::Int(1), Key::Int(2)]);
    }

    #[test]
    fn test_threshold_unknown_reference() {
        let result = find_ids_within_ten_percentage_threshold(&threshold_frame(), &Key::Int(99));
        assert!(matches!(result, Err(TransformError::EmptyInput(_))));
    }
}
