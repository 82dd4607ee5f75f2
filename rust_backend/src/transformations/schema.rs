use polars::prelude::*;

use crate::error::{TransformError, TransformResult};

/// Names from `required` that are not columns of `df`, in the given order.
pub fn missing_columns(df: &DataFrame, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|name| df.get_column_index(name).is_none())
        .map(|name| name.to_string())
        .collect()
}

/// Fail with a schema error naming every absent column.
pub fn require_columns(df: &DataFrame, required: &[&str]) -> TransformResult<()> {
    let missing = missing_columns(df, required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(TransformError::Schema(format!(
            "Missing required column(s): {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_keeps_requested_order() {
        let df = df!("distance" => &[5.0], "vehicle_type" => &["car"]).unwrap();
        assert!(missing_columns(&df, &["distance", "vehicle_type"]).is_empty());
        assert_eq!(
            missing_columns(&df, &["timestamp", "distance", "id_start"]),
            vec!["timestamp".to_string(), "id_start".to_string()]
        );
    }

    #[test]
    fn test_require_columns_lists_all_missing() {
        let df = df!("id_1" => &[1i64]).unwrap();
        match require_columns(&df, &["id_1", "id_2", "car"]) {
            Err(TransformError::Schema(msg)) => {
                assert!(msg.contains("id_2"));
                assert!(msg.contains("car"));
                assert!(!msg.contains("id_1,"));
            }
            other => panic!("expected schema error, got {:?}", other),
        }
        assert!(require_columns(&df, &["id_1"]).is_ok());
    }
}
