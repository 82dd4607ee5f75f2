//! Error types for table transformations.

use polars::prelude::PolarsError;

/// Result type for table transformations
pub type TransformResult<T> = Result<T, TransformError>;

/// Error type for table transformations
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// A required column is absent or has a dtype the transform cannot use.
    #[error("Schema error: {0}")]
    Schema(String),

    /// An aggregate was requested over zero matching rows.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// A flat-rate lookup missed the rate table.
    #[error("Unknown vehicle type: {0}")]
    UnknownVehicleType(String),

    /// An integer result does not fit in `i64`.
    #[error("Overflow: {0}")]
    Overflow(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}
