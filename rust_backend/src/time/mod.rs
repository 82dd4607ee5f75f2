pub mod timestamps;

// Re-export core Rust functions for use in benchmarks and internal code
pub use timestamps::{epoch_to_datetime, parse_timestamp, timestamp_values};
