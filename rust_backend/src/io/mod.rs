//! Table loading utilities.
//!
//! This module reads CSV and JSON files into Polars DataFrames and writes
//! results back out as JSON records. Errors carry context describing which
//! step failed.
//!
//! # Example
//!
//! ```no_run
//! use toll_rust::io::loaders::TableLoader;
//! use std::path::Path;
//!
//! let result = TableLoader::load_from_file(Path::new("dataset-1.csv"))
//!     .expect("Failed to load");
//! println!("Loaded {} rows", result.num_rows);
//! ```

pub mod loaders;


pub use loaders::{dataframe_to_json, TableLoadResult, TableLoader, TableSourceType};
