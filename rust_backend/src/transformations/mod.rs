//! Table reshaping transforms.
//!
//! This module turns key/value tables into square matrices and back, applies
//! elementwise matrix transforms, and checks required columns.
//!
//! # Modules
//!
//! - [`schema`]: Required-column checks shared by every transform
//! - [`matrix`]: Pivot a key pair into a matrix, elementwise scaling
//! - [`distance`]: Pairwise distance matrices and unrolling to long form
//!
//! # Example
//!
//! ```no_run
//! use toll_rust::transformations::{calculate_distance_matrix, unroll_distance_matrix};
//! use polars::prelude::*;
//!
//! # fn example(locations: DataFrame) -> toll_rust::TransformResult<()> {
//! let matrix = calculate_distance_matrix(&locations)?;
//! let routes = unroll_distance_matrix(&matrix)?;
//! println!("{} routes", routes.height());
//! # Ok(())
//! # }
//! ```

pub mod distance;
pub mod matrix;
pub mod schema;

pub use distance::{calculate_distance_matrix, unroll_distance_matrix};
pub use matrix::{generate_car_matrix, multiply_matrix};
pub use schema::{missing_columns, require_columns};
