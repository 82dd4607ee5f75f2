//! Core domain values for the toll and route transforms.
//!
//! This module defines the label type used to index matrices and group rows,
//! plus the typed column accessors every transform builds on.

pub mod domain;

pub use domain::{cell_values, column_keys, keys_to_column, numeric_values, CellValue, Key};
