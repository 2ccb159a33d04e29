//! Catalog module
//!
//! This module contains column, row and type definitions.

pub mod schema;
pub mod types;

pub use schema::{Column, Row};
pub use types::{ColumnType, Value};
