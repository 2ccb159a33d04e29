//! Executor module
//!
//! This module contains the statement dispatcher.

pub mod executor;

pub use executor::{Executor, QueryResult, StatementKind};
