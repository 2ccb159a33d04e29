//! FlatDB - a minimal single-user relational store
//!
//! This library provides the core components:
//! - Statement tokenizer and parser
//! - In-memory table engine with primary key and NOT NULL checks
//! - Flat-file schema/data storage
//! - Statement executor
//!
//! The interactive shell lives in `src/bin/cli.rs`; the library itself never
//! prints or exits.

pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod sql;
pub mod storage;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use executor::{Executor, QueryResult, StatementKind};
