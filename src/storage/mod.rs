//! Storage module
//!
//! This module contains the storage components:
//! - In-memory table engine
//! - Schema and data file codec
//! - Flat-file storage manager
//! - Statement journal

pub mod codec;
pub mod disk;
pub mod journal;
pub mod table;

pub use disk::Storage;
pub use journal::Journal;
pub use table::Table;
