//! Configuration for FlatDB
//!
//! Controls where tables are stored and whether statements are journaled.

use std::path::{Path, PathBuf};

/// Default storage directory
pub const DEFAULT_DATA_DIR: &str = "db";

/// File name of the statement journal inside the data directory
pub const JOURNAL_FILE: &str = "db.log";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "FLATDB_DATA_DIR";

/// Store configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding `<table>.schema` and `<table>.data` files
    pub data_dir: PathBuf,
    /// Append every executed statement to the journal
    pub journal: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            journal: true,
        }
    }
}

impl Config {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config with the data directory taken from `FLATDB_DATA_DIR` when set
    pub fn from_env() -> Self {
        match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Self::default().data_dir(dir),
            _ => Self::default(),
        }
    }

    /// Set the data directory
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Enable or disable the statement journal
    pub fn journal(mut self, enabled: bool) -> Self {
        self.journal = enabled;
        self
    }

    /// Path of the journal file, if journaling is enabled
    pub fn journal_path(&self) -> Option<PathBuf> {
        self.journal.then(|| self.data_dir.join(JOURNAL_FILE))
    }

    pub fn data_path(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = Config::new().data_dir("/tmp/flat").journal(false);
        assert_eq!(config.data_path(), Path::new("/tmp/flat"));
        assert!(config.journal_path().is_none());

        let config = Config::new();
        assert_eq!(
            config.journal_path(),
            Some(PathBuf::from(DEFAULT_DATA_DIR).join(JOURNAL_FILE))
        );
    }
}
