//! File storage for FlatDB
//!
//! Each table lives in two files inside the data directory:
//! `<table>.schema` and `<table>.data`. Writes go to a temporary file in the
//! same directory which is then renamed over the target, so a crash leaves
//! either the old or the new file, never a truncated one.

use super::codec;
use super::table::Table;
use crate::error::{Error, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

pub const SCHEMA_EXTENSION: &str = "schema";
pub const DATA_EXTENSION: &str = "data";

/// Storage manager
#[derive(Debug, Clone)]
pub struct Storage {
    /// Directory where table files are stored
    data_dir: PathBuf,
}

impl Storage {
    /// Open the data directory, creating it if absent
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(|e| {
            Error::StorageError(format!("cannot create {}: {}", data_dir.display(), e))
        })?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn schema_path(&self, table_name: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", table_name, SCHEMA_EXTENSION))
    }

    pub fn data_path(&self, table_name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.{}", table_name, DATA_EXTENSION))
    }

    /// Names of all tables with a schema file, in directory order
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let mut tables = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SCHEMA_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                tables.push(stem.to_string());
            }
        }
        Ok(tables)
    }

    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        Ok(self.list_tables()?.iter().any(|t| t == table_name))
    }

    /// Persist a new table: its schema plus an empty row set.
    ///
    /// Any data file left behind by an interrupted drop is removed so the
    /// table starts out empty.
    pub fn create_table(&self, table: &Table) -> Result<()> {
        self.save_schema(table)?;
        remove_if_exists(&self.data_path(table.name()))
    }

    /// Write the schema file
    pub fn save_schema(&self, table: &Table) -> Result<()> {
        let text = codec::encode_schema(table.name(), table.columns());
        self.write_atomic(&self.schema_path(table.name()), &text)
    }

    /// Rewrite the whole data file
    pub fn save_data(&self, table: &Table) -> Result<()> {
        let text = codec::encode_rows(table.rows());
        self.write_atomic(&self.data_path(table.name()), &text)
    }

    /// Load a table with all of its rows.
    ///
    /// A missing schema file means the table does not exist; a missing data
    /// file means it has no rows. Rows are re-validated on the way in.
    pub fn load_table(&self, table_name: &str) -> Result<Table> {
        let schema_text = match fs::read_to_string(self.schema_path(table_name)) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::TableNotFound(table_name.to_string()))
            }
            Err(e) => {
                return Err(Error::LoadError(format!(
                    "cannot read schema of '{}': {}",
                    table_name, e
                )))
            }
        };

        let (name, columns) = codec::decode_schema(&schema_text)?;
        if name != table_name {
            return Err(Error::LoadError(format!(
                "schema file of '{}' names table '{}'",
                table_name, name
            )));
        }

        let mut table = Table::new(name);
        for column in columns {
            table
                .add_column(column)
                .map_err(|e| Error::LoadError(e.to_string()))?;
        }

        let data_text = match fs::read_to_string(self.data_path(table_name)) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(Error::LoadError(format!(
                    "cannot read data of '{}': {}",
                    table_name, e
                )))
            }
        };
        for row in codec::decode_rows(&data_text) {
            table
                .insert(row)
                .map_err(|e| Error::LoadError(format!("table '{}': {}", table_name, e)))?;
        }

        debug!(
            table = table_name,
            columns = table.columns().len(),
            rows = table.row_count(),
            "table loaded"
        );
        Ok(table)
    }

    /// Remove both files of a table. The schema goes first so the table
    /// stops being listed even if the data file cannot be removed.
    pub fn delete_table(&self, table_name: &str) -> Result<()> {
        fs::remove_file(self.schema_path(table_name)).map_err(|e| {
            Error::StorageError(format!("cannot remove schema of '{}': {}", table_name, e))
        })?;
        remove_if_exists(&self.data_path(table_name))
    }

    fn write_atomic(&self, path: &Path, contents: &str) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.data_dir)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| {
            Error::StorageError(format!("cannot write {}: {}", path.display(), e.error))
        })?;
        Ok(())
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::StorageError(format!(
            "cannot remove {}: {}",
            path.display(),
            e
        ))),
    }
}
