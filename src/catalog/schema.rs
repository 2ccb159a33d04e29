//! Schema definitions for FlatDB
//!
//! This module defines column metadata and the row representation.

use super::types::ColumnType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Column definition in a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Declared type
    pub data_type: ColumnType,
    /// Is this the primary key?
    pub primary_key: bool,
    /// Is this column nullable?
    pub nullable: bool,
}

impl Column {
    /// Create a nullable, non-key column
    pub fn new(name: impl Into<String>, data_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            data_type,
            primary_key: false,
            nullable: true,
        }
    }

    /// Set nullable flag
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set primary key flag. Nullability is left as is.
    pub fn primary_key(mut self, pk: bool) -> Self {
        self.primary_key = pk;
        self
    }
}

/// A row: column name to stored text, in insertion order.
///
/// Rows have no identity beyond their primary key value. Order of entries
/// carries no meaning; two rows with the same pairs compare equal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    values: IndexMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value stored under `column`
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// Set a value, keeping the original position if the column was present
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.values.insert(column.into(), value.into());
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    /// Iterate over (column, value) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keep only `columns`, in the requested order. Absent columns are skipped.
    pub fn project(&self, columns: &[String]) -> Row {
        let mut projected = Row::new();
        for col in columns {
            if let Some(value) = self.values.get(col) {
                projected.set(col.clone(), value.clone());
            }
        }
        projected
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        // IndexMap equality ignores order
        self.values == other.values
    }
}

impl Eq for Row {}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_builder() {
        let col = Column::new("ID", ColumnType::Integer).primary_key(true);
        assert!(col.primary_key);
        assert!(col.nullable);

        let col = Column::new("NAME", ColumnType::Text).nullable(false);
        assert!(!col.primary_key);
        assert!(!col.nullable);
    }

    #[test]
    fn test_row_order_insensitive_eq() {
        let a: Row = [("ID", "1"), ("NAME", "JAN")].into_iter().collect();
        let b: Row = [("NAME", "JAN"), ("ID", "1")].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.iter().next(), Some(("ID", "1")));
    }

    #[test]
    fn test_row_project() {
        let row: Row = [("ID", "1"), ("NAME", "JAN")].into_iter().collect();
        let projected = row.project(&["NAME".to_string(), "AGE".to_string()]);
        assert_eq!(projected.len(), 1);
        assert_eq!(projected.get("NAME"), Some("JAN"));
        assert!(!projected.contains("AGE"));
    }
}
