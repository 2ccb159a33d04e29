//! In-memory table for FlatDB
//!
//! A table owns its columns and rows outright. Every statement loads a fresh
//! copy from disk, mutates it here and writes it back through the codec.

use crate::catalog::{Column, Row, Value};
use crate::error::{Error, Result};
use crate::sql::ast::{Operator, WhereClause};

/// A table: ordered columns plus rows
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
    primary_key: Option<String>,
}

impl Table {
    /// Create an empty table with no columns
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            primary_key: None,
        }
    }

    /// Get table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in declaration order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Name of the primary key column, if any
    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    /// Get column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Get column names in declaration order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Append a column. Names must be unique and at most one column may be
    /// the primary key.
    pub fn add_column(&mut self, column: Column) -> Result<()> {
        if self.has_column(&column.name) {
            return Err(Error::ColumnAlreadyExists(
                column.name,
                self.name.clone(),
            ));
        }
        if column.primary_key {
            if let Some(existing) = &self.primary_key {
                return Err(Error::PrimaryKeyAlreadyDefined(
                    self.name.clone(),
                    existing.clone(),
                ));
            }
            self.primary_key = Some(column.name.clone());
        }
        self.columns.push(column);
        Ok(())
    }

    /// Make `column_name` the primary key, clearing the flag on the previous one
    pub fn set_primary_key(&mut self, column_name: &str) -> Result<()> {
        if !self.has_column(column_name) {
            return Err(Error::ColumnNotFound(
                column_name.to_string(),
                self.name.clone(),
            ));
        }
        for col in &mut self.columns {
            col.primary_key = col.name == column_name;
        }
        self.primary_key = Some(column_name.to_string());
        Ok(())
    }

    /// Insert a row after checking columns, types, nullability and key
    /// uniqueness. Typed values are stored in their canonical spelling.
    /// The table is unchanged on error.
    pub fn insert(&mut self, mut row: Row) -> Result<()> {
        let mut canonical = Vec::with_capacity(row.len());
        for (col_name, value) in row.iter() {
            let column = self
                .column(col_name)
                .ok_or_else(|| Error::ColumnNotFound(col_name.to_string(), self.name.clone()))?;
            canonical.push((col_name.to_string(), canonical_value(column, value)?));
        }
        for (col_name, value) in canonical {
            row.set(col_name, value);
        }

        for column in &self.columns {
            if !column.nullable && !row.contains(&column.name) {
                return Err(Error::MissingColumn(column.name.clone()));
            }
        }

        if let Some(pk) = &self.primary_key {
            let key = row.get(pk).ok_or_else(|| Error::MissingColumn(pk.clone()))?;
            if self.rows.iter().any(|existing| existing.get(pk) == Some(key)) {
                return Err(Error::DuplicateKey(key.to_string()));
            }
        }

        self.rows.push(row);
        Ok(())
    }

    /// Rows matching `filter`, projected onto `columns`.
    ///
    /// An empty column list returns whole rows. A projected row simply lacks
    /// any requested column the stored row does not have.
    pub fn select(&self, columns: &[String], filter: Option<&WhereClause>) -> Result<Vec<Row>> {
        let filter = self.canonical_filter(filter);
        let mut result = Vec::new();
        for row in &self.rows {
            if !row_matches(row, filter.as_ref())? {
                continue;
            }
            if columns.is_empty() {
                result.push(row.clone());
            } else {
                result.push(row.project(columns));
            }
        }
        Ok(result)
    }

    /// Set `column` to `value` in every row matching `filter` (all rows when
    /// `None`). Returns the number of rows changed.
    pub fn update(&mut self, column: &str, value: &str, filter: Option<&WhereClause>) -> Result<usize> {
        let target = self
            .column(column)
            .ok_or_else(|| Error::ColumnNotFound(column.to_string(), self.name.clone()))?;
        let value = canonical_value(target, value)?;
        let value = value.as_str();

        let matched = self.matching_rows(filter)?;
        let count = matched.iter().filter(|m| **m).count();

        if self.primary_key() == Some(column) && count > 0 {
            let collides = self
                .rows
                .iter()
                .zip(&matched)
                .any(|(row, hit)| !hit && row.get(column) == Some(value));
            if count > 1 || collides {
                return Err(Error::DuplicateKey(value.to_string()));
            }
        }

        for (row, hit) in self.rows.iter_mut().zip(matched) {
            if hit {
                row.set(column, value);
            }
        }
        Ok(count)
    }

    /// Remove rows matching `filter`; `None` removes every row.
    /// Returns the number of rows removed.
    pub fn delete(&mut self, filter: Option<&WhereClause>) -> Result<usize> {
        let matched = self.matching_rows(filter)?;
        let before = self.rows.len();
        let mut hits = matched.into_iter();
        self.rows.retain(|_| !hits.next().unwrap_or(false));
        Ok(before - self.rows.len())
    }

    /// Evaluate the filter for every row up front so a failing comparison
    /// leaves the rows untouched
    fn matching_rows(&self, filter: Option<&WhereClause>) -> Result<Vec<bool>> {
        let filter = self.canonical_filter(filter);
        self.rows
            .iter()
            .map(|row| row_matches(row, filter.as_ref()))
            .collect()
    }

    /// Rewrite `=` literals on typed columns into their stored spelling so
    /// `ID = 01` finds the row stored as `1`. Literals that do not parse as
    /// the column type are left alone and simply match nothing.
    fn canonical_filter(&self, filter: Option<&WhereClause>) -> Option<WhereClause> {
        let mut clause = filter?.clone();
        for cond in &mut clause.conditions {
            if cond.op != Operator::Equals {
                continue;
            }
            let Some(column) = self.column(&cond.column) else {
                continue;
            };
            if let Some(value) = Value::canonical(column.data_type, &cond.value) {
                cond.value = value;
            }
        }
        Some(clause)
    }
}

fn row_matches(row: &Row, filter: Option<&WhereClause>) -> Result<bool> {
    match filter {
        Some(clause) => clause.matches(row),
        None => Ok(true),
    }
}

fn canonical_value(column: &Column, value: &str) -> Result<String> {
    Value::canonical(column.data_type, value).ok_or_else(|| Error::TypeMismatch {
        column: column.name.clone(),
        expected: column.data_type.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ColumnType;
    use crate::sql::ast::{Combinator, Condition};

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs.iter().copied().collect()
    }

    fn people() -> Table {
        let mut table = Table::new("PEOPLE");
        table
            .add_column(Column::new("ID", ColumnType::Integer).primary_key(true))
            .unwrap();
        table
            .add_column(Column::new("NAME", ColumnType::Text).nullable(false))
            .unwrap();
        table
            .add_column(Column::new("AGE", ColumnType::Integer))
            .unwrap();
        table.insert(row(&[("ID", "1"), ("NAME", "JAN"), ("AGE", "17")])).unwrap();
        table.insert(row(&[("ID", "2"), ("NAME", "ANNA"), ("AGE", "30")])).unwrap();
        table.insert(row(&[("ID", "3"), ("NAME", "OLA"), ("AGE", "70")])).unwrap();
        table
    }

    fn age_between(low: &str, high: &str) -> WhereClause {
        WhereClause::new(
            vec![
                Condition::new("AGE", Operator::Greater, low),
                Condition::new("AGE", Operator::Less, high),
            ],
            Combinator::And,
        )
    }

    #[test]
    fn test_add_column_invariants() {
        let mut table = Table::new("T");
        table
            .add_column(Column::new("A", ColumnType::Integer).primary_key(true))
            .unwrap();
        assert!(matches!(
            table.add_column(Column::new("A", ColumnType::Text)),
            Err(Error::ColumnAlreadyExists(_, _))
        ));
        assert!(matches!(
            table.add_column(Column::new("B", ColumnType::Text).primary_key(true)),
            Err(Error::PrimaryKeyAlreadyDefined(_, _))
        ));
        assert_eq!(table.primary_key(), Some("A"));
    }

    #[test]
    fn test_set_primary_key_moves_flag() {
        let mut table = people();
        table.set_primary_key("NAME").unwrap();
        assert_eq!(table.primary_key(), Some("NAME"));
        assert!(!table.column("ID").unwrap().primary_key);
        assert!(table.column("NAME").unwrap().primary_key);
        assert!(matches!(
            table.set_primary_key("NOPE"),
            Err(Error::ColumnNotFound(_, _))
        ));
    }

    #[test]
    fn test_insert_duplicate_key() {
        let mut table = people();
        let err = table
            .insert(row(&[("ID", "1"), ("NAME", "DUP")]))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(k) if k == "1"));
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_insert_stores_canonical_values() {
        let mut table = people();
        assert!(matches!(
            table.insert(row(&[("ID", "01"), ("NAME", "DUP")])),
            Err(Error::DuplicateKey(k)) if k == "1"
        ));
        assert!(matches!(
            table.insert(row(&[("ID", "+2"), ("NAME", "DUP")])),
            Err(Error::DuplicateKey(k)) if k == "2"
        ));

        table
            .insert(row(&[("ID", "004"), ("NAME", "EVA"), ("AGE", "+40")]))
            .unwrap();
        assert_eq!(table.rows()[3], row(&[("ID", "4"), ("NAME", "EVA"), ("AGE", "40")]));
    }

    #[test]
    fn test_equality_filter_uses_canonical_literal() {
        let table = people();
        let rows = table
            .select(&["NAME".to_string()], Some(&WhereClause::equals("ID", "02")))
            .unwrap();
        assert_eq!(rows, vec![row(&[("NAME", "ANNA")])]);

        // Text columns compare as written
        let rows = table
            .select(&[], Some(&WhereClause::equals("NAME", "ANNA ")))
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_insert_missing_and_mistyped() {
        let mut table = people();
        assert!(matches!(
            table.insert(row(&[("ID", "9")])),
            Err(Error::MissingColumn(c)) if c == "NAME"
        ));
        assert!(matches!(
            table.insert(row(&[("NAME", "NOKEY")])),
            Err(Error::MissingColumn(c)) if c == "ID"
        ));
        assert!(matches!(
            table.insert(row(&[("ID", "X"), ("NAME", "BAD")])),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            table.insert(row(&[("ID", "9"), ("NAME", "A"), ("ZIP", "1")])),
            Err(Error::ColumnNotFound(_, _))
        ));
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_select_projection() {
        let table = people();
        let all = table.select(&[], None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].len(), 3);

        let names = table.select(&["NAME".to_string()], None).unwrap();
        assert_eq!(names[1], row(&[("NAME", "ANNA")]));
    }

    #[test]
    fn test_select_range() {
        let table = people();
        let clause = age_between("18", "65");
        let rows = table.select(&["NAME".to_string()], Some(&clause)).unwrap();
        assert_eq!(rows, vec![row(&[("NAME", "ANNA")])]);
    }

    #[test]
    fn test_select_non_numeric_fails() {
        let mut table = people();
        table.insert(row(&[("ID", "4"), ("NAME", "EVA")])).unwrap();
        table.rows[3].set("AGE", "OLD");

        let clause = age_between("18", "65");
        assert!(matches!(
            table.select(&[], Some(&clause)),
            Err(Error::NotNumeric(_))
        ));
    }

    #[test]
    fn test_update() {
        let mut table = people();
        let count = table
            .update("NAME", "X", Some(&WhereClause::equals("ID", "2")))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(table.rows()[1].get("NAME"), Some("X"));
        assert_eq!(table.rows()[0].get("NAME"), Some("JAN"));

        assert_eq!(table.update("NAME", "ALL", None).unwrap(), 3);
        assert!(table.rows().iter().all(|r| r.get("NAME") == Some("ALL")));
    }

    #[test]
    fn test_update_errors() {
        let mut table = people();
        assert!(matches!(
            table.update("NOPE", "1", None),
            Err(Error::ColumnNotFound(_, _))
        ));
        assert!(matches!(
            table.update("AGE", "OLD", None),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            table.update("ID", "7", None),
            Err(Error::DuplicateKey(_))
        ));
        assert!(matches!(
            table.update("ID", "1", Some(&WhereClause::equals("ID", "2"))),
            Err(Error::DuplicateKey(_))
        ));
        assert_eq!(table.rows()[1].get("ID"), Some("2"));
    }

    #[test]
    fn test_update_canonical_key_collision() {
        let mut table = people();
        assert!(matches!(
            table.update("ID", "+1", Some(&WhereClause::equals("ID", "2"))),
            Err(Error::DuplicateKey(k)) if k == "1"
        ));
        table
            .update("AGE", "031", Some(&WhereClause::equals("ID", "2")))
            .unwrap();
        assert_eq!(table.rows()[1].get("AGE"), Some("31"));
    }

    #[test]
    fn test_delete() {
        let mut table = people();
        assert_eq!(table.delete(Some(&WhereClause::equals("NAME", "OLA"))).unwrap(), 1);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.delete(None).unwrap(), 2);
        assert_eq!(table.row_count(), 0);
    }
}
