//! Statement executor for FlatDB
//!
//! This module dispatches a raw statement line to its handler. Each handler
//! loads the table it needs from storage, applies the statement in memory and,
//! for mutations, writes the result back before returning.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{Column, Row};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::sql::ast::*;
use crate::sql::{tokenize, Parser};
use crate::storage::{Journal, Storage, Table};

/// Which statement produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatementKind {
    CreateTable,
    Insert,
    Select,
    Update,
    Delete,
    DropTable,
}

/// Query result
#[derive(Debug, Serialize)]
pub struct QueryResult {
    /// Statement that ran
    pub kind: StatementKind,
    /// Table it ran against
    pub table: String,
    /// Column names, for SELECT
    pub columns: Vec<String>,
    /// Result rows, for SELECT
    pub rows: Vec<Row>,
    /// Number of rows inserted, updated or deleted
    pub affected_rows: usize,
}

impl QueryResult {
    fn new(kind: StatementKind, table: impl Into<String>) -> Self {
        Self {
            kind,
            table: table.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            affected_rows: 0,
        }
    }

    fn with_affected_rows(mut self, count: usize) -> Self {
        self.affected_rows = count;
        self
    }
}

/// Execution engine
#[derive(Debug)]
pub struct Executor {
    storage: Storage,
    journal: Option<Journal>,
}

impl Executor {
    /// Create an executor over `storage` with no journal
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            journal: None,
        }
    }

    /// Open the configured data directory
    pub fn open(config: &Config) -> Result<Self> {
        let storage = Storage::open(config.data_path())?;
        Ok(Self {
            storage,
            journal: config.journal_path().map(Journal::new),
        })
    }

    /// Tokenize, parse and execute one statement line
    pub fn execute(&mut self, line: &str) -> Result<QueryResult> {
        let tokens = tokenize(line);
        debug!(?tokens, "tokenized statement");

        let result = Parser::from_tokens(tokens)
            .parse()
            .and_then(|stmt| self.execute_statement(stmt));

        match &result {
            Ok(_) => self.record(line),
            Err(e) => warn!(error = %e, "statement rejected"),
        }
        result
    }

    /// Execute an already parsed statement
    pub fn execute_statement(&mut self, stmt: Statement) -> Result<QueryResult> {
        debug!(table = stmt.table_name(), "dispatching statement");
        match stmt {
            Statement::CreateTable(create) => self.execute_create_table(create),
            Statement::Insert(insert) => self.execute_insert(insert),
            Statement::Select(select) => self.execute_select(select),
            Statement::Update(update) => self.execute_update(update),
            Statement::Delete(delete) => self.execute_delete(delete),
            Statement::DropTable(name) => self.execute_drop_table(&name),
        }
    }

    /// List all table names
    pub fn tables(&self) -> Result<Vec<String>> {
        self.storage.list_tables()
    }

    /// Column definitions of a table
    pub fn describe(&self, table_name: &str) -> Result<Vec<Column>> {
        Ok(self.storage.load_table(table_name)?.columns().to_vec())
    }

    fn execute_create_table(&mut self, create: CreateTableStatement) -> Result<QueryResult> {
        if self.storage.table_exists(&create.name)? {
            return Err(Error::TableAlreadyExists(create.name));
        }

        let mut table = Table::new(create.name.clone());
        for column in create.columns {
            table.add_column(column)?;
        }

        self.storage.create_table(&table)?;
        info!(table = %create.name, columns = table.columns().len(), "table created");
        Ok(QueryResult::new(StatementKind::CreateTable, create.name))
    }

    fn execute_insert(&mut self, insert: InsertStatement) -> Result<QueryResult> {
        let mut table = self.storage.load_table(&insert.table)?;

        if insert.values.len() != table.columns().len() {
            return Err(Error::incorrect(format!(
                "table '{}' has {} columns, got {} values",
                insert.table,
                table.columns().len(),
                insert.values.len()
            )));
        }

        let row: Row = table
            .column_names()
            .into_iter()
            .zip(insert.values)
            .collect();
        table.insert(row)?;

        self.storage.save_data(&table)?;
        info!(table = %insert.table, rows = table.row_count(), "row inserted");
        Ok(QueryResult::new(StatementKind::Insert, insert.table).with_affected_rows(1))
    }

    fn execute_select(&mut self, select: SelectStatement) -> Result<QueryResult> {
        let table = self.storage.load_table(&select.table)?;

        let columns = match select.projection {
            Projection::All => table.column_names(),
            Projection::Columns(columns) => {
                if let Some(missing) = columns.iter().find(|c| !table.has_column(c)) {
                    return Err(Error::incorrect(format!(
                        "column '{}' does not exist in table '{}'",
                        missing, select.table
                    )));
                }
                columns
            }
        };

        let rows = table.select(&columns, select.where_clause.as_ref())?;
        debug!(table = %select.table, rows = rows.len(), "rows selected");

        let mut result = QueryResult::new(StatementKind::Select, select.table);
        result.columns = columns;
        result.rows = rows;
        Ok(result)
    }

    fn execute_update(&mut self, update: UpdateStatement) -> Result<QueryResult> {
        let mut table = self.storage.load_table(&update.table)?;
        let count = table.update(&update.column, &update.value, update.where_clause.as_ref())?;

        self.storage.save_data(&table)?;
        info!(table = %update.table, rows = count, "rows updated");
        Ok(QueryResult::new(StatementKind::Update, update.table).with_affected_rows(count))
    }

    fn execute_delete(&mut self, delete: DeleteStatement) -> Result<QueryResult> {
        let mut table = self.storage.load_table(&delete.table)?;
        if delete.where_clause.is_none() {
            warn!(table = %delete.table, "DELETE without WHERE removes every row");
        }
        let count = table.delete(delete.where_clause.as_ref())?;

        self.storage.save_data(&table)?;
        info!(table = %delete.table, rows = count, "rows deleted");
        Ok(QueryResult::new(StatementKind::Delete, delete.table).with_affected_rows(count))
    }

    fn execute_drop_table(&mut self, table_name: &str) -> Result<QueryResult> {
        if !self.storage.table_exists(table_name)? {
            return Err(Error::TableNotFound(table_name.to_string()));
        }

        self.storage.delete_table(table_name)?;
        info!(table = table_name, "table dropped");
        Ok(QueryResult::new(StatementKind::DropTable, table_name))
    }

    fn record(&self, line: &str) {
        if let Some(journal) = &self.journal {
            if let Err(e) = journal.append(line) {
                warn!(path = %journal.path().display(), error = %e, "journal append failed");
            }
        }
    }
}
