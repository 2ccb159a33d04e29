//! Statement AST
//!
//! This module defines the parsed form of each supported statement and the
//! row filter shared by SELECT, UPDATE and DELETE.

use crate::catalog::{Column, Row, Value};
use crate::error::Result;

/// A parsed statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement
    CreateTable(CreateTableStatement),
    /// INSERT INTO statement
    Insert(InsertStatement),
    /// SELECT statement
    Select(SelectStatement),
    /// UPDATE statement
    Update(UpdateStatement),
    /// DELETE FROM statement
    Delete(DeleteStatement),
    /// DROP TABLE statement
    DropTable(String),
}

impl Statement {
    /// Name of the table the statement targets
    pub fn table_name(&self) -> &str {
        match self {
            Statement::CreateTable(s) => &s.name,
            Statement::Insert(s) => &s.table,
            Statement::Select(s) => &s.table,
            Statement::Update(s) => &s.table,
            Statement::Delete(s) => &s.table,
            Statement::DropTable(name) => name,
        }
    }
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub name: String,
    pub columns: Vec<Column>,
}

/// INSERT INTO statement. Values bind to columns by position.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: String,
    pub values: Vec<String>,
}

/// Columns requested by a SELECT
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// `*`: every column in schema order
    All,
    /// An explicit column list
    Columns(Vec<String>),
}

/// SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub table: String,
    pub projection: Projection,
    pub where_clause: Option<WhereClause>,
}

/// UPDATE statement (single assignment)
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table: String,
    pub column: String,
    pub value: String,
    pub where_clause: Option<WhereClause>,
}

/// DELETE FROM statement
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table: String,
    pub where_clause: Option<WhereClause>,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    Greater,
    Less,
    GreaterEq,
    LessEq,
}

impl Operator {
    /// Every operator except `=` compares integers
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Operator::Equals)
    }
}

/// How conditions of a WHERE clause are joined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
}

/// A single `column <op> value` condition
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: Operator,
    pub value: String,
}

impl Condition {
    pub fn new(column: impl Into<String>, op: Operator, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// Compare a stored value against this condition's literal.
    ///
    /// Numeric operators fail with `NotNumeric` when either side is not an
    /// integer.
    pub fn evaluate(&self, stored: &str) -> Result<bool> {
        if !self.op.is_numeric() {
            return Ok(stored == self.value);
        }
        let lhs = Value::parse_integer(stored)?;
        let rhs = Value::parse_integer(&self.value)?;
        Ok(match self.op {
            Operator::Greater => lhs > rhs,
            Operator::Less => lhs < rhs,
            Operator::GreaterEq => lhs >= rhs,
            Operator::LessEq => lhs <= rhs,
            Operator::Equals => lhs == rhs,
        })
    }
}

/// Row filter: ordered conditions joined by a single combinator
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub conditions: Vec<Condition>,
    pub combinator: Combinator,
}

impl WhereClause {
    pub fn new(conditions: Vec<Condition>, combinator: Combinator) -> Self {
        Self {
            conditions,
            combinator,
        }
    }

    /// A clause with one equality condition
    pub fn equals(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            vec![Condition::new(column, Operator::Equals, value)],
            Combinator::And,
        )
    }

    /// Evaluate the clause against one row.
    ///
    /// A condition on a column the row lacks fails the row under AND and is
    /// skipped under OR. Errors from numeric operands abort the evaluation.
    pub fn matches(&self, row: &Row) -> Result<bool> {
        match self.combinator {
            Combinator::And => {
                for cond in &self.conditions {
                    let Some(stored) = row.get(&cond.column) else {
                        return Ok(false);
                    };
                    if !cond.evaluate(stored)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Combinator::Or => {
                for cond in &self.conditions {
                    let Some(stored) = row.get(&cond.column) else {
                        continue;
                    };
                    if cond.evaluate(stored)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_condition_evaluate() {
        let cond = Condition::new("AGE", Operator::GreaterEq, "18");
        assert!(cond.evaluate("18").unwrap());
        assert!(!cond.evaluate("17").unwrap());
        assert!(matches!(cond.evaluate("OLD"), Err(Error::NotNumeric(_))));

        // Equality compares text, so no numeric parse happens
        let cond = Condition::new("NAME", Operator::Equals, "JAN");
        assert!(cond.evaluate("JAN").unwrap());
        assert!(!cond.evaluate("01").unwrap());
    }

    #[test]
    fn test_and_missing_column_fails_row() {
        let clause = WhereClause::new(
            vec![
                Condition::new("MISSING", Operator::Equals, "X"),
                Condition::new("AGE", Operator::Greater, "NOT_A_NUMBER"),
            ],
            Combinator::And,
        );
        // Short-circuits before the bad numeric operand is reached
        assert!(!clause.matches(&row(&[("AGE", "30")])).unwrap());
    }

    #[test]
    fn test_or_skips_missing_column() {
        let clause = WhereClause::new(
            vec![
                Condition::new("MISSING", Operator::Equals, "X"),
                Condition::new("AGE", Operator::Less, "18"),
            ],
            Combinator::Or,
        );
        assert!(clause.matches(&row(&[("AGE", "12")])).unwrap());
        assert!(!clause.matches(&row(&[("AGE", "40")])).unwrap());
    }

    #[test]
    fn test_numeric_failure_is_fatal() {
        let clause = WhereClause::new(
            vec![Condition::new("AGE", Operator::Greater, "18")],
            Combinator::And,
        );
        assert!(clause.matches(&row(&[("AGE", "ADULT")])).is_err());
    }
}
