//! Statement parser
//!
//! This module turns a token list into a [`Statement`]. Only the grammar is
//! checked here; whether tables and columns exist is up to the executor.

use super::ast::*;
use super::lexer::tokenize;
use crate::catalog::{Column, ColumnType};
use crate::error::{Error, Result};

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till1},
    character::complete::{multispace0, multispace1},
    combinator::{all_consuming, map, value},
    multi::many0,
    sequence::{delimited, tuple},
    IResult,
};

/// Statement parser
pub struct Parser {
    tokens: Vec<String>,
    position: usize,
}

impl Parser {
    /// Create a new parser from a raw line
    pub fn new(input: &str) -> Self {
        Self::from_tokens(tokenize(input))
    }

    /// Create a parser over already tokenized input
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parse a single statement
    pub fn parse(&mut self) -> Result<Statement> {
        let command = match self.tokens.first() {
            Some(command) => command.clone(),
            None => return Err(Error::EmptyQuery),
        };

        match command.as_str() {
            "CREATE" => self.parse_create_table().map(Statement::CreateTable),
            "INSERT" => self.parse_insert().map(Statement::Insert),
            "SELECT" => self.parse_select().map(Statement::Select),
            "UPDATE" => self.parse_update().map(Statement::Update),
            "DELETE" => self.parse_delete().map(Statement::Delete),
            "DROP" => self.parse_drop_table().map(Statement::DropTable),
            _ => Err(Error::UnknownCommand(command)),
        }
    }

    // ========== CREATE TABLE ==========

    fn parse_create_table(&mut self) -> Result<CreateTableStatement> {
        if self.tokens.len() < 4 {
            return Err(Error::incorrect("CREATE TABLE requires a name and columns"));
        }
        self.advance();
        self.expect("TABLE")?;
        let name = self.expect_table_name()?;

        let mut columns: Vec<Column> = Vec::new();
        while let Some(col_name) = self.next_token() {
            validate_identifier(&col_name)?;
            let data_type: ColumnType = self
                .next_token()
                .ok_or_else(|| Error::incorrect(format!("column '{}' has no type", col_name)))?
                .parse()?;

            let mut column = Column::new(col_name, data_type);
            // Constraint pairs in any order; anything else starts the next column
            loop {
                if self.check_pair("PRIMARY", "KEY") {
                    column = column.primary_key(true);
                } else if self.check_pair("NOT", "NULL") {
                    column = column.nullable(false);
                } else {
                    break;
                }
                self.position += 2;
            }
            columns.push(column);
        }

        if columns.is_empty() {
            return Err(Error::incorrect("at least one column is expected"));
        }
        Ok(CreateTableStatement { name, columns })
    }

    // ========== INSERT ==========

    fn parse_insert(&mut self) -> Result<InsertStatement> {
        if self.tokens.len() < 4 {
            return Err(Error::incorrect("INSERT INTO requires a table and values"));
        }
        self.advance();
        self.expect("INTO")?;
        let table = self.expect_table_name()?;

        let values = self.tokens[self.position..].to_vec();
        for v in &values {
            if v.contains('|') {
                return Err(Error::incorrect(format!(
                    "value '{}' contains reserved character '|'",
                    v
                )));
            }
        }
        self.position = self.tokens.len();

        Ok(InsertStatement { table, values })
    }

    // ========== SELECT ==========

    fn parse_select(&mut self) -> Result<SelectStatement> {
        if self.tokens.len() < 4 {
            return Err(Error::incorrect("SELECT requires columns, FROM and a table"));
        }
        self.advance();

        let projection = if self.check("*") {
            self.advance();
            Projection::All
        } else {
            let mut columns = Vec::new();
            while let Some(token) = self.current() {
                if token == "FROM" || token == "WHERE" {
                    break;
                }
                columns.push(token.to_string());
                self.advance();
            }
            if columns.is_empty() {
                return Err(Error::incorrect("SELECT requires at least one column"));
            }
            Projection::Columns(columns)
        };

        self.expect("FROM")?;
        let table = self.expect_table_name()?;
        let where_clause = self.parse_optional_where()?;

        Ok(SelectStatement {
            table,
            projection,
            where_clause,
        })
    }

    // ========== UPDATE ==========

    fn parse_update(&mut self) -> Result<UpdateStatement> {
        if self.tokens.len() < 4 {
            return Err(Error::incorrect("UPDATE requires a table and SET"));
        }
        self.advance();
        let table = self.expect_table_name()?;
        self.expect("SET")?;

        let mut assignment = Vec::new();
        while let Some(token) = self.current() {
            if token == "WHERE" {
                break;
            }
            assignment.push(token.to_string());
            self.advance();
        }
        let (column, new_value) = parse_assignment(&assignment.join(" "))?;
        if new_value.contains('|') {
            return Err(Error::incorrect(format!(
                "value '{}' contains reserved character '|'",
                new_value
            )));
        }
        let where_clause = self.parse_optional_where()?;

        Ok(UpdateStatement {
            table,
            column,
            value: new_value,
            where_clause,
        })
    }

    // ========== DELETE ==========

    fn parse_delete(&mut self) -> Result<DeleteStatement> {
        if self.tokens.len() < 3 {
            return Err(Error::incorrect("DELETE FROM requires a table"));
        }
        self.advance();
        self.expect("FROM")?;
        let table = self.expect_table_name()?;
        let where_clause = self.parse_optional_where()?;

        Ok(DeleteStatement {
            table,
            where_clause,
        })
    }

    // ========== DROP TABLE ==========

    fn parse_drop_table(&mut self) -> Result<String> {
        if self.tokens.len() < 3 {
            return Err(Error::incorrect("DROP TABLE requires a table"));
        }
        self.advance();
        self.expect("TABLE")?;
        let name = self.expect_table_name()?;
        self.expect_end()?;
        Ok(name)
    }

    // ========== WHERE ==========

    /// Parse `WHERE ...` if present; anything else left over is an error
    fn parse_optional_where(&mut self) -> Result<Option<WhereClause>> {
        if self.is_at_end() {
            return Ok(None);
        }
        self.expect("WHERE")?;
        let condition = self.tokens[self.position..].join(" ");
        self.position = self.tokens.len();
        parse_where_clause(&condition).map(Some)
    }

    fn current(&self) -> Option<&str> {
        self.tokens.get(self.position).map(String::as_str)
    }

    fn next_token(&mut self) -> Option<String> {
        let token = self.tokens.get(self.position).cloned();
        self.advance();
        token
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    fn check(&self, token: &str) -> bool {
        self.current() == Some(token)
    }

    fn check_pair(&self, first: &str, second: &str) -> bool {
        self.check(first)
            && self.tokens.get(self.position + 1).map(String::as_str) == Some(second)
    }

    fn expect(&mut self, token: &str) -> Result<()> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(Error::incorrect(format!(
                "expected {}, found {}",
                token,
                self.current().unwrap_or("end of input")
            )))
        }
    }

    fn expect_table_name(&mut self) -> Result<String> {
        let name = self
            .next_token()
            .ok_or_else(|| Error::incorrect("expected table name, found end of input"))?;
        validate_identifier(&name)?;
        Ok(name)
    }

    fn expect_end(&self) -> Result<()> {
        match self.current() {
            None => Ok(()),
            Some(extra) => Err(Error::incorrect(format!("unexpected token '{}'", extra))),
        }
    }
}

/// Table and column names double as file names and schema fields, so they
/// are limited to letters, digits and `_`.
fn validate_identifier(name: &str) -> Result<()> {
    if !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(Error::incorrect(format!("invalid identifier '{}'", name)))
    }
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace() || "=<>".contains(c))(input)
}

fn literal(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace())(input)
}

fn operator(input: &str) -> IResult<&str, Operator> {
    alt((
        value(Operator::GreaterEq, tag(">=")),
        value(Operator::LessEq, tag("<=")),
        value(Operator::Equals, tag("=")),
        value(Operator::Greater, tag(">")),
        value(Operator::Less, tag("<")),
    ))(input)
}

fn condition(input: &str) -> IResult<&str, Condition> {
    map(
        tuple((
            identifier,
            delimited(multispace0, operator, multispace0),
            literal,
        )),
        |(column, op, lit)| Condition::new(column, op, lit),
    )(input)
}

fn combinator(input: &str) -> IResult<&str, Combinator> {
    delimited(
        multispace1,
        alt((
            value(Combinator::And, tag("AND")),
            value(Combinator::Or, tag("OR")),
        )),
        multispace1,
    )(input)
}

/// Parse the text following `WHERE`, e.g. `AGE > 18 AND AGE < 65` or `ID=1`
pub fn parse_where_clause(input: &str) -> Result<WhereClause> {
    let parsed = all_consuming(delimited(
        multispace0,
        tuple((condition, many0(tuple((combinator, condition))))),
        multispace0,
    ))(input);

    let (first, rest) = match parsed {
        Ok((_, parsed)) => parsed,
        Err(_) => {
            return Err(Error::incorrect(format!(
                "malformed WHERE clause '{}'",
                input.trim()
            )))
        }
    };

    let combinator = rest.first().map(|(c, _)| *c).unwrap_or(Combinator::And);
    if rest.iter().any(|(c, _)| *c != combinator) {
        return Err(Error::incorrect("cannot mix AND and OR in one WHERE clause"));
    }

    let mut conditions = vec![first];
    conditions.extend(rest.into_iter().map(|(_, cond)| cond));
    Ok(WhereClause::new(conditions, combinator))
}

/// Parse `column = value`, with or without spaces around `=`
fn parse_assignment(input: &str) -> Result<(String, String)> {
    let parsed = all_consuming(tuple((
        multispace0,
        identifier,
        delimited(multispace0, tag("="), multispace0),
        literal,
        multispace0,
    )))(input);

    match parsed {
        Ok((_, (_, column, _, lit, _))) => Ok((column.to_string(), lit.to_string())),
        Err(_) => Err(Error::incorrect(format!(
            "expected 'column = value', found '{}'",
            input
        ))),
    }
}
