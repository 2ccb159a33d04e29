//! Data types for FlatDB
//!
//! This module defines the column types and the typed view of stored values.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// 64-bit signed integer
    Integer,
    /// TRUE/FALSE
    Boolean,
    /// Unlimited text
    Text,
}

impl ColumnType {
    /// Name used in statements and in the schema file
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Text => "TEXT",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "INTEGER" => Ok(ColumnType::Integer),
            "BOOLEAN" => Ok(ColumnType::Boolean),
            "TEXT" => Ok(ColumnType::Text),
            other => Err(Error::incorrect(format!("unknown column type '{}'", other))),
        }
    }
}

/// A stored value interpreted through its column type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    Text(String),
}

impl Value {
    /// Interpret raw text as a value of `data_type`.
    ///
    /// Rows keep their values as text; this is the check applied before a
    /// value is allowed into a column.
    pub fn parse(data_type: ColumnType, raw: &str) -> Option<Value> {
        match data_type {
            ColumnType::Integer => raw.parse().ok().map(Value::Integer),
            ColumnType::Boolean => match raw.to_ascii_uppercase().as_str() {
                "TRUE" | "1" => Some(Value::Boolean(true)),
                "FALSE" | "0" => Some(Value::Boolean(false)),
                _ => None,
            },
            ColumnType::Text => Some(Value::Text(raw.to_string())),
        }
    }

    /// The stored spelling of `raw` in a column of `data_type`, so `01` and
    /// `+1` both become `1` and `1` in a BOOLEAN column becomes `TRUE`
    pub fn canonical(data_type: ColumnType, raw: &str) -> Option<String> {
        Value::parse(data_type, raw).map(|v| v.to_string())
    }

    /// Parse an operand of a numeric comparison
    pub fn parse_integer(raw: &str) -> Result<i64> {
        raw.trim()
            .parse()
            .map_err(|_| Error::NotNumeric(raw.to_string()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Boolean(true) => write!(f, "TRUE"),
            Value::Boolean(false) => write!(f, "FALSE"),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!("INTEGER".parse::<ColumnType>().unwrap(), ColumnType::Integer);
        assert_eq!(ColumnType::Boolean.to_string(), "BOOLEAN");
        assert!(matches!(
            "VARCHAR".parse::<ColumnType>(),
            Err(Error::IncorrectExpression(_))
        ));
    }

    #[test]
    fn test_value_parse() {
        assert_eq!(
            Value::parse(ColumnType::Integer, "-42"),
            Some(Value::Integer(-42))
        );
        assert_eq!(Value::parse(ColumnType::Integer, "4x"), None);
        assert_eq!(
            Value::parse(ColumnType::Boolean, "TRUE"),
            Some(Value::Boolean(true))
        );
        assert_eq!(
            Value::parse(ColumnType::Boolean, "0"),
            Some(Value::Boolean(false))
        );
        assert_eq!(Value::parse(ColumnType::Boolean, "YES"), None);
        assert_eq!(
            Value::parse(ColumnType::Text, "ANY"),
            Some(Value::Text("ANY".into()))
        );
    }

    #[test]
    fn test_canonical_spelling() {
        assert_eq!(Value::canonical(ColumnType::Integer, "01").as_deref(), Some("1"));
        assert_eq!(Value::canonical(ColumnType::Integer, "+1").as_deref(), Some("1"));
        assert_eq!(Value::canonical(ColumnType::Integer, "-007").as_deref(), Some("-7"));
        assert_eq!(Value::canonical(ColumnType::Boolean, "1").as_deref(), Some("TRUE"));
        assert_eq!(Value::canonical(ColumnType::Boolean, "false").as_deref(), Some("FALSE"));
        assert_eq!(Value::canonical(ColumnType::Text, "01").as_deref(), Some("01"));
        assert_eq!(Value::canonical(ColumnType::Integer, "ONE"), None);
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(Value::parse_integer("18").unwrap(), 18);
        assert!(matches!(
            Value::parse_integer("ADULT"),
            Err(Error::NotNumeric(_))
        ));
    }
}
