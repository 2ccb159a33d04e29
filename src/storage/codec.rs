//! Schema and data file encoding
//!
//! Schema file layout:
//!
//! ```text
//! <table name>
//! <column count>
//! <name>|<INTEGER|BOOLEAN|TEXT>|<primary key 0/1>|<nullable 0/1>
//! ...
//! ```
//!
//! Data file layout: one row per line, `column=value` pairs joined by `|`.
//! Pair order follows the row's insertion order and carries no meaning.

use crate::catalog::{Column, ColumnType, Row};
use crate::error::{Error, Result};

const FIELD_SEP: char = '|';
const PAIR_SEP: char = '=';

/// Encode a table's column definitions
pub fn encode_schema(table_name: &str, columns: &[Column]) -> String {
    let mut out = format!("{}\n{}\n", table_name, columns.len());
    for col in columns {
        out.push_str(&format!(
            "{}|{}|{}|{}\n",
            col.name,
            col.data_type,
            flag(col.primary_key),
            flag(col.nullable)
        ));
    }
    out
}

/// Decode a schema file into the table name and its columns
pub fn decode_schema(text: &str) -> Result<(String, Vec<Column>)> {
    let mut lines = text.lines();

    let name = lines
        .next()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::LoadError("schema file is empty".to_string()))?
        .to_string();

    let count_line = lines
        .next()
        .ok_or_else(|| Error::LoadError(format!("schema of '{}' has no column count", name)))?;
    let count: usize = count_line.trim().parse().map_err(|_| {
        Error::LoadError(format!(
            "schema of '{}' has invalid column count '{}'",
            name, count_line
        ))
    })?;

    let mut columns = Vec::with_capacity(count);
    for i in 0..count {
        let line = lines.next().ok_or_else(|| {
            Error::LoadError(format!(
                "schema of '{}' is truncated: expected {} columns, found {}",
                name, count, i
            ))
        })?;
        columns.push(decode_column(line)?);
    }

    Ok((name, columns))
}

fn decode_column(line: &str) -> Result<Column> {
    let fields: Vec<&str> = line.split(FIELD_SEP).collect();
    let &[name, type_name, pk, nullable] = fields.as_slice() else {
        return Err(Error::LoadError(format!("malformed column line '{}'", line)));
    };
    if name.is_empty() {
        return Err(Error::LoadError(format!("column without a name in '{}'", line)));
    }
    let data_type: ColumnType = type_name
        .parse()
        .map_err(|_| Error::LoadError(format!("unknown column type '{}'", type_name)))?;

    Ok(Column::new(name, data_type)
        .primary_key(parse_flag(pk)?)
        .nullable(parse_flag(nullable)?))
}

/// Encode rows, one line each
pub fn encode_rows(rows: &[Row]) -> String {
    let mut out = String::new();
    for row in rows {
        let line = row
            .iter()
            .map(|(col, val)| format!("{}{}{}", col, PAIR_SEP, val))
            .collect::<Vec<_>>()
            .join("|");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Decode a data file. Blank lines and fields without `=` are skipped; the
/// value is everything after the first `=`.
pub fn decode_rows(text: &str) -> Vec<Row> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split(FIELD_SEP)
                .filter_map(|pair| pair.split_once(PAIR_SEP))
                .collect::<Row>()
        })
        .collect()
}

fn flag(set: bool) -> &'static str {
    if set {
        "1"
    } else {
        "0"
    }
}

fn parse_flag(s: &str) -> Result<bool> {
    match s.trim() {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(Error::LoadError(format!("invalid flag '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_columns() -> Vec<Column> {
        vec![
            Column::new("ID", ColumnType::Integer).primary_key(true),
            Column::new("NAME", ColumnType::Text).nullable(false),
            Column::new("ACTIVE", ColumnType::Boolean),
        ]
    }

    #[test]
    fn test_schema_layout() {
        let text = encode_schema("USERS", &users_columns());
        assert_eq!(
            text,
            "USERS\n3\nID|INTEGER|1|1\nNAME|TEXT|0|0\nACTIVE|BOOLEAN|0|1\n"
        );

        let (name, columns) = decode_schema(&text).unwrap();
        assert_eq!(name, "USERS");
        assert_eq!(columns, users_columns());
    }

    #[test]
    fn test_schema_truncated() {
        let err = decode_schema("USERS\n3\nID|INTEGER|1|1\n").unwrap_err();
        assert!(matches!(err, Error::LoadError(_)));

        assert!(decode_schema("").is_err());
        assert!(decode_schema("USERS\nmany\n").is_err());
        assert!(decode_schema("USERS\n1\nID|INTEGER|1\n").is_err());
        assert!(decode_schema("USERS\n1\nID|FLOAT|0|1\n").is_err());
        assert!(decode_schema("USERS\n1\nID|INTEGER|yes|1\n").is_err());
    }

    #[test]
    fn test_decode_rows_order_independent() {
        let rows = decode_rows("ID=1|NAME=JAN\nNAME=ANNA|ID=2\n\n");
        assert_eq!(rows.len(), 2);
        let expected: Row = [("ID", "2"), ("NAME", "ANNA")].into_iter().collect();
        assert_eq!(rows[1], expected);
    }

    #[test]
    fn test_decode_rows_splits_on_first_equals() {
        let rows = decode_rows("EXPR=A=B|JUNK|N=\n");
        assert_eq!(rows[0].get("EXPR"), Some("A=B"));
        assert_eq!(rows[0].get("N"), Some(""));
        assert!(!rows[0].contains("JUNK"));
    }

    #[test]
    fn test_encode_rows() {
        let rows: Vec<Row> = vec![
            [("ID", "1"), ("NAME", "JAN")].into_iter().collect(),
            [("ID", "2")].into_iter().collect(),
        ];
        assert_eq!(encode_rows(&rows), "ID=1|NAME=JAN\nID=2\n");
        assert_eq!(encode_rows(&[]), "");
    }
}
