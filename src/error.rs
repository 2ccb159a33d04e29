//! Error types for FlatDB
//!
//! This module defines all error types used throughout the store.

use thiserror::Error;

/// The main error type for FlatDB
#[derive(Error, Debug)]
pub enum Error {
    // ========== Dispatch Errors ==========
    #[error("Query error: empty query")]
    EmptyQuery,

    #[error("Query error: unknown command '{0}'")]
    UnknownCommand(String),

    #[error("Parse error: {0}")]
    IncorrectExpression(String),

    // ========== Catalog Errors ==========
    #[error("Catalog error: table '{0}' not found")]
    TableNotFound(String),

    #[error("Catalog error: table '{0}' already exists")]
    TableAlreadyExists(String),

    #[error("Catalog error: column '{0}' not found in table '{1}'")]
    ColumnNotFound(String, String),

    #[error("Catalog error: column '{0}' already exists in table '{1}'")]
    ColumnAlreadyExists(String, String),

    #[error("Catalog error: table '{0}' already has primary key '{1}'")]
    PrimaryKeyAlreadyDefined(String, String),

    // ========== Constraint Errors ==========
    #[error("Constraint error: missing value for required column '{0}'")]
    MissingColumn(String),

    #[error("Constraint error: duplicate primary key value '{0}'")]
    DuplicateKey(String),

    // ========== Type Errors ==========
    #[error("Type error: value '{value}' is not a valid {expected} for column '{column}'")]
    TypeMismatch {
        column: String,
        expected: String,
        value: String,
    },

    #[error("Type error: '{0}' is not an integer")]
    NotNumeric(String),

    // ========== Storage Errors ==========
    #[error("Load error: {0}")]
    LoadError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    // ========== I/O Errors ==========
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    // ========== Internal Errors ==========
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Flat classification of [`Error`], one entry per statement result code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyQuery,
    UnknownCommand,
    IncorrectExpression,
    TableAlreadyExists,
    TableNotFound,
    ColumnNotFound,
    MissingColumn,
    DuplicateKey,
    TypeMismatch,
    LoadError,
    StorageError,
    UnknownError,
}

impl Error {
    /// Map this error onto its result code
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyQuery => ErrorKind::EmptyQuery,
            Error::UnknownCommand(_) => ErrorKind::UnknownCommand,
            Error::IncorrectExpression(_)
            | Error::ColumnAlreadyExists(_, _)
            | Error::PrimaryKeyAlreadyDefined(_, _) => ErrorKind::IncorrectExpression,
            Error::TableAlreadyExists(_) => ErrorKind::TableAlreadyExists,
            Error::TableNotFound(_) => ErrorKind::TableNotFound,
            Error::ColumnNotFound(_, _) => ErrorKind::ColumnNotFound,
            Error::MissingColumn(_) => ErrorKind::MissingColumn,
            Error::DuplicateKey(_) => ErrorKind::DuplicateKey,
            Error::TypeMismatch { .. } | Error::NotNumeric(_) => ErrorKind::TypeMismatch,
            Error::LoadError(_) => ErrorKind::LoadError,
            Error::StorageError(_) | Error::IoError(_) => ErrorKind::StorageError,
            Error::Internal(_) => ErrorKind::UnknownError,
        }
    }

    pub(crate) fn incorrect(msg: impl Into<String>) -> Self {
        Error::IncorrectExpression(msg.into())
    }
}

/// Result type alias for FlatDB operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::TableNotFound("USERS".to_string());
        assert_eq!(err.to_string(), "Catalog error: table 'USERS' not found");

        let err = Error::DuplicateKey("1".to_string());
        assert_eq!(
            err.to_string(),
            "Constraint error: duplicate primary key value '1'"
        );
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(Error::EmptyQuery.kind(), ErrorKind::EmptyQuery);
        assert_eq!(
            Error::PrimaryKeyAlreadyDefined("T".into(), "ID".into()).kind(),
            ErrorKind::IncorrectExpression
        );
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(Error::from(io).kind(), ErrorKind::StorageError);
        assert_eq!(
            Error::Internal("boom".into()).kind(),
            ErrorKind::UnknownError
        );
    }
}
