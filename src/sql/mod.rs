//! SQL module
//!
//! Tokenizer, statement AST and parser.

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::{Statement, WhereClause};
pub use lexer::tokenize;
pub use parser::{parse_where_clause, Parser};
