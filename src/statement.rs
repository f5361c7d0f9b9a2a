//! Line-oriented statements and meta commands.
//!
//! This is the thin layer the REPL uses to turn input lines into table
//! operations:
//!
//! ```text
//! insert <id> <username> <email>
//! select
//! .exit | .btree | .constants
//! ```

use crate::error::StorageError;
use crate::storage::DiskManager;
use crate::types::{Row, COLUMN_EMAIL_SIZE, COLUMN_USERNAME_SIZE};
use crate::Table;
use thiserror::Error;

/// Errors from parsing a statement
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PrepareError {
    #[error("Syntax error. Could not parse statement.")]
    SyntaxError,

    #[error("ID must be positive.")]
    NegativeId,

    #[error("String is too long.")]
    StringTooLong,

    #[error("Unrecognized keyword at start of '{0}'.")]
    Unrecognized(String),
}

/// A parsed statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Insert(Row),
    Select,
}

/// A parsed meta command (input starting with `.`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaCommand {
    Exit,
    BTree,
    Constants,
    Unrecognized(String),
}

/// Result of executing a statement
#[derive(Debug)]
pub enum ExecuteResult {
    Inserted,
    Rows(Vec<Row>),
}

/// Whether a line is a meta command
pub fn is_meta_command(line: &str) -> bool {
    line.starts_with('.')
}

pub fn parse_meta_command(line: &str) -> MetaCommand {
    match line.trim() {
        ".exit" => MetaCommand::Exit,
        ".btree" => MetaCommand::BTree,
        ".constants" => MetaCommand::Constants,
        other => MetaCommand::Unrecognized(other.to_string()),
    }
}

/// Parse one input line into a statement
pub fn prepare(line: &str) -> Result<Statement, PrepareError> {
    let line = line.trim();
    let mut tokens = line.split_whitespace();

    match tokens.next() {
        Some("insert") => prepare_insert(tokens),
        Some("select") if tokens.next().is_none() => Ok(Statement::Select),
        _ => Err(PrepareError::Unrecognized(line.to_string())),
    }
}

fn prepare_insert<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<Statement, PrepareError> {
    let (Some(id), Some(username), Some(email)) = (tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(PrepareError::SyntaxError);
    };

    let id: i64 = id.parse().map_err(|_| PrepareError::SyntaxError)?;
    if id < 0 {
        return Err(PrepareError::NegativeId);
    }
    let id = u32::try_from(id).map_err(|_| PrepareError::SyntaxError)?;

    if username.len() > COLUMN_USERNAME_SIZE || email.len() > COLUMN_EMAIL_SIZE {
        return Err(PrepareError::StringTooLong);
    }

    let row = Row::new(id, username, email).map_err(|_| PrepareError::StringTooLong)?;
    Ok(Statement::Insert(row))
}

/// Run a statement against a table
pub fn execute<D: DiskManager>(
    statement: &Statement,
    table: &mut Table<D>,
) -> Result<ExecuteResult, StorageError> {
    match statement {
        Statement::Insert(row) => {
            table.insert(row)?;
            Ok(ExecuteResult::Inserted)
        }
        Statement::Select => {
            let rows = table.scan()?.collect::<Result<Vec<_>, _>>()?;
            Ok(ExecuteResult::Rows(rows))
        }
    }
}
