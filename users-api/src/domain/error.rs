use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while parsing, reshaping or serializing a [`Table`].
///
/// [`Table`]: crate::domain::models::Table
#[derive(Debug, Error)]
pub enum TableError {
    #[error("no header row")]
    Empty,
    #[error("line {line}: expected at most {expected} fields, found {found}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("missing column: {0}")]
    MissingColumn(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the backing file store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed table in {}: {source}", path.display())]
    Malformed { path: PathBuf, source: TableError },
}

#[derive(Debug, Error)]
pub enum UserDirectoryError {
    #[error("User with ID {0} not found")]
    UserNotFound(String),
    #[error("Data file not found")]
    DataFileNotFound,
    #[error("Invalid CSV file structure")]
    InvalidStructure,
    #[error("invalid table: {0}")]
    Table(#[from] TableError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
