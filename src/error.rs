use rust_decimal::Decimal;
use std::path::PathBuf;
use thiserror::Error;

/// Why an entry was rejected before it could reach the forecasting engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("entry name must not be blank")]
    BlankName,

    #[error("entry amount must be a non-negative magnitude, got {0}")]
    NegativeAmount(Decimal),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {what} '{value}' (expected one of: {expected})")]
pub struct ParseEnumError {
    pub what: &'static str,
    pub value: String,
    pub expected: &'static str,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: {message}")]
    Row { row: usize, message: String },

    #[error("row {row}: {source}")]
    Entry {
        row: usize,
        #[source]
        source: EntryError,
    },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to create data dir {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("stored entry list under key '{key}' is invalid: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode entry list: {0}")]
    Encode(#[source] serde_json::Error),
}
