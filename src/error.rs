//! Errors surfaced by the public operations

use crate::table::DataType;
use relgraph_algorithms::AlgoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Bad parameter or malformed relation
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Column {column} not found in table {table}")]
    ColumnNotFound { table: String, column: String },

    #[error("Column {column} in table {table} must be of type {expected}")]
    ColumnType {
        table: String,
        column: String,
        expected: DataType,
    },

    #[error("Table already exists: {0}")]
    TableExists(String),

    #[error(transparent)]
    Algorithm(#[from] AlgoError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
