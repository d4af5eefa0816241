//! Error types for connlog-datafusion.
//!
//! This module provides error types specific to the DataFusion integration,
//! while re-exporting core error types from connlog-core.

use thiserror::Error;

// Re-export core error types
pub use connlog_core::error::RecordError;
pub use connlog_core::Error as CoreError;

/// Main error type for connlog-datafusion operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from connlog-core (file access, malformed records)
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Error while planning or executing an aggregation
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The malformed record behind this error, if any.
    pub fn record_error(&self) -> Option<&RecordError> {
        match self {
            Error::Core(CoreError::Record(e)) => Some(e),
            _ => None,
        }
    }
}

/// Errors related to planning and executing aggregations.
#[derive(Error, Debug)]
pub enum QueryError {
    /// Column is not among the dataset's retained columns
    #[error("Unknown column: {column} (available: {available})")]
    ColumnNotFound { column: String, available: String },

    /// DataFusion error
    #[error("Query execution error: {0}")]
    Execution(String),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(String),

    /// Worker pool failure (panicked or cancelled task)
    #[error("Worker error: {0}")]
    Runtime(String),
}

impl From<datafusion::error::DataFusionError> for QueryError {
    fn from(err: datafusion::error::DataFusionError) -> Self {
        QueryError::Execution(err.to_string())
    }
}

impl From<arrow::error::ArrowError> for QueryError {
    fn from(err: arrow::error::ArrowError) -> Self {
        QueryError::Arrow(err.to_string())
    }
}

impl From<datafusion::error::DataFusionError> for Error {
    fn from(err: datafusion::error::DataFusionError) -> Self {
        Error::Query(QueryError::from(err))
    }
}

impl From<arrow::error::ArrowError> for Error {
    fn from(err: arrow::error::ArrowError) -> Self {
        Error::Query(QueryError::from(err))
    }
}

impl From<RecordError> for Error {
    fn from(err: RecordError) -> Self {
        Error::Core(CoreError::Record(err))
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
