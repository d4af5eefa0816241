//! Error types for connlog-core.
//!
//! This module provides structured error types for all connlog-core operations:
//!
//! - [`enum@Error`] - Main error enum that wraps all error types
//! - [`RecordError`] - A log line that does not fit the conn.log schema
//!
//! All errors implement `std::error::Error` and can be converted to `anyhow::Error`.

use thiserror::Error;

use crate::schema::DataKind;

/// Main error type for connlog-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Log file does not exist
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// A record failed schema validation
    #[error("Malformed record: {0}")]
    Record(#[from] RecordError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors for a single log record.
///
/// `line` is 1-based. Records parsed inside a partition carry a line number
/// relative to the partition start until the loader rebases them with
/// [`RecordError::with_line_offset`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    /// Field count does not match the declared schema
    #[error("line {line}: expected {expected} tab-separated fields, found {actual}")]
    SchemaMismatch {
        line: u64,
        expected: usize,
        actual: usize,
    },

    /// Field text does not coerce to its declared kind
    #[error("line {line}: invalid {kind} value {value:?} for field '{field}'")]
    InvalidValue {
        line: u64,
        field: &'static str,
        kind: DataKind,
        value: String,
    },

    /// Line is not valid UTF-8
    #[error("line {line}: record is not valid UTF-8")]
    InvalidUtf8 { line: u64 },
}

impl RecordError {
    /// Line number the error refers to.
    pub fn line(&self) -> u64 {
        match self {
            RecordError::SchemaMismatch { line, .. }
            | RecordError::InvalidValue { line, .. }
            | RecordError::InvalidUtf8 { line } => *line,
        }
    }

    /// Shift the line number by the number of lines preceding the partition.
    pub fn with_line_offset(mut self, preceding_lines: u64) -> Self {
        match &mut self {
            RecordError::SchemaMismatch { line, .. }
            | RecordError::InvalidValue { line, .. }
            | RecordError::InvalidUtf8 { line } => *line += preceding_lines,
        }
        self
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
