//! Convenient re-exports for common usage.
//!
//! ```rust
//! use connlog_core::prelude::*;
//!
//! let mut values = Vec::new();
//! let line = "1000000\tC1\t10.0.0.1\t1\t10.0.0.2\t2\tudp\t-\t-\t-\t-\tS0\t0\tD\t1\t60\t0\t0\t-\t-\t-";
//! parse_record(line, 1, &mut values).unwrap();
//! assert_eq!(values[0], FieldValue::TimestampMicros(1_000_000_000_000));
//! ```

// Schema types
pub use crate::schema::{ConnLogSchema, DataKind, FieldDescriptor, TS_COLUMN};

// Record parsing
pub use crate::record::{parse_epoch_micros, parse_record, FieldValue};

// I/O types
pub use crate::io::{LineKind, LogChunk, LogLine, LogSource, PartitionRange};

// Error types
pub use crate::error::{Error, RecordError, Result};
