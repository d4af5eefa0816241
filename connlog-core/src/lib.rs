//! # connlog-core
//!
//! Engine-agnostic Zeek `conn.log` parsing library.
//!
//! This crate provides the core ingestion functionality for connlog, without
//! any query engine dependencies. It can be used standalone to validate and
//! iterate over conn.log records or as the foundation for a columnar
//! integration (see `connlog-datafusion`).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use connlog_core::prelude::*;
//!
//! let source = LogSource::open("conn.log").unwrap();
//! let mut values = Vec::new();
//!
//! for range in source.partition(4) {
//!     for line in source.chunk(&range).lines() {
//!         if line.kind() != LineKind::Record {
//!             continue;
//!         }
//!         let text = line.text().unwrap();
//!         parse_record(text, line.number, &mut values).unwrap();
//!         println!("{} retained fields at offset {}", values.len(), line.offset);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                        connlog-core                                 |
//! +---------------------------------------------------------------------+
//! |  schema/     - FieldDescriptor, DataKind, the 21-column layout      |
//! |  record/     - Line validation, type coercion, epoch conversion     |
//! |  io/         - Memory-mapped source, newline-aligned partitions     |
//! |  error/      - Error types                                          |
//! +---------------------------------------------------------------------+
//! ```

pub mod error;
pub mod io;
pub mod prelude;
pub mod record;
pub mod schema;

// Re-export commonly used types at crate root for convenience
pub use error::{Error, RecordError, Result};
pub use io::{LineKind, LogChunk, LogLine, LogLines, LogSource, PartitionRange};
pub use record::{coerce_field, parse_epoch_micros, parse_record, FieldValue};
pub use schema::{
    ConnLogSchema, DataKind, FieldDescriptor, CONN_FIELDS, CONN_FIELD_COUNT, TS_COLUMN,
    UNSET_PLACEHOLDER,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
