//! Log file access.
//!
//! [`LogSource`] maps a conn.log file into memory and splits it into
//! newline-aligned [`PartitionRange`]s; each range is read through a
//! [`LogChunk`] that yields [`LogLine`]s.

mod chunk;
mod mmap;

pub use chunk::{LineKind, LogChunk, LogLine, LogLines, PartitionRange};
pub use mmap::LogSource;
