//! Memory-mapped log source.
//!
//! Uses `memmap2` crate for platform-independent memory mapping. The whole
//! file is mapped once and shared read-only between partition workers via
//! `Arc`, so splitting a multi-gigabyte log costs no copies.

use std::fs::File;
use std::io::ErrorKind;
use std::ops::Range;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::debug;

use crate::error::Error;

use super::chunk::{LogChunk, PartitionRange};

/// Memory-mapped conn.log file.
#[derive(Debug)]
pub struct LogSource {
    /// Path to the file (for error messages)
    path: PathBuf,
    /// Memory-mapped region; `None` for an empty file
    mmap: Option<Mmap>,
}

impl LogSource {
    /// Open and map a log file.
    ///
    /// A missing file is reported as [`Error::FileNotFound`]; every other
    /// open or map failure as [`Error::Io`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::FileNotFound {
                path: path.display().to_string(),
            },
            _ => Error::Io(e),
        })?;

        let len = file.metadata().map_err(Error::Io)?.len();
        let mmap = if len == 0 {
            None
        } else {
            // SAFETY: read-only mapping; the file must not be truncated while
            // the source is alive.
            Some(unsafe { Mmap::map(&file).map_err(Error::Io)? })
        };

        debug!(path = %path.display(), bytes = len, "mapped log file");

        Ok(Self { path, mmap })
    }

    /// Path the source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The whole file contents.
    pub fn bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    /// Size of the file in bytes.
    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    /// Whether the file is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Split the file into at most `max_partitions` contiguous ranges.
    ///
    /// Boundaries are moved forward to just past the next newline, so every
    /// line belongs to exactly one range. Ranges are returned in file order
    /// and never empty, except that an empty file yields a single empty
    /// range so callers always have one partition to work with.
    pub fn partition(&self, max_partitions: usize) -> Vec<PartitionRange> {
        let data = self.bytes();
        let parts = max_partitions.max(1);
        let target = data.len().div_ceil(parts).max(1);

        let mut ranges = Vec::with_capacity(parts);
        let mut start = 0usize;
        while start < data.len() {
            let tentative = (start + target).min(data.len());
            let end = next_line_start(data, tentative);
            ranges.push(PartitionRange {
                index: ranges.len(),
                start,
                end,
            });
            start = end;
        }

        if ranges.is_empty() {
            ranges.push(PartitionRange {
                index: 0,
                start: 0,
                end: 0,
            });
        }

        ranges
    }

    /// Borrow the bytes of one partition.
    pub fn chunk(&self, range: &PartitionRange) -> LogChunk<'_> {
        let bytes = self.bytes();
        let span: Range<usize> = range.start.min(bytes.len())..range.end.min(bytes.len());
        LogChunk::new(*range, &bytes[span])
    }
}

/// First offset at or after `pos` that starts a line.
fn next_line_start(data: &[u8], pos: usize) -> usize {
    if pos == 0 || pos >= data.len() {
        return pos.min(data.len());
    }
    if data[pos - 1] == b'\n' {
        return pos;
    }
    match data[pos..].iter().position(|&b| b == b'\n') {
        Some(i) => pos + i + 1,
        None => data.len(),
    }
}
