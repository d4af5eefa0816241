//! Log Loader: conn.log file to partitioned, typed dataset.
//!
//! The file is memory-mapped and split into one newline-aligned range per
//! worker. Each range is parsed on the execution context's blocking pool
//! into its own partition of Arrow batches, so partitions come out in file
//! order and nothing is re-parsed by later aggregations.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arrow::record_batch::RecordBatch;
use connlog_core::error::RecordError;
use connlog_core::schema::CONN_FIELD_COUNT;
use connlog_core::{parse_record, LineKind, LogSource, PartitionRange};
use tracing::{debug, info, warn};

use super::arrow_schema::dataset_schema;
use super::builder::ConnBatchBuilder;
use super::context::ExecutionContext;
use super::dataset::LogDataset;
use super::provider::ConnLogTableProvider;
use crate::error::{CoreError, Error, QueryError};

/// What to do with a line that does not fit the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPolicy {
    /// Abort the load on the first malformed record
    #[default]
    FailFast,
    /// Drop malformed records and count them in [`LoadStats::skipped_rows`]
    Skip,
}

/// Loader configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Malformed record handling
    pub row_policy: RowPolicy,
}

impl LoadOptions {
    /// Options that skip malformed records instead of failing.
    pub fn skip_malformed() -> Self {
        Self {
            row_policy: RowPolicy::Skip,
        }
    }
}

/// Statistics gathered during a load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadStats {
    /// Records loaded into the dataset
    pub rows: u64,
    /// Malformed records dropped under [`RowPolicy::Skip`]
    pub skipped_rows: u64,
    /// First malformed record dropped, with its file line number
    pub first_skipped: Option<RecordError>,
    /// `#` directive and blank lines
    pub ignored_lines: u64,
    /// Lines read, of any kind
    pub lines: u64,
    /// Partitions produced
    pub partitions: usize,
    /// Size of the source file
    pub bytes: u64,
    /// Wall-clock time of the load
    pub elapsed: Duration,
}

/// Output of one parse task.
#[derive(Debug, Default)]
struct ParsedPartition {
    batches: Vec<RecordBatch>,
    lines: u64,
    rows: u64,
    skipped_rows: u64,
    first_skipped: Option<RecordError>,
    ignored_lines: u64,
}

/// Reads conn.log files into [`LogDataset`]s.
#[derive(Debug, Clone, Default)]
pub struct LogLoader {
    options: LoadOptions,
}

impl LogLoader {
    /// Create a loader with the given options.
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    /// The loader's options.
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Load, validate and partition a conn.log file.
    ///
    /// Fails with [`CoreError::FileNotFound`] or [`CoreError::Io`] when the
    /// file cannot be read. Under [`RowPolicy::FailFast`] the first malformed
    /// record, in file order, fails the load with its 1-based line number.
    pub fn load<P: AsRef<Path>>(&self, ctx: &ExecutionContext, path: P) -> Result<LogDataset, Error> {
        let started = Instant::now();
        let path = path.as_ref();

        let source = Arc::new(LogSource::open(path)?);
        let ranges = source.partition(ctx.config().workers);

        info!(
            path = %path.display(),
            bytes = source.len(),
            partitions = ranges.len(),
            "loading conn.log"
        );

        let parsed = ctx.block_on(parse_partitions(
            Arc::clone(&source),
            ranges,
            ctx.config().batch_size,
            self.options.row_policy,
        ))?;

        let mut stats = LoadStats {
            partitions: parsed.len(),
            bytes: source.len() as u64,
            ..LoadStats::default()
        };
        let mut partitions = Vec::with_capacity(parsed.len());

        for outcome in parsed {
            let partition = match outcome {
                Ok(partition) => partition,
                Err(err) => return Err(rebase(err, stats.lines)),
            };

            if stats.first_skipped.is_none() {
                stats.first_skipped = partition
                    .first_skipped
                    .map(|e| e.with_line_offset(stats.lines));
            }
            stats.rows += partition.rows;
            stats.skipped_rows += partition.skipped_rows;
            stats.ignored_lines += partition.ignored_lines;
            stats.lines += partition.lines;
            partitions.push(partition.batches);
        }
        stats.elapsed = started.elapsed();

        if let Some(first) = &stats.first_skipped {
            warn!(
                skipped = stats.skipped_rows,
                first = %first,
                "skipped malformed records"
            );
        }
        info!(
            rows = stats.rows,
            ignored_lines = stats.ignored_lines,
            partitions = stats.partitions,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "conn.log loaded"
        );

        Ok(LogDataset::new(
            ConnLogTableProvider::new(dataset_schema(), partitions),
            stats,
        ))
    }
}

/// Load `path` with default options (fail fast on malformed records).
pub fn load<P: AsRef<Path>>(ctx: &ExecutionContext, path: P) -> Result<LogDataset, Error> {
    LogLoader::default().load(ctx, path)
}

/// Shift a partition-relative record error to a file line number.
fn rebase(err: Error, preceding_lines: u64) -> Error {
    match err {
        Error::Core(CoreError::Record(e)) => Error::from(e.with_line_offset(preceding_lines)),
        other => other,
    }
}

/// Parse every range concurrently; results are returned in range order.
async fn parse_partitions(
    source: Arc<LogSource>,
    ranges: Vec<PartitionRange>,
    batch_size: usize,
    policy: RowPolicy,
) -> Result<Vec<Result<ParsedPartition, Error>>, Error> {
    let handles: Vec<_> = ranges
        .into_iter()
        .map(|range| {
            let source = Arc::clone(&source);
            tokio::task::spawn_blocking(move || parse_partition(&source, &range, batch_size, policy))
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        let outcome = handle
            .await
            .map_err(|e| Error::Query(QueryError::Runtime(e.to_string())))?;
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

fn parse_partition(
    source: &LogSource,
    range: &PartitionRange,
    batch_size: usize,
    policy: RowPolicy,
) -> Result<ParsedPartition, Error> {
    let chunk = source.chunk(range);
    let mut builder = ConnBatchBuilder::new(batch_size);
    let mut values = Vec::with_capacity(CONN_FIELD_COUNT);
    let mut parsed = ParsedPartition::default();

    for line in chunk.lines() {
        parsed.lines += 1;

        if line.kind() != LineKind::Record {
            parsed.ignored_lines += 1;
            continue;
        }

        let result = match line.text() {
            Some(text) => parse_record(text, line.number, &mut values),
            None => Err(RecordError::InvalidUtf8 { line: line.number }),
        };

        match (result, policy) {
            (Ok(()), _) => builder.add_record(line.offset, &values)?,
            (Err(err), RowPolicy::FailFast) => return Err(err.into()),
            (Err(err), RowPolicy::Skip) => {
                debug!(offset = line.offset, error = %err, "skipping malformed record");
                parsed.skipped_rows += 1;
                parsed.first_skipped.get_or_insert(err);
            }
        }
    }

    parsed.rows = builder.total_rows() as u64;
    parsed.batches = builder.finish()?;

    debug!(
        partition = range.index,
        rows = parsed.rows,
        skipped = parsed.skipped_rows,
        "partition parsed"
    );

    Ok(parsed)
}
