//! Loading and aggregation engine.
//!
//! This module provides the DataFusion integration for conn.log data.
//!
//! ## Architecture
//!
//! ```text
//! conn.log ──► LogLoader ──► LogDataset ──► MetricPlan ──► MetricResult
//!   (mmap)     (parallel     (partitioned    (lazy DataFusion  (ordered
//!               parse)        Arrow table)    logical plan)     key/count)
//! ```
//!
//! Both stages run on the worker pool owned by an [`ExecutionContext`].
//! The loader parses one newline-aligned range per worker into one table
//! partition; aggregations are grouped counts that DataFusion executes per
//! partition and merges.
//!
//! Every row carries a hidden `record_offset` column, the record's byte
//! offset in the file. It is never null, so counts use it as their witness,
//! and its minimum per group orders ties by first appearance.

pub mod aggregate;
pub mod arrow_schema;
mod builder;
pub mod context;
mod dataset;
pub mod loader;
pub mod metric;
mod provider;

pub use aggregate::{count_by_day, count_by_value, metric_suite, MetricPlan, SUITE_COLUMNS};
pub use arrow_schema::{dataset_schema, descriptors_to_arrow_schema, to_arrow_field};
pub use builder::ConnBatchBuilder;
pub use context::{EngineConfig, ExecutionContext, DEFAULT_BATCH_SIZE, DEFAULT_WORKERS};
pub use dataset::LogDataset;
pub use loader::{load, LoadOptions, LoadStats, LogLoader, RowPolicy};
pub use metric::{MetricKey, MetricKind, MetricResult, UNSET_LABEL};
pub use provider::ConnLogTableProvider;
