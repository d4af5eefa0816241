//! connlog-datafusion: parallel loading and aggregation of Zeek conn.log files.
//!
//! This crate provides the DataFusion integration for connlog:
//! - A parallel loader producing a partitioned, typed Arrow dataset
//! - Lazy count-by-day and count-by-value aggregations
//! - An execution context owning the bounded worker pool
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use connlog_datafusion::query::{count_by_value, load, EngineConfig, ExecutionContext};
//!
//! fn main() -> anyhow::Result<()> {
//!     let ctx = ExecutionContext::new(EngineConfig::with_workers(4))?;
//!
//!     let dataset = load(&ctx, "conn.log")?;
//!     let protocols = count_by_value(&ctx, &dataset, "proto")?.compute(&ctx)?;
//!     for (proto, count) in &protocols {
//!         println!("{proto}: {count}");
//!     }
//!
//!     ctx.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                      connlog-datafusion                             |
//! +---------------------------------------------------------------------+
//! |  query/        - ExecutionContext, LogLoader, Aggregator            |
//! |  cli/          - Command-line arguments and output formatting      |
//! |  error         - DataFusion-specific error types                    |
//! +---------------------------------------------------------------------+
//!                              |
//!                              v
//! +---------------------------------------------------------------------+
//! |                        connlog-core                                 |
//! +---------------------------------------------------------------------+
//! |  conn.log schema, record parsing, memory-mapped partitioning        |
//! +---------------------------------------------------------------------+
//! ```

pub mod cli;
pub mod error;
pub mod query;

// Re-export core for convenience
pub use connlog_core;

// Re-export commonly used types
pub use error::{Error, QueryError, Result};
pub use query::{
    count_by_day, count_by_value, load, EngineConfig, ExecutionContext, LogDataset, LogLoader,
    MetricKey, MetricResult,
};
