//! Execution context: the bounded worker pool and DataFusion session shared
//! by loading and aggregation.

use std::future::Future;
use std::time::Duration;

use datafusion::config::ConfigOptions;
use datafusion::prelude::SessionContext;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::error::Error;

/// Default worker pool size.
pub const DEFAULT_WORKERS: usize = 8;

/// Default number of rows per Arrow batch.
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// How long `shutdown` waits for in-flight tasks.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Engine configuration, fixed for the lifetime of an [`ExecutionContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Worker threads, parse tasks and DataFusion target partitions
    pub workers: usize,
    /// Rows per Arrow batch
    pub batch_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl EngineConfig {
    /// Config with `workers` threads and the default batch size.
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            ..Self::default()
        }
    }

    /// Builder: set the batch size.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    fn normalized(self) -> Self {
        Self {
            workers: self.workers.max(1),
            batch_size: self.batch_size.max(1),
        }
    }
}

/// Configure DataFusion to split work into one partition per worker.
fn create_session_context(config: &EngineConfig) -> SessionContext {
    let mut options = ConfigOptions::default();

    options.execution.target_partitions = config.workers;
    options.execution.batch_size = config.batch_size;

    SessionContext::new_with_config(options.into())
}

/// Owns the worker pool used by [`LogLoader`](super::LogLoader) and every
/// [`MetricPlan`](super::MetricPlan).
///
/// Create one before the first load and call [`shutdown`](Self::shutdown)
/// after the last aggregation. All methods are synchronous and must not be
/// called from inside another async runtime.
pub struct ExecutionContext {
    runtime: Runtime,
    session: SessionContext,
    config: EngineConfig,
}

impl ExecutionContext {
    /// Start a worker pool sized by `config.workers`.
    pub fn new(config: EngineConfig) -> Result<Self, Error> {
        let config = config.normalized();

        let runtime = Builder::new_multi_thread()
            .worker_threads(config.workers)
            .max_blocking_threads(config.workers)
            .thread_name("connlog-worker")
            .enable_all()
            .build()
            .map_err(Error::Io)?;

        let session = create_session_context(&config);

        debug!(
            workers = config.workers,
            batch_size = config.batch_size,
            "execution context started"
        );

        Ok(Self {
            runtime,
            session,
            config,
        })
    }

    /// The configuration the context was started with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the session context for advanced usage.
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Drive `future` to completion on the worker pool.
    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Stop the worker pool, waiting briefly for in-flight tasks.
    pub fn shutdown(self) {
        debug!("execution context shutting down");
        self.runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
