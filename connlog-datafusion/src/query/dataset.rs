//! The loaded, partitioned conn.log table.

use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use connlog_core::schema::TS_COLUMN;
use datafusion::dataframe::DataFrame;

use super::arrow_schema::RECORD_OFFSET_COLUMN;
use super::context::ExecutionContext;
use super::loader::LoadStats;
use super::provider::ConnLogTableProvider;
use crate::error::{Error, QueryError};

/// Typed, partitioned dataset produced by [`LogLoader`](super::LogLoader).
///
/// Cheap to clone; all clones share the same immutable partitions.
#[derive(Debug, Clone)]
pub struct LogDataset {
    provider: Arc<ConnLogTableProvider>,
    stats: LoadStats,
}

impl LogDataset {
    pub(crate) fn new(provider: ConnLogTableProvider, stats: LoadStats) -> Self {
        Self {
            provider: Arc::new(provider),
            stats,
        }
    }

    /// Retained conn.log columns in declared order.
    ///
    /// The loader-assigned `record_offset` column is not listed.
    pub fn columns(&self) -> Vec<&str> {
        self.provider
            .schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .filter(|name| *name != RECORD_OFFSET_COLUMN)
            .collect()
    }

    /// Whether `name` is one of [`columns`](Self::columns).
    pub fn has_column(&self, name: &str) -> bool {
        name != RECORD_OFFSET_COLUMN && self.schema().field_with_name(name).is_ok()
    }

    /// Name of the timestamp column.
    pub fn timestamp_column(&self) -> &'static str {
        TS_COLUMN
    }

    /// Full Arrow schema of the physical table, `record_offset` included.
    pub fn schema(&self) -> SchemaRef {
        self.provider.schema_ref().clone()
    }

    /// Total number of rows.
    pub fn num_rows(&self) -> usize {
        self.provider.num_rows()
    }

    /// Number of partitions (units of parallel work).
    pub fn num_partitions(&self) -> usize {
        self.provider.partitions().len()
    }

    /// The partitions in file order.
    pub fn partitions(&self) -> &[Vec<RecordBatch>] {
        self.provider.partitions()
    }

    /// Statistics gathered while loading.
    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    /// First `n` rows in file order, retained columns only.
    pub fn head(&self, n: usize) -> Result<RecordBatch, Error> {
        let schema = self.schema();
        let mut taken = Vec::new();
        let mut remaining = n;

        for batch in self.partitions().iter().flatten() {
            if remaining == 0 {
                break;
            }
            let rows = batch.num_rows().min(remaining);
            taken.push(batch.slice(0, rows));
            remaining -= rows;
        }

        let combined = concat_batches(&schema, &taken)?;
        let projection: Vec<usize> = (0..schema.fields().len())
            .filter(|&i| schema.field(i).name() != RECORD_OFFSET_COLUMN)
            .collect();
        Ok(combined.project(&projection)?)
    }

    /// Start a lazy DataFusion plan over the dataset.
    pub(crate) fn frame(&self, ctx: &ExecutionContext) -> Result<DataFrame, Error> {
        ctx.session()
            .read_table(self.provider.clone())
            .map_err(|e| Error::Query(QueryError::from(e)))
    }
}
