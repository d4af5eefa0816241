//! DataFusion TableProvider implementation for loaded conn.log data.

use std::any::Any;
use std::sync::Arc;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use datafusion::catalog::Session;
use datafusion::datasource::{TableProvider, TableType};
use datafusion::error::Result as DFResult;
use datafusion::physical_plan::ExecutionPlan;
use datafusion::prelude::*;
use datafusion_datasource::memory::MemorySourceConfig;

/// A TableProvider backed by partitioned in-memory Arrow RecordBatches.
///
/// Each inner `Vec` is one partition; DataFusion scans partitions in
/// parallel, so the partition layout chosen by the loader is the unit of
/// parallel work for every aggregation.
#[derive(Debug)]
pub struct ConnLogTableProvider {
    schema: SchemaRef,
    partitions: Vec<Vec<RecordBatch>>,
}

impl ConnLogTableProvider {
    /// Create a new provider with the given schema and partitions.
    pub fn new(schema: SchemaRef, partitions: Vec<Vec<RecordBatch>>) -> Self {
        Self { schema, partitions }
    }

    /// Schema shared by every batch.
    pub fn schema_ref(&self) -> &SchemaRef {
        &self.schema
    }

    /// The partitions in file order.
    pub fn partitions(&self) -> &[Vec<RecordBatch>] {
        &self.partitions
    }

    /// Total number of rows across all partitions.
    pub fn num_rows(&self) -> usize {
        self.partitions
            .iter()
            .flat_map(|p| p.iter())
            .map(|b| b.num_rows())
            .sum()
    }
}

#[async_trait]
impl TableProvider for ConnLogTableProvider {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    fn table_type(&self) -> TableType {
        TableType::Base
    }

    async fn scan(
        &self,
        _state: &dyn Session,
        projection: Option<&Vec<usize>>,
        _filters: &[Expr],
        _limit: Option<usize>,
    ) -> DFResult<Arc<dyn ExecutionPlan>> {
        Ok(MemorySourceConfig::try_new_exec(
            &self.partitions,
            self.schema.clone(),
            projection.cloned(),
        )? as Arc<dyn ExecutionPlan>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::UInt64Array;
    use arrow::datatypes::{DataType, Field, Schema};

    fn batch(schema: &SchemaRef, values: Vec<u64>) -> RecordBatch {
        RecordBatch::try_new(schema.clone(), vec![Arc::new(UInt64Array::from(values))]).unwrap()
    }

    #[tokio::test]
    async fn test_scan_all_partitions() {
        let schema: SchemaRef = Arc::new(Schema::new(vec![Field::new(
            "record_offset",
            DataType::UInt64,
            false,
        )]));
        let provider = ConnLogTableProvider::new(
            schema.clone(),
            vec![
                vec![batch(&schema, vec![0, 10])],
                vec![batch(&schema, vec![20]), batch(&schema, vec![30, 40])],
            ],
        );
        assert_eq!(provider.num_rows(), 5);
        assert_eq!(provider.partitions().len(), 2);

        let ctx = SessionContext::new();
        let df = ctx.read_table(Arc::new(provider)).unwrap();
        assert_eq!(df.count().await.unwrap(), 5);
    }
}
