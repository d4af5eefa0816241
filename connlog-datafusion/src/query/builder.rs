//! Arrow batch builder for parsed conn.log records.
//!
//! Columns are created from the retained field descriptors, so the builder
//! follows the schema rather than hard-coding one builder per column.

use std::sync::Arc;

use arrow::array::*;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use connlog_core::schema::{ConnLogSchema, DataKind};
use connlog_core::FieldValue;

use super::arrow_schema::{dataset_schema, TIMESTAMP_TZ};
use crate::error::{Error, QueryError};

/// One Arrow builder per retained column.
enum ColumnBuilder {
    UInt16(UInt16Builder),
    UInt64(UInt64Builder),
    Float64(Float64Builder),
    Utf8(StringBuilder),
    Timestamp(TimestampMicrosecondBuilder),
}

impl ColumnBuilder {
    fn for_kind(kind: DataKind, capacity: usize) -> Self {
        match kind {
            DataKind::UInt16 => ColumnBuilder::UInt16(UInt16Builder::with_capacity(capacity)),
            DataKind::UInt64 => ColumnBuilder::UInt64(UInt64Builder::with_capacity(capacity)),
            DataKind::Float64 => ColumnBuilder::Float64(Float64Builder::with_capacity(capacity)),
            // Estimate average string value of 16 bytes
            DataKind::String => {
                ColumnBuilder::Utf8(StringBuilder::with_capacity(capacity, capacity * 16))
            }
            DataKind::TimestampMicros => {
                ColumnBuilder::Timestamp(TimestampMicrosecondBuilder::with_capacity(capacity))
            }
        }
    }

    /// Append a value; returns false when the value does not fit the column.
    fn append(&mut self, value: &FieldValue<'_>) -> bool {
        match (self, value) {
            (ColumnBuilder::UInt16(b), FieldValue::UInt16(v)) => b.append_value(*v),
            (ColumnBuilder::UInt64(b), FieldValue::UInt64(v)) => b.append_value(*v),
            (ColumnBuilder::Float64(b), FieldValue::Float64(v)) => b.append_value(*v),
            (ColumnBuilder::Utf8(b), FieldValue::Str(v)) => b.append_value(v),
            (ColumnBuilder::Timestamp(b), FieldValue::TimestampMicros(v)) => b.append_value(*v),
            (ColumnBuilder::UInt16(b), FieldValue::Null) => b.append_null(),
            (ColumnBuilder::UInt64(b), FieldValue::Null) => b.append_null(),
            (ColumnBuilder::Float64(b), FieldValue::Null) => b.append_null(),
            (ColumnBuilder::Utf8(b), FieldValue::Null) => b.append_null(),
            (ColumnBuilder::Timestamp(b), FieldValue::Null) => b.append_null(),
            _ => return false,
        }
        true
    }

    fn finish(&mut self) -> ArrayRef {
        match self {
            ColumnBuilder::UInt16(b) => Arc::new(b.finish()),
            ColumnBuilder::UInt64(b) => Arc::new(b.finish()),
            ColumnBuilder::Float64(b) => Arc::new(b.finish()),
            ColumnBuilder::Utf8(b) => Arc::new(b.finish()),
            ColumnBuilder::Timestamp(b) => Arc::new(b.finish().with_timezone(TIMESTAMP_TZ)),
        }
    }
}

/// Builds Arrow RecordBatches for the conn.log dataset.
pub struct ConnBatchBuilder {
    batch_size: usize,
    rows: usize,
    schema: SchemaRef,

    // Column builders
    columns: Vec<ColumnBuilder>,
    record_offsets: UInt64Builder,

    // Completed batches
    batches: Vec<RecordBatch>,
}

impl ConnBatchBuilder {
    /// Create a new builder producing batches of `batch_size` rows.
    pub fn new(batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            batch_size,
            rows: 0,
            schema: dataset_schema(),
            columns: Self::new_columns(batch_size),
            record_offsets: UInt64Builder::with_capacity(batch_size),
            batches: Vec::new(),
        }
    }

    fn new_columns(capacity: usize) -> Vec<ColumnBuilder> {
        ConnLogSchema
            .retained()
            .map(|f| ColumnBuilder::for_kind(f.kind, capacity))
            .collect()
    }

    /// Add one parsed record.
    ///
    /// `values` holds one entry per retained column, in schema order, as
    /// produced by [`connlog_core::parse_record`].
    pub fn add_record(&mut self, record_offset: u64, values: &[FieldValue<'_>]) -> Result<(), Error> {
        if values.len() != self.columns.len() {
            return Err(Error::Query(QueryError::Arrow(format!(
                "record at offset {record_offset} has {} values, dataset has {} columns",
                values.len(),
                self.columns.len()
            ))));
        }

        for (index, (column, value)) in self.columns.iter_mut().zip(values).enumerate() {
            if !column.append(value) {
                return Err(Error::Query(QueryError::Arrow(format!(
                    "value {value:?} does not match column {}",
                    self.schema.field(index).name()
                ))));
            }
        }
        self.record_offsets.append_value(record_offset);
        self.rows += 1;

        if self.rows >= self.batch_size {
            let batch = self.build_batch()?;
            self.batches.push(batch);
        }
        Ok(())
    }

    /// Number of rows added so far, across completed and pending batches.
    pub fn total_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum::<usize>() + self.rows
    }

    /// Finish and return all batches (the last one may be short).
    pub fn finish(mut self) -> Result<Vec<RecordBatch>, Error> {
        if self.rows > 0 {
            let batch = self.build_batch()?;
            self.batches.push(batch);
        }
        Ok(self.batches)
    }

    fn build_batch(&mut self) -> Result<RecordBatch, Error> {
        let mut arrays: Vec<ArrayRef> = self.columns.iter_mut().map(|c| c.finish()).collect();
        arrays.push(Arc::new(self.record_offsets.finish()));

        let batch = RecordBatch::try_new(self.schema.clone(), arrays)
            .map_err(|e| Error::Query(QueryError::Arrow(e.to_string())))?;

        self.rows = 0;
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connlog_core::parse_record;

    const LINE: &str = "1331901000.5\tCa\t10.0.0.1\t5353\t224.0.0.251\t5353\tudp\tdns\t-\t-\t-\tS0\t0\tD\t2\t120\t0\t0\t-\t-\t-";

    #[test]
    fn test_single_record() {
        let mut values = Vec::new();
        parse_record(LINE, 1, &mut values).unwrap();

        let mut builder = ConnBatchBuilder::new(16);
        builder.add_record(0, &values).unwrap();
        let batches = builder.finish().unwrap();

        assert_eq!(batches.len(), 1);
        let batch = &batches[0];
        assert_eq!(batch.num_rows(), 1);
        assert_eq!(batch.num_columns(), 16);

        let ts = batch
            .column(0)
            .as_any()
            .downcast_ref::<TimestampMicrosecondArray>()
            .unwrap();
        assert_eq!(ts.value(0), 1_331_901_000_500_000);

        let service = batch
            .column_by_name("service")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(service.value(0), "dns");

        let duration = batch.column_by_name("duration").unwrap();
        assert!(duration.is_null(0));
    }

    #[test]
    fn test_batches_split_at_batch_size() {
        let mut values = Vec::new();
        parse_record(LINE, 1, &mut values).unwrap();

        let mut builder = ConnBatchBuilder::new(2);
        for offset in 0..5u64 {
            builder.add_record(offset * 100, &values).unwrap();
        }
        assert_eq!(builder.total_rows(), 5);

        let batches = builder.finish().unwrap();
        let sizes: Vec<usize> = batches.iter().map(|b| b.num_rows()).collect();
        assert_eq!(sizes, vec![2, 2, 1]);

        let offsets = batches[2]
            .column_by_name("record_offset")
            .unwrap()
            .as_any()
            .downcast_ref::<UInt64Array>()
            .unwrap();
        assert_eq!(offsets.value(0), 400);
    }

    #[test]
    fn test_empty_builder() {
        let builder = ConnBatchBuilder::new(8);
        assert!(builder.finish().unwrap().is_empty());
    }

    #[test]
    fn test_wrong_value_count() {
        let mut builder = ConnBatchBuilder::new(8);
        let err = builder.add_record(0, &[FieldValue::UInt16(1)]).unwrap_err();
        assert!(matches!(err, Error::Query(QueryError::Arrow(_))));
    }
}
