//! Aggregation results.

use std::fmt;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Date32Array, Int64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use chrono::NaiveDate;

use crate::error::{Error, QueryError};

/// Label shown for the unset (`-`) category.
pub const UNSET_LABEL: &str = "(unset)";

/// What a metric groups by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Calendar day (UTC) of the timestamp column
    Day,
    /// Distinct values of a column
    Value { column: String },
}

impl MetricKind {
    /// Header for the key column.
    pub fn key_label(&self) -> &str {
        match self {
            MetricKind::Day => "day",
            MetricKind::Value { column } => column,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Day => write!(f, "count by day"),
            MetricKind::Value { column } => write!(f, "count by {column}"),
        }
    }
}

/// Group key of one metric entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKey {
    /// A calendar day
    Day(NaiveDate),
    /// A column value in its display form
    Value(String),
    /// Rows whose value was the `-` placeholder
    Unset,
}

impl MetricKey {
    /// Shorthand for a value key.
    pub fn value(v: impl Into<String>) -> Self {
        MetricKey::Value(v.into())
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKey::Day(day) => write!(f, "{}", day.format("%Y-%m-%d")),
            MetricKey::Value(v) => f.write_str(v),
            MetricKey::Unset => f.write_str(UNSET_LABEL),
        }
    }
}

/// Ordered `(key, count)` series produced by one aggregation.
///
/// Day metrics are ordered by day ascending; value metrics by count
/// descending, ties in order of first appearance in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricResult {
    kind: MetricKind,
    entries: Vec<(MetricKey, u64)>,
}

impl MetricResult {
    /// Build a result from already ordered entries.
    pub fn new(kind: MetricKind, entries: Vec<(MetricKey, u64)>) -> Self {
        Self { kind, entries }
    }

    /// Convert collected `(key, count)` batches.
    ///
    /// Column 0 is the group key (Date32 for day metrics, any type for value
    /// metrics, null meaning unset); column 1 is the Int64 count.
    pub(crate) fn from_batches(kind: MetricKind, batches: &[RecordBatch]) -> Result<Self, Error> {
        let mut entries = Vec::new();

        for batch in batches {
            if batch.num_columns() < 2 {
                return Err(Error::Query(QueryError::Execution(format!(
                    "expected key and count columns, got {}",
                    batch.num_columns()
                ))));
            }
            let keys = batch.column(0);
            let counts = batch
                .column(1)
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(|| {
                    Error::Query(QueryError::Execution(format!(
                        "count column has type {}",
                        batch.column(1).data_type()
                    )))
                })?;

            for row in 0..batch.num_rows() {
                let key = match kind {
                    MetricKind::Day => day_key(keys, row)?,
                    MetricKind::Value { .. } => value_key(keys, row)?,
                };
                entries.push((key, counts.value(row).max(0) as u64));
            }
        }

        Ok(Self { kind, entries })
    }

    /// What the metric groups by.
    pub fn kind(&self) -> &MetricKind {
        &self.kind
    }

    /// Ordered entries.
    pub fn entries(&self) -> &[(MetricKey, u64)] {
        &self.entries
    }

    /// Iterate over the entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &(MetricKey, u64)> {
        self.entries.iter()
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no groups.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    /// Count for one key.
    pub fn get(&self, key: &MetricKey) -> Option<u64> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, c)| *c)
    }

    /// Largest count, 0 when empty.
    pub fn max_count(&self) -> u64 {
        self.entries.iter().map(|(_, c)| *c).max().unwrap_or(0)
    }

    /// Render as a two-column batch (`<key label>`, `count`) for tabular output.
    pub fn to_record_batch(&self) -> Result<RecordBatch, Error> {
        let schema = Arc::new(Schema::new(vec![
            Field::new(self.kind.key_label(), DataType::Utf8, false),
            Field::new("count", DataType::UInt64, false),
        ]));

        let keys: StringArray = self.entries.iter().map(|(k, _)| Some(k.to_string())).collect();
        let counts: UInt64Array = self.entries.iter().map(|(_, c)| Some(*c)).collect();
        let columns: Vec<ArrayRef> = vec![Arc::new(keys), Arc::new(counts)];

        RecordBatch::try_new(schema, columns).map_err(Error::from)
    }
}

impl<'a> IntoIterator for &'a MetricResult {
    type Item = &'a (MetricKey, u64);
    type IntoIter = std::slice::Iter<'a, (MetricKey, u64)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn day_key(keys: &ArrayRef, row: usize) -> Result<MetricKey, Error> {
    if keys.is_null(row) {
        return Ok(MetricKey::Unset);
    }
    let days = keys.as_any().downcast_ref::<Date32Array>().ok_or_else(|| {
        Error::Query(QueryError::Execution(format!(
            "day column has type {}",
            keys.data_type()
        )))
    })?;
    days.value_as_date(row).map(MetricKey::Day).ok_or_else(|| {
        Error::Query(QueryError::Execution(format!(
            "day value {} out of range",
            days.value(row)
        )))
    })
}

fn value_key(keys: &ArrayRef, row: usize) -> Result<MetricKey, Error> {
    if keys.is_null(row) {
        return Ok(MetricKey::Unset);
    }
    Ok(MetricKey::Value(array_value_to_string(keys, row)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn key_count_batch(keys: ArrayRef, counts: Vec<i64>) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("key", keys.data_type().clone(), true),
            Field::new("count", DataType::Int64, false),
        ]));
        RecordBatch::try_new(schema, vec![keys, Arc::new(Int64Array::from(counts))]).unwrap()
    }

    #[test]
    fn test_day_batches() {
        // 15415 = 2012-03-16
        let keys: ArrayRef = Arc::new(Date32Array::from(vec![15415, 15416]));
        let batch = key_count_batch(keys, vec![3, 2]);

        let result = MetricResult::from_batches(MetricKind::Day, &[batch]).unwrap();
        assert_eq!(
            result.entries(),
            &[
                (MetricKey::Day(day(2012, 3, 16)), 3),
                (MetricKey::Day(day(2012, 3, 17)), 2)
            ]
        );
        assert_eq!(result.total(), 5);
    }

    #[test]
    fn test_value_batches_with_null() {
        let keys: ArrayRef = Arc::new(StringArray::from(vec![Some("http"), None]));
        let batch = key_count_batch(keys, vec![4, 1]);
        let kind = MetricKind::Value {
            column: "service".to_string(),
        };

        let result = MetricResult::from_batches(kind, &[batch]).unwrap();
        assert_eq!(result.get(&MetricKey::value("http")), Some(4));
        assert_eq!(result.get(&MetricKey::Unset), Some(1));
        assert_eq!(result.max_count(), 4);
    }

    #[test]
    fn test_numeric_value_keys() {
        let keys: ArrayRef = Arc::new(arrow::array::UInt16Array::from(vec![80, 443]));
        let batch = key_count_batch(keys, vec![7, 2]);
        let kind = MetricKind::Value {
            column: "id.resp_p".to_string(),
        };

        let result = MetricResult::from_batches(kind, &[batch]).unwrap();
        assert_eq!(result.entries()[0], (MetricKey::value("80"), 7));
    }

    #[test]
    fn test_to_record_batch() {
        let result = MetricResult::new(
            MetricKind::Value {
                column: "proto".to_string(),
            },
            vec![(MetricKey::value("tcp"), 3), (MetricKey::Unset, 1)],
        );
        let batch = result.to_record_batch().unwrap();

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema().field(0).name(), "proto");
        let keys = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(keys.value(1), UNSET_LABEL);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(MetricKey::Day(day(1970, 1, 12)).to_string(), "1970-01-12");
        assert_eq!(MetricKey::value("udp").to_string(), "udp");
        assert_eq!(MetricKey::Unset.to_string(), "(unset)");
    }
}
