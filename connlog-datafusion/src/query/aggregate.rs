//! Aggregator: lazy count-by-day and count-by-value metrics.
//!
//! Building a [`MetricPlan`] only validates the request and records a
//! DataFusion logical plan; nothing is scanned until
//! [`compute`](MetricPlan::compute). Each plan is a grouped count over the
//! dataset's partitions, combined by DataFusion's partial/final aggregation.

use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use connlog_core::schema::TS_COLUMN;
use datafusion::dataframe::DataFrame;
use datafusion::functions_aggregate::expr_fn::{count, min};
use datafusion::logical_expr::{cast, col, ident};
use tracing::debug;

use super::arrow_schema::RECORD_OFFSET_COLUMN;
use super::context::ExecutionContext;
use super::dataset::LogDataset;
use super::metric::{MetricKind, MetricResult};
use crate::error::{Error, QueryError};

const KEY: &str = "key";
const COUNT: &str = "count";
const FIRST_SEEN: &str = "first_seen";

/// Columns reported by [`metric_suite`] after the per-day traffic count.
pub const SUITE_COLUMNS: [&str; 3] = ["proto", "service", "conn_state"];

/// A deferred aggregation over a [`LogDataset`].
#[derive(Debug, Clone)]
pub struct MetricPlan {
    kind: MetricKind,
    frame: DataFrame,
}

impl MetricPlan {
    /// What the plan groups by.
    pub fn kind(&self) -> &MetricKind {
        &self.kind
    }

    /// Indented logical plan, for `--verbose` output and debugging.
    pub fn explain(&self) -> String {
        self.frame.logical_plan().display_indent().to_string()
    }

    /// Execute the plan on the context's worker pool.
    pub fn compute(self, ctx: &ExecutionContext) -> Result<MetricResult, Error> {
        let kind = self.kind;
        let frame = self.frame;

        let batches: Vec<RecordBatch> = ctx
            .block_on(frame.collect())
            .map_err(|e| Error::Query(QueryError::from(e)))?;

        let result = MetricResult::from_batches(kind, &batches)?;
        debug!(
            metric = %result.kind(),
            groups = result.len(),
            total = result.total(),
            "metric computed"
        );
        Ok(result)
    }
}

/// Number of records per calendar day (UTC) of `ts`, ascending by day.
///
/// The key is the full date, not the day-of-month number, so the same day
/// number in different months stays in separate groups. Days without
/// records are absent, not zero-filled.
pub fn count_by_day(ctx: &ExecutionContext, dataset: &LogDataset) -> Result<MetricPlan, Error> {
    let frame = dataset
        .frame(ctx)?
        .aggregate(
            vec![cast(ident(TS_COLUMN), DataType::Date32).alias(KEY)],
            vec![count(ident(RECORD_OFFSET_COLUMN)).alias(COUNT)],
        )?
        .sort(vec![col(KEY).sort(true, false)])?;

    Ok(MetricPlan {
        kind: MetricKind::Day,
        frame,
    })
}

/// Number of records per distinct value of `column`, most frequent first.
///
/// Ties keep the order in which the values first appear in the file. Rows
/// holding the `-` placeholder form their own group. Fails with
/// [`QueryError::ColumnNotFound`] for anything not in
/// [`LogDataset::columns`].
pub fn count_by_value(
    ctx: &ExecutionContext,
    dataset: &LogDataset,
    column: &str,
) -> Result<MetricPlan, Error> {
    if !dataset.has_column(column) {
        return Err(Error::Query(QueryError::ColumnNotFound {
            column: column.to_string(),
            available: dataset.columns().join(", "),
        }));
    }

    let frame = dataset
        .frame(ctx)?
        .aggregate(
            vec![ident(column).alias(KEY)],
            vec![
                count(ident(RECORD_OFFSET_COLUMN)).alias(COUNT),
                min(ident(RECORD_OFFSET_COLUMN)).alias(FIRST_SEEN),
            ],
        )?
        .sort(vec![
            col(COUNT).sort(false, false),
            col(FIRST_SEEN).sort(true, false),
        ])?
        .select_columns(&[KEY, COUNT])?;

    Ok(MetricPlan {
        kind: MetricKind::Value {
            column: column.to_string(),
        },
        frame,
    })
}

/// The standard report: traffic per day, then counts by [`SUITE_COLUMNS`].
pub fn metric_suite(ctx: &ExecutionContext, dataset: &LogDataset) -> Result<Vec<MetricPlan>, Error> {
    let mut plans = Vec::with_capacity(1 + SUITE_COLUMNS.len());
    plans.push(count_by_day(ctx, dataset)?);
    for column in SUITE_COLUMNS {
        plans.push(count_by_value(ctx, dataset, column)?);
    }
    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::arrow_schema::dataset_schema;
    use crate::query::builder::ConnBatchBuilder;
    use crate::query::context::EngineConfig;
    use crate::query::loader::LoadStats;
    use crate::query::metric::MetricKey;
    use crate::query::provider::ConnLogTableProvider;
    use chrono::NaiveDate;
    use connlog_core::record::FieldValue;

    /// One record per `(ts_seconds, proto, service)`, split round-robin into
    /// `partitions` partitions so groups span partitions.
    fn dataset(rows: &[(i64, &str, Option<&str>)], partitions: usize) -> LogDataset {
        let mut builders: Vec<_> = (0..partitions).map(|_| ConnBatchBuilder::new(2)).collect();

        for (i, (ts, proto, service)) in rows.iter().enumerate() {
            let values = vec![
                FieldValue::TimestampMicros(ts * 1_000_000),
                FieldValue::Str("10.0.0.1"),
                FieldValue::UInt16(1234),
                FieldValue::Str("10.0.0.2"),
                FieldValue::UInt16(80),
                FieldValue::Str(proto),
                service.map_or(FieldValue::Null, FieldValue::Str),
                FieldValue::Null,
                FieldValue::Null,
                FieldValue::Null,
                FieldValue::Str("SF"),
                FieldValue::Null,
                FieldValue::UInt64(1),
                FieldValue::UInt64(40),
                FieldValue::UInt64(1),
            ];
            builders[i % partitions]
                .add_record(i as u64 * 100, &values)
                .unwrap();
        }

        let parts = builders.into_iter().map(|b| b.finish().unwrap()).collect();
        LogDataset::new(
            ConnLogTableProvider::new(dataset_schema(), parts),
            LoadStats::default(),
        )
    }

    fn value_kind(column: &str) -> MetricKind {
        MetricKind::Value {
            column: column.to_string(),
        }
    }

    #[test]
    fn test_count_by_day_ascending() {
        let ctx = ExecutionContext::new(EngineConfig::with_workers(2)).unwrap();
        let ds = dataset(
            &[
                (1331987400, "tcp", None),
                (1331901000, "tcp", None),
                (1331901000, "udp", None),
            ],
            2,
        );

        let result = count_by_day(&ctx, &ds).unwrap().compute(&ctx).unwrap();
        let d16 = NaiveDate::from_ymd_opt(2012, 3, 16).unwrap();
        let d17 = NaiveDate::from_ymd_opt(2012, 3, 17).unwrap();
        assert_eq!(
            result.entries(),
            &[(MetricKey::Day(d16), 2), (MetricKey::Day(d17), 1)]
        );
        ctx.shutdown();
    }

    #[test]
    fn test_count_by_value_ties_in_first_seen_order() {
        let ctx = ExecutionContext::new(EngineConfig::with_workers(3)).unwrap();
        let ds = dataset(
            &[
                (0, "udp", None),
                (0, "tcp", None),
                (0, "icmp", None),
                (0, "tcp", None),
            ],
            3,
        );

        let result = count_by_value(&ctx, &ds, "proto")
            .unwrap()
            .compute(&ctx)
            .unwrap();
        assert_eq!(result.kind(), &value_kind("proto"));
        assert_eq!(
            result.entries(),
            &[
                (MetricKey::value("tcp"), 2),
                (MetricKey::value("udp"), 1),
                (MetricKey::value("icmp"), 1)
            ]
        );
        ctx.shutdown();
    }

    #[test]
    fn test_unset_values_are_counted() {
        let ctx = ExecutionContext::new(EngineConfig::with_workers(2)).unwrap();
        let ds = dataset(
            &[(0, "tcp", Some("http")), (0, "tcp", None), (0, "tcp", None)],
            2,
        );

        let result = count_by_value(&ctx, &ds, "service")
            .unwrap()
            .compute(&ctx)
            .unwrap();
        assert_eq!(
            result.entries(),
            &[(MetricKey::Unset, 2), (MetricKey::value("http"), 1)]
        );
        assert_eq!(result.total(), ds.num_rows() as u64);
        ctx.shutdown();
    }

    #[test]
    fn test_unknown_columns_rejected() {
        let ctx = ExecutionContext::new(EngineConfig::with_workers(1)).unwrap();
        let ds = dataset(&[(0, "tcp", None)], 1);

        for column in ["uid", RECORD_OFFSET_COLUMN, "nope"] {
            let err = count_by_value(&ctx, &ds, column).unwrap_err();
            assert!(matches!(
                err,
                Error::Query(QueryError::ColumnNotFound { column: ref c, .. }) if c == column
            ));
        }
        ctx.shutdown();
    }

    #[test]
    fn test_empty_dataset() {
        let ctx = ExecutionContext::new(EngineConfig::with_workers(2)).unwrap();
        let ds = dataset(&[], 1);

        assert!(count_by_day(&ctx, &ds).unwrap().compute(&ctx).unwrap().is_empty());
        assert!(count_by_value(&ctx, &ds, "proto")
            .unwrap()
            .compute(&ctx)
            .unwrap()
            .is_empty());
        ctx.shutdown();
    }

    #[test]
    fn test_plan_is_lazy() {
        let ctx = ExecutionContext::new(EngineConfig::with_workers(1)).unwrap();
        let ds = dataset(&[(0, "tcp", None)], 1);

        let plan = count_by_value(&ctx, &ds, "id.resp_p").unwrap();
        assert!(plan.explain().contains("Aggregate"));
        let result = plan.compute(&ctx).unwrap();
        assert_eq!(result.entries(), &[(MetricKey::value("80"), 1)]);
        ctx.shutdown();
    }

    #[test]
    fn test_metric_suite_kinds() {
        let ctx = ExecutionContext::new(EngineConfig::with_workers(1)).unwrap();
        let ds = dataset(&[(0, "tcp", None)], 1);

        let plans = metric_suite(&ctx, &ds).unwrap();
        let kinds: Vec<_> = plans.iter().map(|p| p.kind().clone()).collect();
        assert_eq!(
            kinds,
            vec![
                MetricKind::Day,
                value_kind("proto"),
                value_kind("service"),
                value_kind("conn_state")
            ]
        );
        ctx.shutdown();
    }
}
