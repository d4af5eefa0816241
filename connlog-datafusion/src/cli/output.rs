//! Output formatting for loaded rows and metric results.
//!
//! Rows are displayed in table, CSV, or JSON format. Metrics are rendered
//! through the same writers; the table form adds a proportional bar column.

use std::io::Write;
use std::sync::Arc;

use arrow::array::{Array, RecordBatch};
use arrow::util::display::array_value_to_string;

use super::args::OutputFormat;
use crate::query::MetricResult;

/// Width of the bar column for the largest count.
const BAR_WIDTH: usize = 40;

/// Placeholder shown for null cells in tables, as written in conn.log.
const NULL_CELL: &str = "-";

/// Formats results for output.
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    /// Create a new formatter with the specified format.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format a RecordBatch and write to the given writer.
    pub fn write<W: Write>(&self, batch: &RecordBatch, writer: &mut W) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Table => self.write_table(batch, writer),
            OutputFormat::Csv => self.write_csv(batch, writer),
            OutputFormat::Json => self.write_json(batch, writer),
        }
    }

    /// Write a metric under a title line.
    ///
    /// JSON output emits one `{"metric", "key", "count"}` object per entry
    /// instead of a title.
    pub fn write_metric<W: Write>(
        &self,
        metric: &MetricResult,
        writer: &mut W,
    ) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Table => {
                writeln!(writer, "{}", metric.kind())?;
                self.write_metric_table(metric, writer)
            }
            OutputFormat::Csv => {
                writeln!(writer, "# {}", metric.kind())?;
                let batch = metric.to_record_batch().map_err(std::io::Error::other)?;
                self.write_csv(&batch, writer)
            }
            OutputFormat::Json => {
                let label = metric.kind().to_string();
                for (key, count) in metric {
                    let obj = serde_json::json!({
                        "metric": label,
                        "key": key.to_string(),
                        "count": count,
                    });
                    writeln!(writer, "{obj}")?;
                }
                Ok(())
            }
        }
    }

    fn format_value(col: &Arc<dyn Array>, row_idx: usize) -> Option<String> {
        if col.is_null(row_idx) {
            return None;
        }
        Some(array_value_to_string(col, row_idx).unwrap_or_else(|_| "?".to_string()))
    }

    fn write_table<W: Write>(&self, batch: &RecordBatch, writer: &mut W) -> std::io::Result<()> {
        use comfy_table::{Cell, Table};

        let mut table = Table::new();

        let headers: Vec<Cell> = batch
            .schema()
            .fields()
            .iter()
            .map(|f| Cell::new(f.name()))
            .collect();
        table.set_header(headers);

        for row_idx in 0..batch.num_rows() {
            let row: Vec<Cell> = batch
                .columns()
                .iter()
                .map(|col| {
                    Cell::new(Self::format_value(col, row_idx).unwrap_or_else(|| NULL_CELL.into()))
                })
                .collect();
            table.add_row(row);
        }

        writeln!(writer, "{table}")
    }

    fn write_metric_table<W: Write>(
        &self,
        metric: &MetricResult,
        writer: &mut W,
    ) -> std::io::Result<()> {
        use comfy_table::{Cell, CellAlignment, Table};

        let mut table = Table::new();
        table.set_header(vec![
            Cell::new(metric.kind().key_label()),
            Cell::new("count"),
            Cell::new(""),
        ]);

        let max = metric.max_count();
        for (key, count) in metric {
            table.add_row(vec![
                Cell::new(key),
                Cell::new(count).set_alignment(CellAlignment::Right),
                Cell::new(bar(*count, max)),
            ]);
        }

        writeln!(writer, "{table}")
    }

    fn write_csv<W: Write>(&self, batch: &RecordBatch, writer: &mut W) -> std::io::Result<()> {
        let schema = batch.schema();
        let headers: Vec<String> = schema.fields().iter().map(|f| csv_escape(f.name())).collect();
        writeln!(writer, "{}", headers.join(","))?;

        for row_idx in 0..batch.num_rows() {
            let values: Vec<String> = batch
                .columns()
                .iter()
                .map(|col| Self::format_value(col, row_idx).map_or_else(String::new, |v| csv_escape(&v)))
                .collect();
            writeln!(writer, "{}", values.join(","))?;
        }

        Ok(())
    }

    fn write_json<W: Write>(&self, batch: &RecordBatch, writer: &mut W) -> std::io::Result<()> {
        let schema = batch.schema();

        for row_idx in 0..batch.num_rows() {
            let mut obj = serde_json::Map::new();
            for (col_idx, field) in schema.fields().iter().enumerate() {
                let col = batch.column(col_idx);

                let json_value = match Self::format_value(col, row_idx) {
                    None => serde_json::Value::Null,
                    Some(value) if col.data_type().is_numeric() => {
                        if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::json!(n)
                        } else {
                            serde_json::Value::String(value)
                        }
                    }
                    Some(value) => serde_json::Value::String(value),
                };

                obj.insert(field.name().clone(), json_value);
            }

            writeln!(writer, "{}", serde_json::Value::Object(obj))?;
        }

        Ok(())
    }
}

/// Escape commas, quotes and newlines.
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Bar proportional to `count / max`; non-zero counts get at least one cell.
fn bar(count: u64, max: u64) -> String {
    if max == 0 || count == 0 {
        return String::new();
    }
    let cells = ((count as u128 * BAR_WIDTH as u128) / max as u128).max(1) as usize;
    "#".repeat(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{MetricKey, MetricKind};
    use arrow::array::{StringArray, UInt16Array};
    use arrow::datatypes::{DataType, Field, Schema};

    fn create_test_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("proto", DataType::Utf8, false),
            Field::new("service", DataType::Utf8, true),
            Field::new("id.resp_p", DataType::UInt16, false),
        ]));

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["tcp", "udp"])),
                Arc::new(StringArray::from(vec![Some("http, tls"), None])),
                Arc::new(UInt16Array::from(vec![443, 53])),
            ],
        )
        .unwrap()
    }

    fn metric() -> MetricResult {
        MetricResult::new(
            MetricKind::Value {
                column: "proto".to_string(),
            },
            vec![
                (MetricKey::value("tcp"), 4),
                (MetricKey::value("udp"), 2),
                (MetricKey::Unset, 1),
            ],
        )
    }

    fn render(format: OutputFormat, batch: &RecordBatch) -> String {
        let mut out = Vec::new();
        OutputFormatter::new(format).write(batch, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_table_output() {
        let output = render(OutputFormat::Table, &create_test_batch());

        assert!(output.contains("id.resp_p"));
        assert!(output.contains("443"));
        assert!(output.contains(" - "));
    }

    #[test]
    fn test_csv_output() {
        let output = render(OutputFormat::Csv, &create_test_batch());
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "proto,service,id.resp_p");
        assert_eq!(lines[1], "tcp,\"http, tls\",443");
        assert_eq!(lines[2], "udp,,53");
    }

    #[test]
    fn test_json_output() {
        let output = render(OutputFormat::Json, &create_test_batch());
        let first: serde_json::Value = serde_json::from_str(output.lines().next().unwrap()).unwrap();
        let second: serde_json::Value = serde_json::from_str(output.lines().nth(1).unwrap()).unwrap();

        assert_eq!(first["proto"], "tcp");
        assert_eq!(first["id.resp_p"], 443);
        assert!(second["service"].is_null());
    }

    #[test]
    fn test_metric_table_has_bars() {
        let mut out = Vec::new();
        OutputFormatter::new(OutputFormat::Table)
            .write_metric(&metric(), &mut out)
            .unwrap();
        let output = String::from_utf8(out).unwrap();

        assert!(output.starts_with("count by proto"));
        assert!(output.contains(&"#".repeat(BAR_WIDTH)));
        assert!(output.contains("(unset)"));
    }

    #[test]
    fn test_metric_json_lines() {
        let mut out = Vec::new();
        OutputFormatter::new(OutputFormat::Json)
            .write_metric(&metric(), &mut out)
            .unwrap();
        let output = String::from_utf8(out).unwrap();
        let rows: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["key"], "tcp");
        assert_eq!(rows[0]["count"], 4);
        assert_eq!(rows[2]["key"], crate::query::UNSET_LABEL);
    }

    #[test]
    fn test_metric_csv() {
        let mut out = Vec::new();
        OutputFormatter::new(OutputFormat::Csv)
            .write_metric(&metric(), &mut out)
            .unwrap();
        let output = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "# count by proto");
        assert_eq!(lines[1], "proto,count");
        assert_eq!(lines[2], "tcp,4");
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(0, 10), "");
        assert_eq!(bar(10, 10).len(), BAR_WIDTH);
        assert_eq!(bar(1, 1_000_000).len(), 1);
        assert_eq!(bar(5, 10).len(), BAR_WIDTH / 2);
    }
}
