// Command-line argument definitions.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table (default)
    Table,
    /// Comma-separated values
    Csv,
    /// JSON Lines (one JSON object per row)
    Json,
}

/// Load a Zeek conn.log file and report connection counts.
#[derive(Parser, Debug)]
#[command(name = "connlog")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// conn.log file to load
    #[arg(value_name = "FILE", default_value = "./conn.log")]
    pub file: PathBuf,

    /// Worker threads for loading and aggregation
    #[arg(short = 'w', long = "workers", default_value = "8", value_parser = parse_positive)]
    pub workers: usize,

    /// Batch size for processing (rows per batch)
    #[arg(long = "batch-size", default_value = "8192", value_parser = parse_positive)]
    pub batch_size: usize,

    /// Skip malformed records instead of aborting the load
    #[arg(long = "skip-malformed")]
    pub skip_malformed: bool,

    /// Output format for stdout
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Number of loaded rows to preview before the metrics (0 to disable)
    #[arg(long = "head", default_value = "3", value_name = "ROWS")]
    pub head: usize,

    /// Additional columns to count by, after the standard report
    #[arg(short = 'c', long = "count-by", value_name = "COLUMN")]
    pub count_by: Vec<String>,

    /// Show the dataset schema and exit
    #[arg(long = "schema")]
    pub show_schema: bool,

    /// Show a spinner while loading
    #[arg(long = "progress")]
    pub progress: bool,

    /// Enable verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Value parser for counts that must be at least 1.
fn parse_positive(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("Invalid number '{s}': {e}")),
    }
}

impl Args {
    /// Default tracing filter directive for the verbosity level.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
