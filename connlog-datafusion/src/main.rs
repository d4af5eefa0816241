//! connlog CLI entry point.

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use connlog_core::schema::ConnLogSchema;
use connlog_datafusion::cli::{Args, OutputFormat, OutputFormatter};
use connlog_datafusion::query::{
    count_by_value, dataset_schema, metric_suite, EngineConfig, ExecutionContext, LoadOptions,
    LogDataset, LogLoader,
};

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| args.log_level().into()),
        )
        .init();

    if args.show_schema {
        show_schema();
        return Ok(());
    }

    let config = EngineConfig::with_workers(args.workers).batch_size(args.batch_size);
    let ctx = ExecutionContext::new(config).context("Failed to start worker pool")?;

    let outcome = run(&ctx, &args);
    ctx.shutdown();
    outcome
}

fn run(ctx: &ExecutionContext, args: &Args) -> Result<()> {
    let dataset = load(ctx, args)?;

    let formatter = OutputFormatter::new(args.format);
    let mut stdout = io::stdout().lock();

    if args.head > 0 {
        let head = dataset.head(args.head)?;
        formatter.write(&head, &mut stdout)?;
        section_break(args.format, &mut stdout)?;
    }

    let mut plans = metric_suite(ctx, &dataset)?;
    for column in &args.count_by {
        plans.push(count_by_value(ctx, &dataset, column)?);
    }

    for plan in plans {
        debug!(metric = %plan.kind(), plan = %plan.explain(), "computing metric");
        let metric = plan.compute(ctx)?;
        formatter.write_metric(&metric, &mut stdout)?;
        section_break(args.format, &mut stdout)?;
    }

    Ok(())
}

fn load(ctx: &ExecutionContext, args: &Args) -> Result<LogDataset> {
    let options = if args.skip_malformed {
        LoadOptions::skip_malformed()
    } else {
        LoadOptions::default()
    };

    let progress = args.progress.then(|| spinner(&args.file));
    let loaded = LogLoader::new(options).load(ctx, &args.file);

    if let Some(pb) = progress {
        match &loaded {
            Ok(dataset) => pb.finish_with_message(format!(
                "{} records loaded",
                dataset.stats().rows
            )),
            Err(_) => pb.finish_and_clear(),
        }
    }

    let dataset = loaded.with_context(|| format!("Failed to load {}", args.file.display()))?;

    let stats = dataset.stats();
    if let Some(first) = &stats.first_skipped {
        eprintln!(
            "Warning: skipped {} malformed record(s); first: {first}",
            stats.skipped_rows
        );
    }

    Ok(dataset)
}

fn spinner(path: &Path) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
    }
    pb.set_message(format!("Loading {}...", path.display()));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Blank line between table sections; JSON and CSV stay line-oriented.
fn section_break<W: Write>(format: OutputFormat, writer: &mut W) -> io::Result<()> {
    match format {
        OutputFormat::Table | OutputFormat::Csv => writeln!(writer),
        OutputFormat::Json => Ok(()),
    }
}

fn show_schema() {
    println!("=== conn.log ===");
    println!();
    println!("Records have {} tab-separated fields.", ConnLogSchema.fields().len());
    println!("Dropped fields are validated for count but never loaded.");
    println!();

    let schema = dataset_schema();
    println!("{:<16} {:<36} Nullable", "Column", "Type");
    println!("{:-<62}", "");
    for field in schema.fields() {
        if !ConnLogSchema.is_retained(field.name()) {
            continue;
        }
        let arrow_type = format!("{:?}", field.data_type());
        let nullable = if field.is_nullable() { "YES" } else { "NO" };
        println!("{:<16} {:<36} {}", field.name(), arrow_type, nullable);
    }

    println!();
    let dropped: Vec<&str> = ConnLogSchema.dropped().map(|f| f.name).collect();
    println!("Dropped: {}", dropped.join(", "));
}
