//! Command-line interface module.
//!
//! This module handles:
//! - Argument parsing via clap
//! - Output formatting (table, CSV, JSON) for rows and metrics

mod args;
mod output;

pub use args::{Args, OutputFormat};
pub use output::OutputFormatter;
