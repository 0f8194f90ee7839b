//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use chrono::NaiveDate;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// stock-tally - aggregate pasted stock picks into a point ranking
///
/// Reads text blocks with "# 候補銘柄" candidate lists and "# ベスト3"
/// rankings, awards 1pt per candidate mention and 7/5/3pt per 1st/2nd/3rd
/// place, and prints the merged ranking.
///
/// Examples:
///   stock-tally answer1.txt answer2.txt
///   pbpaste | stock-tally --format tsv
///   stock-tally --format json --output ranking.json picks/*.txt
///   stock-tally --prompt --date 2026-10-18
///   stock-tally --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Input files, one pasted block per file
    ///
    /// Use "-" to read a block from stdin. Reads stdin when no files are given.
    #[arg(value_name = "FILES")]
    pub inputs: Vec<PathBuf>,

    /// Output format (markdown, tsv, json)
    ///
    /// Defaults to the config file setting, or markdown.
    #[arg(short, long, value_name = "FORMAT", env = "STOCK_TALLY_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .stock-tally.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Show only the first N rows of the ranking
    #[arg(long, value_name = "COUNT")]
    pub limit: Option<usize>,

    /// Exit with code 2 when nothing could be scored
    ///
    /// Useful in scripts to detect pastes in an unexpected format.
    #[arg(long)]
    pub fail_on_empty: bool,

    /// Print the analysis prompt instead of aggregating
    #[arg(long, conflicts_with_all = ["inputs", "fail_on_empty", "limit"])]
    pub prompt: bool,

    /// Reference date for the prompt's target week (YYYY-MM-DD)
    ///
    /// Defaults to today. The prompt targets the following Monday.
    #[arg(long, value_name = "DATE", requires = "prompt")]
    pub date: Option<NaiveDate>,

    /// Generate a default .stock-tally.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown table (default)
    #[default]
    Markdown,
    /// Tab-separated values
    Tsv,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.limit == Some(0) {
            return Err("Limit must be at least 1".to_string());
        }

        let stdin_count = self
            .inputs
            .iter()
            .filter(|p| p.as_os_str() == "-")
            .count();
        if stdin_count > 1 {
            return Err("Stdin (\"-\") can only be given once".to_string());
        }

        for path in self.inputs.iter().filter(|p| p.as_os_str() != "-") {
            if !path.exists() {
                return Err(format!("Input file does not exist: {}", path.display()));
            }
            if path.is_dir() {
                return Err(format!("Input path is a directory: {}", path.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        }
    }
}
