//! stock-tally - point ranking for pasted stock picks
//!
//! A CLI tool that reads pasted "# 候補銘柄" / "# ベスト3" answers,
//! awards points per mention and prints the merged ranking.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unreadable input, bad config, unwritable output)
//!   2 - Nothing could be scored and --fail-on-empty was set

mod analysis;
mod cli;
mod config;
mod input;
mod models;
mod prompt;
mod report;

use anyhow::{Context, Result};
use chrono::Local;
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use models::Ranking;
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("stock-tally v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Aggregation failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .stock-tally.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("Edit it to customize section markers, points, and report output.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so the report on stdout stays pipeable.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the aggregation workflow. Returns exit code (0 or 2).
fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    if args.prompt {
        return handle_prompt(&args, &config);
    }

    let blocks = input::read_blocks(&args.inputs)?;
    info!("Read {} input block(s)", blocks.len());
    for block in &blocks {
        debug!("  {:?}: {} lines", block.source, block.text.lines().count());
    }

    let rules = config.scoring_rules();
    let entries = analysis::aggregate(&blocks, &rules);
    let mut ranking = Ranking::new(entries, blocks.len(), rules.points);

    let empty = !ranking.has_scores();
    if empty {
        warn!(
            "No entries found. Expected \"# {}\" or \"# {}\" sections with \"- \" items.",
            rules.candidate_marker, rules.top3_marker
        );
    } else {
        info!("Ranked {} stocks", ranking.entries.len());
    }

    if let Some(limit) = config.general.limit {
        ranking.truncate(limit);
    }

    let output = report::render_report(&ranking, config.general.format, &config.report)?;
    emit(&output, args.output.as_deref())?;

    if empty && args.fail_on_empty {
        eprintln!("No entries could be scored. Failing (exit code 2).");
        return Ok(2);
    }

    Ok(0)
}

/// Handle --prompt: render the analysis prompt for the coming week.
fn handle_prompt(args: &Args, config: &Config) -> Result<i32> {
    let template = prompt::load_template(config.prompt.template.as_deref())?;
    let today = args.date.unwrap_or_else(|| Local::now().date_naive());
    debug!("Rendering prompt for week after {}", today);

    let text = prompt::render(&template, today);
    emit(&text, args.output.as_deref())?;
    Ok(0)
}

/// Print to stdout, or write to a file when an output path is set.
fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            report::write_report(content, path)?;
            info!("Report saved to: {}", path.display());
        }
        None => println!("{}", content.trim_end_matches('\n')),
    }
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
