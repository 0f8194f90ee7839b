//! Ranking report generation.
//!
//! This module renders the aggregated ranking as a Markdown table,
//! tab-separated values, or JSON.

use crate::cli::OutputFormat;
use crate::config::ReportConfig;
use crate::models::{Placement, PointWeights, Ranking, RankingMetadata, ScoreRecord};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

const PLACEMENTS: [Placement; 3] = [Placement::First, Placement::Second, Placement::Third];

/// Render the ranking in the requested format.
pub fn render_report(
    ranking: &Ranking,
    format: OutputFormat,
    config: &ReportConfig,
) -> Result<String> {
    match format {
        OutputFormat::Markdown => Ok(generate_markdown_report(ranking, config)),
        OutputFormat::Tsv => Ok(generate_tsv_report(ranking)),
        OutputFormat::Json => generate_json_report(ranking),
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(ranking: &Ranking, config: &ReportConfig) -> String {
    let mut output = String::new();

    output.push_str("# 集計結果ランキング\n\n");
    output.push_str(&generate_metadata_section(&ranking.metadata));

    if !ranking.has_scores() {
        output.push_str(&generate_empty_section());
    } else {
        output.push_str(&generate_ranking_table(
            &ranking.entries,
            &ranking.metadata.points,
            &config.empty_cell,
        ));
    }

    if config.show_legend {
        output.push_str(&generate_legend(&ranking.metadata.points));
    }

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &RankingMetadata) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "- **集計日時:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **入力データ数:** {}\n", metadata.input_blocks));
    section.push_str(&format!("- **銘柄数:** {}\n", metadata.total_entries));
    section.push('\n');

    section
}

fn generate_empty_section() -> String {
    let mut section = String::new();

    section.push_str("**集計データがありません**\n\n");
    section.push_str(
        "`# 候補銘柄` と `# ベスト3` の見出しを含むテキストを入力してください。\n\n",
    );

    section
}

/// Generate the ranking table.
fn generate_ranking_table(entries: &[ScoreRecord], points: &PointWeights, empty: &str) -> String {
    let mut table = String::new();

    table.push_str(&format!(
        "| 順位 | 銘柄名 | 合計pt | 候補({}pt) | 1位({}pt) | 2位({}pt) | 3位({}pt) |\n",
        points.candidate, points.first, points.second, points.third
    ));
    table.push_str("|:---:|:---|:---:|:---:|:---:|:---:|:---:|\n");

    for entry in entries {
        let mut row = format!(
            "| {} | {} | **{}** | {} |",
            rank_badge(entry.display_rank),
            escape_cell(&entry.name),
            entry.total,
            format_points(entry.candidate_count, empty),
        );
        for placement in PLACEMENTS {
            row.push_str(&format!(
                " {} |",
                format_points(entry.placement_points(placement), empty)
            ));
        }
        row.push('\n');
        table.push_str(&row);
    }
    table.push('\n');

    table
}

/// Generate the points legend line.
fn generate_legend(points: &PointWeights) -> String {
    format!(
        "*候補銘柄: {}pt ｜ 1位: {}pt ｜ 2位: {}pt ｜ 3位: {}pt*\n",
        points.candidate, points.first, points.second, points.third
    )
}

/// Medal for the podium, plain number below it.
pub fn rank_badge(rank: usize) -> String {
    match rank {
        1 => "🥇 1".to_string(),
        2 => "🥈 2".to_string(),
        3 => "🥉 3".to_string(),
        n => n.to_string(),
    }
}

/// Show a point cell, using the placeholder for zero.
pub fn format_points(value: u32, empty: &str) -> String {
    if value > 0 {
        value.to_string()
    } else {
        empty.to_string()
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Generate tab-separated rows for scripting.
///
/// Columns: rank, name, total, candidate, 1st, 2nd, 3rd (no header, raw numbers).
pub fn generate_tsv_report(ranking: &Ranking) -> String {
    ranking
        .entries
        .iter()
        .map(|entry| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                entry.display_rank,
                entry.name.replace('\t', " "),
                entry.total,
                entry.candidate_count,
                entry.rank1_points,
                entry.rank2_points,
                entry.rank3_points
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Generate a JSON report.
pub fn generate_json_report(ranking: &Ranking) -> Result<String> {
    serde_json::to_string_pretty(ranking).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    if !content.ends_with('\n') {
        file.write_all(b"\n")?;
    }

    Ok(())
}
