//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.stock-tally.toml` files.

use crate::cli::OutputFormat;
use crate::models::{PointWeights, ScoringRules};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest accepted point weight per mention.
pub const MAX_POINTS: u32 = 1_000_000;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".stock-tally.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Section marker settings.
    #[serde(default)]
    pub markers: MarkerConfig,

    /// Point weights.
    #[serde(default)]
    pub points: PointsConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Prompt settings.
    #[serde(default)]
    pub prompt: PromptConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Default row limit for the ranking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Substrings that identify section headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Marker for candidate-list sections.
    #[serde(default = "default_candidate_marker")]
    pub candidate: String,

    /// Marker for top-3 sections.
    #[serde(default = "default_top3_marker")]
    pub top3: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            candidate: default_candidate_marker(),
            top3: default_top3_marker(),
        }
    }
}

fn default_candidate_marker() -> String {
    "候補銘柄".to_string()
}

fn default_top3_marker() -> String {
    "ベスト3".to_string()
}

/// Points awarded per mention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsConfig {
    #[serde(default = "default_candidate_points")]
    pub candidate: u32,

    #[serde(default = "default_first_points")]
    pub first: u32,

    #[serde(default = "default_second_points")]
    pub second: u32,

    #[serde(default = "default_third_points")]
    pub third: u32,
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            candidate: default_candidate_points(),
            first: default_first_points(),
            second: default_second_points(),
            third: default_third_points(),
        }
    }
}

fn default_candidate_points() -> u32 {
    1
}

fn default_first_points() -> u32 {
    7
}

fn default_second_points() -> u32 {
    5
}

fn default_third_points() -> u32 {
    3
}

/// Report rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Text shown in point columns that are zero.
    #[serde(default = "default_empty_cell")]
    pub empty_cell: String,

    /// Append the points legend under the Markdown table.
    #[serde(default = "default_true")]
    pub show_legend: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            empty_cell: default_empty_cell(),
            show_legend: true,
        }
    }
}

fn default_empty_cell() -> String {
    "—".to_string()
}

fn default_true() -> bool {
    true
}

/// Analysis prompt settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Custom template file. `{DATE}` is replaced with the target week label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(format) = args.format {
            self.general.format = format;
        }

        if args.limit.is_some() {
            self.general.limit = args.limit;
        }
    }

    /// Check settings that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.markers.candidate.trim().is_empty() || self.markers.top3.trim().is_empty() {
            bail!("Section markers must not be empty");
        }
        if self.markers.candidate == self.markers.top3 {
            bail!("Candidate and top-3 markers must differ");
        }
        if self.general.limit == Some(0) {
            bail!("Limit must be at least 1");
        }
        let points = &self.points;
        for (name, value) in [
            ("candidate", points.candidate),
            ("first", points.first),
            ("second", points.second),
            ("third", points.third),
        ] {
            if value > MAX_POINTS {
                bail!("points.{} must be at most {}, got {}", name, MAX_POINTS, value);
            }
        }
        Ok(())
    }

    /// Scoring rules derived from the marker and points sections.
    pub fn scoring_rules(&self) -> ScoringRules {
        ScoringRules {
            candidate_marker: self.markers.candidate.clone(),
            top3_marker: self.markers.top3.clone(),
            points: PointWeights {
                candidate: self.points.candidate,
                first: self.points.first,
                second: self.points.second,
                third: self.points.third,
            },
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
