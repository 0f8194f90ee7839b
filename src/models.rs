//! Data models for the point tally.
//!
//! This module contains the core data structures shared by the aggregator
//! and the report layer: per-stock score records, the top-3 placement,
//! the scoring rules and the final ranking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placement inside a "best 3" section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// 1位
    First,
    /// 2位
    Second,
    /// 3位
    Third,
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}位", self.number())
    }
}

impl Placement {
    /// Builds a placement from an ASCII rank digit.
    pub fn from_digit(digit: u32) -> Option<Self> {
        match digit {
            1 => Some(Placement::First),
            2 => Some(Placement::Second),
            3 => Some(Placement::Third),
            _ => None,
        }
    }

    /// Returns the 1-based place number.
    pub fn number(&self) -> u32 {
        match self {
            Placement::First => 1,
            Placement::Second => 2,
            Placement::Third => 3,
        }
    }
}

/// Point weights awarded per mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointWeights {
    /// Points per candidate-list mention.
    pub candidate: u32,
    /// Points per 1st place mention.
    pub first: u32,
    /// Points per 2nd place mention.
    pub second: u32,
    /// Points per 3rd place mention.
    pub third: u32,
}

impl Default for PointWeights {
    fn default() -> Self {
        Self {
            candidate: 1,
            first: 7,
            second: 5,
            third: 3,
        }
    }
}

impl PointWeights {
    /// Points for a single mention at the given placement.
    pub fn for_placement(&self, placement: Placement) -> u32 {
        match placement {
            Placement::First => self.first,
            Placement::Second => self.second,
            Placement::Third => self.third,
        }
    }
}

/// Rules that decide how sections are recognized and scored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringRules {
    /// Substring marking a candidate-list section header.
    pub candidate_marker: String,
    /// Substring marking a top-3 section header.
    pub top3_marker: String,
    /// Point weights.
    pub points: PointWeights,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            candidate_marker: "候補銘柄".to_string(),
            top3_marker: "ベスト3".to_string(),
            points: PointWeights::default(),
        }
    }
}

/// Accumulated score for one stock name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Stock name exactly as written (trimmed).
    pub name: String,
    /// Number of candidate-list mentions.
    pub candidate_count: u32,
    /// Points from 1st place mentions.
    pub rank1_points: u32,
    /// Points from 2nd place mentions.
    pub rank2_points: u32,
    /// Points from 3rd place mentions.
    pub rank3_points: u32,
    /// Sum of all points.
    pub total: u32,
    /// Competition rank (1, 1, 3, ...). Zero until ranked.
    pub display_rank: usize,
}

impl ScoreRecord {
    /// Creates an empty record for the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            candidate_count: 0,
            rank1_points: 0,
            rank2_points: 0,
            rank3_points: 0,
            total: 0,
            display_rank: 0,
        }
    }

    /// Records one candidate-list mention. Counters saturate at `u32::MAX`.
    pub fn add_candidate(&mut self, points: u32) {
        self.candidate_count = self.candidate_count.saturating_add(1);
        self.total = self.total.saturating_add(points);
    }

    /// Records one top-3 mention.
    pub fn add_placement(&mut self, placement: Placement, points: u32) {
        match placement {
            Placement::First => self.rank1_points = self.rank1_points.saturating_add(points),
            Placement::Second => self.rank2_points = self.rank2_points.saturating_add(points),
            Placement::Third => self.rank3_points = self.rank3_points.saturating_add(points),
        }
        self.total = self.total.saturating_add(points);
    }

    /// Raw points for one placement column.
    pub fn placement_points(&self, placement: Placement) -> u32 {
        match placement {
            Placement::First => self.rank1_points,
            Placement::Second => self.rank2_points,
            Placement::Third => self.rank3_points,
        }
    }
}

/// Metadata about a ranking run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingMetadata {
    /// When the ranking was produced.
    pub generated_at: DateTime<Utc>,
    /// Number of pasted blocks that were merged.
    pub input_blocks: usize,
    /// Number of distinct stocks.
    pub total_entries: usize,
    /// Weights used for scoring.
    pub points: PointWeights,
}

/// The complete ranking handed to the report layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ranking {
    /// Metadata about the run.
    pub metadata: RankingMetadata,
    /// Records ordered by total, highest first.
    pub entries: Vec<ScoreRecord>,
}

impl Ranking {
    /// Wraps aggregated records with metadata.
    pub fn new(entries: Vec<ScoreRecord>, input_blocks: usize, points: PointWeights) -> Self {
        Self {
            metadata: RankingMetadata {
                generated_at: Utc::now(),
                input_blocks,
                total_entries: entries.len(),
                points,
            },
            entries,
        }
    }

    /// Returns true when no rows were produced.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true when the top row has a positive total.
    ///
    /// With zero weights configured, rows can exist without any points.
    pub fn has_scores(&self) -> bool {
        self.entries.first().map_or(false, |e| e.total > 0)
    }

    /// Keeps only the first `n` rows. Ranks are not recomputed.
    pub fn truncate(&mut self, n: usize) {
        self.entries.truncate(n);
    }
}
