//! Point aggregation over pasted stock-pick text.
//!
//! This module turns one or more pasted text blocks into ranked
//! [`ScoreRecord`]s. Parsing is a single forward pass over lines; anything
//! that does not fit the expected shape is skipped, so aggregation never fails.

use crate::models::{Placement, ScoreRecord, ScoringRules};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s+(.*)$").expect("static regex must compile"));
static ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\s+(.*)$").expect("static regex must compile"));
static PLACEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([1-3１-３])位[：:]\s*(.*)$").expect("static regex must compile")
});

/// Offset between fullwidth digits (U+FF10..) and ASCII digits.
const FULLWIDTH_OFFSET: u32 = 0xFEE0;

/// Classification of a single trimmed input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// Empty after trimming.
    Blank,
    /// `# <section>`; holds the trimmed section name.
    Header(&'a str),
    /// `- <content>`; holds the trimmed content.
    Item(&'a str),
    /// Anything else.
    Other,
}

/// Classify one raw line.
pub fn classify_line(raw: &str) -> Line<'_> {
    let line = raw.trim();
    if line.is_empty() {
        return Line::Blank;
    }

    if let Some(caps) = HEADER_RE.captures(line) {
        let section = caps.get(1).map_or("", |m| m.as_str());
        return Line::Header(section.trim());
    }

    if let Some(caps) = ITEM_RE.captures(line) {
        let content = caps.get(1).map_or("", |m| m.as_str());
        return Line::Item(content.trim());
    }

    Line::Other
}

/// Parse a top-3 item such as `1位：トヨタ` or `２位:ソニー`.
///
/// Returns the placement and the trimmed stock name.
pub fn parse_placement(content: &str) -> Option<(Placement, &str)> {
    let caps = PLACEMENT_RE.captures(content)?;
    let digit = caps.get(1)?.as_str().chars().next()?;
    let name = caps.get(2).map_or("", |m| m.as_str()).trim();

    let placement = Placement::from_digit(normalize_digit(digit)?)?;
    Some((placement, name))
}

/// Convert an ASCII or fullwidth decimal digit to its value.
fn normalize_digit(c: char) -> Option<u32> {
    let ascii = if ('０'..='９').contains(&c) {
        char::from_u32(c as u32 - FULLWIDTH_OFFSET)?
    } else {
        c
    };
    ascii.to_digit(10)
}

/// Kind of section the parser is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    Candidates,
    Top3,
    Unrecognized,
}

fn section_kind(section: &str, rules: &ScoringRules) -> SectionKind {
    if section.contains(rules.candidate_marker.as_str()) {
        SectionKind::Candidates
    } else if section.contains(rules.top3_marker.as_str()) {
        SectionKind::Top3
    } else {
        SectionKind::Unrecognized
    }
}

/// Per-run line counters, logged at debug level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParseStats {
    pub lines: usize,
    pub headers: usize,
    pub scored_items: usize,
    pub ignored: usize,
}

/// Records keyed by name, kept in first-seen order.
#[derive(Debug, Default)]
struct Tally {
    records: Vec<ScoreRecord>,
    index: HashMap<String, usize>,
}

impl Tally {
    fn entry(&mut self, name: &str) -> &mut ScoreRecord {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                self.records.push(ScoreRecord::new(name));
                let idx = self.records.len() - 1;
                self.index.insert(name.to_string(), idx);
                idx
            }
        };
        &mut self.records[idx]
    }

    fn into_records(self) -> Vec<ScoreRecord> {
        self.records
    }
}

/// Tally a single merged text into unranked records, in first-seen order.
pub fn tally_text(text: &str, rules: &ScoringRules) -> (Vec<ScoreRecord>, ParseStats) {
    let mut tally = Tally::default();
    let mut stats = ParseStats::default();
    let mut current_section = SectionKind::Unrecognized;

    for raw in text.lines() {
        stats.lines += 1;

        match classify_line(raw) {
            Line::Blank => {}
            Line::Header(section) => {
                stats.headers += 1;
                current_section = section_kind(section, rules);
            }
            Line::Item(content) => match current_section {
                SectionKind::Candidates => {
                    tally.entry(content).add_candidate(rules.points.candidate);
                    stats.scored_items += 1;
                }
                SectionKind::Top3 => match parse_placement(content) {
                    Some((placement, name)) => {
                        let points = rules.points.for_placement(placement);
                        tally.entry(name).add_placement(placement, points);
                        stats.scored_items += 1;
                    }
                    None => stats.ignored += 1,
                },
                SectionKind::Unrecognized => stats.ignored += 1,
            },
            Line::Other => stats.ignored += 1,
        }
    }

    (tally.into_records(), stats)
}

/// Sort records by total (highest first) and assign competition ranks.
///
/// The sort is stable, so equal totals keep their first-seen order. Tied
/// records share a rank and the next distinct total takes its 1-based
/// position ("1, 1, 3").
pub fn rank_records(mut records: Vec<ScoreRecord>) -> Vec<ScoreRecord> {
    records.sort_by(|a, b| b.total.cmp(&a.total));

    let mut current_rank = 1;
    let mut previous_total = None;
    for (idx, record) in records.iter_mut().enumerate() {
        if let Some(prev) = previous_total {
            if record.total < prev {
                current_rank = idx + 1;
            }
        }
        record.display_rank = current_rank;
        previous_total = Some(record.total);
    }

    records
}

/// Aggregate pasted blocks into a ranked list of records.
///
/// Blocks are joined with newlines and parsed as one stream, so a section
/// header in one block stays active in the next.
pub fn aggregate<S: AsRef<str>>(texts: &[S], rules: &ScoringRules) -> Vec<ScoreRecord> {
    let parts: Vec<&str> = texts.iter().map(|t| t.as_ref()).collect();
    let merged = parts.join("\n");

    let (records, stats) = tally_text(&merged, rules);
    debug!(
        "Parsed {} lines: {} headers, {} scored items, {} ignored, {} distinct names",
        stats.lines,
        stats.headers,
        stats.scored_items,
        stats.ignored,
        records.len()
    );

    rank_records(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Vec<ScoreRecord> {
        aggregate(&[text], &ScoringRules::default())
    }

    fn find<'a>(records: &'a [ScoreRecord], name: &str) -> &'a ScoreRecord {
        records
            .iter()
            .find(|r| r.name == name)
            .unwrap_or_else(|| panic!("missing record for {}", name))
    }

    #[test]
    fn test_candidate_only() {
        let records = run("# 候補銘柄\n- X");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "X");
        assert_eq!(records[0].candidate_count, 1);
        assert_eq!(records[0].total, 1);
        assert_eq!(records[0].display_rank, 1);
    }

    #[test]
    fn test_top3_only() {
        let records = run("# ベスト3\n- 1位：A\n- 2位：B\n- 3位：C");
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);

        let totals: Vec<_> = records.iter().map(|r| r.total).collect();
        assert_eq!(totals, vec![7, 5, 3]);

        let ranks: Vec<_> = records.iter().map(|r| r.display_rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);

        assert_eq!(records[0].rank1_points, 7);
        assert_eq!(records[1].rank2_points, 5);
        assert_eq!(records[2].rank3_points, 3);
    }

    #[test]
    fn test_candidate_and_top3_combine() {
        let records = run("# 候補銘柄\n- X\n\n# ベスト3\n- 1位：X");
        assert_eq!(records.len(), 1);
        let x = find(&records, "X");
        assert_eq!(x.candidate_count, 1);
        assert_eq!(x.rank1_points, 7);
        assert_eq!(x.total, 8);
    }

    #[test]
    fn test_fullwidth_digit_and_colons() {
        for text in [
            "# ベスト3\n- １位：Y",
            "# ベスト3\n- 1位：Y",
            "# ベスト3\n- 1位:Y",
            "# ベスト3\n- ３位: Y",
        ] {
            let records = run(text);
            assert_eq!(records.len(), 1, "input: {}", text);
            assert_eq!(records[0].name, "Y");
        }

        assert_eq!(run("# ベスト3\n- １位：Y")[0].total, 7);
        assert_eq!(run("# ベスト3\n- ３位: Y")[0].rank3_points, 3);
    }

    #[test]
    fn test_garbage_and_unsectioned_items_are_ignored() {
        assert!(run("hello\nworld\n* not an item\n#nospace\n-nospace").is_empty());
        assert!(run("- orphan item\n# その他\n- still ignored").is_empty());
    }

    #[test]
    fn test_malformed_placements_are_ignored() {
        let records = run("# ベスト3\n- 4位：D\n- 1st：E\n- 1位 F\n- 0位：G\n- ４位：H");
        assert!(records.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(run("").is_empty());
        assert!(run("\n\n   \n\t\n").is_empty());
        let none: [&str; 0] = [];
        assert!(aggregate(&none, &ScoringRules::default()).is_empty());
    }

    #[test]
    fn test_marker_is_substring_match() {
        let records = run("# 今週の候補銘柄リスト\n- A\n# 私のベスト3予想\n- 2位：B");
        assert_eq!(find(&records, "A").total, 1);
        assert_eq!(find(&records, "B").total, 5);
    }

    #[test]
    fn test_header_is_sticky_across_blocks() {
        let blocks = ["# 候補銘柄\n- A", "- B\n- A"];
        let records = aggregate(&blocks, &ScoringRules::default());
        assert_eq!(find(&records, "A").candidate_count, 2);
        assert_eq!(find(&records, "B").candidate_count, 1);
    }

    #[test]
    fn test_unrecognized_header_resets_section() {
        let records = run("# 候補銘柄\n- A\n# メモ\n- B");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "A");
    }

    #[test]
    fn test_crlf_and_indentation() {
        let records = run("  # 候補銘柄\r\n   - 三菱UFJ  \r\n\r\n# ベスト3\r\n- 1位：三菱UFJ\r\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "三菱UFJ");
        assert_eq!(records[0].total, 8);
    }

    #[test]
    fn test_names_are_exact_keys() {
        let records = run("# 候補銘柄\n- Sony\n- sony\n- Sony  G\n-   Sony");
        assert_eq!(records.len(), 3);
        assert_eq!(find(&records, "Sony").candidate_count, 2);
    }

    #[test]
    fn test_repeated_placements_accumulate() {
        let records = run("# ベスト3\n- 1位：A\n- 1位：A\n- 3位：A");
        assert_eq!(records[0].rank1_points, 14);
        assert_eq!(records[0].rank3_points, 3);
        assert_eq!(records[0].total, 17);
    }

    #[test]
    fn test_competition_ranking_with_ties() {
        let text = "# ベスト3\n- 2位：A\n- 2位：B\n- 3位：C\n- 3位：D\n# 候補銘柄\n- E";
        let records = run(text);

        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D", "E"]);

        let ranks: Vec<_> = records.iter().map(|r| r.display_rank).collect();
        assert_eq!(ranks, vec![1, 1, 3, 3, 5]);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let records = run("# 候補銘柄\n- Z\n- 7203\n- A");
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Z", "7203", "A"]);
        assert!(records.iter().all(|r| r.display_rank == 1));
    }

    #[test]
    fn test_ordering_and_rank_laws() {
        let text = include_str!("../../fixtures/weekly_picks.txt");
        let records = run(text);
        assert!(!records.is_empty());

        for (idx, pair) in records.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            assert!(prev.total >= next.total);
            assert!(prev.display_rank <= next.display_rank);
            if prev.total == next.total {
                assert_eq!(prev.display_rank, next.display_rank);
            } else {
                assert_eq!(next.display_rank, idx + 2);
            }
        }

        for record in &records {
            assert_eq!(
                record.total,
                record.candidate_count
                    + record.rank1_points
                    + record.rank2_points
                    + record.rank3_points
            );
        }
    }

    #[test]
    fn test_fixture_totals() {
        let text = include_str!("../../fixtures/weekly_picks.txt");
        let records = run(text);

        let toyota = find(&records, "トヨタ自動車");
        assert_eq!(toyota.candidate_count, 3);
        assert_eq!(toyota.rank1_points, 14);
        assert_eq!(toyota.rank2_points, 5);
        assert_eq!(toyota.total, 22);
        assert_eq!(toyota.display_rank, 1);

        let sony = find(&records, "ソニーグループ");
        assert_eq!(sony.total, 11);
        assert_eq!(sony.display_rank, 2);

        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "トヨタ自動車",
                "ソニーグループ",
                "キーエンス",
                "任天堂",
                "三菱UFJフィナンシャル・グループ",
                "東京エレクトロン",
            ]
        );
        let ranks: Vec<_> = records.iter().map(|r| r.display_rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5, 5]);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let text = include_str!("../../fixtures/weekly_picks.txt");
        assert_eq!(run(text), run(text));
    }

    #[test]
    fn test_custom_rules() {
        let rules = ScoringRules {
            candidate_marker: "Candidates".to_string(),
            top3_marker: "Top 3".to_string(),
            points: crate::models::PointWeights {
                candidate: 2,
                first: 10,
                second: 6,
                third: 1,
            },
        };
        let records = aggregate(&["# Candidates\n- A\n# Top 3\n- 1位: A\n- 3位: B"], &rules);
        assert_eq!(find(&records, "A").total, 12);
        assert_eq!(find(&records, "B").total, 1);
    }

    #[test]
    fn test_huge_weights_do_not_overflow() {
        let rules = ScoringRules {
            points: crate::models::PointWeights {
                first: 3_000_000_000,
                ..Default::default()
            },
            ..Default::default()
        };
        let records = aggregate(&["# ベスト3\n- 1位：A\n- 1位：A"], &rules);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].total, u32::MAX);
    }

    #[test]
    fn test_candidate_marker_wins_when_both_present() {
        let records = run("# 候補銘柄とベスト3\n- 1位：A");
        assert_eq!(records[0].name, "1位：A");
        assert_eq!(records[0].candidate_count, 1);
    }

    #[test]
    fn test_classify_line() {
        assert_eq!(classify_line("   "), Line::Blank);
        assert_eq!(classify_line("#  候補銘柄  "), Line::Header("候補銘柄"));
        assert_eq!(classify_line("- 1位：A "), Line::Item("1位：A"));
        assert_eq!(classify_line("text"), Line::Other);
        assert_eq!(classify_line("##heading"), Line::Other);
    }

    #[test]
    fn test_parse_placement() {
        assert_eq!(parse_placement("2位：ソニー"), Some((Placement::Second, "ソニー")));
        assert_eq!(parse_placement("２位:  任天堂 "), Some((Placement::Second, "任天堂")));
        assert_eq!(parse_placement("2位；ソニー"), None);
        assert_eq!(parse_placement(" 2位：ソニー"), None);
    }

    #[test]
    fn test_tally_stats() {
        let (records, stats) =
            tally_text("# 候補銘柄\n- A\nnoise\n# ベスト3\n- 9位：B\n\n- 1位：A", &ScoringRules::default());
        assert_eq!(records.len(), 1);
        assert_eq!(stats.lines, 7);
        assert_eq!(stats.headers, 2);
        assert_eq!(stats.scored_items, 2);
        assert_eq!(stats.ignored, 2);
    }
}
