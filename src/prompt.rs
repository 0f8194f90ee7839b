//! Analysis prompt rendering.
//!
//! The prompt asks an assistant for a weekly pick list in exactly the
//! format the aggregator reads, so several answers can be pasted back
//! and tallied.

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::path::Path;

/// Placeholder replaced with the target week label.
pub const DATE_PLACEHOLDER: &str = "{DATE}";

/// Built-in prompt template.
pub const DEFAULT_TEMPLATE: &str = "\
あなたは日本株の短期モメンタム分析の専門家です。
{DATE}からの週に上昇が期待できる東証上場銘柄を分析してください。

直近の出来高、価格トレンド、材料（決算・業績修正・テーマ性）を考慮し、
以下のフォーマットだけで回答してください。説明文は不要です。

# 候補銘柄
- 銘柄名
- 銘柄名
（5〜10銘柄）

# ベスト3
- 1位：銘柄名
- 2位：銘柄名
- 3位：銘柄名
";

/// Returns the Monday that starts the next trading week.
///
/// Sunday maps to the following day, Monday to the Monday one week later,
/// and every other day to the upcoming Monday.
pub fn next_monday(today: NaiveDate) -> NaiveDate {
    let days = match today.weekday() {
        Weekday::Sun => 1,
        Weekday::Mon => 7,
        other => 8 - i64::from(other.number_from_monday()),
    };
    today + Duration::days(days)
}

/// Formats a date as `YYYY年M月D日`.
pub fn week_label(date: NaiveDate) -> String {
    format!("{}年{}月{}日", date.year(), date.month(), date.day())
}

/// Replaces the first `{DATE}` in the template with the next Monday's label.
pub fn render(template: &str, today: NaiveDate) -> String {
    template.replacen(DATE_PLACEHOLDER, &week_label(next_monday(today)), 1)
}

/// Loads a template file, falling back to the built-in template.
pub fn load_template(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt template: {}", path.display())),
        None => Ok(DEFAULT_TEMPLATE.to_string()),
    }
}
