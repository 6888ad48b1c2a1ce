//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{Duration, NaiveDate};
use regex::Regex;

use ojt_core::{TimeEntry, format_minutes};

/// Pre-compiled regex for relative date parsing.
static RELATIVE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(day|week)s?\s+ago$").unwrap());

/// Conservative bound for relative dates (~10 years in days).
const MAX_RELATIVE_DAYS: i64 = 10 * 366;

/// Parse an entry date as an ISO date or a date relative to `today`.
///
/// Supports:
/// - ISO 8601: "2026-01-15"
/// - Keywords: "today", "yesterday"
/// - Relative: "3 days ago", "1 week ago"
pub fn parse_entry_date(s: &str, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    let s = s.trim();
    match s {
        "today" => return Ok(today),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    let Some(caps) = RELATIVE_DATE_RE.captures(s) else {
        anyhow::bail!(
            "Invalid date: {s}. Use YYYY-MM-DD (e.g., 2026-01-15), 'today', 'yesterday' or '3 days ago'"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative date")?;
    let days = match &caps[2] {
        "day" => n,
        "week" => n.saturating_mul(7),
        unit => anyhow::bail!("Unknown date unit: {unit}"),
    };
    if days > MAX_RELATIVE_DAYS {
        anyhow::bail!("Relative date too far back: {s}");
    }

    Ok(today - Duration::days(days))
}

/// Rounds fractional minutes for display. Malformed values show as zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn whole_minutes(minutes: f64) -> u64 {
    if minutes.is_finite() && minutes > 0.0 {
        minutes.round() as u64
    } else {
        0
    }
}

/// Converts fractional hours to whole minutes for display.
pub fn hours_to_minutes(hours: f64) -> u64 {
    whole_minutes(hours * 60.0)
}

/// One line of a session listing.
pub fn format_session_line(entry: &TimeEntry) -> String {
    let minutes = whole_minutes(entry.duration);
    let source = if entry.is_automatic { "timer" } else { "manual" };
    let mut line = format!(
        "  {}  {:<28}{:>8}  {source}",
        entry.date.format("%Y-%m-%d"),
        entry.activity,
        format_minutes(minutes)
    );
    if let Some(location) = &entry.location {
        line.push_str(&format!("  @ {location}"));
    }
    line
}
