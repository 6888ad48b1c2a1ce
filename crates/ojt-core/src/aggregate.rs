//! Read-only statistics over logged training time.
//!
//! Every function here is pure: the caller supplies "now" as a
//! `DateTime<Tz>`, and the reference's own calendar date decides which week
//! or year an entry belongs to. Week boundaries follow ISO 8601 (weeks start
//! on Monday).

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use serde::Serialize;

use crate::entry::TimeEntry;

/// Annual off-the-job training goal used when no target has been set.
pub const DEFAULT_ANNUAL_TARGET_HOURS: f64 = 400.0;

/// Whole hours and leftover minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeTotal {
    pub hours: u64,
    pub minutes: u64,
}

impl TimeTotal {
    /// Splits a whole number of minutes into hours and remainder.
    pub const fn from_minutes(total: u64) -> Self {
        Self {
            hours: total / 60,
            minutes: total % 60,
        }
    }
}

/// Progress towards a target number of hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetProgress {
    pub completed_hours: f64,
    pub target_hours: f64,
    pub remaining_hours: f64,
    /// Whole percent, capped at 100.
    pub percent_complete: u8,
}

/// Returns the Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_since_monday = date.weekday().num_days_from_monday();
    date - chrono::Duration::days(i64::from(days_since_monday))
}

/// Sums countable minutes. Malformed durations contribute nothing.
fn sum_minutes<'a>(entries: impl IntoIterator<Item = &'a TimeEntry>) -> f64 {
    entries.into_iter().map(TimeEntry::countable_minutes).sum()
}

/// Hours logged since Monday 00:00 of the reference's week.
pub fn weekly_hours<Tz: TimeZone>(entries: &[TimeEntry], reference: &DateTime<Tz>) -> f64 {
    let monday = week_start(reference.date_naive());
    sum_minutes(entries.iter().filter(|e| e.date >= monday)) / 60.0
}

/// Hours logged in the reference's calendar year.
pub fn yearly_hours<Tz: TimeZone>(entries: &[TimeEntry], reference: &DateTime<Tz>) -> f64 {
    let year = reference.date_naive().year();
    sum_minutes(entries.iter().filter(|e| e.date.year() == year)) / 60.0
}

/// All logged time, rounded to the nearest minute and split into hours and minutes.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn total_hours(entries: &[TimeEntry]) -> TimeTotal {
    TimeTotal::from_minutes(sum_minutes(entries).round() as u64)
}

/// Mean session length in whole minutes; zero when nothing has been logged.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn average_session_minutes(entries: &[TimeEntry]) -> u64 {
    if entries.is_empty() {
        return 0;
    }
    (sum_minutes(entries) / entries.len() as f64).round() as u64
}

/// The first `limit` entries, in the order given.
///
/// This does not sort. The entry store returns entries most-recent-first and
/// callers must pass that order through untouched; handing in any other order
/// silently yields the wrong "recent" sessions.
pub fn recent_sessions(
    entries: &[TimeEntry],
    limit: usize,
) -> impl Iterator<Item = &TimeEntry> + Clone {
    entries.iter().take(limit)
}

/// Compares completed hours against a target.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn target_progress(completed_hours: f64, target_hours: f64) -> TargetProgress {
    let completed_hours = if completed_hours.is_finite() {
        completed_hours.max(0.0)
    } else {
        0.0
    };
    if !target_hours.is_finite() || target_hours <= 0.0 {
        return TargetProgress {
            completed_hours,
            target_hours: 0.0,
            remaining_hours: 0.0,
            percent_complete: 0,
        };
    }
    let percent = (completed_hours / target_hours * 100.0).round().min(100.0);
    TargetProgress {
        completed_hours,
        target_hours,
        remaining_hours: (target_hours - completed_hours).max(0.0),
        percent_complete: percent as u8,
    }
}

/// Formats minutes as "Xh Ym", or "Ym" under an hour.
pub fn format_minutes(minutes: u64) -> String {
    let total = TimeTotal::from_minutes(minutes);
    if total.hours >= 1 {
        format!("{}h {}m", total.hours, total.minutes)
    } else {
        format!("{}m", total.minutes)
    }
}

/// Every statistic the time section displays, computed in one pass of calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingSummary {
    pub week_start: NaiveDate,
    pub weekly_hours: f64,
    pub yearly_hours: f64,
    pub total: TimeTotal,
    pub session_count: usize,
    pub average_session_minutes: u64,
    pub target: TargetProgress,
    pub recent: Vec<TimeEntry>,
}

impl TrainingSummary {
    /// Builds a summary from store-ordered entries.
    pub fn compute<Tz: TimeZone>(
        entries: &[TimeEntry],
        reference: &DateTime<Tz>,
        target_hours: f64,
        recent_limit: usize,
    ) -> Self {
        let yearly = yearly_hours(entries, reference);
        Self {
            week_start: week_start(reference.date_naive()),
            weekly_hours: weekly_hours(entries, reference),
            yearly_hours: yearly,
            total: total_hours(entries),
            session_count: entries.len(),
            average_session_minutes: average_session_minutes(entries),
            target: target_progress(yearly, target_hours),
            recent: recent_sessions(entries, recent_limit).cloned().collect(),
        }
    }
}
