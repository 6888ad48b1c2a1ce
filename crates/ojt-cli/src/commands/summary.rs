//! Summary command for weekly, yearly and all-time training totals.
//!
//! This module implements `ojt summary` in human-readable and JSON form.

use std::fmt::Write;

use anyhow::Result;

use ojt_core::{Clock, EntryStore, TargetSource, TrainingSummary, format_minutes};
use ojt_db::Database;

use super::util::{format_session_line, hours_to_minutes};

/// Computes the summary for "now" according to `clock`.
pub fn generate_summary(
    db: &Database,
    clock: &dyn Clock,
    recent_limit: usize,
) -> Result<TrainingSummary> {
    let entries = db.list()?;
    let target_hours = db.annual_target_or_default()?;
    Ok(TrainingSummary::compute(
        &entries,
        &clock.now(),
        target_hours,
        recent_limit,
    ))
}

/// Formats the human-readable summary.
pub fn format_summary(summary: &TrainingSummary) -> String {
    let mut output = String::new();

    writeln!(
        output,
        "OJT SUMMARY: Week of {}",
        summary.week_start.format("%b %-d, %Y")
    )
    .unwrap();

    if summary.session_count == 0 {
        writeln!(output).unwrap();
        writeln!(output, "No training time logged yet.").unwrap();
        writeln!(output).unwrap();
        writeln!(
            output,
            "Hint: Run 'ojt log' or 'ojt track' to record a session."
        )
        .unwrap();
        return output;
    }

    writeln!(output).unwrap();
    writeln!(output, "THIS WEEK").unwrap();
    writeln!(output, "─────────").unwrap();
    writeln!(
        output,
        "Logged:     {}",
        format_minutes(hours_to_minutes(summary.weekly_hours))
    )
    .unwrap();

    let target = &summary.target;
    writeln!(output).unwrap();
    writeln!(output, "THIS YEAR").unwrap();
    writeln!(output, "─────────").unwrap();
    writeln!(
        output,
        "Logged:     {} of {}h target ({}%)",
        format_minutes(hours_to_minutes(summary.yearly_hours)),
        target.target_hours,
        target.percent_complete
    )
    .unwrap();
    writeln!(
        output,
        "Remaining:  {}",
        format_minutes(hours_to_minutes(target.remaining_hours))
    )
    .unwrap();

    writeln!(output).unwrap();
    writeln!(output, "ALL TIME").unwrap();
    writeln!(output, "────────").unwrap();
    writeln!(
        output,
        "Total:      {}",
        format_minutes(summary.total.hours * 60 + summary.total.minutes)
    )
    .unwrap();
    writeln!(
        output,
        "Sessions:   {} (avg {})",
        summary.session_count,
        format_minutes(summary.average_session_minutes)
    )
    .unwrap();

    if !summary.recent.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "RECENT SESSIONS").unwrap();
        writeln!(output, "───────────────").unwrap();
        for entry in &summary.recent {
            writeln!(output, "{}", format_session_line(entry)).unwrap();
        }
    }

    output
}

/// Runs the summary command.
pub fn run<W: std::io::Write>(
    writer: &mut W,
    db: &Database,
    clock: &dyn Clock,
    recent_limit: usize,
    json: bool,
) -> Result<()> {
    let summary = generate_summary(db, clock, recent_limit)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&summary)?)?;
    } else {
        write!(writer, "{}", format_summary(&summary))?;
    }
    Ok(())
}
