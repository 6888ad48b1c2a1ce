//! Log command for entering a completed session by hand.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;

use ojt_core::{NewTimeEntry, format_minutes};
use ojt_db::Database;

use super::util::{parse_entry_date, whole_minutes};

#[derive(Debug, Args)]
pub struct LogArgs {
    /// What you worked on (e.g. "Workshop Training").
    #[arg(short, long)]
    pub activity: String,

    /// Session length in minutes.
    #[arg(short, long)]
    pub minutes: f64,

    /// Date of the session: YYYY-MM-DD, "today", "yesterday" or "N days ago".
    #[arg(short, long, default_value = "today")]
    pub date: String,

    /// Free-text notes.
    #[arg(long)]
    pub notes: Option<String>,

    /// Where the training took place.
    #[arg(long)]
    pub location: Option<String>,

    /// Who supervised the session.
    #[arg(long)]
    pub supervisor: Option<String>,
}

pub fn run<W: Write>(
    writer: &mut W,
    args: &LogArgs,
    db: &mut Database,
    today: NaiveDate,
) -> Result<()> {
    let date = parse_entry_date(&args.date, today)?;
    let entry = NewTimeEntry::manual(date, args.minutes, args.activity.as_str())?
        .with_notes(args.notes.clone())
        .with_location(args.location.clone())
        .with_supervisor(args.supervisor.clone());

    let stored = db.insert_entry(entry).context("failed to save entry")?;
    tracing::debug!(id = %stored.id, "manual entry logged");

    writeln!(
        writer,
        "Logged {} of {} on {}",
        format_minutes(whole_minutes(stored.duration)),
        stored.activity,
        stored.date.format("%Y-%m-%d")
    )?;
    Ok(())
}
