//! Recent command for listing the latest sessions.

use std::io::Write;

use anyhow::Result;

use ojt_core::{EntryStore, TimeEntry, recent_sessions};
use ojt_db::Database;

use super::util::format_session_line;

/// The `limit` most recent sessions, newest first.
pub fn get_recent(db: &Database, limit: usize) -> Result<Vec<TimeEntry>> {
    let entries = db.list()?;
    Ok(recent_sessions(&entries, limit).cloned().collect())
}

pub fn run<W: Write>(writer: &mut W, db: &Database, limit: usize, json: bool) -> Result<()> {
    let recent = get_recent(db, limit)?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&recent)?)?;
        return Ok(());
    }

    if recent.is_empty() {
        writeln!(writer, "No sessions logged yet.")?;
        return Ok(());
    }

    for entry in &recent {
        writeln!(writer, "{}", format_session_line(entry))?;
    }
    Ok(())
}
