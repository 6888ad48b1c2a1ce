//! Track command for timing a live session from the terminal.
//!
//! The session ticks on the tokio runtime while commands are read line by
//! line from `input`:
//!
//! - `p` pauses or resumes
//! - `t` prints the elapsed time
//! - `s` stops and saves (sessions under a minute are refused)
//! - `q` quits without saving
//!
//! When `shutdown` resolves (Ctrl-C in the binary), the session is saved if
//! it is long enough and discarded otherwise. Closing the input discards the
//! session.

use std::future::Future;
use std::io::{self, Write};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::runtime::Handle;

use ojt_core::{Clock, LiveSession, StopError, TimeEntry, TimerStatus, format_minutes};
use ojt_db::Database;

use super::util::whole_minutes;

/// Formats elapsed seconds as `HH:MM:SS`.
pub fn format_elapsed(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

fn write_saved<W: Write>(writer: &mut W, entry: &TimeEntry) -> Result<()> {
    writeln!(
        writer,
        "Saved {} of {} on {}",
        format_minutes(whole_minutes(entry.duration)),
        entry.activity,
        entry.date.format("%Y-%m-%d")
    )?;
    Ok(())
}

pub async fn run<R, W, S>(
    input: R,
    writer: &mut W,
    db: &mut Database,
    activity: &str,
    clock: &dyn Clock,
    shutdown: S,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    S: Future<Output = io::Result<()>>,
{
    let mut session = LiveSession::new(Handle::current());
    session.start(activity)?;
    writeln!(
        writer,
        "Tracking {}. Commands: p pause/resume, t time, s stop and save, q quit",
        activity.trim()
    )?;

    tokio::pin!(shutdown);
    let mut lines = input.lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read command")?,
            signal = &mut shutdown => {
                signal.context("failed to listen for interrupt")?;
                return save_on_interrupt(writer, &mut session, db, clock);
            }
        };

        let Some(line) = line else {
            session.discard();
            writeln!(writer, "Input closed. Session discarded.")?;
            return Ok(());
        };

        match line.trim() {
            "" => {}
            "p" => {
                let verb = match session.toggle() {
                    TimerStatus::Suspended => "Paused",
                    TimerStatus::Running | TimerStatus::Idle => "Resumed",
                };
                writeln!(
                    writer,
                    "{verb} at {}",
                    format_elapsed(session.elapsed_seconds())
                )?;
            }
            "t" => {
                let status = match session.status() {
                    TimerStatus::Suspended => "Paused",
                    TimerStatus::Running | TimerStatus::Idle => "Running",
                };
                writeln!(
                    writer,
                    "{status} {}",
                    format_elapsed(session.elapsed_seconds())
                )?;
            }
            "s" => match session.stop(db, clock.today()) {
                Ok(entry) => {
                    write_saved(writer, &entry)?;
                    return Ok(());
                }
                Err(StopError::Validation(err)) => writeln!(writer, "Not saved: {err}")?,
                Err(err @ StopError::Store(_)) => {
                    writeln!(writer, "Not saved: {:#}", anyhow::Error::new(err))?;
                }
            },
            "q" => {
                session.discard();
                writeln!(writer, "Session discarded.")?;
                return Ok(());
            }
            other => writeln!(writer, "Unknown command: {other}")?,
        }
    }
}

fn save_on_interrupt<W: Write>(
    writer: &mut W,
    session: &mut LiveSession,
    db: &mut Database,
    clock: &dyn Clock,
) -> Result<()> {
    match session.stop(db, clock.today()) {
        Ok(entry) => write_saved(writer, &entry),
        Err(StopError::Validation(err)) => {
            session.discard();
            writeln!(writer, "Not saved: {err}. Session discarded.")?;
            Ok(())
        }
        Err(err) => Err(err).context("failed to save session on interrupt"),
    }
}
