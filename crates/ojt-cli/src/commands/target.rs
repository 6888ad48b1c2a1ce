//! Target command for showing or setting the annual training goal.

use std::io::Write;

use anyhow::{Context, Result};

use ojt_core::DEFAULT_ANNUAL_TARGET_HOURS;
use ojt_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &mut Database, hours: Option<f64>) -> Result<()> {
    if let Some(hours) = hours {
        db.set_annual_target(hours)
            .context("failed to save annual target")?;
        writeln!(writer, "Annual target set to {hours}h")?;
        return Ok(());
    }

    match db.annual_target()? {
        Some(hours) => writeln!(writer, "Annual target: {hours}h")?,
        None => writeln!(
            writer,
            "Annual target: {DEFAULT_ANNUAL_TARGET_HOURS}h (default)"
        )?,
    }
    Ok(())
}
