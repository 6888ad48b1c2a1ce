//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::log::LogArgs;

/// Off-the-job training time tracker.
///
/// Logs apprenticeship training sessions, times live sessions, and reports
/// progress against the annual off-the-job training target.
#[derive(Debug, Parser)]
#[command(name = "ojt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log a completed session by hand.
    Log(LogArgs),

    /// Time a live session.
    ///
    /// Reads commands from stdin: `p` pause/resume, `t` show time,
    /// `s` stop and save, `q` quit without saving. Ctrl-C stops and saves.
    Track {
        /// What you are working on.
        activity: String,
    },

    /// Show weekly, yearly and all-time totals.
    Summary {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the most recent sessions.
    Recent {
        /// Number of sessions to show (defaults to `recent_limit` from config).
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show or set the annual training target in hours.
    Target {
        /// New target in hours.
        hours: Option<f64>,
    },
}
