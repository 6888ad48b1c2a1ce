use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use ojt_cli::commands::{log, recent, summary, target, track};
use ojt_cli::{Cli, Commands, Config};
use ojt_core::{Clock, SystemClock};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(ojt_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = ojt_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so command output stays clean
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let clock = SystemClock;
    let mut stdout = io::stdout().lock();

    match &cli.command {
        Some(Commands::Log(args)) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            log::run(&mut stdout, args, &mut db, clock.today())?;
        }
        Some(Commands::Track { activity }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to start async runtime")?;
            runtime.block_on(track::run(
                BufReader::new(tokio::io::stdin()),
                &mut stdout,
                &mut db,
                activity,
                &clock,
                tokio::signal::ctrl_c(),
            ))?;
        }
        Some(Commands::Summary { json }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            summary::run(&mut stdout, &db, &clock, config.recent_limit, *json)?;
        }
        Some(Commands::Recent { limit, json }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            recent::run(&mut stdout, &db, limit.unwrap_or(config.recent_limit), *json)?;
        }
        Some(Commands::Target { hours }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            target::run(&mut stdout, &mut db, *hours)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
