//! dirmirror CLI
//!
//! Periodically mirrors a source directory into a replica and logs what
//! changed until `quit` is read from stdin.

mod cli;
mod error;
mod logging;

use std::io::{self, BufReader};

use clap::Parser;
use colored::Colorize;
use mirror_core::{ConfigLayer, EventLog, QuitSignal, SyncConfig, SyncScheduler, spawn_listener};
use mirror_fs::{LocalFs, open_log_sink};

use cli::Cli;
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    tracing::debug!("Verbose mode enabled");

    let config = resolve_config(&cli)?;
    config.validate()?;
    config.prepare_replica()?;

    let sink = open_log_sink(&config.log_file)?;
    let log = EventLog::new(sink, io::stdout(), config.separator);

    let quit = QuitSignal::new();
    let listener = spawn_listener(BufReader::new(io::stdin()), quit.clone())?;

    let mut scheduler = SyncScheduler::new(LocalFs::new(), &config, log, quit);
    let summary = scheduler.run()?;

    let outcome = listener.join().map_err(|_| CliError::ListenerPanicked)?;
    tracing::debug!(cycles = summary.cycles, ?outcome, "Exiting");
    Ok(())
}

/// Merge the optional config file with command-line values.
fn resolve_config(cli: &Cli) -> Result<SyncConfig> {
    let base = match &cli.config {
        Some(path) if !path.is_file() => {
            return Err(CliError::user(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        Some(path) => ConfigLayer::load(path)?,
        None => ConfigLayer::default(),
    };
    Ok(base.overlay(cli.layer()).resolve()?)
}
