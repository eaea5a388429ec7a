//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use mirror_core::{ConfigLayer, FailurePolicy, SeparatorPolicy};

/// dirmirror - Keep a replica directory identical to a source directory
///
/// Every INTERVAL seconds the replica is wiped and recopied from the source,
/// and each file's fate is written to stdout and the log file. Type `quit`
/// on stdin to stop after the next cycle.
#[derive(Parser, Debug)]
#[command(name = "dirmirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to mirror from
    #[arg(required_unless_present = "config")]
    pub source: Option<PathBuf>,

    /// Directory to mirror into (created if missing)
    #[arg(required_unless_present = "config")]
    pub replica: Option<PathBuf>,

    /// Seconds to wait before each cycle
    #[arg(required_unless_present = "config")]
    pub interval: Option<u64>,

    /// Log file, truncated at start
    #[arg(required_unless_present = "config")]
    pub log: Option<PathBuf>,

    /// Read settings from a .toml, .json or .yaml file; positionals override it
    #[arg(short, long, env = "DIRMIRROR_CONFIG")]
    pub config: Option<PathBuf>,

    /// What to do when a file cannot be read, copied or removed
    #[arg(long, value_enum)]
    pub on_error: Option<OnError>,

    /// When to write the blank line after a cycle
    #[arg(long, value_enum)]
    pub separator: Option<Separator>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Failure handling choices
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnError {
    /// Log the failure and keep syncing
    Continue,
    /// Stop on the first failure
    Abort,
}

impl From<OnError> for FailurePolicy {
    fn from(value: OnError) -> Self {
        match value {
            OnError::Continue => Self::Continue,
            OnError::Abort => Self::Abort,
        }
    }
}

/// Separator choices
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// Only after cycles that wrote something
    OnChange,
    /// After every cycle
    Always,
}

impl From<Separator> for SeparatorPolicy {
    fn from(value: Separator) -> Self {
        match value {
            Separator::OnChange => Self::OnChange,
            Separator::Always => Self::Always,
        }
    }
}

impl Cli {
    /// Settings given on the command line, as a layer to put over a config file.
    pub fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            source: self.source.clone(),
            replica: self.replica.clone(),
            interval_secs: self.interval,
            log_file: self.log.clone(),
            on_error: self.on_error.map(Into::into),
            separator: self.separator.map(Into::into),
        }
    }
}
