//! Synchronization engine for dirmirror
//!
//! This crate keeps a replica directory identical to a source directory by
//! periodically wiping and recopying it, and reports what changed in the
//! source between cycles:
//!
//! - **Mirror**: destructive clear-and-copy of the replica
//! - **DiffEngine**: classification of source files as created, copied or removed
//! - **EventLog**: identical lines to a log file and the console
//! - **QuitSignal**: a stdin listener that asks the loop to stop
//! - **SyncScheduler**: the sleep, mirror, diff, log, check-quit loop
//!
//! # Architecture
//!
//! ```text
//!                 mirror-cli
//!                     |
//!                mirror-core
//!                     |
//!                 mirror-fs
//! ```
//!
//! All storage access goes through [`mirror_fs::FileSystem`], so the engine
//! runs the same against the disk and an in-memory tree.

pub mod config;
pub mod diff;
pub mod error;
pub mod event;
pub mod log;
pub mod mirror;
pub mod quit;
pub mod scheduler;
pub mod snapshot;

pub use config::{ConfigLayer, FailurePolicy, SeparatorPolicy, SyncConfig};
pub use diff::{DiffEngine, DiffOutcome};
pub use error::{Error, Result};
pub use event::{Operation, SyncEvent};
pub use log::EventLog;
pub use mirror::{Mirror, MirrorStats};
pub use quit::{ListenOutcome, QUIT_SENTINEL, QuitSignal, is_sentinel, listen, spawn_listener};
pub use scheduler::{CycleReport, RunSummary, SchedulerState, SyncScheduler};
pub use snapshot::Snapshot;
