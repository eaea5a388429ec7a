//! Run configuration and policies
//!
//! A [`SyncConfig`] is assembled from [`ConfigLayer`]s: typically a config
//! file overlaid with command-line values. Later layers win field by field.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use mirror_fs::ConfigStore;

use crate::{Error, Result};

/// What to do when a filesystem operation fails mid-cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Skip the failing entry, report it, and keep syncing
    #[default]
    Continue,
    /// Stop the loop on the first failure
    Abort,
}

impl FailurePolicy {
    /// Apply the policy to one failure.
    ///
    /// Under `Continue` the failure is stashed in `caught` for reporting and
    /// `Ok(())` lets the operation carry on; under `Abort` it is handed back.
    pub fn handle(
        self,
        error: mirror_fs::Error,
        caught: &mut Vec<mirror_fs::Error>,
    ) -> mirror_fs::Result<()> {
        match self {
            Self::Continue => {
                caught.push(error);
                Ok(())
            }
            Self::Abort => Err(error),
        }
    }
}

/// When to write the blank line that ends a cycle's block of log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeparatorPolicy {
    /// Only after a cycle that wrote at least one line
    #[default]
    OnChange,
    /// After every cycle
    Always,
}

/// Fully resolved settings for one mirroring run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    pub source: PathBuf,
    pub replica: PathBuf,
    /// Seconds to sleep before each cycle
    pub interval_secs: u64,
    pub log_file: PathBuf,
    #[serde(default)]
    pub on_error: FailurePolicy,
    #[serde(default)]
    pub separator: SeparatorPolicy,
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Check the settings against each other and the filesystem.
    ///
    /// The source must be an existing directory, the replica (if it exists)
    /// must be a directory, neither tree may contain the other, and the
    /// interval must be at least one second.
    pub fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            return Err(Error::InvalidInterval {
                value: self.interval_secs,
            });
        }

        if !self.source.exists() {
            return Err(Error::SourceNotFound {
                path: self.source.clone(),
            });
        }
        if !self.source.is_dir() {
            return Err(Error::SourceNotDirectory {
                path: self.source.clone(),
            });
        }
        if self.replica.exists() && !self.replica.is_dir() {
            return Err(Error::ReplicaNotDirectory {
                path: self.replica.clone(),
            });
        }

        let source = mirror_fs::canonicalize(&self.source)?;
        let replica = resolve_lenient(&self.replica);
        if replica.starts_with(&source) || source.starts_with(&replica) {
            return Err(Error::OverlappingTrees {
                source_dir: self.source.clone(),
                replica: self.replica.clone(),
            });
        }
        Ok(())
    }

    /// Create the replica directory (and parents) if it does not exist yet.
    pub fn prepare_replica(&self) -> Result<()> {
        if !self.replica.is_dir() {
            tracing::debug!(replica = %self.replica.display(), "Creating replica directory");
            std::fs::create_dir_all(&self.replica)
                .map_err(|e| mirror_fs::Error::io(&self.replica, e))?;
        }
        Ok(())
    }
}

/// Canonicalize as much of `path` as exists, keeping the missing tail.
fn resolve_lenient(path: &Path) -> PathBuf {
    let mut missing = Vec::new();
    let mut current = path;
    loop {
        if let Ok(found) = mirror_fs::canonicalize(current) {
            return missing
                .iter()
                .rev()
                .fold(found, |acc: PathBuf, part| acc.join(part));
        }
        match (current.parent(), current.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                current = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

/// One source of settings, any of which may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub source: Option<PathBuf>,
    pub replica: Option<PathBuf>,
    pub interval_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub on_error: Option<FailurePolicy>,
    pub separator: Option<SeparatorPolicy>,
}

impl ConfigLayer {
    /// Load a layer from a `.toml`, `.json`, `.yaml` or `.yml` file.
    ///
    /// Relative paths inside the file are resolved against the file's
    /// directory, so a config can sit next to the trees it names.
    pub fn load(path: &Path) -> Result<Self> {
        let mut layer: Self = ConfigStore::new().load(path)?;
        if let Some(base) = path.parent() {
            for field in [&mut layer.source, &mut layer.replica, &mut layer.log_file] {
                if let Some(value) = field.as_mut()
                    && value.is_relative()
                {
                    *value = base.join(&*value);
                }
            }
        }
        tracing::debug!(config = %path.display(), "Loaded config layer");
        Ok(layer)
    }

    /// Values from `top` replace values here wherever `top` has one.
    pub fn overlay(self, top: ConfigLayer) -> Self {
        Self {
            source: top.source.or(self.source),
            replica: top.replica.or(self.replica),
            interval_secs: top.interval_secs.or(self.interval_secs),
            log_file: top.log_file.or(self.log_file),
            on_error: top.on_error.or(self.on_error),
            separator: top.separator.or(self.separator),
        }
    }

    /// Turn the merged layer into a complete configuration.
    ///
    /// Policies fall back to their defaults; paths and the interval are
    /// required.
    pub fn resolve(self) -> Result<SyncConfig> {
        Ok(SyncConfig {
            source: self.source.ok_or(Error::MissingSetting { field: "source" })?,
            replica: self
                .replica
                .ok_or(Error::MissingSetting { field: "replica" })?,
            interval_secs: self
                .interval_secs
                .ok_or(Error::MissingSetting { field: "interval_secs" })?,
            log_file: self
                .log_file
                .ok_or(Error::MissingSetting { field: "log_file" })?,
            on_error: self.on_error.unwrap_or_default(),
            separator: self.separator.unwrap_or_default(),
        })
    }
}
