//! Error types for mirror-core

use std::path::PathBuf;

/// Result type for mirror-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mirror-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Source directory does not exist
    #[error("Source directory not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// Source path exists but is not a directory
    #[error("Source is not a directory: {path}")]
    SourceNotDirectory { path: PathBuf },

    /// Replica path exists but is not a directory
    #[error("Replica is not a directory: {path}")]
    ReplicaNotDirectory { path: PathBuf },

    /// Source and replica nest inside one another
    #[error("Source {source_dir} and replica {replica} must not contain one another")]
    OverlappingTrees {
        source_dir: PathBuf,
        replica: PathBuf,
    },

    /// Interval was zero
    #[error("Interval must be a positive number of seconds, got {value}")]
    InvalidInterval { value: u64 },

    /// A required setting was given neither in a config file nor on the command line
    #[error("Missing configuration value: {field}")]
    MissingSetting { field: &'static str },

    /// Writing to the event log or console failed
    #[error("Failed to write event log: {source}")]
    LogWrite {
        #[source]
        source: std::io::Error,
    },

    /// The quit listener thread could not be started
    #[error("Failed to start quit listener: {source}")]
    ListenerSpawn {
        #[source]
        source: std::io::Error,
    },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from mirror-fs
    #[error(transparent)]
    Fs(#[from] mirror_fs::Error),
}

impl Error {
    /// Whether this error stems from invalid user input rather than a
    /// failure while running.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::SourceNotFound { .. }
                | Self::SourceNotDirectory { .. }
                | Self::ReplicaNotDirectory { .. }
                | Self::OverlappingTrees { .. }
                | Self::InvalidInterval { .. }
                | Self::MissingSetting { .. }
                | Self::Fs(
                    mirror_fs::Error::ConfigParse { .. } | mirror_fs::Error::UnsupportedFormat { .. }
                )
        )
    }
}
