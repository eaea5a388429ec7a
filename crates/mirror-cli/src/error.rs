//! Error types for mirror-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from mirror-core
    #[error(transparent)]
    Core(#[from] mirror_core::Error),

    /// Error from mirror-fs
    #[error(transparent)]
    Fs(#[from] mirror_fs::Error),

    /// The quit listener thread panicked
    #[error("Quit listener stopped unexpectedly")]
    ListenerPanicked,

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Process exit status: 2 for bad input, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::User { .. } => 2,
            Self::Core(e) if e.is_invalid_input() => 2,
            Self::Fs(mirror_fs::Error::ConfigParse { .. } | mirror_fs::Error::UnsupportedFormat { .. }) => 2,
            _ => 1,
        }
    }
}
