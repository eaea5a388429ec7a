//! Per-file actions reported for a cycle

use std::fmt;

use mirror_fs::RelativePath;

/// What happened to a file during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Present now, absent from the previous snapshot
    Created,
    /// Present now and copied into the replica
    Copied,
    /// Present in the previous snapshot, absent now
    Removed,
}

impl Operation {
    /// Past-tense verb used in log lines.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Copied => "copied",
            Self::Removed => "removed",
        }
    }
}

/// A classified action on one file.
///
/// Renders as the log line for the event, e.g. `docs/a.txt is copied.`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyncEvent {
    pub path: RelativePath,
    pub operation: Operation,
}

impl SyncEvent {
    pub fn new(path: impl Into<RelativePath>, operation: Operation) -> Self {
        Self {
            path: path.into(),
            operation,
        }
    }

    pub fn created(path: impl Into<RelativePath>) -> Self {
        Self::new(path, Operation::Created)
    }

    pub fn copied(path: impl Into<RelativePath>) -> Self {
        Self::new(path, Operation::Copied)
    }

    pub fn removed(path: impl Into<RelativePath>) -> Self {
        Self::new(path, Operation::Removed)
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is {}.", self.path, self.operation.verb())
    }
}
