//! Change detection between successive snapshots of the source
//!
//! Classification is a pure function of the entries seen this cycle and the
//! previous [`Snapshot`]; [`DiffEngine::scan`] is the thin part that lists
//! the source through a [`FileSystem`] first.

use std::path::{Path, PathBuf};

use mirror_fs::{Entry, FileSystem};

use crate::event::SyncEvent;
use crate::snapshot::Snapshot;

/// Events for one cycle together with the snapshot that replaces the old one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffOutcome {
    /// Created/Copied pairs in traversal order, then Removed in snapshot order
    pub events: Vec<SyncEvent>,
    pub snapshot: Snapshot,
}

/// Classifies the files in a source tree against the previous cycle.
#[derive(Debug, Clone)]
pub struct DiffEngine {
    source: PathBuf,
}

impl DiffEngine {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Classify `entries` (in traversal order) against `previous`.
    ///
    /// Every regular file yields a `Copied` event, preceded by `Created` when
    /// it was not in `previous`. Files in `previous` that were not seen yield
    /// `Removed` after all of those. Directories and other entries are ignored.
    pub fn classify<'a>(
        entries: impl IntoIterator<Item = &'a Entry>,
        previous: &Snapshot,
    ) -> DiffOutcome {
        let mut remaining = previous.clone();
        let mut outcome = DiffOutcome::default();

        for entry in entries.into_iter().filter(|e| e.is_file()) {
            if !remaining.remove(&entry.path) {
                outcome.events.push(SyncEvent::created(entry.path.clone()));
            }
            outcome.events.push(SyncEvent::copied(entry.path.clone()));
            outcome.snapshot.insert(entry.path.clone());
        }

        outcome
            .events
            .extend(remaining.into_iter().map(SyncEvent::removed));
        outcome
    }

    /// List the source and classify what is there now.
    ///
    /// Entries that could not be read are passed to `on_error`; the files
    /// under them are treated as absent this cycle. Fails when the source
    /// root itself cannot be listed, or when `on_error` returns an error.
    pub fn scan<F: FileSystem + ?Sized>(
        &self,
        fs: &F,
        previous: &Snapshot,
        on_error: &mut dyn FnMut(mirror_fs::Error) -> mirror_fs::Result<()>,
    ) -> mirror_fs::Result<DiffOutcome> {
        let mut listing = fs.list_entries(&self.source)?;
        for e in std::mem::take(&mut listing.errors) {
            on_error(e)?;
        }
        let outcome = Self::classify(&listing.entries, previous);
        tracing::debug!(
            files = outcome.snapshot.len(),
            events = outcome.events.len(),
            "Scanned source"
        );
        Ok(outcome)
    }
}
