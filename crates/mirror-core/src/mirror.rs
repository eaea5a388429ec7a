//! Destructive wipe-and-recopy of the replica tree

use std::path::{Path, PathBuf};

use mirror_fs::{CopyStats, FileSystem};

/// Counts from one [`Mirror::mirror`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorStats {
    /// Top-level replica entries removed before copying
    pub cleared: usize,
    pub copied: CopyStats,
}

/// Makes the replica an exact copy of the source.
#[derive(Debug, Clone)]
pub struct Mirror {
    source: PathBuf,
    replica: PathBuf,
}

impl Mirror {
    pub fn new(source: impl Into<PathBuf>, replica: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            replica: replica.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn replica(&self) -> &Path {
        &self.replica
    }

    /// Empty the replica, recreate the source's directory hierarchy in it,
    /// then copy every regular file across.
    ///
    /// The replica directory itself is kept (and recreated if it vanished
    /// between cycles). Per-entry failures go to `on_error`.
    pub fn mirror<F: FileSystem + ?Sized>(
        &self,
        fs: &F,
        on_error: &mut dyn FnMut(mirror_fs::Error) -> mirror_fs::Result<()>,
    ) -> mirror_fs::Result<MirrorStats> {
        fs.create_dir_all(&self.replica)?;
        let cleared = fs.clear_dir(&self.replica, on_error)?;
        let copied = fs.copy_tree(&self.source, &self.replica, on_error)?;

        tracing::debug!(
            cleared,
            directories = copied.directories,
            files = copied.files,
            bytes = copied.bytes,
            "Mirrored source into replica"
        );
        Ok(MirrorStats { cleared, copied })
    }
}
