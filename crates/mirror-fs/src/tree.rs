//! The filesystem capability the mirror engine is written against
//!
//! Everything the engine does to storage goes through [`FileSystem`]:
//! listing a tree, creating directories, copying files and removing
//! subtrees. [`crate::LocalFs`] talks to the real disk and
//! [`crate::MemoryFs`] keeps a tree in memory for tests.

use std::path::Path;

use crate::path::{self, RelativePath};
use crate::{Error, Result};

/// What kind of object an [`Entry`] names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A regular file
    File,
    /// A directory
    Directory,
    /// Anything else: symlinks, sockets, devices. Never copied.
    Other,
}

/// One object found while listing a tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    /// Path relative to the listed root
    pub path: RelativePath,
    pub kind: EntryKind,
}

impl Entry {
    pub fn new(path: impl Into<RelativePath>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn file(path: impl Into<RelativePath>) -> Self {
        Self::new(path, EntryKind::File)
    }

    pub fn directory(path: impl Into<RelativePath>) -> Self {
        Self::new(path, EntryKind::Directory)
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// The result of listing a tree recursively.
///
/// Entries that could not be read (an unreadable subdirectory, an entry that
/// vanished mid-walk) do not abort the listing; they land in `errors` and the
/// caller decides what to do with them.
#[derive(Debug, Default)]
pub struct Listing {
    /// Entries in depth-first order, siblings sorted by file name
    pub entries: Vec<Entry>,
    pub errors: Vec<Error>,
}

impl Listing {
    /// Regular files only, in listing order.
    pub fn files(&self) -> impl Iterator<Item = &RelativePath> {
        self.entries.iter().filter(|e| e.is_file()).map(|e| &e.path)
    }

    /// Directories only, in listing order.
    pub fn directories(&self) -> impl Iterator<Item = &RelativePath> {
        self.entries.iter().filter(|e| e.is_dir()).map(|e| &e.path)
    }
}

/// Counts from a [`FileSystem::copy_tree`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub directories: usize,
    pub files: usize,
    pub bytes: u64,
}

/// Storage operations used by the mirror and the diff scanner.
///
/// Only the primitives are required. `list_entries`, `clear_dir`,
/// `copy_tree` and `relativize` are built on top of them, and an
/// implementation may override `list_entries` with a faster walker.
///
/// The composite operations take an `on_error` handler. Each recoverable
/// per-entry failure is passed to it: returning `Ok(())` skips the entry and
/// carries on, returning `Err` stops the operation with that error.
pub trait FileSystem {
    /// Immediate children of `dir`, sorted by file name.
    ///
    /// Each returned entry's path is the single child name.
    fn list_children(&self, dir: &Path) -> Result<Vec<Entry>>;

    /// Create `path` and any missing parents.
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Copy a regular file, overwriting `to`. Returns bytes copied.
    fn copy_file(&self, from: &Path, to: &Path) -> Result<u64>;

    /// Remove a file, or a directory and everything under it.
    fn remove_tree(&self, path: &Path) -> Result<()>;

    /// Every entry below `root` (not `root` itself), depth first.
    ///
    /// Fails only when `root` itself cannot be listed.
    fn list_entries(&self, root: &Path) -> Result<Listing> {
        fn walk<F: FileSystem + ?Sized>(
            fs: &F,
            root: &Path,
            dir: &RelativePath,
            listing: &mut Listing,
        ) {
            let children = match fs.list_children(&dir.to_native(root)) {
                Ok(children) => children,
                Err(e) => {
                    listing.errors.push(e);
                    return;
                }
            };
            for child in children {
                let path = dir.join(&child.path);
                let is_dir = child.is_dir();
                listing.entries.push(Entry::new(path.clone(), child.kind));
                if is_dir {
                    walk(fs, root, &path, listing);
                }
            }
        }

        // Surface an unreadable root as a hard failure rather than a listing error.
        self.list_children(root)?;
        let mut listing = Listing::default();
        walk(self, root, &RelativePath::root(), &mut listing);
        Ok(listing)
    }

    /// Express `path` relative to `base` in forward-slash form.
    fn relativize(&self, path: &Path, base: &Path) -> Result<RelativePath> {
        path::relativize(path, base)
    }

    /// Remove everything inside `dir`, leaving `dir` itself in place.
    ///
    /// Returns the number of top-level entries removed.
    fn clear_dir(
        &self,
        dir: &Path,
        on_error: &mut dyn FnMut(Error) -> Result<()>,
    ) -> Result<usize> {
        let mut removed = 0;
        for child in self.list_children(dir)? {
            match self.remove_tree(&child.path.to_native(dir)) {
                Ok(()) => removed += 1,
                Err(e) => on_error(e)?,
            }
        }
        Ok(removed)
    }

    /// Recreate the directory hierarchy of `source` under `target`, then copy
    /// every regular file into it.
    ///
    /// Entries that are neither files nor directories are skipped.
    fn copy_tree(
        &self,
        source: &Path,
        target: &Path,
        on_error: &mut dyn FnMut(Error) -> Result<()>,
    ) -> Result<CopyStats> {
        let mut listing = self.list_entries(source)?;
        for e in std::mem::take(&mut listing.errors) {
            on_error(e)?;
        }

        let mut stats = CopyStats::default();
        for dir in listing.directories() {
            match self.create_dir_all(&dir.to_native(target)) {
                Ok(()) => stats.directories += 1,
                Err(e) => on_error(e)?,
            }
        }
        for file in listing.files() {
            match self.copy_file(&file.to_native(source), &file.to_native(target)) {
                Ok(bytes) => {
                    stats.files += 1;
                    stats.bytes += bytes;
                }
                Err(e) => on_error(e)?,
            }
        }
        Ok(stats)
    }
}
