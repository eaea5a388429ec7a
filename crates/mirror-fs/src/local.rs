//! [`FileSystem`] backed by the real disk

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::path::relativize;
use crate::tree::{Entry, EntryKind, FileSystem, Listing};
use crate::{Error, Result};

/// The local disk.
///
/// Symlinks are never followed; they are reported as [`EntryKind::Other`]
/// and so are neither classified nor copied.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

fn kind_of(file_type: fs::FileType) -> EntryKind {
    if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    }
}

impl FileSystem for LocalFs {
    fn list_children(&self, dir: &Path) -> Result<Vec<Entry>> {
        let read = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
        let mut children = Vec::new();
        for item in read {
            let item = item.map_err(|e| Error::io(dir, e))?;
            let file_type = item.file_type().map_err(|e| Error::io(item.path(), e))?;
            children.push((item.file_name(), kind_of(file_type)));
        }
        children.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(children
            .into_iter()
            .map(|(name, kind)| Entry::new(Path::new(&name), kind))
            .collect())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| Error::io(path, e))
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<u64> {
        fs::copy(from, to).map_err(|e| Error::io(from, e))
    }

    fn remove_tree(&self, path: &Path) -> Result<()> {
        let meta = fs::symlink_metadata(path).map_err(|e| Error::io(path, e))?;
        if meta.is_dir() {
            fs::remove_dir_all(path).map_err(|e| Error::io(path, e))
        } else {
            fs::remove_file(path).map_err(|e| Error::io(path, e))
        }
    }

    fn list_entries(&self, root: &Path) -> Result<Listing> {
        let meta = fs::metadata(root).map_err(|e| Error::io(root, e))?;
        if !meta.is_dir() {
            return Err(Error::NotFound {
                path: root.to_path_buf(),
            });
        }

        let mut listing = Listing::default();
        let walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name();
        for item in walker {
            match item {
                Ok(entry) => {
                    let path = relativize(entry.path(), root)?;
                    listing
                        .entries
                        .push(Entry::new(path, kind_of(entry.file_type())));
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf());
                    tracing::debug!(path = %path.display(), "Skipping unreadable entry");
                    listing.errors.push(Error::io(path, e.into()));
                }
            }
        }
        Ok(listing)
    }
}
