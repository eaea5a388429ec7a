//! In-memory [`FileSystem`] for exercising the engine without a disk

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::path::{RelativePath, relativize};
use crate::tree::{Entry, EntryKind, FileSystem};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Dir,
    File(Vec<u8>),
}

#[derive(Debug, Default)]
struct State {
    /// Keyed by absolute path; `PathBuf` ordering is per component, which
    /// gives depth-first, name-sorted iteration for free.
    nodes: BTreeMap<PathBuf, Node>,
    /// Paths whose reads and removals fail with `PermissionDenied`
    denied: HashSet<PathBuf>,
}

/// A tree held in memory.
///
/// Clones share the same tree, so a test can keep a handle and mutate the
/// source between cycles while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    state: Arc<RwLock<State>>,
}

fn denied(path: &Path) -> Error {
    Error::io(path, io::Error::from(io::ErrorKind::PermissionDenied))
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a directory and its parents.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.write_state();
        for ancestor in path.as_ref().ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            state.nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
        }
    }

    /// Write a file, creating its parent directories.
    pub fn write(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.write_state()
            .nodes
            .insert(path.to_path_buf(), Node::File(contents.into()));
    }

    /// Remove a path and everything under it. Missing paths are ignored.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.write_state().nodes.retain(|p, _| !p.starts_with(path));
    }

    /// Contents of a file, if it exists.
    pub fn read(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.read_state().nodes.get(path.as_ref()) {
            Some(Node::File(data)) => Some(data.clone()),
            _ => None,
        }
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.read_state().nodes.contains_key(path.as_ref())
    }

    /// Make reads of `path` (and removal of it) fail with `PermissionDenied`.
    pub fn deny(&self, path: impl AsRef<Path>) {
        self.write_state().denied.insert(path.as_ref().to_path_buf());
    }

    /// Relative paths of every regular file below `root`.
    pub fn files_under(&self, root: impl AsRef<Path>) -> BTreeSet<RelativePath> {
        let root = root.as_ref();
        self.read_state()
            .nodes
            .iter()
            .filter(|(p, node)| matches!(node, Node::File(_)) && p.starts_with(root))
            .filter_map(|(p, _)| relativize(p, root).ok())
            .collect()
    }
}

impl FileSystem for MemoryFs {
    fn list_children(&self, dir: &Path) -> Result<Vec<Entry>> {
        let state = self.read_state();
        if state.denied.contains(dir) {
            return Err(denied(dir));
        }
        match state.nodes.get(dir) {
            Some(Node::Dir) => {}
            _ => {
                return Err(Error::NotFound {
                    path: dir.to_path_buf(),
                });
            }
        }
        Ok(state
            .nodes
            .iter()
            .filter(|(p, _)| p.parent() == Some(dir))
            .filter_map(|(p, node)| {
                let name = p.file_name()?;
                let kind = match node {
                    Node::Dir => EntryKind::Directory,
                    Node::File(_) => EntryKind::File,
                };
                Some(Entry::new(Path::new(name), kind))
            })
            .collect())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        if let Some(Node::File(_)) = self.read_state().nodes.get(path) {
            return Err(Error::io(
                path,
                io::Error::from(io::ErrorKind::AlreadyExists),
            ));
        }
        self.add_dir(path);
        Ok(())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<u64> {
        let mut state = self.write_state();
        if state.denied.contains(from) {
            return Err(denied(from));
        }
        let data = match state.nodes.get(from) {
            Some(Node::File(data)) => data.clone(),
            _ => {
                return Err(Error::NotFound {
                    path: from.to_path_buf(),
                });
            }
        };
        match to.parent().map(|p| state.nodes.get(p)) {
            Some(Some(Node::Dir)) => {}
            _ => {
                return Err(Error::NotFound {
                    path: to.to_path_buf(),
                });
            }
        }
        let len = data.len() as u64;
        state.nodes.insert(to.to_path_buf(), Node::File(data));
        Ok(len)
    }

    fn remove_tree(&self, path: &Path) -> Result<()> {
        let mut state = self.write_state();
        if state.denied.contains(path) {
            return Err(denied(path));
        }
        if !state.nodes.contains_key(path) {
            return Err(Error::NotFound {
                path: path.to_path_buf(),
            });
        }
        state.nodes.retain(|p, _| !p.starts_with(path));
        Ok(())
    }
}
