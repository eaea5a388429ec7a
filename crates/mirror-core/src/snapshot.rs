//! The set of source files known at the end of a cycle

use std::collections::BTreeSet;

use mirror_fs::RelativePath;

/// Relative paths of the regular files seen in the source during a cycle.
///
/// Iteration is sorted, which is what orders `Removed` events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    paths: BTreeSet<RelativePath>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Returns false if the path was already present.
    pub fn insert(&mut self, path: RelativePath) -> bool {
        self.paths.insert(path)
    }

    /// Returns false if the path was not present.
    pub fn remove(&mut self, path: &RelativePath) -> bool {
        self.paths.remove(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelativePath> {
        self.paths.iter()
    }
}

impl FromIterator<RelativePath> for Snapshot {
    fn from_iter<I: IntoIterator<Item = RelativePath>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Snapshot {
    type Item = RelativePath;
    type IntoIter = std::collections::btree_set::IntoIter<RelativePath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a RelativePath;
    type IntoIter = std::collections::btree_set::Iter<'a, RelativePath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}
