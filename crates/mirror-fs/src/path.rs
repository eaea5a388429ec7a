//! Root-relative paths in a platform-independent form

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// A path relative to a tree root.
///
/// The segments are kept exactly as the filesystem returned them, so names
/// that are not valid UTF-8, or that contain `\` on Unix, still resolve back
/// to the same file. The forward-slash rendering is what the event log shows
/// and what ordering is based on; names that differ only in bytes lost by
/// that rendering still compare unequal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath {
    /// Forward-slash rendering, lossy for non-UTF-8 names
    display: String,
    segments: Vec<OsString>,
}

impl RelativePath {
    /// Create a RelativePath from any path-like input.
    ///
    /// Root, prefix and `.` components are dropped, so `./a//b/` becomes
    /// `a/b`. Only the platform separator splits segments: on Windows
    /// `a\b` is two segments, elsewhere it is one name.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::from_segments(
            path.as_ref()
                .components()
                .filter_map(|component| match component {
                    Component::Normal(s) => Some(s.to_os_string()),
                    Component::ParentDir => Some(OsString::from("..")),
                    _ => None,
                })
                .collect(),
        )
    }

    fn from_segments(segments: Vec<OsString>) -> Self {
        let display = segments
            .iter()
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        Self { display, segments }
    }

    /// The empty path, naming the tree root itself.
    pub fn root() -> Self {
        Self::from_segments(Vec::new())
    }

    /// The forward-slash rendering.
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Resolve against `base` into a platform-native path.
    pub fn to_native(&self, base: &Path) -> PathBuf {
        let mut native = base.to_path_buf();
        native.extend(&self.segments);
        native
    }

    /// `tail` appended below this path.
    pub fn join(&self, tail: &RelativePath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(tail.segments.iter().cloned());
        Self::from_segments(segments)
    }
}

/// Express `path` relative to `base`.
///
/// Fails with [`Error::NotRelative`] when `path` is not under `base`.
pub fn relativize(path: &Path, base: &Path) -> Result<RelativePath> {
    let rest = path.strip_prefix(base).map_err(|_| Error::NotRelative {
        path: path.to_path_buf(),
        base: base.to_path_buf(),
    })?;
    Ok(RelativePath::new(rest))
}

impl AsRef<str> for RelativePath {
    fn as_ref(&self) -> &str {
        &self.display
    }
}

impl std::fmt::Display for RelativePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display)
    }
}

impl From<&str> for RelativePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RelativePath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&Path> for RelativePath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
