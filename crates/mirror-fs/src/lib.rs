//! Filesystem abstraction for dirmirror
//!
//! Provides root-relative paths, the [`FileSystem`] capability the mirror
//! engine is written against (with disk and in-memory implementations),
//! configuration loading and log sink opening.

pub mod config;
pub mod error;
pub mod io;
pub mod local;
pub mod memory;
pub mod path;
pub mod tree;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use io::open_log_sink;
pub use local::LocalFs;
pub use memory::MemoryFs;
pub use path::{RelativePath, relativize};
pub use tree::{CopyStats, Entry, EntryKind, FileSystem, Listing};

/// Canonicalize a directory path without the `\\?\` prefix on Windows.
pub fn canonicalize(path: &std::path::Path) -> Result<std::path::PathBuf> {
    dunce::canonicalize(path).map_err(|e| Error::io(path, e))
}
