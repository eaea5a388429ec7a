//! [`TestTree`] fixture for mirroring scenarios.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory holding a `source` tree, a `replica` location and a
/// log file path, with helpers for setup and assertion.
///
/// The source exists from the start; the replica does not, so tests can
/// check that it gets created.
///
/// # Example
///
/// ```rust,no_run
/// use mirror_test_utils::TestTree;
///
/// let tree = TestTree::new();
/// tree.write("docs/a.txt", "hello");
/// tree.assert_replica_missing("docs/a.txt");
/// ```
pub struct TestTree {
    temp_dir: TempDir,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// Create a temporary directory with an empty `source/` inside it.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("source")).unwrap();
        Self { temp_dir }
    }

    /// Root of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn source(&self) -> PathBuf {
        self.root().join("source")
    }

    pub fn replica(&self) -> PathBuf {
        self.root().join("replica")
    }

    pub fn log_file(&self) -> PathBuf {
        self.root().join("sync.log")
    }

    /// Write a file under the source, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.source().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
    }

    /// Create an (empty) directory under the source.
    pub fn mkdir(&self, rel: &str) {
        fs::create_dir_all(self.source().join(rel)).unwrap();
    }

    /// Remove a file or directory under the source.
    pub fn remove(&self, rel: &str) {
        let path = self.source().join(rel);
        if path.is_dir() {
            fs::remove_dir_all(&path).unwrap();
        } else {
            fs::remove_file(&path).unwrap();
        }
    }

    /// Forward-slash relative paths of every regular file under `dir`.
    pub fn files(dir: &Path) -> BTreeSet<String> {
        walkdir::WalkDir::new(dir)
            .min_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(dir)
                    .unwrap()
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .collect()
    }

    pub fn source_files(&self) -> BTreeSet<String> {
        Self::files(&self.source())
    }

    pub fn replica_files(&self) -> BTreeSet<String> {
        Self::files(&self.replica())
    }

    /// Contents of the log file, or an empty string if it was never written.
    pub fn log_contents(&self) -> String {
        fs::read_to_string(self.log_file()).unwrap_or_default()
    }

    /// Assert that the replica holds exactly the source's files.
    ///
    /// # Panics
    /// Panics listing both sets if they differ.
    pub fn assert_in_sync(&self) {
        let source = self.source_files();
        let replica = self.replica_files();
        assert_eq!(
            source, replica,
            "Replica out of sync.\nSource: {:?}\nReplica: {:?}",
            source, replica
        );
    }

    /// Assert that `rel` under the replica exists and holds `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or differs.
    pub fn assert_replica_contains(&self, rel: &str, content: &str) {
        let full_path = self.replica().join(rel);
        let actual = fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()));
        assert_eq!(
            actual,
            content,
            "Replica file {} has unexpected content",
            full_path.display()
        );
    }

    /// Assert that `rel` does **not** exist under the replica.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_replica_missing(&self, rel: &str) {
        let full_path = self.replica().join(rel);
        assert!(
            !full_path.exists(),
            "Expected replica path NOT to exist: {}",
            full_path.display()
        );
    }
}
