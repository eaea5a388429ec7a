//! Scenario tests for the sync loop
//!
//! Each test drives cycles by hand against a real directory tree and checks
//! the lines written and the resulting replica.

use std::fs;
use std::time::Duration;

use mirror_core::{
    CycleReport, EventLog, FailurePolicy, QuitSignal, SeparatorPolicy, SyncConfig, SyncScheduler,
};
use mirror_fs::LocalFs;
use mirror_test_utils::TestTree;
use pretty_assertions::assert_eq;

// =============================================================================
// Test Infrastructure
// =============================================================================

type Scheduler = SyncScheduler<LocalFs, Vec<u8>, Vec<u8>>;

fn start(tree: &TestTree, on_error: FailurePolicy) -> Scheduler {
    let config = SyncConfig {
        source: tree.source(),
        replica: tree.replica(),
        interval_secs: 1,
        log_file: tree.log_file(),
        on_error,
        separator: SeparatorPolicy::OnChange,
    };
    config.validate().unwrap();
    let log = EventLog::new(Vec::new(), Vec::new(), config.separator);
    SyncScheduler::new(LocalFs::new(), &config, log, QuitSignal::new())
        .with_interval(Duration::ZERO)
}

fn lines(report: &CycleReport) -> Vec<String> {
    report.events.iter().map(ToString::to_string).collect()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_empty_source_writes_nothing() {
    let tree = TestTree::new();
    let mut scheduler = start(&tree, FailurePolicy::Continue);

    let report = scheduler.run_cycle().unwrap();
    assert!(report.events.is_empty());

    let (persistent, _) = scheduler.into_log().into_inner();
    assert!(persistent.is_empty(), "no separator for a quiet cycle");
    assert!(tree.replica().is_dir());
}

#[test]
fn test_added_file_created_then_only_copied() {
    let tree = TestTree::new();
    let mut scheduler = start(&tree, FailurePolicy::Continue);
    scheduler.run_cycle().unwrap();

    tree.write("a.txt", "a");
    assert_eq!(
        lines(&scheduler.run_cycle().unwrap()),
        vec!["a.txt is created.", "a.txt is copied."]
    );
    assert_eq!(lines(&scheduler.run_cycle().unwrap()), vec!["a.txt is copied."]);
    tree.assert_in_sync();
}

#[test]
fn test_removed_file_reported_without_copy() {
    let tree = TestTree::new();
    tree.write("a.txt", "a");
    let mut scheduler = start(&tree, FailurePolicy::Continue);
    scheduler.run_cycle().unwrap();

    tree.remove("a.txt");
    assert_eq!(lines(&scheduler.run_cycle().unwrap()), vec!["a.txt is removed."]);
    tree.assert_replica_missing("a.txt");
}

#[test]
fn test_add_then_remove_within_interval_is_invisible() {
    let tree = TestTree::new();
    let mut scheduler = start(&tree, FailurePolicy::Continue);
    scheduler.run_cycle().unwrap();

    tree.write("flash.txt", "f");
    tree.remove("flash.txt");
    assert!(scheduler.run_cycle().unwrap().events.is_empty());
}

#[test]
fn test_modified_content_reaches_replica() {
    let tree = TestTree::new();
    tree.write("notes.txt", "v1");
    let mut scheduler = start(&tree, FailurePolicy::Continue);
    scheduler.run_cycle().unwrap();

    tree.write("notes.txt", "v2");
    assert_eq!(lines(&scheduler.run_cycle().unwrap()), vec!["notes.txt is copied."]);
    tree.assert_replica_contains("notes.txt", "v2");
}

#[test]
fn test_whole_directory_removed() {
    let tree = TestTree::new();
    tree.write("dir/a.txt", "a");
    tree.write("dir/nested/b.txt", "b");
    tree.write("top.txt", "t");
    let mut scheduler = start(&tree, FailurePolicy::Continue);
    scheduler.run_cycle().unwrap();

    tree.remove("dir");
    assert_eq!(
        lines(&scheduler.run_cycle().unwrap()),
        vec![
            "top.txt is copied.",
            "dir/a.txt is removed.",
            "dir/nested/b.txt is removed.",
        ]
    );
    tree.assert_replica_missing("dir");
}

#[test]
fn test_replica_deleted_between_cycles_is_recreated() {
    let tree = TestTree::new();
    tree.write("a.txt", "a");
    let mut scheduler = start(&tree, FailurePolicy::Continue);
    scheduler.run_cycle().unwrap();

    fs::remove_dir_all(tree.replica()).unwrap();
    assert_eq!(lines(&scheduler.run_cycle().unwrap()), vec!["a.txt is copied."]);
    tree.assert_in_sync();
}

#[cfg(unix)]
mod unix {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::os::unix::fs::PermissionsExt;

    fn is_root() -> bool {
        match std::process::Command::new("id").arg("-u").output() {
            Ok(output) => String::from_utf8_lossy(&output.stdout).trim() == "0",
            Err(_) => false,
        }
    }

    #[test]
    fn test_backslash_name_is_wiped_and_removed_under_abort() {
        let tree = TestTree::new();
        tree.write("a\\b.txt", "x");
        let mut scheduler = start(&tree, FailurePolicy::Abort);

        let first = scheduler.run_cycle().unwrap();
        assert_eq!(lines(&first), vec!["a\\b.txt is created.", "a\\b.txt is copied."]);
        assert!(tree.replica().join("a\\b.txt").is_file());

        tree.remove("a\\b.txt");
        let second = scheduler.run_cycle().unwrap();

        assert!(second.failures.is_empty());
        assert_eq!(lines(&second), vec!["a\\b.txt is removed."]);
        assert_eq!(fs::read_dir(tree.replica()).unwrap().count(), 0);
    }

    #[test]
    fn test_unreadable_file_skipped_under_continue() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let tree = TestTree::new();
        tree.write("open.txt", "o");
        tree.write("secret.txt", "s");
        let secret = tree.source().join("secret.txt");
        fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();

        let mut scheduler = start(&tree, FailurePolicy::Continue);
        let report = scheduler.run_cycle().unwrap();
        fs::set_permissions(&secret, fs::Permissions::from_mode(0o644)).unwrap();

        assert_eq!(report.failures.len(), 1);
        tree.assert_replica_contains("open.txt", "o");
        tree.assert_replica_missing("secret.txt");

        let (persistent, console) = scheduler.into_log().into_inner();
        assert_eq!(persistent, console);
        assert!(String::from_utf8(persistent).unwrap().starts_with("error: "));
    }

    #[test]
    fn test_unreadable_file_aborts_under_abort() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let tree = TestTree::new();
        tree.write("secret.txt", "s");
        let secret = tree.source().join("secret.txt");
        fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();

        let mut scheduler = start(&tree, FailurePolicy::Abort);
        let result = scheduler.run_cycle();
        fs::set_permissions(&secret, fs::Permissions::from_mode(0o644)).unwrap();

        assert!(result.is_err());
    }
}
