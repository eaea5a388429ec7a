//! End-to-end integration test for a full run
//!
//! This test exercises the complete flow: config loading -> validation ->
//! log sink -> quit listener -> sync loop, the same way the binary does.

use std::fs;
use std::io::Cursor;
use std::time::Duration;

use mirror_core::{
    ConfigLayer, EventLog, FailurePolicy, ListenOutcome, QuitSignal, SeparatorPolicy,
    SyncScheduler, spawn_listener,
};
use mirror_fs::{LocalFs, open_log_sink};
use mirror_test_utils::TestTree;
use pretty_assertions::assert_eq;

/// Write a JSON config next to the trees, naming them relatively.
fn write_config(tree: &TestTree, extra: serde_json::Value) -> std::path::PathBuf {
    let mut config = serde_json::json!({
        "source": "source",
        "replica": "replica",
        "interval_secs": 1,
        "log_file": "sync.log",
    });
    if let (Some(base), Some(extra)) = (config.as_object_mut(), extra.as_object()) {
        base.extend(extra.clone());
    }
    let path = tree.root().join("mirror.json");
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    path
}

#[test]
fn test_full_run_from_config_file() {
    let tree = TestTree::new();
    tree.write("readme.md", "# hi");
    tree.write("src/lib.rs", "fn main() {}");
    tree.mkdir("assets/empty");

    let config_path = write_config(&tree, serde_json::json!({ "separator": "always" }));
    let config = ConfigLayer::load(&config_path).unwrap().resolve().unwrap();
    assert_eq!(config.source, tree.source());
    assert_eq!(config.on_error, FailurePolicy::Continue);
    assert_eq!(config.separator, SeparatorPolicy::Always);

    config.validate().unwrap();
    config.prepare_replica().unwrap();
    let sink = open_log_sink(&config.log_file).unwrap();
    let log = EventLog::new(sink, Vec::new(), config.separator);

    let quit = QuitSignal::new();
    let listener = spawn_listener(Cursor::new("status\nquit\n"), quit.clone()).unwrap();
    assert_eq!(listener.join().unwrap(), ListenOutcome::Sentinel);

    let mut scheduler =
        SyncScheduler::new(LocalFs::new(), &config, log, quit).with_interval(Duration::ZERO);
    let summary = scheduler.run().unwrap();
    assert_eq!(summary.cycles, 1);

    let (_, console) = scheduler.into_log().into_inner();
    let console = String::from_utf8(console).unwrap();
    assert_eq!(
        console,
        "readme.md is created.\n\
         readme.md is copied.\n\
         src/lib.rs is created.\n\
         src/lib.rs is copied.\n\
         \n"
    );
    assert_eq!(tree.log_contents(), console);

    tree.assert_in_sync();
    assert!(tree.replica().join("assets/empty").is_dir());
}

#[test]
fn test_second_process_cannot_share_log() {
    let tree = TestTree::new();
    let config_path = write_config(&tree, serde_json::json!({}));
    let config = ConfigLayer::load(&config_path).unwrap().resolve().unwrap();

    let _held = open_log_sink(&config.log_file).unwrap();
    let err = open_log_sink(&config.log_file).unwrap_err();
    assert!(matches!(err, mirror_fs::Error::LockFailed { .. }));
}

#[test]
fn test_command_line_layer_overrides_file() {
    let tree = TestTree::new();
    let config_path = write_config(&tree, serde_json::json!({ "on_error": "abort" }));

    let cli = ConfigLayer {
        interval_secs: Some(7),
        ..Default::default()
    };
    let config = ConfigLayer::load(&config_path)
        .unwrap()
        .overlay(cli)
        .resolve()
        .unwrap();

    assert_eq!(config.interval(), Duration::from_secs(7));
    assert_eq!(config.on_error, FailurePolicy::Abort);
    assert_eq!(config.replica, tree.replica());
}
