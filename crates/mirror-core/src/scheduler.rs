//! The periodic sync loop
//!
//! Each iteration sleeps for the interval, mirrors the source into the
//! replica, classifies what changed since the previous cycle, logs the
//! events and then checks the quit signal. The check comes after the cycle,
//! so the first cycle always runs and a cycle in progress always completes.

use std::io::Write;
use std::thread;
use std::time::Duration;

use mirror_fs::FileSystem;

use crate::config::{FailurePolicy, SyncConfig};
use crate::diff::DiffEngine;
use crate::event::SyncEvent;
use crate::log::EventLog;
use crate::mirror::Mirror;
use crate::quit::QuitSignal;
use crate::snapshot::Snapshot;
use crate::Result;

/// Where the loop is in its lifecycle.
///
/// `Idle -> Syncing -> (ContinueLoop -> Idle | ShuttingDown) -> Terminated`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Sleeping, or not started
    Idle,
    /// Mirroring and classifying
    Syncing,
    /// Cycle done, no quit requested
    ContinueLoop,
    /// Cycle done and quit requested, or the cycle aborted
    ShuttingDown,
    Terminated,
}

/// What one cycle produced.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub events: Vec<SyncEvent>,
    /// Failures skipped under [`FailurePolicy::Continue`]
    pub failures: Vec<mirror_fs::Error>,
}

/// Totals for a finished [`SyncScheduler::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
}

/// Drives mirror, diff and log cycles until quit is requested.
pub struct SyncScheduler<F: FileSystem, P: Write, C: Write> {
    fs: F,
    mirror: Mirror,
    diff: DiffEngine,
    interval: Duration,
    on_error: FailurePolicy,
    log: EventLog<P, C>,
    quit: QuitSignal,
    snapshot: Snapshot,
    state: SchedulerState,
}

impl<F: FileSystem, P: Write, C: Write> SyncScheduler<F, P, C> {
    /// Build a scheduler for `config`. The log sinks must already be open.
    pub fn new(fs: F, config: &SyncConfig, log: EventLog<P, C>, quit: QuitSignal) -> Self {
        Self {
            fs,
            mirror: Mirror::new(&config.source, &config.replica),
            diff: DiffEngine::new(&config.source),
            interval: config.interval(),
            on_error: config.on_error,
            log,
            quit,
            snapshot: Snapshot::new(),
            state: SchedulerState::Idle,
        }
    }

    /// Override the sleep between cycles.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Files seen in the source at the end of the last cycle.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn into_log(self) -> EventLog<P, C> {
        self.log
    }

    fn transition(&mut self, next: SchedulerState) {
        tracing::debug!(from = ?self.state, to = ?next, "Scheduler transition");
        self.state = next;
    }

    /// Run one mirror and diff pass and log its lines, without sleeping or
    /// looking at the quit signal.
    ///
    /// Under `Abort` the first filesystem failure is returned. Under
    /// `Continue` failures are logged and returned in the report; if the
    /// source could not be scanned at all the previous snapshot is kept.
    pub fn run_cycle(&mut self) -> Result<CycleReport> {
        let policy = self.on_error;
        let mut failures = Vec::new();
        let mut handler = |e: mirror_fs::Error| policy.handle(e, &mut failures);

        if let Err(e) = self.mirror.mirror(&self.fs, &mut handler) {
            handler(e)?;
        }
        let outcome = match self.diff.scan(&self.fs, &self.snapshot, &mut handler) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                handler(e)?;
                None
            }
        };

        for failure in &failures {
            tracing::warn!(error = %failure, "Skipped failed filesystem operation");
            self.log.failure(failure)?;
        }

        let events = match outcome {
            Some(outcome) => {
                for event in &outcome.events {
                    self.log.record(event)?;
                }
                self.snapshot = outcome.snapshot;
                outcome.events
            }
            None => Vec::new(),
        };
        self.log.end_cycle()?;

        tracing::debug!(
            events = events.len(),
            failures = failures.len(),
            files = self.snapshot.len(),
            "Cycle complete"
        );
        Ok(CycleReport { events, failures })
    }

    /// Loop until the quit signal is seen after a cycle.
    pub fn run(&mut self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        tracing::info!(
            source = %self.mirror.source().display(),
            replica = %self.mirror.replica().display(),
            interval = ?self.interval,
            "Starting sync loop"
        );

        loop {
            thread::sleep(self.interval);
            self.transition(SchedulerState::Syncing);
            let cycle = self.run_cycle();
            summary.cycles += 1;

            if let Err(e) = cycle {
                self.transition(SchedulerState::ShuttingDown);
                self.transition(SchedulerState::Terminated);
                return Err(e);
            }
            if self.quit.is_triggered() {
                self.transition(SchedulerState::ShuttingDown);
                break;
            }
            self.transition(SchedulerState::ContinueLoop);
            self.transition(SchedulerState::Idle);
        }

        self.log.flush()?;
        self.transition(SchedulerState::Terminated);
        tracing::info!(cycles = summary.cycles, "Sync loop stopped");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeparatorPolicy;
    use crate::event::Operation;
    use crate::Error;
    use mirror_fs::MemoryFs;
    use pretty_assertions::assert_eq;

    type TestScheduler = SyncScheduler<MemoryFs, Vec<u8>, Vec<u8>>;

    fn config(on_error: FailurePolicy) -> SyncConfig {
        SyncConfig {
            source: "/src".into(),
            replica: "/dst".into(),
            interval_secs: 1,
            log_file: "/sync.log".into(),
            on_error,
            separator: SeparatorPolicy::OnChange,
        }
    }

    fn scheduler(fs: &MemoryFs, on_error: FailurePolicy) -> TestScheduler {
        let log = EventLog::new(Vec::new(), Vec::new(), SeparatorPolicy::OnChange);
        SyncScheduler::new(fs.clone(), &config(on_error), log, QuitSignal::new())
            .with_interval(Duration::ZERO)
    }

    fn lines(report: &CycleReport) -> Vec<String> {
        report.events.iter().map(ToString::to_string).collect()
    }

    fn log_text(scheduler: TestScheduler) -> String {
        let (persistent, console) = scheduler.into_log().into_inner();
        assert_eq!(persistent, console);
        String::from_utf8(persistent).unwrap()
    }

    #[test]
    fn empty_source_writes_nothing() {
        let fs = MemoryFs::new();
        fs.add_dir("/src");
        let mut scheduler = scheduler(&fs, FailurePolicy::Continue);

        let report = scheduler.run_cycle().unwrap();
        assert!(report.events.is_empty());
        assert_eq!(log_text(scheduler), "");
    }

    #[test]
    fn create_copy_then_remove_across_cycles() {
        let fs = MemoryFs::new();
        fs.add_dir("/src");
        let mut scheduler = scheduler(&fs, FailurePolicy::Continue);
        scheduler.run_cycle().unwrap();

        fs.write("/src/a.txt", "a");
        let report = scheduler.run_cycle().unwrap();
        assert_eq!(lines(&report), vec!["a.txt is created.", "a.txt is copied."]);
        assert_eq!(fs.read("/dst/a.txt"), Some(b"a".to_vec()));

        let report = scheduler.run_cycle().unwrap();
        assert_eq!(lines(&report), vec!["a.txt is copied."]);

        fs.remove("/src/a.txt");
        let report = scheduler.run_cycle().unwrap();
        assert_eq!(lines(&report), vec!["a.txt is removed."]);
        assert!(!fs.exists("/dst/a.txt"));

        assert_eq!(
            log_text(scheduler),
            "a.txt is created.\na.txt is copied.\n\n\
             a.txt is copied.\n\n\
             a.txt is removed.\n\n"
        );
    }

    #[test]
    fn unchanged_source_is_idempotent() {
        let fs = MemoryFs::new();
        fs.write("/src/a.txt", "a");
        fs.write("/src/nested/b.txt", "b");
        let mut scheduler = scheduler(&fs, FailurePolicy::Continue);
        scheduler.run_cycle().unwrap();

        let report = scheduler.run_cycle().unwrap();
        assert!(report.events.iter().all(|e| e.operation == Operation::Copied));
        assert_eq!(report.events.len(), 2);
        assert_eq!(fs.files_under("/dst"), fs.files_under("/src"));
    }

    #[test]
    fn add_then_remove_between_cycles_is_invisible() {
        let fs = MemoryFs::new();
        fs.add_dir("/src");
        let mut scheduler = scheduler(&fs, FailurePolicy::Continue);
        scheduler.run_cycle().unwrap();

        fs.write("/src/blip.txt", "b");
        fs.remove("/src/blip.txt");
        let report = scheduler.run_cycle().unwrap();
        assert!(report.events.is_empty());
    }

    #[test]
    fn quit_before_start_still_runs_one_cycle() {
        let fs = MemoryFs::new();
        fs.write("/src/a.txt", "a");
        let quit = QuitSignal::new();
        quit.trigger();
        let log = EventLog::new(Vec::new(), Vec::new(), SeparatorPolicy::OnChange);
        let mut scheduler =
            SyncScheduler::new(fs.clone(), &config(FailurePolicy::Continue), log, quit)
                .with_interval(Duration::ZERO);

        let summary = scheduler.run().unwrap();
        assert_eq!(summary, RunSummary { cycles: 1 });
        assert_eq!(scheduler.state(), SchedulerState::Terminated);
        assert!(fs.exists("/dst/a.txt"));
    }

    #[test]
    fn abort_policy_stops_on_first_failure() {
        let fs = MemoryFs::new();
        fs.write("/src/a.txt", "a");
        fs.deny("/src/a.txt");
        let mut scheduler = scheduler(&fs, FailurePolicy::Abort);

        let err = scheduler.run().unwrap_err();
        assert!(matches!(err, Error::Fs(mirror_fs::Error::Io { .. })));
        assert_eq!(scheduler.state(), SchedulerState::Terminated);
        assert_eq!(log_text(scheduler), "");
    }

    #[test]
    fn continue_policy_logs_failure_and_syncs_the_rest() {
        let fs = MemoryFs::new();
        fs.write("/src/a.txt", "a");
        fs.write("/src/b.txt", "b");
        fs.deny("/src/a.txt");
        let mut scheduler = scheduler(&fs, FailurePolicy::Continue);

        let report = scheduler.run_cycle().unwrap();
        assert_eq!(report.failures.len(), 1);
        assert!(fs.exists("/dst/b.txt"));
        assert!(!fs.exists("/dst/a.txt"));

        let text = log_text(scheduler);
        assert!(text.starts_with("error: "));
        assert!(text.contains("b.txt is copied.\n"));
    }

    #[test]
    fn failed_scan_keeps_previous_snapshot() {
        let fs = MemoryFs::new();
        fs.write("/src/a.txt", "a");
        let mut scheduler = scheduler(&fs, FailurePolicy::Continue);
        scheduler.run_cycle().unwrap();

        fs.deny("/src");
        let report = scheduler.run_cycle().unwrap();
        assert!(report.events.is_empty());
        assert!(!report.failures.is_empty());
        assert_eq!(scheduler.snapshot().len(), 1);
    }
}
