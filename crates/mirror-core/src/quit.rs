//! Cooperative shutdown driven by a line on standard input

use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crate::{Error, Result};

/// The line that asks the loop to stop, compared after trimming whitespace.
pub const QUIT_SENTINEL: &str = "quit";

pub fn is_sentinel(line: &str) -> bool {
    line.trim() == QUIT_SENTINEL
}

/// A one-way flag shared between the listener and the scheduler.
///
/// Once triggered it stays triggered.
#[derive(Debug, Clone, Default)]
pub struct QuitSignal {
    flag: Arc<AtomicBool>,
}

impl QuitSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Why the listener stopped reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenOutcome {
    /// The sentinel line arrived
    Sentinel,
    /// Input closed before the sentinel
    EndOfInput,
    /// Reading failed
    ReadFailed,
}

/// Read lines until the sentinel, end of input or a read error, then trigger
/// `signal`. All three count as a request to stop.
pub fn listen<R: BufRead>(mut input: R, signal: &QuitSignal) -> ListenOutcome {
    let mut line = String::new();
    let outcome = loop {
        line.clear();
        match input.read_line(&mut line) {
            Ok(0) => break ListenOutcome::EndOfInput,
            Ok(_) if is_sentinel(&line) => break ListenOutcome::Sentinel,
            Ok(_) => tracing::trace!(line = line.trim_end(), "Ignoring input line"),
            Err(e) => {
                tracing::warn!(error = %e, "Reading quit input failed");
                break ListenOutcome::ReadFailed;
            }
        }
    };
    tracing::debug!(?outcome, "Quit requested");
    signal.trigger();
    outcome
}

/// Run [`listen`] on its own thread.
pub fn spawn_listener<R>(input: R, signal: QuitSignal) -> Result<JoinHandle<ListenOutcome>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("quit-listener".into())
        .spawn(move || listen(input, &signal))
        .map_err(|source| Error::ListenerSpawn { source })
}
