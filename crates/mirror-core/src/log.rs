//! Dual-sink event log
//!
//! Every line goes to the persistent log and the console, in that order, so
//! both carry identical text.

use std::io::{self, Write};

use crate::config::SeparatorPolicy;
use crate::event::SyncEvent;
use crate::{Error, Result};

/// Writes event and failure lines to a log file and the console.
#[derive(Debug)]
pub struct EventLog<P: Write, C: Write> {
    persistent: P,
    console: C,
    separator: SeparatorPolicy,
    /// Lines written since the last `end_cycle`
    pending: usize,
}

impl<P: Write, C: Write> EventLog<P, C> {
    pub fn new(persistent: P, console: C, separator: SeparatorPolicy) -> Self {
        Self {
            persistent,
            console,
            separator,
            pending: 0,
        }
    }

    /// Lines written in the current cycle so far.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Write one event line.
    pub fn record(&mut self, event: &SyncEvent) -> Result<()> {
        self.line(&event.to_string())?;
        self.pending += 1;
        Ok(())
    }

    /// Write one line describing a skipped failure.
    pub fn failure(&mut self, error: &mirror_fs::Error) -> Result<()> {
        self.line(&format!("error: {error}"))?;
        self.pending += 1;
        Ok(())
    }

    /// Close the current cycle's block: write the blank separator line when
    /// the policy asks for one, then flush both sinks.
    pub fn end_cycle(&mut self) -> Result<()> {
        let wrote = self.pending > 0;
        self.pending = 0;
        if wrote || self.separator == SeparatorPolicy::Always {
            self.line("")?;
        }
        self.flush()
    }

    pub fn flush(&mut self) -> Result<()> {
        self.persistent.flush().map_err(log_write)?;
        self.console.flush().map_err(log_write)
    }

    /// Give back the two sinks.
    pub fn into_inner(self) -> (P, C) {
        (self.persistent, self.console)
    }

    fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.persistent, "{text}").map_err(log_write)?;
        writeln!(self.console, "{text}").map_err(log_write)
    }
}

fn log_write(source: io::Error) -> Error {
    Error::LogWrite { source }
}
