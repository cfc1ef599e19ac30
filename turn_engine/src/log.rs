//! The per-turn debug trace.
//!
//! Every pipeline decision appends an entry here. The trace is pure data
//! returned to the caller; `tracing` mirrors each entry for operators but
//! carries no simulation meaning.

use serde::{Deserialize, Serialize};
use world_model::{NoticeKind, ValidationNotice};

/// Entry severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Info,
    Success,
    Warning,
}

/// One entry in the ordered per-turn trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugLogEntry {
    /// In-world clock display at the moment of logging.
    pub timestamp: String,
    pub message: String,
    pub kind: LogKind,
}

/// Ordered, append-only collector for one turn's trace.
#[derive(Debug, Default)]
pub struct TurnLog {
    entries: Vec<DebugLogEntry>,
    clock: String,
}

impl TurnLog {
    /// Create a log stamped with the given in-world clock display.
    pub fn new(clock: impl Into<String>) -> Self {
        Self { entries: Vec::new(), clock: clock.into() }
    }

    /// Update the clock used for subsequent entries.
    pub fn set_clock(&mut self, clock: impl Into<String>) {
        self.clock = clock.into();
    }

    fn push(&mut self, kind: LogKind, message: String) {
        match kind {
            LogKind::Warning => tracing::warn!(target: "turn_engine", "{message}"),
            _ => tracing::debug!(target: "turn_engine", "{message}"),
        }
        self.entries.push(DebugLogEntry {
            timestamp: self.clock.clone(),
            message,
            kind,
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogKind::Info, message.into());
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(LogKind::Success, message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(LogKind::Warning, message.into());
    }

    /// Fold validator notices into the trace.
    pub fn extend_notices(&mut self, notices: Vec<ValidationNotice>) {
        for notice in notices {
            let kind = match notice.kind {
                NoticeKind::Info => LogKind::Info,
                NoticeKind::Success => LogKind::Success,
                NoticeKind::Warning => LogKind::Warning,
            };
            self.push(kind, notice.message);
        }
    }

    /// Insert an entry at the front of the trace, ahead of everything
    /// logged so far. Used for the model's own thought process.
    pub fn unshift(&mut self, message: impl Into<String>) {
        self.entries.insert(
            0,
            DebugLogEntry {
                timestamp: self.clock.clone(),
                message: message.into(),
                kind: LogKind::Info,
            },
        );
    }

    /// Number of entries so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the trace is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the collector, yielding the ordered trace.
    pub fn into_entries(self) -> Vec<DebugLogEntry> {
        self.entries
    }
}
