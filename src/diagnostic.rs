//! Injected diagnostics collaborator.
//!
//! Operations that used to take an optional log file handle take a
//! [`DiagnosticSink`] instead. Sinks receive stage-tagged event strings
//! and are never consulted for control flow; passing [`NullSink`] is
//! always valid.

use std::sync::Mutex;

/// Receiver for diagnostic events emitted during reconciliation.
pub trait DiagnosticSink {
    /// Record one event. `stage` identifies the emitting component
    /// (e.g. `"reconcile"`, `"frameshift"`).
    fn event(&self, stage: &str, message: &str);
}

/// Sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn event(&self, _stage: &str, _message: &str) {}
}

/// Sink that collects events in memory, for tests and debugging.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<(String, String)>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events recorded so far.
    pub fn events(&self) -> Vec<(String, String)> {
        self.events.lock().expect("diagnostic sink poisoned").clone()
    }
}

impl DiagnosticSink for MemorySink {
    fn event(&self, stage: &str, message: &str) {
        self.events
            .lock()
            .expect("diagnostic sink poisoned")
            .push((stage.to_string(), message.to_string()));
    }
}
