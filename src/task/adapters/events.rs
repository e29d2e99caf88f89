//! Task event sink implementations.

use std::sync::{Arc, Mutex};

use crate::task::{domain::TaskEvent, ports::TaskEventSink};

/// Sink that writes every event to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl TaskEventSink for TracingEventSink {
    fn emit(&self, event: TaskEvent) {
        let kind = serde_json::to_string(&event.kind).unwrap_or_default();
        tracing::info!(
            target: "checklist::timeline",
            entity = %event.entity,
            actor = ?event.actor,
            occurred_at = %event.occurred_at,
            kind = %kind,
            "{}",
            event.summary
        );
    }
}

/// Sink that keeps emitted events in memory for inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingEventSink {
    events: Arc<Mutex<Vec<TaskEvent>>>,
}

impl RecordingEventSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every event recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<TaskEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl TaskEventSink for RecordingEventSink {
    fn emit(&self, event: TaskEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
