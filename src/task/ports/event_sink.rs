//! Port for timeline and audit event emission.

use crate::task::domain::TaskEvent;
use std::sync::Arc;

/// Receiver of task timeline events.
///
/// Emission is fire-and-forget: sinks buffer, log or forward events and never
/// fail the operation that produced them.
pub trait TaskEventSink: Send + Sync {
    /// Records one event.
    fn emit(&self, event: TaskEvent);
}

impl<S: TaskEventSink + ?Sized> TaskEventSink for Arc<S> {
    fn emit(&self, event: TaskEvent) {
        (**self).emit(event);
    }
}
