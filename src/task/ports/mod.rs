//! Port contracts for task orchestration.
//!
//! Ports define infrastructure-agnostic interfaces used by the task service:
//! persistence, workflow templates, attachments, timeline events and the
//! per-entity-type adapters.

pub mod attachment;
pub mod entity_adapter;
pub mod event_sink;
pub mod repository;
pub mod workflow;

pub use attachment::{AttachmentCounter, AttachmentCounterError};
pub use entity_adapter::{AdapterError, AdapterResult, EntityAdapter, Progression};
pub use event_sink::TaskEventSink;
pub use repository::{
    AssigneeFilter, TaskQuery, TaskRepository, TaskRepositoryError, TaskRepositoryResult,
};
pub use workflow::{WorkflowReaderError, WorkflowReaderResult, WorkflowTemplateReader};

#[cfg(test)]
pub use entity_adapter::MockEntityAdapter;
