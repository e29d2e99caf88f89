//! Structured timeline events emitted by the orchestrator and adapters.

use super::{EntityRef, ProfileId, TaskId, TaskStatus, WorkflowId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind-specific payload of a [`TaskEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEventKind {
    /// Tasks were instantiated from a workflow template.
    TasksCreated {
        /// Source template.
        workflow_id: Option<WorkflowId>,
        /// Number of tasks created.
        count: usize,
    },
    /// A task moved into progress.
    TaskStarted {
        /// Task that started.
        task_id: TaskId,
    },
    /// A task was completed.
    TaskCompleted {
        /// Task that completed.
        task_id: TaskId,
        /// Completion notes.
        notes: String,
    },
    /// A task was blocked.
    TaskBlocked {
        /// Task that was blocked.
        task_id: TaskId,
        /// Block reason.
        reason: String,
    },
    /// A blocked task was released.
    TaskUnblocked {
        /// Task that was released.
        task_id: TaskId,
    },
    /// An optional task was skipped.
    TaskSkipped {
        /// Task that was skipped.
        task_id: TaskId,
    },
    /// A task changed assignee.
    TaskReassigned {
        /// Task that was reassigned.
        task_id: TaskId,
        /// Previous assignee.
        from: Option<ProfileId>,
        /// New assignee.
        to: Option<ProfileId>,
        /// Reason given for the change.
        reason: Option<String>,
    },
    /// A working note was appended.
    TaskNoteAdded {
        /// Task that received the note.
        task_id: TaskId,
    },
    /// The owning entity moved to a new status as a task side effect.
    EntityStatusChanged {
        /// Status before the change.
        from: String,
        /// Status after the change.
        to: String,
    },
    /// Every required task of the owning entity is resolved.
    EntityTasksCompleted,
}

/// Timeline entry describing something that happened to an entity's tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEvent {
    /// Entity whose timeline receives the event.
    pub entity: EntityRef,
    /// Acting profile, when known.
    pub actor: Option<ProfileId>,
    /// Human-readable summary for timelines.
    pub summary: String,
    /// Event payload.
    pub kind: TaskEventKind,
    /// Emission time.
    pub occurred_at: DateTime<Utc>,
}

impl TaskEvent {
    /// Creates an event.
    #[must_use]
    pub fn new(
        entity: EntityRef,
        kind: TaskEventKind,
        summary: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            entity,
            actor: None,
            summary: summary.into(),
            kind,
            occurred_at,
        }
    }

    /// Sets the acting profile.
    #[must_use]
    pub const fn with_actor(mut self, actor: Option<ProfileId>) -> Self {
        self.actor = actor;
        self
    }

    /// Returns the status the event moved a task into, if any.
    #[must_use]
    pub const fn task_status(&self) -> Option<TaskStatus> {
        match self.kind {
            TaskEventKind::TaskStarted { .. } => Some(TaskStatus::InProgress),
            TaskEventKind::TaskCompleted { .. } => Some(TaskStatus::Completed),
            TaskEventKind::TaskBlocked { .. } => Some(TaskStatus::Blocked),
            TaskEventKind::TaskUnblocked { .. } => Some(TaskStatus::Pending),
            TaskEventKind::TaskSkipped { .. } => Some(TaskStatus::Skipped),
            _ => None,
        }
    }
}
