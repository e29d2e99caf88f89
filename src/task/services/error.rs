//! Service-level error taxonomy for task orchestration.

use crate::task::{
    domain::{EntityRef, EntityType, Task, TaskDomainError, TaskId, WorkflowId},
    ports::{AdapterError, AttachmentCounterError, TaskRepositoryError, WorkflowReaderError},
};
use std::fmt;
use thiserror::Error;

/// Broad class of a [`TaskServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A task, workflow or entity does not exist.
    NotFound,
    /// A business precondition is not met yet; retry once it clears.
    Precondition,
    /// The caller supplied invalid input.
    Validation,
    /// Deployment defect, such as a missing entity adapter.
    Configuration,
    /// Storage or collaborator failure.
    Infrastructure,
}

/// Adapter lifecycle hook that ran after a task change was persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleHook {
    /// `on_task_start`.
    Start,
    /// `on_task_complete`.
    Complete,
    /// `on_task_block`.
    Block,
}

impl fmt::Display for LifecycleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::Complete => "completion",
            Self::Block => "block",
        })
    }
}

/// Errors returned by the task service.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// The task does not exist.
    #[error("task {0} was not found")]
    TaskNotFound(TaskId),

    /// The workflow template does not exist.
    #[error("workflow {0} was not found")]
    WorkflowNotFound(WorkflowId),

    /// The workflow template is deactivated.
    #[error("workflow \"{name}\" is inactive")]
    WorkflowInactive {
        /// Template identifier.
        workflow_id: WorkflowId,
        /// Template name.
        name: String,
    },

    /// The workflow template has no task entries.
    #[error("workflow \"{name}\" has no tasks")]
    WorkflowEmpty {
        /// Template identifier.
        workflow_id: WorkflowId,
        /// Template name.
        name: String,
    },

    /// Two entries of the workflow template share a sequence order.
    #[error("workflow \"{name}\" has more than one task at position {duplicate_order}")]
    WorkflowInvalid {
        /// Template identifier.
        workflow_id: WorkflowId,
        /// Template name.
        name: String,
        /// Sequence order used more than once.
        duplicate_order: u32,
    },

    /// The owning entity does not exist.
    #[error("{0} was not found")]
    EntityNotFound(EntityRef),

    /// The entity adapter refused the workflow.
    #[error("workflow cannot be assigned to {entity}: {reason}")]
    CannotAssign {
        /// Target entity.
        entity: EntityRef,
        /// Workflow that was refused.
        workflow_id: WorkflowId,
        /// Adapter explanation.
        reason: String,
    },

    /// The entity adapter refused to let the task start.
    #[error("task cannot be started: {reason}")]
    PreconditionFailed {
        /// Task that was refused.
        task_id: TaskId,
        /// Adapter explanation.
        reason: String,
    },

    /// Earlier required tasks of a strict workflow are still open.
    #[error("task cannot be started before these earlier tasks are done: {waiting_on}")]
    SequenceNotSatisfied {
        /// Task that was refused.
        task_id: TaskId,
        /// Names of the earlier open tasks, comma separated.
        waiting_on: String,
    },

    /// State machine or completion validation failure.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Another writer changed the task between read and write.
    #[error("task {0} was changed by someone else; reload it and try again")]
    Conflict(TaskId),

    /// No adapter is registered for the entity type.
    #[error("no entity adapter is registered for {0}")]
    AdapterNotFound(EntityType),

    /// The task change was persisted but the adapter side effect failed.
    #[error(
        "task {} was saved as {} but its {hook} side effect failed: {source}",
        .task.id(),
        .task.status()
    )]
    HookFailed {
        /// Task as persisted.
        task: Box<Task>,
        /// Hook that failed.
        hook: LifecycleHook,
        /// Adapter failure.
        #[source]
        source: AdapterError,
    },

    /// Entity adapter failure outside lifecycle hooks.
    #[error(transparent)]
    Adapter(AdapterError),

    /// Task repository failure.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),

    /// Workflow template lookup failure.
    #[error(transparent)]
    Workflow(#[from] WorkflowReaderError),

    /// Attachment lookup failure.
    #[error(transparent)]
    Attachments(#[from] AttachmentCounterError),
}

impl TaskServiceError {
    /// Classifies the error for callers deciding how to present or retry it.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::TaskNotFound(_) | Self::WorkflowNotFound(_) | Self::EntityNotFound(_) => {
                ErrorCategory::NotFound
            }
            Self::WorkflowInactive { .. }
            | Self::CannotAssign { .. }
            | Self::PreconditionFailed { .. }
            | Self::SequenceNotSatisfied { .. }
            | Self::Conflict(_)
            | Self::Repository(TaskRepositoryError::SequenceTaken(_)) => ErrorCategory::Precondition,
            Self::WorkflowEmpty { .. } | Self::WorkflowInvalid { .. } | Self::Domain(_) => {
                ErrorCategory::Validation
            }
            Self::AdapterNotFound(_) => ErrorCategory::Configuration,
            Self::HookFailed { .. }
            | Self::Adapter(_)
            | Self::Repository(_)
            | Self::Workflow(_)
            | Self::Attachments(_) => ErrorCategory::Infrastructure,
        }
    }

    /// Returns the persisted task carried by a hook failure.
    #[must_use]
    pub fn persisted_task(&self) -> Option<&Task> {
        match self {
            Self::HookFailed { task, .. } => Some(task),
            _ => None,
        }
    }
}

impl From<AdapterError> for TaskServiceError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::EntityNotFound(entity) => Self::EntityNotFound(entity),
            other => Self::Adapter(other),
        }
    }
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;
