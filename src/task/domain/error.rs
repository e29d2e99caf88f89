//! Error types for task state machine and validation rules.

use super::{TaskId, TaskStatus};
use thiserror::Error;

/// Lifecycle operation requested on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskAction {
    /// Begin work on the task.
    Start,
    /// Finish the task.
    Complete,
    /// Pause the task with a reason.
    Block,
    /// Release a blocked task.
    Unblock,
    /// Skip an optional task.
    Skip,
    /// Append a working note.
    AddNote,
}

impl TaskAction {
    /// Returns the verb used in user-facing messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Complete => "complete",
            Self::Block => "block",
            Self::Unblock => "unblock",
            Self::Skip => "skip",
            Self::AddNote => "add a note to",
        }
    }
}

impl std::fmt::Display for TaskAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by task state transitions and completion validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The requested operation is not legal from the current status.
    #[error("cannot {action} task {task_id} while it is {from}")]
    InvalidTransition {
        /// Task being transitioned.
        task_id: TaskId,
        /// Status the task is currently in.
        from: TaskStatus,
        /// Operation that was attempted.
        action: TaskAction,
    },

    /// Completion notes are shorter than the configured minimum.
    #[error("completion notes must be at least {min} characters (got {actual})")]
    NotesTooShort {
        /// Minimum accepted length in characters.
        min: usize,
        /// Length of the supplied notes after trimming.
        actual: usize,
    },

    /// The task definition requires working notes before completion.
    #[error("this task requires working notes before it can be completed")]
    MissingRequiredNotes,

    /// The task definition requires a photo before completion.
    #[error("this task requires at least one photo attachment before it can be completed")]
    MissingRequiredAttachment,

    /// A block reason or working note was empty.
    #[error("a reason is required")]
    EmptyReason,

    /// Unblock was requested on a task that is not blocked.
    #[error("task {0} is not blocked")]
    NotBlocked(TaskId),

    /// Skip was requested on a required task.
    #[error("task {0} is required and cannot be skipped")]
    TaskIsRequired(TaskId),
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing entity type tags.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown entity type: {0}")]
pub struct ParseEntityTypeError(pub String);
