//! Repository port for task persistence and filtered lookup.

use crate::task::domain::{
    EntityId, EntityRef, EntityType, ProfileId, Task, TaskId, TaskStatus, WorkflowId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Assignee criterion for task queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssigneeFilter {
    /// Do not filter on assignee.
    #[default]
    Any,
    /// Only tasks with no assignee.
    Unassigned,
    /// Only tasks assigned to the given profile.
    Profile(ProfileId),
}

/// Storage-level task query. Empty criteria match every task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Assignee criterion.
    pub assignee: AssigneeFilter,
    /// Accepted statuses; empty accepts all.
    pub statuses: Vec<TaskStatus>,
    /// Owning entity type.
    pub entity_type: Option<EntityType>,
    /// Owning entity identifier.
    pub entity_id: Option<EntityId>,
    /// Source workflow.
    pub workflow_id: Option<WorkflowId>,
    /// Only tasks due strictly before this instant.
    pub due_before: Option<DateTime<Utc>>,
    /// Only required tasks.
    pub required_only: bool,
}

impl TaskQuery {
    /// Returns whether `task` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        let assignee_matches = match self.assignee {
            AssigneeFilter::Any => true,
            AssigneeFilter::Unassigned => task.assigned_to().is_none(),
            AssigneeFilter::Profile(profile) => task.assigned_to() == Some(profile),
        };
        let owner = task.owner();

        assignee_matches
            && (self.statuses.is_empty() || self.statuses.contains(&task.status()))
            && self
                .entity_type
                .is_none_or(|entity_type| owner.entity_type() == entity_type)
            && self
                .entity_id
                .as_ref()
                .is_none_or(|entity_id| owner.entity_id() == entity_id)
            && self
                .workflow_id
                .is_none_or(|workflow_id| task.workflow_id() == Some(workflow_id))
            && self
                .due_before
                .is_none_or(|cutoff| task.due_date().is_some_and(|due| due < cutoff))
            && (!self.required_only || task.is_required())
    }
}

/// Task persistence contract.
///
/// Only the orchestrator writes through this port; entity adapters never
/// mutate task rows.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists and [`TaskRepositoryError::SequenceTaken`] when a sibling from
    /// the same workflow already uses its sequence order.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Stores a batch of new tasks atomically.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when any task ID already
    /// exists and [`TaskRepositoryError::SequenceTaken`] when two workflow
    /// siblings would share a sequence order; no task of the batch is stored
    /// in either case.
    async fn store_all(&self, tasks: &[Task]) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing task when the stored version still
    /// equals `expected_version`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// and [`TaskRepositoryError::VersionConflict`] when another writer
    /// updated it first.
    async fn update(&self, task: &Task, expected_version: u64) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns every task owned by the given entity.
    async fn find_by_entity(&self, owner: &EntityRef) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the tasks matching `query`, in no particular order.
    async fn query(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// Another task of the same entity already holds this workflow position.
    #[error("a task of {0} already occupies this workflow position")]
    SequenceTaken(EntityRef),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The stored task changed since it was read.
    #[error("task {task_id} was modified concurrently (expected version {expected})")]
    VersionConflict {
        /// Task being updated.
        task_id: TaskId,
        /// Version the writer read.
        expected: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
