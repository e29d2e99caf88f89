//! Request, filter and report types for the task service.

use crate::task::{
    domain::{
        EntityId, EntityRef, EntityType, ProfileId, Task, TaskDefinition, TaskId, TaskStatus,
        WorkflowId,
    },
    ports::{AssigneeFilter, TaskQuery},
    services::TaskServiceError,
};
use chrono::{DateTime, Utc};

/// Request payload for creating an ad-hoc task outside any workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    pub(crate) owner: EntityRef,
    pub(crate) definition: TaskDefinition,
    pub(crate) is_required: bool,
    pub(crate) assigned_to: Option<ProfileId>,
    pub(crate) due_date: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    /// Creates a request for a required, unassigned task.
    #[must_use]
    pub const fn new(owner: EntityRef, definition: TaskDefinition) -> Self {
        Self {
            owner,
            definition,
            is_required: true,
            assigned_to: None,
            due_date: None,
        }
    }

    /// Marks the task as optional.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.is_required = false;
        self
    }

    /// Sets the assignee.
    #[must_use]
    pub const fn assigned_to(mut self, profile: ProfileId) -> Self {
        self.assigned_to = Some(profile);
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn due_on(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Caller-facing task list filter.
///
/// Omitting statuses lists the configured active set; the assignee filter
/// distinguishes "everyone" ([`AssigneeFilter::Any`]) from "nobody"
/// ([`AssigneeFilter::Unassigned`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    assignee: AssigneeFilter,
    statuses: Option<Vec<TaskStatus>>,
    entity_type: Option<EntityType>,
    entity_id: Option<EntityId>,
    workflow_id: Option<WorkflowId>,
    overdue_only: bool,
    required_only: bool,
}

impl TaskFilter {
    /// Creates a filter listing all active tasks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the assignee.
    #[must_use]
    pub const fn assignee(mut self, assignee: AssigneeFilter) -> Self {
        self.assignee = assignee;
        self
    }

    /// Restricts to a single status.
    #[must_use]
    pub fn status(self, status: TaskStatus) -> Self {
        self.statuses([status])
    }

    /// Restricts to a set of statuses.
    ///
    /// An empty set restores the configured active set; use
    /// [`TaskFilter::any_status`] to list every status.
    #[must_use]
    pub fn statuses(mut self, statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        let chosen: Vec<TaskStatus> = statuses.into_iter().collect();
        self.statuses = (!chosen.is_empty()).then_some(chosen);
        self
    }

    /// Lists tasks in every status.
    #[must_use]
    pub fn any_status(mut self) -> Self {
        self.statuses = Some(Vec::new());
        self
    }

    /// Restricts to one entity type.
    #[must_use]
    pub const fn entity_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = Some(entity_type);
        self
    }

    /// Restricts to one owning entity.
    #[must_use]
    pub fn entity(mut self, owner: &EntityRef) -> Self {
        self.entity_type = Some(owner.entity_type());
        self.entity_id = Some(owner.entity_id().clone());
        self
    }

    /// Restricts to tasks instantiated from one workflow.
    #[must_use]
    pub const fn workflow(mut self, workflow_id: WorkflowId) -> Self {
        self.workflow_id = Some(workflow_id);
        self
    }

    /// Restricts to tasks whose due date has passed.
    #[must_use]
    pub const fn overdue(mut self) -> Self {
        self.overdue_only = true;
        self
    }

    /// Restricts to required tasks.
    #[must_use]
    pub const fn required_only(mut self) -> Self {
        self.required_only = true;
        self
    }

    /// Resolves the filter into a storage query at `now`.
    #[must_use]
    pub fn to_query(&self, now: DateTime<Utc>, default_statuses: &[TaskStatus]) -> TaskQuery {
        TaskQuery {
            assignee: self.assignee,
            statuses: self
                .statuses
                .clone()
                .unwrap_or_else(|| default_statuses.to_vec()),
            entity_type: self.entity_type,
            entity_id: self.entity_id.clone(),
            workflow_id: self.workflow_id,
            due_before: self.overdue_only.then_some(now),
            required_only: self.required_only,
        }
    }
}

/// One entry of a bulk completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkCompletionItem {
    /// Task to complete.
    pub task_id: TaskId,
    /// Completion notes for this task.
    pub notes: String,
}

impl BulkCompletionItem {
    /// Creates a bulk completion entry.
    #[must_use]
    pub fn new(task_id: TaskId, notes: impl Into<String>) -> Self {
        Self {
            task_id,
            notes: notes.into(),
        }
    }
}

/// Outcome of one item in a bulk operation.
#[derive(Debug)]
pub struct BulkItemOutcome {
    /// Task the item referred to.
    pub task_id: TaskId,
    /// Updated task or the reason the item failed.
    pub result: Result<Task, TaskServiceError>,
}

/// Per-item report of a bulk operation.
#[derive(Debug, Default)]
pub struct BulkReport {
    /// Outcomes in request order.
    pub items: Vec<BulkItemOutcome>,
}

impl BulkReport {
    /// Returns the tasks that were processed successfully.
    pub fn succeeded(&self) -> impl Iterator<Item = &Task> {
        self.items.iter().filter_map(|item| item.result.as_ref().ok())
    }

    /// Returns the failed items with their errors.
    pub fn failed(&self) -> impl Iterator<Item = (TaskId, &TaskServiceError)> {
        self.items
            .iter()
            .filter_map(|item| item.result.as_ref().err().map(|err| (item.task_id, err)))
    }

    /// Returns whether every item succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.items.iter().all(|item| item.result.is_ok())
    }
}
