//! Task aggregate root and the lifecycle state machine.

use super::{
    EntityRef, ParseTaskStatusError, ProfileId, TaskAction, TaskDefinitionId, TaskDomainError,
    TaskId, TaskRequirements, WorkflowId, WorkflowTaskId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has not been started.
    Pending,
    /// Task is being worked on.
    InProgress,
    /// Task has been finished.
    Completed,
    /// Task work is paused with a reason.
    Blocked,
    /// Optional task was deliberately not done.
    Skipped,
}

impl TaskStatus {
    /// Statuses listed when a caller gives no status filter.
    pub const ACTIVE: [Self; 3] = [Self::Pending, Self::InProgress, Self::Blocked];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
            Self::Skipped => "skipped",
        }
    }

    /// Returns whether no further transitions are allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }

    /// Returns whether the status resolves a task for ordering and
    /// auto-progression purposes.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        self.is_terminal()
    }

    /// Returns whether the state machine permits moving to `target`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::InProgress | Self::Skipped)
                | (Self::InProgress, Self::Completed | Self::Blocked)
                | (Self::Blocked, Self::Pending)
        )
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "blocked" => Ok(Self::Blocked),
            "skipped" => Ok(Self::Skipped),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of applying a lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The task changed state.
    Applied,
    /// The task was already in the requested state; nothing changed.
    Unchanged,
}

/// Workflow template origin of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowOrigin {
    /// Template the task was instantiated from.
    pub workflow_id: WorkflowId,
    /// Template entry the task was instantiated from.
    pub workflow_task_id: WorkflowTaskId,
}

/// Parameter object for creating a new pending task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Owning entity.
    pub owner: EntityRef,
    /// Template origin, `None` for ad-hoc tasks.
    pub origin: Option<WorkflowOrigin>,
    /// Reusable task definition.
    pub task_definition_id: TaskDefinitionId,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Completion requirements copied from the definition.
    pub requirements: TaskRequirements,
    /// Sibling ordering.
    pub sequence_order: u32,
    /// Whether the task gates entity completion.
    pub is_required: bool,
    /// Initial assignee.
    pub assigned_to: Option<ProfileId>,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
}

/// One checklist item with its own lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    owner: EntityRef,
    origin: Option<WorkflowOrigin>,
    task_definition_id: TaskDefinitionId,
    name: String,
    description: Option<String>,
    requirements: TaskRequirements,
    sequence_order: u32,
    status: TaskStatus,
    is_required: bool,
    assigned_to: Option<ProfileId>,
    due_date: Option<DateTime<Utc>>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    completed_by: Option<ProfileId>,
    task_notes: Option<String>,
    completion_notes: Option<String>,
    blocked_reason: Option<String>,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owning entity.
    pub owner: EntityRef,
    /// Persisted template origin.
    pub origin: Option<WorkflowOrigin>,
    /// Persisted task definition reference.
    pub task_definition_id: TaskDefinitionId,
    /// Persisted name.
    pub name: String,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted completion requirements.
    pub requirements: TaskRequirements,
    /// Persisted sibling ordering.
    pub sequence_order: u32,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted required flag.
    pub is_required: bool,
    /// Persisted assignee.
    pub assigned_to: Option<ProfileId>,
    /// Persisted due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Persisted start timestamp.
    pub started_at: Option<DateTime<Utc>>,
    /// Persisted completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted completing actor.
    pub completed_by: Option<ProfileId>,
    /// Persisted working notes.
    pub task_notes: Option<String>,
    /// Persisted completion notes.
    pub completion_notes: Option<String>,
    /// Persisted block reason.
    pub blocked_reason: Option<String>,
    /// Persisted optimistic concurrency version.
    pub version: u64,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new pending task.
    #[must_use]
    pub fn new(new_task: NewTask, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        let NewTask {
            owner,
            origin,
            task_definition_id,
            name,
            description,
            requirements,
            sequence_order,
            is_required,
            assigned_to,
            due_date,
        } = new_task;

        Self {
            id: TaskId::new(),
            owner,
            origin,
            task_definition_id,
            name,
            description,
            requirements,
            sequence_order,
            status: TaskStatus::Pending,
            is_required,
            assigned_to,
            due_date,
            started_at: None,
            completed_at: None,
            completed_by: None,
            task_notes: None,
            completion_notes: None,
            blocked_reason: None,
            version: 0,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            owner: data.owner,
            origin: data.origin,
            task_definition_id: data.task_definition_id,
            name: data.name,
            description: data.description,
            requirements: data.requirements,
            sequence_order: data.sequence_order,
            status: data.status,
            is_required: data.is_required,
            assigned_to: data.assigned_to,
            due_date: data.due_date,
            started_at: data.started_at,
            completed_at: data.completed_at,
            completed_by: data.completed_by,
            task_notes: data.task_notes,
            completion_notes: data.completion_notes,
            blocked_reason: data.blocked_reason,
            version: data.version,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning entity.
    #[must_use]
    pub const fn owner(&self) -> &EntityRef {
        &self.owner
    }

    /// Returns the template origin, if any.
    #[must_use]
    pub const fn origin(&self) -> Option<WorkflowOrigin> {
        self.origin
    }

    /// Returns the workflow identifier, if the task came from a template.
    #[must_use]
    pub fn workflow_id(&self) -> Option<WorkflowId> {
        self.origin.map(|origin| origin.workflow_id)
    }

    /// Returns the task definition reference.
    #[must_use]
    pub const fn task_definition_id(&self) -> TaskDefinitionId {
        self.task_definition_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the completion requirements.
    #[must_use]
    pub const fn requirements(&self) -> TaskRequirements {
        self.requirements
    }

    /// Returns the sibling ordering.
    #[must_use]
    pub const fn sequence_order(&self) -> u32 {
        self.sequence_order
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns whether the task gates entity completion.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.is_required
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assigned_to(&self) -> Option<ProfileId> {
        self.assigned_to
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns when work first started.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns when the task was completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns who completed the task.
    #[must_use]
    pub const fn completed_by(&self) -> Option<ProfileId> {
        self.completed_by
    }

    /// Returns the accumulated working notes.
    #[must_use]
    pub fn task_notes(&self) -> Option<&str> {
        self.task_notes.as_deref()
    }

    /// Returns the completion notes.
    #[must_use]
    pub fn completion_notes(&self) -> Option<&str> {
        self.completion_notes.as_deref()
    }

    /// Returns the block reason while blocked.
    #[must_use]
    pub fn blocked_reason(&self) -> Option<&str> {
        self.blocked_reason.as_deref()
    }

    /// Returns the optimistic concurrency version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether the task is past due at `now`.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_terminal() && self.due_date.is_some_and(|due| due < now)
    }

    /// Returns whether `other` belongs to the same checklist as this task.
    #[must_use]
    pub fn is_sibling_of(&self, other: &Self) -> bool {
        self.id != other.id
            && self.owner == other.owner
            && self.workflow_id() == other.workflow_id()
    }

    /// Returns whether repeating `action` would be a no-op.
    ///
    /// Only `start`, `complete` and `skip` have an idempotent target state.
    #[must_use]
    pub const fn is_in_target_state(&self, action: TaskAction) -> bool {
        matches!(
            (action, self.status),
            (TaskAction::Start, TaskStatus::InProgress)
                | (TaskAction::Complete, TaskStatus::Completed)
                | (TaskAction::Skip, TaskStatus::Skipped)
        )
    }

    /// Checks the structural guard for `action` without mutating the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskIsRequired`] for skips of required
    /// tasks, [`TaskDomainError::NotBlocked`] for unblocking a non-terminal
    /// task that is not blocked, and
    /// [`TaskDomainError::InvalidTransition`] for every other illegal move.
    pub fn ensure_can(&self, action: TaskAction) -> Result<(), TaskDomainError> {
        let allowed = match action {
            TaskAction::Start => self.status == TaskStatus::Pending,
            TaskAction::Complete | TaskAction::Block => self.status == TaskStatus::InProgress,
            TaskAction::Unblock => {
                if self.status == TaskStatus::Blocked {
                    true
                } else if self.status.is_terminal() {
                    false
                } else {
                    return Err(TaskDomainError::NotBlocked(self.id));
                }
            }
            TaskAction::Skip => {
                if self.is_required {
                    return Err(TaskDomainError::TaskIsRequired(self.id));
                }
                self.status == TaskStatus::Pending
            }
            TaskAction::AddNote => !self.status.is_terminal(),
        };

        if allowed {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    /// Moves a pending task into progress.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] unless the task is
    /// pending or already in progress.
    pub fn start(&mut self, clock: &impl Clock) -> Result<Transition, TaskDomainError> {
        if self.is_in_target_state(TaskAction::Start) {
            return Ok(Transition::Unchanged);
        }
        self.ensure_can(TaskAction::Start)?;

        let now = clock.utc();
        self.status = TaskStatus::InProgress;
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
        self.touch(now);
        Ok(Transition::Applied)
    }

    /// Completes an in-progress task.
    ///
    /// `attachment_count` is only consulted when the task requires a photo.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] when the task is not in
    /// progress, [`TaskDomainError::NotesTooShort`] when the trimmed notes are
    /// shorter than `min_notes_len` (or empty),
    /// [`TaskDomainError::MissingRequiredNotes`] or
    /// [`TaskDomainError::MissingRequiredAttachment`] when the definition's
    /// requirements are unmet.
    pub fn complete(
        &mut self,
        completion: Completion<'_>,
        clock: &impl Clock,
    ) -> Result<Transition, TaskDomainError> {
        if self.is_in_target_state(TaskAction::Complete) {
            return Ok(Transition::Unchanged);
        }
        self.ensure_can(TaskAction::Complete)?;
        self.validate_completion(&completion)?;

        let now = clock.utc();
        self.status = TaskStatus::Completed;
        self.completed_at = Some(now);
        self.completed_by = completion.actor;
        self.completion_notes = Some(completion.notes.trim().to_owned());
        self.touch(now);
        Ok(Transition::Applied)
    }

    /// Checks completion data requirements without mutating the task.
    ///
    /// # Errors
    ///
    /// See [`Task::complete`].
    pub fn validate_completion(&self, completion: &Completion<'_>) -> Result<(), TaskDomainError> {
        let min = completion.min_notes_len.max(1);
        let actual = completion.notes.trim().chars().count();
        if actual < min {
            return Err(TaskDomainError::NotesTooShort { min, actual });
        }

        if self.requirements.requires_notes
            && self
                .task_notes
                .as_deref()
                .is_none_or(|notes| notes.trim().is_empty())
        {
            return Err(TaskDomainError::MissingRequiredNotes);
        }

        if self.requirements.requires_photo && completion.attachment_count == 0 {
            return Err(TaskDomainError::MissingRequiredAttachment);
        }

        Ok(())
    }

    /// Blocks an in-progress task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] when the task is not in
    /// progress or [`TaskDomainError::EmptyReason`] for a blank reason.
    pub fn block(&mut self, reason: &str, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.ensure_can(TaskAction::Block)?;
        let trimmed = reason.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyReason);
        }

        self.status = TaskStatus::Blocked;
        self.blocked_reason = Some(trimmed.to_owned());
        self.touch(clock.utc());
        Ok(())
    }

    /// Releases a blocked task back to pending so it must be started again.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotBlocked`] or
    /// [`TaskDomainError::InvalidTransition`] per [`Task::ensure_can`].
    pub fn unblock(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.ensure_can(TaskAction::Unblock)?;
        self.status = TaskStatus::Pending;
        self.blocked_reason = None;
        self.touch(clock.utc());
        Ok(())
    }

    /// Skips a pending optional task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskIsRequired`] for required tasks and
    /// [`TaskDomainError::InvalidTransition`] unless the task is pending.
    pub fn skip(&mut self, clock: &impl Clock) -> Result<Transition, TaskDomainError> {
        if self.is_required {
            return Err(TaskDomainError::TaskIsRequired(self.id));
        }
        if self.is_in_target_state(TaskAction::Skip) {
            return Ok(Transition::Unchanged);
        }
        self.ensure_can(TaskAction::Skip)?;
        self.status = TaskStatus::Skipped;
        self.touch(clock.utc());
        Ok(Transition::Applied)
    }

    /// Appends a line to the working notes.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] on terminal tasks and
    /// [`TaskDomainError::EmptyReason`] for a blank note.
    pub fn add_note(&mut self, note: &str, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.ensure_can(TaskAction::AddNote)?;
        let trimmed = note.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyReason);
        }

        let notes = match self.task_notes.take() {
            Some(existing) if !existing.is_empty() => format!("{existing}\n{trimmed}"),
            _ => trimmed.to_owned(),
        };
        self.task_notes = Some(notes);
        self.touch(clock.utc());
        Ok(())
    }

    /// Replaces the assignee and returns the previous one.
    pub fn reassign(&mut self, assignee: Option<ProfileId>, clock: &impl Clock) -> Option<ProfileId> {
        let previous = std::mem::replace(&mut self.assigned_to, assignee);
        self.touch(clock.utc());
        previous
    }

    fn invalid(&self, action: TaskAction) -> TaskDomainError {
        TaskDomainError::InvalidTransition {
            task_id: self.id,
            from: self.status,
            action,
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.version = self.version.saturating_add(1);
    }
}

/// Completion data supplied to [`Task::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion<'a> {
    /// Completion notes entered by the actor.
    pub notes: &'a str,
    /// Actor completing the task.
    pub actor: Option<ProfileId>,
    /// Number of attachments linked to the task.
    pub attachment_count: usize,
    /// Minimum accepted length of the trimmed notes.
    pub min_notes_len: usize,
}
