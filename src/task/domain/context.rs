//! Read-only projections and guard decisions returned by entity adapters.

use super::{EntityRef, Task};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome of an entity-specific precondition check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum Permission {
    /// The operation may proceed.
    Allowed,
    /// The operation is refused for the given human-readable reason.
    Denied(String),
}

impl Permission {
    /// Creates a denial with a reason.
    #[must_use]
    pub fn deny(reason: impl Into<String>) -> Self {
        Self::Denied(reason.into())
    }

    /// Returns whether the operation may proceed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Returns the denial reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed => None,
            Self::Denied(reason) => Some(reason),
        }
    }
}

/// Display projection of the entity owning a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityContext {
    /// Headline, e.g. ticket number and device.
    pub title: String,
    /// Secondary line, e.g. customer name.
    pub subtitle: Option<String>,
    /// Entity status in its own vocabulary.
    pub status: String,
    /// Link to the entity detail page.
    pub url: String,
    /// Entity priority, when the entity type has one.
    pub priority: Option<String>,
    /// Additional entity-specific display fields.
    pub metadata: Map<String, Value>,
}

/// Task enriched with the context of its owning entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskWithContext {
    /// The task.
    pub task: Task,
    /// Owning entity context; `None` when the entity could not be resolved.
    pub context: Option<EntityContext>,
}

/// Progress counters for one entity's checklist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProgress {
    /// Number of tasks.
    pub total: usize,
    /// Completed tasks.
    pub completed: usize,
    /// Tasks in progress.
    pub in_progress: usize,
    /// Blocked tasks.
    pub blocked: usize,
    /// Pending tasks.
    pub pending: usize,
    /// Skipped tasks.
    pub skipped: usize,
    /// Completed share of all tasks, rounded to the nearest percent.
    pub completion_percentage: u8,
}

impl TaskProgress {
    /// Tallies the given tasks.
    #[must_use]
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        use super::TaskStatus;

        let mut progress = Self::default();
        for task in tasks {
            progress.total += 1;
            match task.status() {
                TaskStatus::Pending => progress.pending += 1,
                TaskStatus::InProgress => progress.in_progress += 1,
                TaskStatus::Completed => progress.completed += 1,
                TaskStatus::Blocked => progress.blocked += 1,
                TaskStatus::Skipped => progress.skipped += 1,
            }
        }
        progress.completion_percentage = rounded_percentage(progress.completed, progress.total);
        progress
    }
}

fn rounded_percentage(part: usize, total: usize) -> u8 {
    let doubled_total = total.saturating_mul(2);
    let scaled = part.saturating_mul(200).saturating_add(total);
    let percent = scaled.checked_div(doubled_total).unwrap_or(0).min(100);
    u8::try_from(percent).unwrap_or(100)
}

/// Full checklist of one entity with aggregate progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityChecklist {
    /// Owning entity.
    pub owner: EntityRef,
    /// Tasks ordered by sequence order.
    pub tasks: Vec<Task>,
    /// Aggregate counters.
    pub progress: TaskProgress,
}

/// Read-only view of an entity's checklist handed to completion hooks.
#[derive(Debug, Clone, Copy)]
pub struct ChecklistView<'a> {
    tasks: &'a [Task],
}

impl<'a> ChecklistView<'a> {
    /// Wraps a slice of sibling tasks, including the task that just changed.
    #[must_use]
    pub const fn new(tasks: &'a [Task]) -> Self {
        Self { tasks }
    }

    /// Returns the tasks in the checklist.
    #[must_use]
    pub const fn tasks(&self) -> &'a [Task] {
        self.tasks
    }

    /// Returns whether every required task is completed or skipped.
    ///
    /// A checklist without required tasks counts as resolved only when it is
    /// non-empty.
    #[must_use]
    pub fn all_required_resolved(&self) -> bool {
        !self.tasks.is_empty()
            && self
                .tasks
                .iter()
                .filter(|task| task.is_required())
                .all(|task| task.status().is_resolved())
    }

    /// Returns the number of required tasks still open.
    #[must_use]
    pub fn open_required(&self) -> usize {
        self.tasks
            .iter()
            .filter(|task| task.is_required() && !task.status().is_resolved())
            .count()
    }
}
