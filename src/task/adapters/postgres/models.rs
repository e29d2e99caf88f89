//! Diesel row model for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Row shape shared by reads, inserts and full-row updates.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct TaskRow {
    /// Task identifier.
    pub id: Uuid,
    /// Owning entity type tag.
    pub entity_type: String,
    /// Owning entity identifier.
    pub entity_id: String,
    /// Source workflow template.
    pub workflow_id: Option<Uuid>,
    /// Source workflow entry.
    pub workflow_task_id: Option<Uuid>,
    /// Reusable task definition.
    pub task_definition_id: Uuid,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Completion requires working notes.
    pub requires_notes: bool,
    /// Completion requires an attachment.
    pub requires_photo: bool,
    /// Sibling ordering.
    pub sequence_order: i32,
    /// Lifecycle status.
    pub status: String,
    /// Whether the task gates entity completion.
    pub is_required: bool,
    /// Assigned profile.
    pub assigned_to: Option<Uuid>,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
    /// First start timestamp.
    pub started_at: Option<DateTime<Utc>>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Completing profile.
    pub completed_by: Option<Uuid>,
    /// Append-only working notes.
    pub task_notes: Option<String>,
    /// Completion notes.
    pub completion_notes: Option<String>,
    /// Block reason while blocked.
    pub blocked_reason: Option<String>,
    /// Optimistic concurrency version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
