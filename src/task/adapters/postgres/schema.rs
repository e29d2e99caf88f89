//! Diesel schema for checklist task persistence.

diesel::table! {
    /// Checklist task records.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning entity type tag.
        #[max_length = 50]
        entity_type -> Varchar,
        /// Owning entity identifier.
        #[max_length = 255]
        entity_id -> Varchar,
        /// Source workflow template, null for ad-hoc tasks.
        workflow_id -> Nullable<Uuid>,
        /// Source workflow entry, null for ad-hoc tasks.
        workflow_task_id -> Nullable<Uuid>,
        /// Reusable task definition.
        task_definition_id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Completion requires working notes.
        requires_notes -> Bool,
        /// Completion requires an attachment.
        requires_photo -> Bool,
        /// Sibling ordering.
        sequence_order -> Int4,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Whether the task gates entity completion.
        is_required -> Bool,
        /// Assigned profile.
        assigned_to -> Nullable<Uuid>,
        /// Due date.
        due_date -> Nullable<Timestamptz>,
        /// First start timestamp.
        started_at -> Nullable<Timestamptz>,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Completing profile.
        completed_by -> Nullable<Uuid>,
        /// Append-only working notes.
        task_notes -> Nullable<Text>,
        /// Completion notes.
        completion_notes -> Nullable<Text>,
        /// Block reason while blocked.
        blocked_reason -> Nullable<Text>,
        /// Optimistic concurrency version.
        version -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
