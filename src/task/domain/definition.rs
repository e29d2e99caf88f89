//! Reusable task definitions and workflow templates.

use super::{EntityType, TaskDefinitionId, WorkflowId, WorkflowTaskId};
use serde::{Deserialize, Serialize};

/// Completion requirements declared by a task definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRequirements {
    /// Working notes must be present before completion.
    pub requires_notes: bool,
    /// At least one attachment must be linked before completion.
    pub requires_photo: bool,
}

/// Reusable task type, referenced by workflow entries and ad-hoc tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    id: TaskDefinitionId,
    name: String,
    description: Option<String>,
    requirements: TaskRequirements,
    estimated_minutes: Option<u32>,
}

impl TaskDefinition {
    /// Creates a definition with no completion requirements.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TaskDefinitionId::new(),
            name: name.into(),
            description: None,
            requirements: TaskRequirements::default(),
            estimated_minutes: None,
        }
    }

    /// Sets the definition identifier.
    #[must_use]
    pub const fn with_id(mut self, id: TaskDefinitionId) -> Self {
        self.id = id;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the definition as requiring working notes.
    #[must_use]
    pub const fn requiring_notes(mut self) -> Self {
        self.requirements.requires_notes = true;
        self
    }

    /// Marks the definition as requiring a photo attachment.
    #[must_use]
    pub const fn requiring_photo(mut self) -> Self {
        self.requirements.requires_photo = true;
        self
    }

    /// Sets the estimated duration in minutes.
    #[must_use]
    pub const fn with_estimated_minutes(mut self, minutes: u32) -> Self {
        self.estimated_minutes = Some(minutes);
        self
    }

    /// Returns the definition identifier.
    #[must_use]
    pub const fn id(&self) -> TaskDefinitionId {
        self.id
    }

    /// Returns the definition name.
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

    /// Returns the estimated duration in minutes.
    #[must_use]
    pub const fn estimated_minutes(&self) -> Option<u32> {
        self.estimated_minutes
    }
}

/// One ordered entry inside a workflow template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowTaskEntry {
    /// Entry identifier.
    pub id: WorkflowTaskId,
    /// Task definition instantiated by this entry.
    pub definition: TaskDefinition,
    /// Position among siblings.
    pub sequence_order: u32,
    /// Whether the instantiated task gates entity completion.
    pub is_required: bool,
    /// Entry-specific name replacing the definition name.
    pub name_override: Option<String>,
    /// Entry-specific description replacing the definition description.
    pub description_override: Option<String>,
    /// Due date offset from instantiation, in minutes.
    pub due_after_minutes: Option<u32>,
}

impl WorkflowTaskEntry {
    /// Creates a required entry for the given definition.
    #[must_use]
    pub fn new(definition: TaskDefinition, sequence_order: u32) -> Self {
        Self {
            id: WorkflowTaskId::new(),
            definition,
            sequence_order,
            is_required: true,
            name_override: None,
            description_override: None,
            due_after_minutes: None,
        }
    }

    /// Marks the entry as optional.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.is_required = false;
        self
    }

    /// Overrides the definition name for this entry.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name_override = Some(name.into());
        self
    }

    /// Overrides the definition description for this entry.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description_override = Some(description.into());
        self
    }

    /// Sets a due date offset relative to instantiation.
    #[must_use]
    pub const fn due_after_minutes(mut self, minutes: u32) -> Self {
        self.due_after_minutes = Some(minutes);
        self
    }

    /// Returns the effective task name.
    #[must_use]
    pub fn effective_name(&self) -> &str {
        self.name_override
            .as_deref()
            .unwrap_or_else(|| self.definition.name())
    }

    /// Returns the effective task description.
    #[must_use]
    pub fn effective_description(&self) -> Option<&str> {
        self.description_override
            .as_deref()
            .or_else(|| self.definition.description())
    }
}

/// Immutable blueprint of an ordered checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    id: WorkflowId,
    name: String,
    entity_type: Option<EntityType>,
    strict_sequence: bool,
    is_active: bool,
    entries: Vec<WorkflowTaskEntry>,
}

impl WorkflowTemplate {
    /// Creates an active, unscoped, non-strict template with no entries.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: WorkflowId::new(),
            name: name.into(),
            entity_type: None,
            strict_sequence: false,
            is_active: true,
            entries: Vec::new(),
        }
    }

    /// Sets the template identifier.
    #[must_use]
    pub const fn with_id(mut self, id: WorkflowId) -> Self {
        self.id = id;
        self
    }

    /// Restricts the template to one entity type.
    #[must_use]
    pub const fn scoped_to(mut self, entity_type: EntityType) -> Self {
        self.entity_type = Some(entity_type);
        self
    }

    /// Enables strict sibling ordering.
    #[must_use]
    pub const fn strict(mut self) -> Self {
        self.strict_sequence = true;
        self
    }

    /// Marks the template as inactive.
    #[must_use]
    pub const fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Appends an entry.
    #[must_use]
    pub fn with_entry(mut self, entry: WorkflowTaskEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Returns the template identifier.
    #[must_use]
    pub const fn id(&self) -> WorkflowId {
        self.id
    }

    /// Returns the template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the entity type this template is scoped to, if any.
    #[must_use]
    pub const fn entity_type(&self) -> Option<EntityType> {
        self.entity_type
    }

    /// Returns whether siblings must be resolved in ascending order.
    #[must_use]
    pub const fn strict_sequence(&self) -> bool {
        self.strict_sequence
    }

    /// Returns whether the template may be instantiated.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the entries sorted by sequence order.
    #[must_use]
    pub fn ordered_entries(&self) -> Vec<&WorkflowTaskEntry> {
        let mut entries: Vec<&WorkflowTaskEntry> = self.entries.iter().collect();
        entries.sort_by_key(|entry| entry.sequence_order);
        entries
    }

    /// Returns whether the template has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the lowest sequence order shared by more than one entry.
    #[must_use]
    pub fn duplicate_order(&self) -> Option<u32> {
        self.ordered_entries()
            .windows(2)
            .find_map(|pair| match pair {
                [first, second] if first.sequence_order == second.sequence_order => {
                    Some(first.sequence_order)
                }
                _ => None,
            })
    }
}
