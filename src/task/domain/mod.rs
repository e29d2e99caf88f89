//! Domain model for checklist tasks.
//!
//! The task domain owns the polymorphic owner reference, the task lifecycle
//! state machine, workflow templates and the projections adapters return.
//! It holds no infrastructure concerns.

mod context;
mod definition;
mod entity;
mod error;
mod event;
mod ids;
mod task;

pub use context::{
    ChecklistView, EntityChecklist, EntityContext, Permission, TaskProgress, TaskWithContext,
};
pub use definition::{TaskDefinition, TaskRequirements, WorkflowTaskEntry, WorkflowTemplate};
pub use entity::{EntityRef, EntityType};
pub use error::{ParseEntityTypeError, ParseTaskStatusError, TaskAction, TaskDomainError};
pub use event::{TaskEvent, TaskEventKind};
pub use ids::{EntityId, ProfileId, TaskDefinitionId, TaskId, WorkflowId, WorkflowTaskId};
pub use task::{
    Completion, NewTask, PersistedTaskData, Task, TaskStatus, Transition, WorkflowOrigin,
};
