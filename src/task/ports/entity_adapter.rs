//! Entity adapter port: the boundary between orchestration and
//! entity-specific business rules.

use crate::task::domain::{
    EntityContext, EntityId, EntityRef, EntityType, Permission, Task, WorkflowTemplate,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for entity adapter calls.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Outcome of an adapter's completion hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progression {
    /// Required tasks remain open; the entity was left untouched.
    Waiting {
        /// Number of required tasks not yet completed or skipped.
        open_required: usize,
    },
    /// The entity advanced as a result of this completion.
    Advanced,
    /// The entity had already advanced, or is not in the state the
    /// completion effect applies to.
    Unchanged,
}

/// Entity-specific lifecycle rules and side effects.
///
/// One implementation exists per [`EntityType`]. Only
/// [`EntityAdapter::on_task_complete`] is mandatory; every other hook
/// defaults to "allowed" or a no-op.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityAdapter: Send + Sync {
    /// Entity type served by this adapter.
    fn entity_type(&self) -> EntityType;

    /// Decides whether work on `task` may begin given the owning entity.
    async fn can_start_task(&self, _task: &Task) -> AdapterResult<Permission> {
        Ok(Permission::Allowed)
    }

    /// Runs after `task` was persisted as in progress.
    async fn on_task_start(&self, _task: &Task) -> AdapterResult<()> {
        Ok(())
    }

    /// Runs after `task` was persisted as completed or skipped.
    ///
    /// `checklist` holds every task of the owning entity, including `task`
    /// in its new state. Implementations must be idempotent.
    async fn on_task_complete(
        &self,
        task: &Task,
        checklist: &[Task],
    ) -> AdapterResult<Progression>;

    /// Runs after `task` was persisted as blocked.
    async fn on_task_block(&self, _task: &Task, _reason: &str) -> AdapterResult<()> {
        Ok(())
    }

    /// Projects the owning entity for task-list display.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::EntityNotFound`] when the entity no longer
    /// exists.
    async fn get_entity_context(&self, entity_id: &EntityId) -> AdapterResult<EntityContext>;

    /// Decides whether `workflow` may be instantiated for the entity.
    async fn can_assign_workflow(
        &self,
        entity_id: &EntityId,
        workflow: &WorkflowTemplate,
    ) -> AdapterResult<Permission>;

    /// Returns whether task creation must wait, e.g. while the entity is a
    /// draft.
    async fn defers_task_creation(&self, _entity_id: &EntityId) -> AdapterResult<bool> {
        Ok(false)
    }
}

/// Errors raised by entity adapters.
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    /// The owning entity does not exist.
    #[error("{0} was not found")]
    EntityNotFound(EntityRef),

    /// Rendering a display template failed.
    #[error("could not render {entity_type} context: {reason}")]
    Render {
        /// Entity type being rendered.
        entity_type: EntityType,
        /// Template engine message.
        reason: String,
    },

    /// The entity store failed.
    #[error("entity store error: {0}")]
    Store(Arc<dyn std::error::Error + Send + Sync>),
}

impl AdapterError {
    /// Wraps an entity store error.
    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Store(Arc::new(err))
    }
}
