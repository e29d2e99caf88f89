//! Entity adapter for customer service requests.

use super::support::{AdapterCore, ContextExtras, ContextTemplates, waiting_on};
use crate::{
    entity::{domain::ServiceRequest, ports::EntityStore},
    task::{
        domain::{EntityContext, EntityId, EntityType, Permission, Task, WorkflowTemplate},
        ports::{AdapterResult, EntityAdapter, Progression, TaskEventSink},
    },
};
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;

const TITLE_TEMPLATE: &str = "Request {{ number }}: {{ summary }}";
const URL_TEMPLATE: &str = "/service-requests/{{ id }}";

/// Service request rules: no work once declined or converted, and
/// resolving every required intake task marks the request `reviewed`.
pub struct ServiceRequestAdapter {
    core: AdapterCore<ServiceRequest>,
}

impl ServiceRequestAdapter {
    /// Creates the adapter with the default display templates.
    #[must_use]
    pub fn new(
        store: Arc<dyn EntityStore<ServiceRequest>>,
        events: Arc<dyn TaskEventSink>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            core: AdapterCore::new(
                store,
                events,
                clock,
                ContextTemplates::new(TITLE_TEMPLATE, URL_TEMPLATE),
            ),
        }
    }

    /// Replaces the display templates.
    #[must_use]
    pub fn with_templates(mut self, templates: ContextTemplates) -> Self {
        self.core.set_templates(templates);
        self
    }
}

#[async_trait]
impl EntityAdapter for ServiceRequestAdapter {
    fn entity_type(&self) -> EntityType {
        EntityType::ServiceRequest
    }

    async fn can_start_task(&self, task: &Task) -> AdapterResult<Permission> {
        let request = self.core.load(task.owner().entity_id()).await?;
        if request.status().is_terminal() {
            return Ok(Permission::deny(format!(
                "request {} was already {}",
                request.number(),
                request.status()
            )));
        }
        Ok(Permission::Allowed)
    }

    async fn on_task_complete(
        &self,
        task: &Task,
        checklist: &[Task],
    ) -> AdapterResult<Progression> {
        if let Some(waiting) = waiting_on(checklist) {
            return Ok(waiting);
        }
        let mut request = self.core.load(task.owner().entity_id()).await?;
        let Some(change) = request.mark_reviewed(self.core.now()) else {
            return Ok(Progression::Unchanged);
        };
        self.core.save(&request).await?;
        self.core.status_changed(&request, change, task.completed_by());
        self.core.tasks_completed(&request, task.completed_by());
        Ok(Progression::Advanced)
    }

    async fn get_entity_context(&self, entity_id: &EntityId) -> AdapterResult<EntityContext> {
        let request = self.core.load(entity_id).await?;
        let extras = ContextExtras::default()
            .with_subtitle(request.customer())
            .with_priority(request.priority().as_str())
            .with_field("number", request.number())
            .with_timestamp("reviewed_at", request.reviewed_at());
        self.core.context(&request, extras)
    }

    async fn can_assign_workflow(
        &self,
        entity_id: &EntityId,
        workflow: &WorkflowTemplate,
    ) -> AdapterResult<Permission> {
        self.core.assignment_permission(entity_id, workflow).await
    }
}
