//! Entity adapter for repair tickets.

use super::support::{AdapterCore, ContextExtras, ContextTemplates, waiting_on};
use crate::{
    entity::{domain::Ticket, ports::EntityStore},
    task::{
        domain::{EntityContext, EntityId, EntityType, Permission, Task, WorkflowTemplate},
        ports::{AdapterResult, EntityAdapter, Progression, TaskEventSink},
    },
};
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;

const TITLE_TEMPLATE: &str = "Ticket {{ number }}: {{ subject }}";
const URL_TEMPLATE: &str = "/tickets/{{ id }}";

/// Ticket rules: no work on closed or cancelled tickets, the first task
/// start puts a pending ticket in progress, and resolving every required
/// task stamps `tasks_completed_at` once.
pub struct TicketAdapter {
    core: AdapterCore<Ticket>,
}

impl TicketAdapter {
    /// Creates the adapter with the default display templates.
    #[must_use]
    pub fn new(
        store: Arc<dyn EntityStore<Ticket>>,
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
impl EntityAdapter for TicketAdapter {
    fn entity_type(&self) -> EntityType {
        EntityType::Ticket
    }

    async fn can_start_task(&self, task: &Task) -> AdapterResult<Permission> {
        let ticket = self.core.load(task.owner().entity_id()).await?;
        if ticket.status().is_terminal() {
            return Ok(Permission::deny(format!(
                "ticket {} is {}; no further work can start",
                ticket.number(),
                ticket.status()
            )));
        }
        Ok(Permission::Allowed)
    }

    async fn on_task_start(&self, task: &Task) -> AdapterResult<()> {
        let mut ticket = self.core.load(task.owner().entity_id()).await?;
        if let Some(change) = ticket.begin_work() {
            self.core.save(&ticket).await?;
            self.core.status_changed(&ticket, change, task.assigned_to());
        }
        Ok(())
    }

    async fn on_task_complete(
        &self,
        task: &Task,
        checklist: &[Task],
    ) -> AdapterResult<Progression> {
        if let Some(waiting) = waiting_on(checklist) {
            return Ok(waiting);
        }
        let mut ticket = self.core.load(task.owner().entity_id()).await?;
        if !ticket.mark_tasks_completed(self.core.now()) {
            return Ok(Progression::Unchanged);
        }
        self.core.save(&ticket).await?;
        self.core.tasks_completed(&ticket, task.completed_by());
        Ok(Progression::Advanced)
    }

    async fn get_entity_context(&self, entity_id: &EntityId) -> AdapterResult<EntityContext> {
        let ticket = self.core.load(entity_id).await?;
        let mut extras = ContextExtras::default()
            .with_priority(ticket.priority().as_str())
            .with_field("number", ticket.number())
            .with_timestamp("tasks_completed_at", ticket.tasks_completed_at());
        if let Some(customer) = ticket.customer() {
            extras = extras.with_subtitle(customer);
        }
        self.core.context(&ticket, extras)
    }

    async fn can_assign_workflow(
        &self,
        entity_id: &EntityId,
        workflow: &WorkflowTemplate,
    ) -> AdapterResult<Permission> {
        self.core.assignment_permission(entity_id, workflow).await
    }
}
