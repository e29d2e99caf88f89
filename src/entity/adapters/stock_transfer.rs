//! Entity adapter for stock transfers.

use super::support::{AdapterCore, ContextExtras, ContextTemplates, waiting_on};
use crate::{
    entity::{domain::StockTransfer, ports::EntityStore},
    task::{
        domain::{EntityContext, EntityId, EntityType, Permission, Task, WorkflowTemplate},
        ports::{AdapterResult, EntityAdapter, Progression, TaskEventSink},
    },
};
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;

const TITLE_TEMPLATE: &str = "Transfer {{ number }}: {{ from_location }} to {{ to_location }}";
const URL_TEMPLATE: &str = "/stock/transfers/{{ id }}";

/// Stock transfer rules: work starts once approved and dispatches the
/// transfer; resolving every required task books it in at the destination.
pub struct StockTransferAdapter {
    core: AdapterCore<StockTransfer>,
}

impl StockTransferAdapter {
    /// Creates the adapter with the default display templates.
    #[must_use]
    pub fn new(
        store: Arc<dyn EntityStore<StockTransfer>>,
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
impl EntityAdapter for StockTransferAdapter {
    fn entity_type(&self) -> EntityType {
        EntityType::StockTransfer
    }

    async fn can_start_task(&self, task: &Task) -> AdapterResult<Permission> {
        let transfer = self.core.load(task.owner().entity_id()).await?;
        if transfer.status().accepts_task_work() {
            return Ok(Permission::Allowed);
        }
        Ok(Permission::deny(format!(
            "transfer {} must be approved before work can start (currently {})",
            transfer.number(),
            transfer.status()
        )))
    }

    async fn on_task_start(&self, task: &Task) -> AdapterResult<()> {
        let mut transfer = self.core.load(task.owner().entity_id()).await?;
        if let Some(change) = transfer.dispatch() {
            self.core.save(&transfer).await?;
            self.core.status_changed(&transfer, change, task.assigned_to());
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
        let mut transfer = self.core.load(task.owner().entity_id()).await?;
        let Some(change) = transfer.receive(self.core.now()) else {
            return Ok(Progression::Unchanged);
        };
        self.core.save(&transfer).await?;
        self.core.status_changed(&transfer, change, task.completed_by());
        self.core.tasks_completed(&transfer, task.completed_by());
        Ok(Progression::Advanced)
    }

    async fn get_entity_context(&self, entity_id: &EntityId) -> AdapterResult<EntityContext> {
        let transfer = self.core.load(entity_id).await?;
        let extras = ContextExtras::default()
            .with_subtitle(format!(
                "{} to {}",
                transfer.from_location(),
                transfer.to_location()
            ))
            .with_field("number", transfer.number())
            .with_timestamp("received_at", transfer.received_at());
        self.core.context(&transfer, extras)
    }

    async fn can_assign_workflow(
        &self,
        entity_id: &EntityId,
        workflow: &WorkflowTemplate,
    ) -> AdapterResult<Permission> {
        self.core.assignment_permission(entity_id, workflow).await
    }
}
