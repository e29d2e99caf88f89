//! Entity adapter for inbound stock receipts.

use super::support::{AdapterCore, ContextExtras, ContextTemplates, waiting_on};
use crate::{
    entity::{
        domain::{StockReceipt, StockReceiptStatus},
        ports::EntityStore,
    },
    task::{
        domain::{EntityContext, EntityId, EntityType, Permission, Task, WorkflowTemplate},
        ports::{AdapterResult, EntityAdapter, Progression, TaskEventSink},
    },
};
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;
use tracing::debug;

const TITLE_TEMPLATE: &str = "Receipt {{ number }} from {{ supplier }}";
const URL_TEMPLATE: &str = "/stock/receipts/{{ id }}";

/// Stock receipt rules.
///
/// Checklists are not created while the receipt is a draft. Work may only
/// start once the receipt is approved; the first start moves it to
/// `receiving`, and resolving every required task books it as `received`.
pub struct StockReceiptAdapter {
    core: AdapterCore<StockReceipt>,
}

impl StockReceiptAdapter {
    /// Creates the adapter with the default display templates.
    #[must_use]
    pub fn new(
        store: Arc<dyn EntityStore<StockReceipt>>,
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
impl EntityAdapter for StockReceiptAdapter {
    fn entity_type(&self) -> EntityType {
        EntityType::StockReceipt
    }

    async fn can_start_task(&self, task: &Task) -> AdapterResult<Permission> {
        let receipt = self.core.load(task.owner().entity_id()).await?;
        if receipt.status().accepts_task_work() {
            return Ok(Permission::Allowed);
        }
        Ok(Permission::deny(format!(
            "receipt {} must be approved before receiving work can start (currently {})",
            receipt.number(),
            receipt.status()
        )))
    }

    async fn on_task_start(&self, task: &Task) -> AdapterResult<()> {
        let mut receipt = self.core.load(task.owner().entity_id()).await?;
        if let Some(change) = receipt.begin_receiving() {
            self.core.save(&receipt).await?;
            self.core.status_changed(&receipt, change, task.assigned_to());
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
        let mut receipt = self.core.load(task.owner().entity_id()).await?;
        let Some(change) = receipt.finish_receiving(self.core.now()) else {
            debug!(
                receipt = receipt.number(),
                status = %receipt.status(),
                "receipt not receiving; completion effect skipped"
            );
            return Ok(Progression::Unchanged);
        };
        self.core.save(&receipt).await?;
        self.core.status_changed(&receipt, change, task.completed_by());
        self.core.tasks_completed(&receipt, task.completed_by());
        Ok(Progression::Advanced)
    }

    async fn get_entity_context(&self, entity_id: &EntityId) -> AdapterResult<EntityContext> {
        let receipt = self.core.load(entity_id).await?;
        let extras = ContextExtras::default()
            .with_subtitle(receipt.supplier())
            .with_field("number", receipt.number())
            .with_timestamp("tasks_completed_at", receipt.tasks_completed_at());
        self.core.context(&receipt, extras)
    }

    async fn can_assign_workflow(
        &self,
        entity_id: &EntityId,
        workflow: &WorkflowTemplate,
    ) -> AdapterResult<Permission> {
        self.core.assignment_permission(entity_id, workflow).await
    }

    async fn defers_task_creation(&self, entity_id: &EntityId) -> AdapterResult<bool> {
        let receipt = self.core.load(entity_id).await?;
        Ok(receipt.status() == StockReceiptStatus::Draft)
    }
}
