//! Entity adapter for outbound stock issues.

use super::support::{AdapterCore, ContextExtras, ContextTemplates, waiting_on};
use crate::{
    entity::{domain::StockIssue, ports::EntityStore},
    task::{
        domain::{EntityContext, EntityId, EntityType, Permission, Task, WorkflowTemplate},
        ports::{AdapterResult, EntityAdapter, Progression, TaskEventSink},
    },
};
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;

const TITLE_TEMPLATE: &str = "Issue {{ number }} for {{ requested_for }}";
const URL_TEMPLATE: &str = "/stock/issues/{{ id }}";

/// Stock issue rules: work starts once approved and moves the issue into
/// `picking`; resolving every required task marks it `issued`.
pub struct StockIssueAdapter {
    core: AdapterCore<StockIssue>,
}

impl StockIssueAdapter {
    /// Creates the adapter with the default display templates.
    #[must_use]
    pub fn new(
        store: Arc<dyn EntityStore<StockIssue>>,
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
impl EntityAdapter for StockIssueAdapter {
    fn entity_type(&self) -> EntityType {
        EntityType::StockIssue
    }

    async fn can_start_task(&self, task: &Task) -> AdapterResult<Permission> {
        let issue = self.core.load(task.owner().entity_id()).await?;
        if issue.status().accepts_task_work() {
            return Ok(Permission::Allowed);
        }
        Ok(Permission::deny(format!(
            "issue {} must be approved before picking can start (currently {})",
            issue.number(),
            issue.status()
        )))
    }

    async fn on_task_start(&self, task: &Task) -> AdapterResult<()> {
        let mut issue = self.core.load(task.owner().entity_id()).await?;
        if let Some(change) = issue.begin_picking() {
            self.core.save(&issue).await?;
            self.core.status_changed(&issue, change, task.assigned_to());
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
        let mut issue = self.core.load(task.owner().entity_id()).await?;
        let Some(change) = issue.finish_picking(self.core.now()) else {
            return Ok(Progression::Unchanged);
        };
        self.core.save(&issue).await?;
        self.core.status_changed(&issue, change, task.completed_by());
        self.core.tasks_completed(&issue, task.completed_by());
        Ok(Progression::Advanced)
    }

    async fn get_entity_context(&self, entity_id: &EntityId) -> AdapterResult<EntityContext> {
        let issue = self.core.load(entity_id).await?;
        let extras = ContextExtras::default()
            .with_subtitle(issue.requested_for())
            .with_field("number", issue.number())
            .with_timestamp("issued_at", issue.issued_at());
        self.core.context(&issue, extras)
    }

    async fn can_assign_workflow(
        &self,
        entity_id: &EntityId,
        workflow: &WorkflowTemplate,
    ) -> AdapterResult<Permission> {
        self.core.assignment_permission(entity_id, workflow).await
    }
}
