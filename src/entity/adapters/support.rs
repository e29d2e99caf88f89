//! Plumbing shared by the entity adapters: record loading, context
//! rendering and timeline emission.

use crate::{
    entity::{
        domain::{EntityRecord, StatusChange},
        ports::EntityStore,
    },
    task::{
        domain::{
            ChecklistView, EntityContext, EntityId, EntityRef, Permission, ProfileId, Task,
            TaskEvent, TaskEventKind, WorkflowTemplate,
        },
        ports::{AdapterError, AdapterResult, Progression, TaskEventSink},
    },
};
use chrono::{DateTime, Utc};
use minijinja::Environment;
use mockable::Clock;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

/// Title and link templates used to project a record for task lists.
///
/// Templates are rendered with `minijinja`; every field of the record is
/// available by name, e.g. `{{ number }}` or `{{ status }}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextTemplates {
    title: String,
    url: String,
}

impl ContextTemplates {
    /// Creates a template pair.
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }

    /// Returns the title template.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the link template.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn render<E: EntityRecord>(&self, record: &E) -> AdapterResult<(String, String)> {
        let environment = Environment::new();
        let render = |template: &str| {
            environment
                .render_str(template, record)
                .map_err(|error| AdapterError::Render {
                    entity_type: E::ENTITY_TYPE,
                    reason: error.to_string(),
                })
        };
        Ok((render(&self.title)?, render(&self.url)?))
    }
}

/// Display fields an adapter adds on top of the rendered title and link.
#[derive(Debug, Default)]
pub(crate) struct ContextExtras {
    pub(crate) subtitle: Option<String>,
    pub(crate) priority: Option<String>,
    pub(crate) metadata: Map<String, Value>,
}

impl ContextExtras {
    pub(crate) fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub(crate) fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub(crate) fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_owned(), value.into());
        self
    }

    pub(crate) fn with_timestamp(self, key: &str, at: Option<DateTime<Utc>>) -> Self {
        let Some(timestamp) = at else {
            return self;
        };
        self.with_field(key, timestamp.to_rfc3339())
    }
}

/// Record access and side-effect helpers for one entity type.
pub(crate) struct AdapterCore<E: EntityRecord> {
    store: Arc<dyn EntityStore<E>>,
    events: Arc<dyn TaskEventSink>,
    clock: Arc<dyn Clock + Send + Sync>,
    templates: ContextTemplates,
}

impl<E: EntityRecord> AdapterCore<E> {
    pub(crate) fn new(
        store: Arc<dyn EntityStore<E>>,
        events: Arc<dyn TaskEventSink>,
        clock: Arc<dyn Clock + Send + Sync>,
        templates: ContextTemplates,
    ) -> Self {
        Self {
            store,
            events,
            clock,
            templates,
        }
    }

    pub(crate) fn set_templates(&mut self, templates: ContextTemplates) {
        self.templates = templates;
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    pub(crate) async fn load(&self, id: &EntityId) -> AdapterResult<E> {
        self.store
            .find(id)
            .await
            .map_err(AdapterError::store)?
            .ok_or_else(|| {
                AdapterError::EntityNotFound(EntityRef::new(E::ENTITY_TYPE, id.clone()))
            })
    }

    pub(crate) async fn save(&self, record: &E) -> AdapterResult<()> {
        self.store.save(record).await.map_err(AdapterError::store)
    }

    /// Rejects workflows scoped to another entity type and records that
    /// accept no further work.
    pub(crate) async fn assignment_permission(
        &self,
        id: &EntityId,
        workflow: &WorkflowTemplate,
    ) -> AdapterResult<Permission> {
        let record = self.load(id).await?;
        if let Some(scope) = workflow
            .entity_type()
            .filter(|scope| *scope != E::ENTITY_TYPE)
        {
            return Ok(Permission::deny(format!(
                "workflow \"{}\" is meant for {scope} records",
                workflow.name()
            )));
        }
        if record.is_terminal() {
            return Ok(Permission::deny(format!(
                "{} {} is already {}",
                E::ENTITY_TYPE,
                record.id(),
                record.status_label()
            )));
        }
        Ok(Permission::Allowed)
    }

    pub(crate) fn context(
        &self,
        record: &E,
        extras: ContextExtras,
    ) -> AdapterResult<EntityContext> {
        let (title, url) = self.templates.render(record)?;
        Ok(EntityContext {
            title,
            subtitle: extras.subtitle,
            status: record.status_label().to_owned(),
            url,
            priority: extras.priority,
            metadata: extras.metadata,
        })
    }

    pub(crate) fn status_changed(
        &self,
        record: &E,
        change: StatusChange,
        actor: Option<ProfileId>,
    ) {
        let entity = record.entity_ref();
        info!(
            entity = %entity,
            from = change.from,
            to = change.to,
            "entity status changed by task activity"
        );
        self.events.emit(
            TaskEvent::new(
                entity,
                TaskEventKind::EntityStatusChanged {
                    from: change.from.to_owned(),
                    to: change.to.to_owned(),
                },
                format!("Status changed from {} to {}", change.from, change.to),
                self.now(),
            )
            .with_actor(actor),
        );
    }

    pub(crate) fn tasks_completed(&self, record: &E, actor: Option<ProfileId>) {
        let entity = record.entity_ref();
        info!(entity = %entity, "all required tasks resolved");
        self.events.emit(
            TaskEvent::new(
                entity,
                TaskEventKind::EntityTasksCompleted,
                "All required tasks completed",
                self.now(),
            )
            .with_actor(actor),
        );
    }
}

/// Returns the waiting progression while required tasks remain open.
pub(crate) fn waiting_on(checklist: &[Task]) -> Option<Progression> {
    let view = ChecklistView::new(checklist);
    (!view.all_required_resolved()).then(|| Progression::Waiting {
        open_required: view.open_required(),
    })
}
