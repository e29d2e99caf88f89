//! Shared world state for repair ticket checklist BDD scenarios.

use std::sync::Arc;

use checklist::{
    entity::adapters::InMemoryEntities,
    task::{
        adapters::{
            events::RecordingEventSink,
            memory::{InMemoryAttachmentIndex, InMemoryTaskRepository, InMemoryWorkflowCatalog},
        },
        domain::{EntityRef, TaskId, WorkflowId},
        ports::TaskEventSink,
        services::{TaskService, TaskServiceError},
    },
};
use mockable::{Clock, DefaultClock};
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestTaskService = TaskService<
    InMemoryTaskRepository,
    InMemoryWorkflowCatalog,
    InMemoryAttachmentIndex,
    DefaultClock,
>;

/// Scenario world for checklist behaviour tests.
pub struct ChecklistWorld {
    pub service: TestTaskService,
    pub workflows: Arc<InMemoryWorkflowCatalog>,
    pub entities: InMemoryEntities,
    pub events: RecordingEventSink,
    pub ticket: Option<EntityRef>,
    pub workflow: Option<WorkflowId>,
    pub tasks: Vec<TaskId>,
    pub last_result: Option<Result<(), TaskServiceError>>,
}

impl ChecklistWorld {
    /// Creates a world backed by in-memory stores and the standard adapters.
    ///
    /// # Panics
    ///
    /// Panics if the standard adapter set fails to register.
    #[must_use]
    pub fn new() -> Self {
        let entities = InMemoryEntities::new();
        let events = RecordingEventSink::new();
        let sink: Arc<dyn TaskEventSink> = Arc::new(events.clone());
        let clock: Arc<dyn Clock + Send + Sync> = Arc::new(DefaultClock);
        let registry = entities
            .stores()
            .registry(&sink, &clock)
            .expect("standard adapters should register");
        let workflows = Arc::new(InMemoryWorkflowCatalog::new());
        let service = TaskService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::clone(&workflows),
            Arc::new(InMemoryAttachmentIndex::new()),
            Arc::new(registry),
            sink,
            Arc::new(DefaultClock),
        );

        Self {
            service,
            workflows,
            entities,
            events,
            ticket: None,
            workflow: None,
            tasks: Vec::new(),
            last_result: None,
        }
    }

    /// Returns the scenario ticket.
    pub fn ticket(&self) -> Result<&EntityRef, eyre::Report> {
        self.ticket
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing ticket in scenario world"))
    }

    /// Returns the task at a one-based checklist position.
    pub fn task_at(&self, position: usize) -> Result<TaskId, eyre::Report> {
        position
            .checked_sub(1)
            .and_then(|index| self.tasks.get(index))
            .copied()
            .ok_or_else(|| eyre::eyre!("no task at position {position}"))
    }

    /// Returns the error recorded by the last `When` step.
    pub fn last_error(&self) -> Result<&TaskServiceError, eyre::Report> {
        match self.last_result.as_ref() {
            Some(Err(err)) => Ok(err),
            Some(Ok(())) => Err(eyre::eyre!("expected the last operation to fail")),
            None => Err(eyre::eyre!("no operation was attempted")),
        }
    }
}

impl Default for ChecklistWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ChecklistWorld {
    ChecklistWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
