//! Shared fixtures for task service tests.

use crate::{
    entity::{
        adapters::InMemoryEntities,
        domain::{StockReceipt, StockReceiptStatus, Ticket, TicketStatus},
    },
    task::{
        adapters::{
            events::RecordingEventSink,
            memory::{InMemoryAttachmentIndex, InMemoryTaskRepository, InMemoryWorkflowCatalog},
        },
        domain::{
            EntityId, EntityRef, EntityType, Task, TaskDefinition, TaskEventKind, WorkflowId,
            WorkflowTaskEntry, WorkflowTemplate,
        },
        ports::TaskEventSink,
        services::{EntityAdapterRegistry, TaskService},
    },
};
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use std::sync::{Arc, Mutex};

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub(crate) struct TestClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl TestClock {
    pub(crate) fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
            .single()
            .expect("fixed start time should be valid");
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub(crate) fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().expect("clock lock should not be poisoned");
        *now += by;
    }
}

impl Clock for TestClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock should not be poisoned")
    }
}

pub(crate) type TestService = TaskService<
    InMemoryTaskRepository,
    InMemoryWorkflowCatalog,
    InMemoryAttachmentIndex,
    TestClock,
>;

/// Service wired to in-memory collaborators and the standard adapters.
pub(crate) struct Harness {
    pub(crate) service: TestService,
    pub(crate) repository: Arc<InMemoryTaskRepository>,
    pub(crate) workflows: Arc<InMemoryWorkflowCatalog>,
    pub(crate) attachments: Arc<InMemoryAttachmentIndex>,
    pub(crate) entities: InMemoryEntities,
    pub(crate) events: RecordingEventSink,
    pub(crate) clock: Arc<TestClock>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        let entities = InMemoryEntities::new();
        let events = RecordingEventSink::new();
        let clock = Arc::new(TestClock::new());
        let sink: Arc<dyn TaskEventSink> = Arc::new(events.clone());
        let dyn_clock: Arc<dyn Clock + Send + Sync> = clock.clone();
        let registry = entities
            .stores()
            .registry(&sink, &dyn_clock)
            .expect("standard adapter set should register");
        Self::assemble(registry, entities, events, clock)
    }

    pub(crate) fn with_registry(registry: EntityAdapterRegistry) -> Self {
        Self::assemble(
            registry,
            InMemoryEntities::new(),
            RecordingEventSink::new(),
            Arc::new(TestClock::new()),
        )
    }

    fn assemble(
        registry: EntityAdapterRegistry,
        entities: InMemoryEntities,
        events: RecordingEventSink,
        clock: Arc<TestClock>,
    ) -> Self {
        let repository = Arc::new(InMemoryTaskRepository::new());
        let workflows = Arc::new(InMemoryWorkflowCatalog::new());
        let attachments = Arc::new(InMemoryAttachmentIndex::new());
        let service = TaskService::new(
            Arc::clone(&repository),
            Arc::clone(&workflows),
            Arc::clone(&attachments),
            Arc::new(registry),
            Arc::new(events.clone()),
            Arc::clone(&clock),
        );
        Self {
            service,
            repository,
            workflows,
            attachments,
            entities,
            events,
            clock,
        }
    }

    pub(crate) fn ticket(&self, status: TicketStatus) -> EntityRef {
        let id = EntityId::new(format!("ticket-{}", uuid::Uuid::new_v4()));
        let ticket = Ticket::new(id.clone(), "T-1001", "Cracked screen").with_status(status);
        self.entities
            .tickets
            .insert(ticket)
            .expect("ticket should be stored");
        EntityRef::new(EntityType::Ticket, id)
    }

    pub(crate) fn stored_ticket(&self, owner: &EntityRef) -> Ticket {
        self.entities
            .tickets
            .get(owner.entity_id())
            .expect("ticket store should be readable")
            .expect("ticket should exist")
    }

    pub(crate) fn stock_receipt(&self, status: StockReceiptStatus) -> EntityRef {
        let id = EntityId::new(format!("receipt-{}", uuid::Uuid::new_v4()));
        let receipt = StockReceipt::new(id.clone(), "GR-77", "Parts Direct").with_status(status);
        self.entities
            .stock_receipts
            .insert(receipt)
            .expect("receipt should be stored");
        EntityRef::new(EntityType::StockReceipt, id)
    }

    pub(crate) fn stored_receipt(&self, owner: &EntityRef) -> StockReceipt {
        self.entities
            .stock_receipts
            .get(owner.entity_id())
            .expect("receipt store should be readable")
            .expect("receipt should exist")
    }

    /// Instantiates `workflow` for `owner` and returns the tasks in order.
    pub(crate) async fn instantiate(&self, owner: &EntityRef, workflow: WorkflowId) -> Vec<Task> {
        self.service
            .create_tasks_from_workflow(owner, workflow, None)
            .await
            .expect("workflow should instantiate");
        self.service
            .get_entity_tasks(owner)
            .await
            .expect("checklist should load")
            .tasks
    }

    pub(crate) fn install(&self, template: WorkflowTemplate) -> WorkflowId {
        let id = template.id();
        self.workflows
            .insert(template)
            .expect("workflow should be stored");
        id
    }

    /// Installs a workflow with three required steps at orders 1, 2, 3.
    pub(crate) fn three_step_workflow(&self, strict: bool) -> WorkflowId {
        let template = WorkflowTemplate::new("Screen repair")
            .with_entry(WorkflowTaskEntry::new(TaskDefinition::new("Diagnose"), 1))
            .with_entry(WorkflowTaskEntry::new(TaskDefinition::new("Replace panel"), 2))
            .with_entry(WorkflowTaskEntry::new(TaskDefinition::new("Quality check"), 3));
        self.install(if strict { template.strict() } else { template })
    }

    pub(crate) fn count_events(&self, matches: impl Fn(&TaskEventKind) -> bool) -> usize {
        self.events
            .events()
            .iter()
            .filter(|event| matches(&event.kind))
            .count()
    }
}

pub(crate) const GOOD_NOTES: &str = "Replaced and tested OK";
