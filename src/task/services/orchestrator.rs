//! Task orchestration service.
//!
//! [`TaskService`] is the only writer of task rows. Every lifecycle call
//! follows the same shape: load the task, check the state machine guard and
//! the adapter preconditions, persist with an optimistic version check, emit
//! a timeline event and finally run the adapter hook.

use crate::task::{
    domain::{
        Completion, EntityChecklist, EntityContext, EntityRef, NewTask, Permission, ProfileId,
        Task, TaskAction, TaskEvent, TaskEventKind, TaskId, TaskProgress, TaskWithContext,
        Transition, WorkflowId, WorkflowOrigin, WorkflowTemplate,
    },
    ports::{
        AdapterError, AttachmentCounter, EntityAdapter, Progression, TaskEventSink,
        TaskRepository, TaskRepositoryError, WorkflowTemplateReader,
    },
    services::{
        BulkCompletionItem, BulkItemOutcome, BulkReport, CreateTaskRequest, EntityAdapterRegistry,
        LifecycleHook, TaskFilter, TaskServiceConfig, TaskServiceError, TaskServiceResult,
    },
};
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of a version-checked write.
enum Persisted {
    /// This call's change was written.
    Written(Task),
    /// A concurrent writer already moved the task into the requested state.
    AlreadyApplied(Task),
}

/// Entity-agnostic task orchestrator.
#[derive(Clone)]
pub struct TaskService<R, W, A, C>
where
    R: TaskRepository,
    W: WorkflowTemplateReader,
    A: AttachmentCounter,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    workflows: Arc<W>,
    attachments: Arc<A>,
    adapters: Arc<EntityAdapterRegistry>,
    events: Arc<dyn TaskEventSink>,
    clock: Arc<C>,
    config: TaskServiceConfig,
}

impl<R, W, A, C> TaskService<R, W, A, C>
where
    R: TaskRepository,
    W: WorkflowTemplateReader,
    A: AttachmentCounter,
    C: Clock + Send + Sync,
{
    /// Creates a task service with the default configuration.
    #[must_use]
    pub fn new(
        repository: Arc<R>,
        workflows: Arc<W>,
        attachments: Arc<A>,
        adapters: Arc<EntityAdapterRegistry>,
        events: Arc<dyn TaskEventSink>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            repository,
            workflows,
            attachments,
            adapters,
            events,
            clock,
            config: TaskServiceConfig::default(),
        }
    }

    /// Replaces the service configuration.
    #[must_use]
    pub fn with_config(mut self, config: TaskServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &TaskServiceConfig {
        &self.config
    }

    /// Instantiates one pending task per entry of a workflow template.
    ///
    /// Returns the number of tasks created. Zero is returned without error
    /// when the adapter defers task creation (for example while the entity
    /// is a draft) or when the workflow was already instantiated for the
    /// entity.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::WorkflowNotFound`],
    /// [`TaskServiceError::WorkflowInactive`],
    /// [`TaskServiceError::WorkflowEmpty`],
    /// [`TaskServiceError::WorkflowInvalid`],
    /// [`TaskServiceError::CannotAssign`] or
    /// [`TaskServiceError::EntityNotFound`] when the workflow cannot be
    /// attached, and infrastructure errors from the collaborators.
    pub async fn create_tasks_from_workflow(
        &self,
        owner: &EntityRef,
        workflow_id: WorkflowId,
        actor: Option<ProfileId>,
    ) -> TaskServiceResult<usize> {
        let adapter = self.adapter_for(owner)?;
        let template = self.load_template(workflow_id).await?;

        let permission = adapter
            .can_assign_workflow(owner.entity_id(), &template)
            .await?;
        if let Permission::Denied(reason) = permission {
            warn!(
                entity = %owner,
                workflow_id = %workflow_id,
                reason = %reason,
                "workflow assignment refused"
            );
            return Err(TaskServiceError::CannotAssign {
                entity: owner.clone(),
                workflow_id,
                reason,
            });
        }

        if adapter.defers_task_creation(owner.entity_id()).await? {
            info!(
                entity = %owner,
                workflow_id = %workflow_id,
                "task creation deferred by entity state"
            );
            return Ok(0);
        }

        let existing = self.repository.find_by_entity(owner).await?;
        if existing
            .iter()
            .any(|task| task.workflow_id() == Some(workflow_id))
        {
            info!(
                entity = %owner,
                workflow_id = %workflow_id,
                "workflow already instantiated for entity"
            );
            return Ok(0);
        }

        let now = self.clock.utc();
        let tasks: Vec<Task> = template
            .ordered_entries()
            .into_iter()
            .map(|entry| {
                Task::new(
                    NewTask {
                        owner: owner.clone(),
                        origin: Some(WorkflowOrigin {
                            workflow_id,
                            workflow_task_id: entry.id,
                        }),
                        task_definition_id: entry.definition.id(),
                        name: entry.effective_name().to_owned(),
                        description: entry.effective_description().map(str::to_owned),
                        requirements: entry.definition.requirements(),
                        sequence_order: entry.sequence_order,
                        is_required: entry.is_required,
                        assigned_to: None,
                        due_date: entry
                            .due_after_minutes
                            .and_then(|minutes| due_after(now, minutes)),
                    },
                    &*self.clock,
                )
            })
            .collect();

        self.repository.store_all(&tasks).await?;

        let count = tasks.len();
        info!(
            entity = %owner,
            workflow_id = %workflow_id,
            count,
            "tasks created from workflow"
        );
        self.events.emit(
            TaskEvent::new(
                owner.clone(),
                TaskEventKind::TasksCreated {
                    workflow_id: Some(workflow_id),
                    count,
                },
                format!("Workflow \"{}\" added {count} tasks", template.name()),
                now,
            )
            .with_actor(actor),
        );
        Ok(count)
    }

    /// Creates a single ad-hoc task outside any workflow.
    ///
    /// The task is placed after the entity's highest existing ad-hoc task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::EntityNotFound`] when the owning entity
    /// does not exist, [`TaskServiceError::AdapterNotFound`] for an
    /// unregistered entity type, and repository errors.
    pub async fn create_task(
        &self,
        request: CreateTaskRequest,
        actor: Option<ProfileId>,
    ) -> TaskServiceResult<Task> {
        let CreateTaskRequest {
            owner,
            definition,
            is_required,
            assigned_to,
            due_date,
        } = request;

        let adapter = self.adapter_for(&owner)?;
        adapter.get_entity_context(owner.entity_id()).await?;

        let existing = self.repository.find_by_entity(&owner).await?;
        let sequence_order = existing
            .iter()
            .filter(|task| task.origin().is_none())
            .map(Task::sequence_order)
            .max()
            .map_or(1, |highest| highest.saturating_add(1));

        let task = Task::new(
            NewTask {
                owner,
                origin: None,
                task_definition_id: definition.id(),
                name: definition.name().to_owned(),
                description: definition.description().map(str::to_owned),
                requirements: definition.requirements(),
                sequence_order,
                is_required,
                assigned_to,
                due_date,
            },
            &*self.clock,
        );
        self.repository.store(&task).await?;

        log_transition(&task, "ad-hoc task created");
        self.emit(
            &task,
            actor,
            TaskEventKind::TasksCreated {
                workflow_id: None,
                count: 1,
            },
            format!("Task \"{}\" added", task.name()),
        );
        Ok(task)
    }

    /// Moves a pending task into progress.
    ///
    /// Starting a task that is already in progress returns it unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`], state machine errors,
    /// [`TaskServiceError::PreconditionFailed`] when the adapter refuses,
    /// [`TaskServiceError::SequenceNotSatisfied`] under a strict workflow,
    /// and [`TaskServiceError::HookFailed`] when the start side effect fails
    /// after the task was saved.
    pub async fn start_task(
        &self,
        task_id: TaskId,
        actor: Option<ProfileId>,
    ) -> TaskServiceResult<Task> {
        let mut task = self.load(task_id).await?;
        if task.is_in_target_state(TaskAction::Start) {
            debug!(task_id = %task_id, "task already in progress");
            return Ok(task);
        }
        task.ensure_can(TaskAction::Start)?;

        let adapter = self.adapter_for(task.owner())?;
        if let Permission::Denied(reason) = adapter.can_start_task(&task).await? {
            warn!(
                task_id = %task_id,
                entity = %task.owner(),
                reason = %reason,
                "task start refused by entity"
            );
            return Err(TaskServiceError::PreconditionFailed { task_id, reason });
        }
        self.ensure_sequence(&task).await?;

        let expected = task.version();
        task.start(&*self.clock)?;
        let started = match self
            .persist(task, expected, |current| {
                current.is_in_target_state(TaskAction::Start)
            })
            .await?
        {
            Persisted::Written(written) => written,
            Persisted::AlreadyApplied(current) => return Ok(current),
        };

        log_transition(&started, "task started");
        self.emit(
            &started,
            actor,
            TaskEventKind::TaskStarted { task_id },
            format!("Task \"{}\" started", started.name()),
        );

        if let Err(source) = adapter.on_task_start(&started).await {
            return Err(hook_failed(started, LifecycleHook::Start, source));
        }
        Ok(started)
    }

    /// Completes an in-progress task and lets the adapter advance the entity.
    ///
    /// Completing a task that is already completed returns it unchanged and
    /// does not run the completion hook again.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`], state machine and
    /// completion validation errors, and [`TaskServiceError::HookFailed`]
    /// when the completion side effect fails after the task was saved.
    pub async fn complete_task(
        &self,
        task_id: TaskId,
        actor: Option<ProfileId>,
        notes: &str,
    ) -> TaskServiceResult<Task> {
        let mut task = self.load(task_id).await?;
        if task.is_in_target_state(TaskAction::Complete) {
            debug!(task_id = %task_id, "task already completed");
            return Ok(task);
        }
        task.ensure_can(TaskAction::Complete)?;
        let adapter = self.adapter_for(task.owner())?;

        let attachment_count = if task.requirements().requires_photo {
            self.attachments.count_for_task(task_id).await?
        } else {
            0
        };

        let expected = task.version();
        task.complete(
            Completion {
                notes,
                actor,
                attachment_count,
                min_notes_len: self.config.min_completion_notes_len,
            },
            &*self.clock,
        )?;
        let completed = match self
            .persist(task, expected, |current| {
                current.is_in_target_state(TaskAction::Complete)
            })
            .await?
        {
            Persisted::Written(written) => written,
            Persisted::AlreadyApplied(current) => return Ok(current),
        };

        log_transition(&completed, "task completed");
        self.emit(
            &completed,
            actor,
            TaskEventKind::TaskCompleted {
                task_id,
                notes: completed.completion_notes().unwrap_or_default().to_owned(),
            },
            format!("Task \"{}\" completed", completed.name()),
        );

        self.run_completion_hook(adapter.as_ref(), completed).await
    }

    /// Completes several tasks independently.
    ///
    /// Each item succeeds or fails on its own; the report lists every
    /// outcome in request order.
    pub async fn complete_tasks(
        &self,
        items: Vec<BulkCompletionItem>,
        actor: Option<ProfileId>,
    ) -> BulkReport {
        let mut report = BulkReport::default();
        for BulkCompletionItem { task_id, notes } in items {
            let result = self.complete_task(task_id, actor, &notes).await;
            if let Err(err) = &result {
                warn!(task_id = %task_id, error = %err, "bulk completion item failed");
            }
            report.items.push(BulkItemOutcome { task_id, result });
        }
        info!(
            total = report.items.len(),
            failed = report.failed().count(),
            "bulk completion processed"
        );
        report
    }

    /// Blocks an in-progress task with a reason.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`], state machine errors,
    /// [`TaskServiceError::Conflict`] on a concurrent write, and
    /// [`TaskServiceError::HookFailed`] when the block side effect fails
    /// after the task was saved.
    pub async fn block_task(
        &self,
        task_id: TaskId,
        actor: Option<ProfileId>,
        reason: &str,
    ) -> TaskServiceResult<Task> {
        let mut task = self.load(task_id).await?;
        let adapter = self.adapter_for(task.owner())?;

        let expected = task.version();
        task.block(reason, &*self.clock)?;
        let blocked = self.persist_exclusive(task, expected).await?;

        let recorded_reason = blocked.blocked_reason().unwrap_or_default().to_owned();
        log_transition(&blocked, "task blocked");
        self.emit(
            &blocked,
            actor,
            TaskEventKind::TaskBlocked {
                task_id,
                reason: recorded_reason.clone(),
            },
            format!("Task \"{}\" blocked: {recorded_reason}", blocked.name()),
        );

        if let Err(source) = adapter.on_task_block(&blocked, &recorded_reason).await {
            return Err(hook_failed(blocked, LifecycleHook::Block, source));
        }
        Ok(blocked)
    }

    /// Releases a blocked task back to pending.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`], a
    /// [`crate::task::domain::TaskDomainError::NotBlocked`] domain error when
    /// the task is not blocked, and [`TaskServiceError::Conflict`] on a
    /// concurrent write.
    pub async fn unblock_task(&self, task_id: TaskId) -> TaskServiceResult<Task> {
        let mut task = self.load(task_id).await?;
        let expected = task.version();
        task.unblock(&*self.clock)?;
        let released = self.persist_exclusive(task, expected).await?;

        log_transition(&released, "task unblocked");
        self.emit(
            &released,
            None,
            TaskEventKind::TaskUnblocked { task_id },
            format!("Task \"{}\" unblocked", released.name()),
        );
        Ok(released)
    }

    /// Skips a pending optional task.
    ///
    /// A skip resolves the task for auto-progression, so the adapter's
    /// completion hook runs afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`], a
    /// [`crate::task::domain::TaskDomainError::TaskIsRequired`] domain error
    /// for required tasks, other state machine errors, and
    /// [`TaskServiceError::HookFailed`] when the completion side effect
    /// fails after the task was saved.
    pub async fn skip_task(&self, task_id: TaskId) -> TaskServiceResult<Task> {
        let mut task = self.load(task_id).await?;
        let adapter = self.adapter_for(task.owner())?;

        let expected = task.version();
        if task.skip(&*self.clock)? == Transition::Unchanged {
            debug!(task_id = %task_id, "task already skipped");
            return Ok(task);
        }
        let skipped = match self
            .persist(task, expected, |current| {
                current.is_in_target_state(TaskAction::Skip)
            })
            .await?
        {
            Persisted::Written(written) => written,
            Persisted::AlreadyApplied(current) => return Ok(current),
        };

        log_transition(&skipped, "task skipped");
        self.emit(
            &skipped,
            None,
            TaskEventKind::TaskSkipped { task_id },
            format!("Task \"{}\" skipped", skipped.name()),
        );

        self.run_completion_hook(adapter.as_ref(), skipped).await
    }

    /// Changes the assignee of a task in any status.
    ///
    /// Permission checks happen upstream; this records the change and emits
    /// an audit event.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`] and
    /// [`TaskServiceError::Conflict`] on a concurrent write.
    pub async fn reassign_task(
        &self,
        task_id: TaskId,
        assignee: Option<ProfileId>,
        reason: Option<String>,
        actor: Option<ProfileId>,
    ) -> TaskServiceResult<Task> {
        let mut task = self.load(task_id).await?;
        let expected = task.version();
        let previous = task.reassign(assignee, &*self.clock);
        let reassigned = match self
            .persist(task, expected, |current| current.assigned_to() == assignee)
            .await?
        {
            Persisted::Written(written) => written,
            Persisted::AlreadyApplied(current) => return Ok(current),
        };

        info!(
            task_id = %task_id,
            entity = %reassigned.owner(),
            from = ?previous,
            to = ?assignee,
            "task reassigned"
        );
        let summary = reason.as_deref().map_or_else(
            || format!("Task \"{}\" reassigned", reassigned.name()),
            |why| format!("Task \"{}\" reassigned: {why}", reassigned.name()),
        );
        self.emit(
            &reassigned,
            actor,
            TaskEventKind::TaskReassigned {
                task_id,
                from: previous,
                to: assignee,
                reason,
            },
            summary,
        );
        Ok(reassigned)
    }

    /// Appends a working note to a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`], a domain error for
    /// terminal tasks or blank notes, and [`TaskServiceError::Conflict`] on
    /// a concurrent write.
    pub async fn add_task_note(
        &self,
        task_id: TaskId,
        actor: Option<ProfileId>,
        note: &str,
    ) -> TaskServiceResult<Task> {
        let mut task = self.load(task_id).await?;
        let expected = task.version();
        task.add_note(note, &*self.clock)?;
        let annotated = self.persist_exclusive(task, expected).await?;

        debug!(task_id = %task_id, "task note added");
        self.emit(
            &annotated,
            actor,
            TaskEventKind::TaskNoteAdded { task_id },
            format!("Note added to task \"{}\"", annotated.name()),
        );
        Ok(annotated)
    }

    /// Lists tasks matching `filter`, each enriched with its entity context.
    ///
    /// Results are ordered by due date (tasks without one last) and then by
    /// sequence order. Tasks whose entity no longer exists are returned
    /// without context.
    ///
    /// # Errors
    ///
    /// Returns repository errors, [`TaskServiceError::AdapterNotFound`] for
    /// an unregistered entity type and adapter failures other than a missing
    /// entity.
    pub async fn list_tasks(
        &self,
        filter: &TaskFilter,
    ) -> TaskServiceResult<Vec<TaskWithContext>> {
        let query = filter.to_query(self.clock.utc(), &self.config.default_statuses);
        let mut tasks = self.repository.query(&query).await?;
        tasks.sort_by_key(|task| {
            (
                task.due_date().is_none(),
                task.due_date(),
                task.sequence_order(),
                task.created_at(),
            )
        });

        let mut contexts: HashMap<EntityRef, Option<EntityContext>> = HashMap::new();
        let mut listed = Vec::with_capacity(tasks.len());
        for task in tasks {
            if !contexts.contains_key(task.owner()) {
                let resolved = self.resolve_context(task.owner()).await?;
                contexts.insert(task.owner().clone(), resolved);
            }
            let context = contexts.get(task.owner()).cloned().flatten();
            listed.push(TaskWithContext { task, context });
        }
        Ok(listed)
    }

    /// Returns the full checklist of one entity with aggregate progress.
    ///
    /// # Errors
    ///
    /// Returns repository errors.
    pub async fn get_entity_tasks(&self, owner: &EntityRef) -> TaskServiceResult<EntityChecklist> {
        let tasks = self.repository.find_by_entity(owner).await?;
        let progress = TaskProgress::from_tasks(&tasks);
        Ok(EntityChecklist {
            owner: owner.clone(),
            tasks,
            progress,
        })
    }

    async fn load(&self, task_id: TaskId) -> TaskServiceResult<Task> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(task_id))
    }

    async fn load_template(&self, workflow_id: WorkflowId) -> TaskServiceResult<WorkflowTemplate> {
        let template = self
            .workflows
            .find_by_id(workflow_id)
            .await?
            .ok_or(TaskServiceError::WorkflowNotFound(workflow_id))?;
        if !template.is_active() {
            return Err(TaskServiceError::WorkflowInactive {
                workflow_id,
                name: template.name().to_owned(),
            });
        }
        if template.is_empty() {
            return Err(TaskServiceError::WorkflowEmpty {
                workflow_id,
                name: template.name().to_owned(),
            });
        }
        if let Some(duplicate_order) = template.duplicate_order() {
            warn!(
                workflow_id = %workflow_id,
                duplicate_order,
                "workflow template reuses a sequence order"
            );
            return Err(TaskServiceError::WorkflowInvalid {
                workflow_id,
                name: template.name().to_owned(),
                duplicate_order,
            });
        }
        Ok(template)
    }

    fn adapter_for(&self, owner: &EntityRef) -> TaskServiceResult<Arc<dyn EntityAdapter>> {
        let entity_type = owner.entity_type();
        self.adapters.get(entity_type).map(Arc::clone).map_err(|_| {
            error!(
                entity_type = %entity_type,
                entity_id = %owner.entity_id(),
                "no entity adapter registered; check service bootstrap"
            );
            TaskServiceError::AdapterNotFound(entity_type)
        })
    }

    /// Requires every earlier required sibling of a strict workflow to be
    /// resolved.
    async fn ensure_sequence(&self, task: &Task) -> TaskServiceResult<()> {
        let Some(workflow_id) = task.workflow_id() else {
            return Ok(());
        };
        let template = self.workflows.find_by_id(workflow_id).await?;
        let strict = template.as_ref().map_or_else(
            || {
                warn!(
                    task_id = %task.id(),
                    workflow_id = %workflow_id,
                    "workflow template missing; ordering not enforced"
                );
                false
            },
            WorkflowTemplate::strict_sequence,
        );
        if !strict {
            return Ok(());
        }

        let siblings = self.repository.find_by_entity(task.owner()).await?;
        let waiting_on: Vec<&str> = siblings
            .iter()
            .filter(|sibling| {
                task.is_sibling_of(sibling)
                    && sibling.is_required()
                    && sibling.sequence_order() < task.sequence_order()
                    && !sibling.status().is_resolved()
            })
            .map(Task::name)
            .collect();

        if waiting_on.is_empty() {
            Ok(())
        } else {
            warn!(
                task_id = %task.id(),
                waiting_on = waiting_on.len(),
                "task start refused by strict sequence"
            );
            Err(TaskServiceError::SequenceNotSatisfied {
                task_id: task.id(),
                waiting_on: waiting_on.join(", "),
            })
        }
    }

    /// Writes `task` if nobody else changed it since `expected_version`.
    ///
    /// On a version conflict the task is reloaded; when `reached` holds for
    /// the stored task, a concurrent caller already did the same work.
    async fn persist(
        &self,
        task: Task,
        expected_version: u64,
        reached: impl Fn(&Task) -> bool + Send,
    ) -> TaskServiceResult<Persisted> {
        match self.repository.update(&task, expected_version).await {
            Ok(()) => Ok(Persisted::Written(task)),
            Err(TaskRepositoryError::VersionConflict { task_id, .. }) => {
                let current = self.load(task_id).await?;
                if reached(&current) {
                    debug!(task_id = %task_id, "concurrent write already applied the change");
                    Ok(Persisted::AlreadyApplied(current))
                } else {
                    warn!(task_id = %task_id, "task changed concurrently");
                    Err(TaskServiceError::Conflict(task_id))
                }
            }
            Err(TaskRepositoryError::NotFound(task_id)) => {
                Err(TaskServiceError::TaskNotFound(task_id))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Writes a change that has no idempotent target state.
    async fn persist_exclusive(&self, task: Task, expected_version: u64) -> TaskServiceResult<Task> {
        match self.persist(task, expected_version, |_| false).await? {
            Persisted::Written(written) | Persisted::AlreadyApplied(written) => Ok(written),
        }
    }

    async fn run_completion_hook(
        &self,
        adapter: &dyn EntityAdapter,
        task: Task,
    ) -> TaskServiceResult<Task> {
        let checklist = self.repository.find_by_entity(task.owner()).await?;
        match adapter.on_task_complete(&task, &checklist).await {
            Ok(Progression::Advanced) => {
                info!(
                    task_id = %task.id(),
                    entity = %task.owner(),
                    "entity advanced after required tasks resolved"
                );
                Ok(task)
            }
            Ok(Progression::Waiting { open_required }) => {
                debug!(task_id = %task.id(), open_required, "entity waiting on required tasks");
                Ok(task)
            }
            Ok(Progression::Unchanged) => Ok(task),
            Err(source) => Err(hook_failed(task, LifecycleHook::Complete, source)),
        }
    }

    async fn resolve_context(&self, owner: &EntityRef) -> TaskServiceResult<Option<EntityContext>> {
        let adapter = self.adapter_for(owner)?;
        match adapter.get_entity_context(owner.entity_id()).await {
            Ok(context) => Ok(Some(context)),
            Err(AdapterError::EntityNotFound(missing)) => {
                warn!(entity = %missing, "task listed without context; entity not found");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn emit(&self, task: &Task, actor: Option<ProfileId>, kind: TaskEventKind, summary: String) {
        self.events.emit(
            TaskEvent::new(task.owner().clone(), kind, summary, task.updated_at()).with_actor(actor),
        );
    }
}

fn due_after(now: DateTime<Utc>, minutes: u32) -> Option<DateTime<Utc>> {
    now.checked_add_signed(TimeDelta::minutes(i64::from(minutes)))
}

fn log_transition(task: &Task, message: &'static str) {
    info!(
        task_id = %task.id(),
        entity_type = %task.owner().entity_type(),
        entity_id = %task.owner().entity_id(),
        status = %task.status(),
        "{message}"
    );
}

fn hook_failed(task: Task, hook: LifecycleHook, source: AdapterError) -> TaskServiceError {
    error!(
        task_id = %task.id(),
        entity = %task.owner(),
        status = %task.status(),
        hook = %hook,
        error = %source,
        "entity side effect failed after task change was saved"
    );
    TaskServiceError::HookFailed {
        task: Box::new(task),
        hook,
        source,
    }
}
