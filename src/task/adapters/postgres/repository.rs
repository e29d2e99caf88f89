//! `PostgreSQL` repository implementation for task storage.

use super::{models::TaskRow, schema::tasks};
use crate::task::{
    domain::{
        EntityId, EntityRef, EntityType, PersistedTaskData, ProfileId, Task, TaskDefinitionId,
        TaskId, TaskRequirements, TaskStatus, WorkflowId, WorkflowOrigin, WorkflowTaskId,
    },
    ports::{AssigneeFilter, TaskQuery, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let owner = task.owner().clone();
        let row = to_row(task)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| map_insert_error(err, task_id, owner))?;
            Ok(())
        })
        .await
    }

    async fn store_all(&self, batch: &[Task]) -> TaskRepositoryResult<()> {
        let Some((first_id, owner)) = batch.first().map(|task| (task.id(), task.owner().clone()))
        else {
            return Ok(());
        };
        let rows = batch.iter().map(to_row).collect::<TaskRepositoryResult<Vec<_>>>()?;

        self.run_blocking(move |connection| {
            connection
                .transaction(|tx| {
                    diesel::insert_into(tasks::table)
                        .values(&rows)
                        .execute(tx)
                })
                .map_err(|err| map_insert_error(err, first_id, owner))?;
            Ok(())
        })
        .await
    }

    async fn update(&self, task: &Task, expected_version: u64) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let row = to_row(task)?;
        let expected = i64::try_from(expected_version).map_err(TaskRepositoryError::persistence)?;

        self.run_blocking(move |connection| {
            // Compare-and-set on the version column; zero rows means either a
            // concurrent writer won or the row is gone.
            let affected = diesel::update(
                tasks::table
                    .filter(tasks::id.eq(task_id.into_inner()))
                    .filter(tasks::version.eq(expected)),
            )
            .set(&row)
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;

            if affected > 0 {
                return Ok(());
            }

            let still_exists = diesel::select(exists(
                tasks::table.filter(tasks::id.eq(task_id.into_inner())),
            ))
            .get_result::<bool>(connection)
            .map_err(TaskRepositoryError::persistence)?;

            if still_exists {
                Err(TaskRepositoryError::VersionConflict {
                    task_id,
                    expected: expected_version,
                })
            } else {
                Err(TaskRepositoryError::NotFound(task_id))
            }
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_by_entity(&self, owner: &EntityRef) -> TaskRepositoryResult<Vec<Task>> {
        let entity_type = owner.entity_type().as_str();
        let entity_id = owner.entity_id().as_str().to_owned();

        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::entity_type.eq(entity_type))
                .filter(tasks::entity_id.eq(entity_id))
                .order(tasks::sequence_order.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn query(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>> {
        let filter = query.clone();

        self.run_blocking(move |connection| {
            let mut statement = tasks::table.into_boxed();

            match filter.assignee {
                AssigneeFilter::Any => {}
                AssigneeFilter::Unassigned => {
                    statement = statement.filter(tasks::assigned_to.is_null());
                }
                AssigneeFilter::Profile(profile) => {
                    statement = statement.filter(tasks::assigned_to.eq(profile.into_inner()));
                }
            }
            if !filter.statuses.is_empty() {
                let statuses: Vec<&str> = filter
                    .statuses
                    .iter()
                    .copied()
                    .map(TaskStatus::as_str)
                    .collect();
                statement = statement.filter(tasks::status.eq_any(statuses));
            }
            if let Some(entity_type) = filter.entity_type {
                statement = statement.filter(tasks::entity_type.eq(entity_type.as_str()));
            }
            if let Some(entity_id) = filter.entity_id {
                statement = statement.filter(tasks::entity_id.eq(entity_id.as_str().to_owned()));
            }
            if let Some(workflow_id) = filter.workflow_id {
                statement = statement.filter(tasks::workflow_id.eq(workflow_id.into_inner()));
            }
            if let Some(cutoff) = filter.due_before {
                statement = statement.filter(tasks::due_date.lt(cutoff));
            }
            if filter.required_only {
                statement = statement.filter(tasks::is_required.eq(true));
            }

            let rows = statement
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }
}

const WORKFLOW_SEQUENCE_INDEX: &str = "idx_tasks_workflow_sequence_unique";

fn map_insert_error(err: DieselError, task_id: TaskId, owner: EntityRef) -> TaskRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
            if info.constraint_name() == Some(WORKFLOW_SEQUENCE_INDEX) =>
        {
            TaskRepositoryError::SequenceTaken(owner)
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            TaskRepositoryError::DuplicateTask(task_id)
        }
        other => TaskRepositoryError::persistence(other),
    }
}

fn to_row(task: &Task) -> TaskRepositoryResult<TaskRow> {
    let origin = task.origin();
    let requirements = task.requirements();

    Ok(TaskRow {
        id: task.id().into_inner(),
        entity_type: task.owner().entity_type().as_str().to_owned(),
        entity_id: task.owner().entity_id().as_str().to_owned(),
        workflow_id: origin.map(|o| o.workflow_id.into_inner()),
        workflow_task_id: origin.map(|o| o.workflow_task_id.into_inner()),
        task_definition_id: task.task_definition_id().into_inner(),
        name: task.name().to_owned(),
        description: task.description().map(str::to_owned),
        requires_notes: requirements.requires_notes,
        requires_photo: requirements.requires_photo,
        sequence_order: i32::try_from(task.sequence_order())
            .map_err(TaskRepositoryError::persistence)?,
        status: task.status().as_str().to_owned(),
        is_required: task.is_required(),
        assigned_to: task.assigned_to().map(ProfileId::into_inner),
        due_date: task.due_date(),
        started_at: task.started_at(),
        completed_at: task.completed_at(),
        completed_by: task.completed_by().map(ProfileId::into_inner),
        task_notes: task.task_notes().map(str::to_owned),
        completion_notes: task.completion_notes().map(str::to_owned),
        blocked_reason: task.blocked_reason().map(str::to_owned),
        version: i64::try_from(task.version()).map_err(TaskRepositoryError::persistence)?,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let entity_type =
        EntityType::try_from(row.entity_type.as_str()).map_err(TaskRepositoryError::persistence)?;
    let status =
        TaskStatus::try_from(row.status.as_str()).map_err(TaskRepositoryError::persistence)?;
    let origin = match (row.workflow_id, row.workflow_task_id) {
        (Some(workflow_id), Some(workflow_task_id)) => Some(WorkflowOrigin {
            workflow_id: WorkflowId::from_uuid(workflow_id),
            workflow_task_id: WorkflowTaskId::from_uuid(workflow_task_id),
        }),
        _ => None,
    };

    let data = PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        owner: EntityRef::new(entity_type, EntityId::new(row.entity_id)),
        origin,
        task_definition_id: TaskDefinitionId::from_uuid(row.task_definition_id),
        name: row.name,
        description: row.description,
        requirements: TaskRequirements {
            requires_notes: row.requires_notes,
            requires_photo: row.requires_photo,
        },
        sequence_order: u32::try_from(row.sequence_order)
            .map_err(TaskRepositoryError::persistence)?,
        status,
        is_required: row.is_required,
        assigned_to: row.assigned_to.map(ProfileId::from_uuid),
        due_date: row.due_date,
        started_at: row.started_at,
        completed_at: row.completed_at,
        completed_by: row.completed_by.map(ProfileId::from_uuid),
        task_notes: row.task_notes,
        completion_notes: row.completion_notes,
        blocked_reason: row.blocked_reason,
        version: u64::try_from(row.version).map_err(TaskRepositoryError::persistence)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(Task::from_persisted(data))
}
