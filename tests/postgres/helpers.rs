//! Shared test helpers for `PostgreSQL` integration tests.

pub use super::cluster::{BoxError, PostgresCluster, postgres_cluster};
use super::cluster::{boxed, test_runtime};
use checklist::task::{
    adapters::postgres::PostgresTaskRepository,
    domain::{
        EntityId, EntityRef, EntityType, NewTask, Task, TaskDefinitionId, TaskRequirements,
        WorkflowId, WorkflowOrigin, WorkflowTaskId,
    },
};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use rstest::fixture;
use tokio::runtime::Runtime;
use uuid::Uuid;

/// SQL creating the `tasks` table and its indexes.
pub const CREATE_TASKS_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_tasks/up.sql");

/// Scratch database dropped when the guard goes out of scope.
pub struct TestDatabase {
    cluster: PostgresCluster,
    name: String,
}

impl TestDatabase {
    /// Creates a uniquely named database with the schema applied.
    ///
    /// # Errors
    ///
    /// Returns an error if creation or migration fails.
    pub fn create(cluster: PostgresCluster) -> Result<Self, BoxError> {
        let name = format!("checklist_{}", Uuid::new_v4().simple());
        cluster.create_database(&name)?;
        let database = Self { cluster, name };
        let mut conn = PgConnection::establish(&database.url()).map_err(boxed)?;
        conn.batch_execute(CREATE_TASKS_SQL).map_err(boxed)?;
        Ok(database)
    }

    /// Returns the connection URL of this database.
    #[must_use]
    pub fn url(&self) -> String {
        self.cluster.database_url(&self.name)
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        drop(self.cluster.drop_database(&self.name));
    }
}

/// Repository bound to a fresh database, plus the runtime to drive it.
///
/// Fields drop in declaration order, so the pool closes before the
/// database is removed.
pub struct PreparedRepo {
    /// Repository under test.
    pub repository: PostgresTaskRepository,
    /// Runtime the test blocks on.
    pub runtime: Runtime,
    /// Backing scratch database.
    pub database: TestDatabase,
}

/// Creates a repository over a fresh database, or `None` without a cluster.
///
/// # Errors
///
/// Returns an error if the database or connection pool cannot be set up.
#[fixture]
pub fn prepared_repo(
    postgres_cluster: Option<PostgresCluster>,
) -> Result<Option<PreparedRepo>, BoxError> {
    let Some(cluster) = postgres_cluster else {
        return Ok(None);
    };
    let database = TestDatabase::create(cluster)?;
    let pool = Pool::builder()
        .max_size(2)
        .build(ConnectionManager::<PgConnection>::new(database.url()))
        .map_err(boxed)?;

    Ok(Some(PreparedRepo {
        repository: PostgresTaskRepository::new(pool),
        runtime: test_runtime()?,
        database,
    }))
}

/// Converts the fixture result into an `eyre` result.
///
/// # Errors
///
/// Returns the fixture's setup error.
pub fn setup(
    prepared: Result<Option<PreparedRepo>, BoxError>,
) -> eyre::Result<Option<PreparedRepo>> {
    prepared.map_err(|err| eyre::eyre!(err))
}

/// Returns a ticket reference with the given identifier.
#[must_use]
pub fn ticket(id: &str) -> EntityRef {
    EntityRef::new(EntityType::Ticket, EntityId::new(id))
}

/// Builds an ad-hoc task for `owner`.
#[must_use]
pub fn ad_hoc(owner: &EntityRef, name: &str, order: u32) -> Task {
    Task::new(draft(owner, None, name, order), &DefaultClock)
}

/// Builds a task instantiated from `workflow` for `owner`.
#[must_use]
pub fn from_workflow(owner: &EntityRef, workflow: WorkflowId, name: &str, order: u32) -> Task {
    let origin = WorkflowOrigin {
        workflow_id: workflow,
        workflow_task_id: WorkflowTaskId::new(),
    };
    Task::new(draft(owner, Some(origin), name, order), &DefaultClock)
}

/// Returns required, unassigned task fields for `owner`.
#[must_use]
pub fn draft(
    owner: &EntityRef,
    origin: Option<WorkflowOrigin>,
    name: &str,
    order: u32,
) -> NewTask {
    NewTask {
        owner: owner.clone(),
        origin,
        task_definition_id: TaskDefinitionId::new(),
        name: name.to_owned(),
        description: None,
        requirements: TaskRequirements::default(),
        sequence_order: order,
        is_required: true,
        assigned_to: None,
        due_date: None,
    }
}
