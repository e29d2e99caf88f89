//! Filtered query tests for the `PostgreSQL` task repository.

use crate::postgres::helpers::{BoxError, PreparedRepo, draft, prepared_repo, setup, ticket};
use checklist::task::{
    domain::{
        EntityId, EntityRef, EntityType, ProfileId, Task, TaskStatus, WorkflowId,
        WorkflowOrigin, WorkflowTaskId,
    },
    ports::{AssigneeFilter, TaskQuery, TaskRepository},
};
use chrono::{DateTime, TimeDelta, Utc};
use eyre::ensure;
use mockable::{Clock, DefaultClock};
use rstest::rstest;
use std::collections::BTreeSet;

/// Identifiers shared between the seeded rows and the queries over them.
struct Seed {
    technician: ProfileId,
    workflow: WorkflowId,
    now: DateTime<Utc>,
}

impl Seed {
    fn new() -> Self {
        Self {
            technician: ProfileId::new(),
            workflow: WorkflowId::new(),
            now: DefaultClock.utc(),
        }
    }

    /// Seeds four tasks:
    ///
    /// | name          | owner        | workflow | assignee   | status      | due    | required |
    /// |---------------|--------------|----------|------------|-------------|--------|----------|
    /// | Diagnose      | ticket-20    | yes      | technician | pending     | +1h    | yes      |
    /// | Replace panel | ticket-20    | yes      | nobody     | in progress | none   | no       |
    /// | Count stock   | receipt-5    | no       | technician | pending     | +3d    | yes      |
    /// | Call customer | ticket-21    | no       | nobody     | pending     | none   | yes      |
    fn tasks(&self) -> eyre::Result<Vec<Task>> {
        let repair = ticket("ticket-20");
        let receipt = EntityRef::new(EntityType::StockReceipt, EntityId::new("receipt-5"));
        let origin = || {
            Some(WorkflowOrigin {
                workflow_id: self.workflow,
                workflow_task_id: WorkflowTaskId::new(),
            })
        };

        let mut diagnose = draft(&repair, origin(), "Diagnose", 1);
        diagnose.assigned_to = Some(self.technician);
        diagnose.due_date = Some(self.now + TimeDelta::hours(1));

        let mut replace = draft(&repair, origin(), "Replace panel", 2);
        replace.is_required = false;
        let mut replace = Task::new(replace, &DefaultClock);
        replace.start(&DefaultClock)?;

        let mut count = draft(&receipt, None, "Count stock", 1);
        count.assigned_to = Some(self.technician);
        count.due_date = Some(self.now + TimeDelta::days(3));

        let call = draft(&ticket("ticket-21"), None, "Call customer", 1);

        Ok(vec![
            Task::new(diagnose, &DefaultClock),
            replace,
            Task::new(count, &DefaultClock),
            Task::new(call, &DefaultClock),
        ])
    }
}

#[rstest]
#[case::everything(|_: &Seed| TaskQuery::default(),
    &["Diagnose", "Replace panel", "Count stock", "Call customer"])]
#[case::in_progress(|_: &Seed| TaskQuery {
    statuses: vec![TaskStatus::InProgress],
    ..TaskQuery::default()
}, &["Replace panel"])]
#[case::pending_or_blocked(|_: &Seed| TaskQuery {
    statuses: vec![TaskStatus::Pending, TaskStatus::Blocked],
    ..TaskQuery::default()
}, &["Diagnose", "Count stock", "Call customer"])]
#[case::unassigned(|_: &Seed| TaskQuery {
    assignee: AssigneeFilter::Unassigned,
    ..TaskQuery::default()
}, &["Replace panel", "Call customer"])]
#[case::assigned_to_technician(|seed: &Seed| TaskQuery {
    assignee: AssigneeFilter::Profile(seed.technician),
    ..TaskQuery::default()
}, &["Diagnose", "Count stock"])]
#[case::stock_receipts(|_: &Seed| TaskQuery {
    entity_type: Some(EntityType::StockReceipt),
    ..TaskQuery::default()
}, &["Count stock"])]
#[case::one_ticket(|_: &Seed| TaskQuery {
    entity_type: Some(EntityType::Ticket),
    entity_id: Some(EntityId::new("ticket-20")),
    ..TaskQuery::default()
}, &["Diagnose", "Replace panel"])]
#[case::workflow(|seed: &Seed| TaskQuery {
    workflow_id: Some(seed.workflow),
    ..TaskQuery::default()
}, &["Diagnose", "Replace panel"])]
#[case::due_within_a_day(|seed: &Seed| TaskQuery {
    due_before: Some(seed.now + TimeDelta::days(1)),
    ..TaskQuery::default()
}, &["Diagnose"])]
#[case::required_only(|_: &Seed| TaskQuery {
    required_only: true,
    ..TaskQuery::default()
}, &["Diagnose", "Count stock", "Call customer"])]
#[case::combined(|seed: &Seed| TaskQuery {
    assignee: AssigneeFilter::Profile(seed.technician),
    entity_type: Some(EntityType::Ticket),
    statuses: vec![TaskStatus::Pending],
    ..TaskQuery::default()
}, &["Diagnose"])]
fn query_applies_every_criterion(
    prepared_repo: Result<Option<PreparedRepo>, BoxError>,
    #[case] build: fn(&Seed) -> TaskQuery,
    #[case] expected: &[&str],
) -> eyre::Result<()> {
    let Some(prepared) = setup(prepared_repo)? else {
        return Ok(());
    };
    let seed = Seed::new();
    prepared
        .runtime
        .block_on(prepared.repository.store_all(&seed.tasks()?))?;

    let found = prepared
        .runtime
        .block_on(prepared.repository.query(&build(&seed)))?;

    let names: BTreeSet<&str> = found.iter().map(Task::name).collect();
    let wanted: BTreeSet<&str> = expected.iter().copied().collect();
    ensure!(names == wanted, "expected {wanted:?}, got {names:?}");
    Ok(())
}
