//! Insert, update and uniqueness tests for the `PostgreSQL` task repository.

use crate::postgres::helpers::{
    BoxError, PreparedRepo, ad_hoc, from_workflow, prepared_repo, setup, ticket,
};
use checklist::task::{
    domain::{ProfileId, TaskStatus, WorkflowId},
    ports::{TaskRepository, TaskRepositoryError},
};
use eyre::ensure;
use mockable::DefaultClock;
use rstest::rstest;

#[rstest]
fn stored_task_is_found_by_id(
    prepared_repo: Result<Option<PreparedRepo>, BoxError>,
) -> eyre::Result<()> {
    let Some(prepared) = setup(prepared_repo)? else {
        return Ok(());
    };
    let owner = ticket("ticket-7");
    let workflow = WorkflowId::new();
    let task = from_workflow(&owner, workflow, "Diagnose", 1);

    prepared.runtime.block_on(prepared.repository.store(&task))?;
    let found = prepared
        .runtime
        .block_on(prepared.repository.find_by_id(task.id()))?
        .ok_or_else(|| eyre::eyre!("stored task should be found"))?;

    ensure!(found.id() == task.id() && found.name() == "Diagnose");
    ensure!(found.owner() == &owner && found.workflow_id() == Some(workflow));
    ensure!(found.origin() == task.origin());
    ensure!(found.status() == TaskStatus::Pending && found.version() == 0);
    ensure!(found.sequence_order() == 1 && found.is_required());
    Ok(())
}

#[rstest]
fn update_with_current_version_persists_changes(
    prepared_repo: Result<Option<PreparedRepo>, BoxError>,
) -> eyre::Result<()> {
    let Some(prepared) = setup(prepared_repo)? else {
        return Ok(());
    };
    let mut task = ad_hoc(&ticket("ticket-8"), "Order screen", 1);
    prepared.runtime.block_on(prepared.repository.store(&task))?;

    task.start(&DefaultClock)?;
    prepared.runtime.block_on(prepared.repository.update(&task, 0))?;

    let found = prepared
        .runtime
        .block_on(prepared.repository.find_by_id(task.id()))?
        .ok_or_else(|| eyre::eyre!("updated task should be found"))?;
    ensure!(found.status() == TaskStatus::InProgress);
    ensure!(found.version() == 1 && found.started_at().is_some());
    Ok(())
}

#[rstest]
fn update_with_stale_version_is_a_conflict(
    prepared_repo: Result<Option<PreparedRepo>, BoxError>,
) -> eyre::Result<()> {
    let Some(prepared) = setup(prepared_repo)? else {
        return Ok(());
    };
    let original = ad_hoc(&ticket("ticket-9"), "Call customer", 1);
    prepared.runtime.block_on(prepared.repository.store(&original))?;

    let mut first = original.clone();
    first.start(&DefaultClock)?;
    prepared.runtime.block_on(prepared.repository.update(&first, 0))?;

    let mut second = original;
    let previous = second.reassign(Some(ProfileId::new()), &DefaultClock);
    ensure!(previous.is_none());
    let result = prepared.runtime.block_on(prepared.repository.update(&second, 0));

    ensure!(
        matches!(
            result,
            Err(TaskRepositoryError::VersionConflict { task_id, expected: 0 }) if task_id == second.id()
        ),
        "expected a version conflict, got {result:?}"
    );
    let stored = prepared
        .runtime
        .block_on(prepared.repository.find_by_id(second.id()))?
        .ok_or_else(|| eyre::eyre!("task should still exist"))?;
    ensure!(stored.status() == TaskStatus::InProgress && stored.assigned_to().is_none());
    Ok(())
}

#[rstest]
fn update_of_missing_task_is_not_found(
    prepared_repo: Result<Option<PreparedRepo>, BoxError>,
) -> eyre::Result<()> {
    let Some(prepared) = setup(prepared_repo)? else {
        return Ok(());
    };
    let task = ad_hoc(&ticket("ticket-10"), "Never stored", 1);

    let result = prepared.runtime.block_on(prepared.repository.update(&task, 0));

    ensure!(
        matches!(result, Err(TaskRepositoryError::NotFound(id)) if id == task.id()),
        "expected not found, got {result:?}"
    );
    Ok(())
}

#[rstest]
fn storing_the_same_task_twice_is_a_duplicate(
    prepared_repo: Result<Option<PreparedRepo>, BoxError>,
) -> eyre::Result<()> {
    let Some(prepared) = setup(prepared_repo)? else {
        return Ok(());
    };
    let task = ad_hoc(&ticket("ticket-11"), "Quote repair", 1);
    prepared.runtime.block_on(prepared.repository.store(&task))?;

    let result = prepared.runtime.block_on(prepared.repository.store(&task));

    ensure!(
        matches!(result, Err(TaskRepositoryError::DuplicateTask(id)) if id == task.id()),
        "expected duplicate task, got {result:?}"
    );
    Ok(())
}

#[rstest]
fn batch_is_listed_per_entity_in_sequence_order(
    prepared_repo: Result<Option<PreparedRepo>, BoxError>,
) -> eyre::Result<()> {
    let Some(prepared) = setup(prepared_repo)? else {
        return Ok(());
    };
    let owner = ticket("ticket-12");
    let other = ticket("ticket-13");
    let workflow = WorkflowId::new();
    let batch = [
        from_workflow(&owner, workflow, "Quality check", 3),
        from_workflow(&owner, workflow, "Diagnose", 1),
        from_workflow(&owner, workflow, "Replace panel", 2),
    ];
    prepared.runtime.block_on(prepared.repository.store_all(&batch))?;
    prepared
        .runtime
        .block_on(prepared.repository.store(&ad_hoc(&other, "Unrelated", 1)))?;

    let listed = prepared
        .runtime
        .block_on(prepared.repository.find_by_entity(&owner))?;

    let names: Vec<&str> = listed.iter().map(|task| task.name()).collect();
    ensure!(names == ["Diagnose", "Replace panel", "Quality check"]);
    Ok(())
}

#[rstest]
fn workflow_position_can_only_be_taken_once(
    prepared_repo: Result<Option<PreparedRepo>, BoxError>,
) -> eyre::Result<()> {
    let Some(prepared) = setup(prepared_repo)? else {
        return Ok(());
    };
    let owner = ticket("ticket-14");
    let workflow = WorkflowId::new();
    prepared
        .runtime
        .block_on(prepared.repository.store(&from_workflow(&owner, workflow, "Diagnose", 1)))?;

    let single = prepared
        .runtime
        .block_on(prepared.repository.store(&from_workflow(&owner, workflow, "Inspect", 1)));
    ensure!(
        matches!(single, Err(TaskRepositoryError::SequenceTaken(ref taken)) if *taken == owner),
        "expected the position to be taken, got {single:?}"
    );

    let batch = [
        from_workflow(&owner, workflow, "Replace panel", 2),
        from_workflow(&owner, workflow, "Reseat cable", 2),
    ];
    let batched = prepared.runtime.block_on(prepared.repository.store_all(&batch));
    ensure!(matches!(batched, Err(TaskRepositoryError::SequenceTaken(_))));

    let stored = prepared
        .runtime
        .block_on(prepared.repository.find_by_entity(&owner))?;
    ensure!(stored.len() == 1, "a failed batch must not leave rows behind");

    let ad_hoc_twin = ad_hoc(&owner, "Ad-hoc at the same position", 1);
    prepared.runtime.block_on(prepared.repository.store(&ad_hoc_twin))?;
    Ok(())
}
