//! Given steps for repair ticket checklist scenarios.

use super::world::{ChecklistWorld, run_async};
use checklist::{
    entity::domain::{Ticket, TicketStatus},
    task::domain::{
        EntityId, EntityRef, EntityType, TaskDefinition, WorkflowTaskEntry, WorkflowTemplate,
    },
};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a pending ticket "{number}" about "{subject}""#)]
fn pending_ticket(
    world: &mut ChecklistWorld,
    number: String,
    subject: String,
) -> Result<(), eyre::Report> {
    let id = EntityId::new(format!("ticket-{number}"));
    world
        .entities
        .tickets
        .insert(Ticket::new(id.clone(), number, subject))?;
    world.ticket = Some(EntityRef::new(EntityType::Ticket, id));
    Ok(())
}

#[given("the ticket has been closed")]
fn ticket_closed(world: &mut ChecklistWorld) -> Result<(), eyre::Report> {
    let id = world.ticket()?.entity_id().clone();
    let ticket = world
        .entities
        .tickets
        .get(&id)?
        .ok_or_else(|| eyre::eyre!("ticket {id} should exist"))?;
    world
        .entities
        .tickets
        .insert(ticket.with_status(TicketStatus::Closed))?;
    Ok(())
}

fn install_workflow(
    world: &mut ChecklistWorld,
    name: &str,
    tasks: &str,
    strict: bool,
) -> Result<(), eyre::Report> {
    let template = tasks
        .split(',')
        .map(str::trim)
        .zip(1_u32..)
        .fold(WorkflowTemplate::new(name), |template, (task, order)| {
            template.with_entry(WorkflowTaskEntry::new(TaskDefinition::new(task), order))
        });
    let template = if strict { template.strict() } else { template };
    world.workflow = Some(template.id());
    world.workflows.insert(template)?;
    Ok(())
}

#[given(r#"a strict workflow "{name}" with tasks "{tasks}""#)]
fn strict_workflow(
    world: &mut ChecklistWorld,
    name: String,
    tasks: String,
) -> Result<(), eyre::Report> {
    install_workflow(world, &name, &tasks, true)
}

#[given(r#"a workflow "{name}" with tasks "{tasks}""#)]
fn relaxed_workflow(
    world: &mut ChecklistWorld,
    name: String,
    tasks: String,
) -> Result<(), eyre::Report> {
    install_workflow(world, &name, &tasks, false)
}

#[given("the workflow has been applied to the ticket")]
fn workflow_applied(world: &mut ChecklistWorld) -> Result<(), eyre::Report> {
    let ticket = world.ticket()?.clone();
    let workflow = world
        .workflow
        .ok_or_else(|| eyre::eyre!("missing workflow in scenario world"))?;
    run_async(
        world
            .service
            .create_tasks_from_workflow(&ticket, workflow, None),
    )
    .wrap_err("apply workflow in scenario setup")?;
    let checklist = run_async(world.service.get_entity_tasks(&ticket))?;
    world.tasks = checklist.tasks.iter().map(|task| task.id()).collect();
    Ok(())
}

#[given("task {position:usize} has been started")]
fn task_started(world: &mut ChecklistWorld, position: usize) -> Result<(), eyre::Report> {
    let task_id = world.task_at(position)?;
    run_async(world.service.start_task(task_id, None)).wrap_err("start task in scenario setup")?;
    Ok(())
}
