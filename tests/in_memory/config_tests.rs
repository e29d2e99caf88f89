//! Effects of the task service configuration.

use super::helpers::Shop;
use checklist::{
    entity::domain::Ticket,
    task::{
        domain::{EntityId, EntityRef, EntityType, TaskDomainError, TaskId, TaskStatus},
        services::{TaskFilter, TaskServiceConfig, TaskServiceError},
    },
};
use eyre::ensure;
use rstest::rstest;

async fn ticket_with_started_task(shop: &Shop) -> eyre::Result<TaskId> {
    let id = EntityId::new("ticket-config");
    shop.entities
        .tickets
        .insert(Ticket::new(id.clone(), "T-500", "Flickering display"))?;
    let ticket = EntityRef::new(EntityType::Ticket, id);
    let tasks = shop.checklist(&ticket, "Display", &["Swap cable"]).await?;
    let task = tasks
        .first()
        .ok_or_else(|| eyre::eyre!("checklist should not be empty"))?;
    shop.service.start_task(task.id(), None).await?;
    Ok(task.id())
}

#[rstest]
#[case(TaskServiceConfig::lenient(), "Done", true)]
#[case(TaskServiceConfig::default(), "Done", false)]
#[case(TaskServiceConfig::default(), "Swapped the cable", true)]
#[case(TaskServiceConfig::strict(), "Swapped the cable", false)]
#[tokio::test(flavor = "multi_thread")]
async fn minimum_note_length_follows_configuration(
    #[case] config: TaskServiceConfig,
    #[case] notes: &str,
    #[case] accepted: bool,
) -> eyre::Result<()> {
    let min = config.min_completion_notes_len;
    let shop = Shop::with_config(config)?;
    let task_id = ticket_with_started_task(&shop).await?;

    let result = shop.service.complete_task(task_id, None, notes).await;

    if accepted {
        ensure!(result.is_ok(), "notes {notes:?} should pass a minimum of {min}");
    } else {
        ensure!(matches!(
            result,
            Err(TaskServiceError::Domain(TaskDomainError::NotesTooShort { min: reported, .. }))
                if reported == min
        ));
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn default_statuses_can_be_reconfigured() -> eyre::Result<()> {
    let config = TaskServiceConfig {
        default_statuses: vec![TaskStatus::InProgress],
        ..TaskServiceConfig::default()
    };
    let shop = Shop::with_config(config)?;
    let task_id = ticket_with_started_task(&shop).await?;

    let listed = shop.service.list_tasks(&TaskFilter::new()).await?;
    ensure!(listed.len() == 1);
    ensure!(listed.iter().all(|item| item.task.id() == task_id));
    Ok(())
}

#[rstest]
fn configuration_deserializes_with_defaults() -> eyre::Result<()> {
    let parsed: TaskServiceConfig =
        serde_json::from_str(r#"{"default_statuses": ["pending", "blocked"]}"#)?;
    ensure!(parsed.min_completion_notes_len == 10);
    ensure!(parsed.default_statuses == vec![TaskStatus::Pending, TaskStatus::Blocked]);
    Ok(())
}
