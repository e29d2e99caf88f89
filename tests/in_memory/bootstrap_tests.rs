//! Assembly of the adapter registry and service wiring.

use std::sync::Arc;

use checklist::{
    entity::adapters::{InMemoryEntities, TicketAdapter},
    task::{
        adapters::events::{RecordingEventSink, TracingEventSink},
        domain::{EntityId, EntityRef, EntityType, TaskDefinition},
        ports::TaskEventSink,
        services::{
            AdapterRegistryError, CreateTaskRequest, EntityAdapterRegistry,
            EntityAdapterRegistryBuilder, TaskServiceError,
        },
    },
};
use mockable::{Clock, DefaultClock};
use rstest::rstest;

use super::helpers::{Shop, shop};

#[rstest]
fn standard_registry_covers_every_entity_type() -> eyre::Result<()> {
    let entities = InMemoryEntities::new();
    let sink: Arc<dyn TaskEventSink> = Arc::new(TracingEventSink);
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(DefaultClock);

    let registry = entities.stores().registry(&sink, &clock)?;

    eyre::ensure!(registry.registered_types() == EntityType::ALL.to_vec());
    Ok(())
}

#[rstest]
fn incomplete_registry_names_the_missing_type() {
    let entities = InMemoryEntities::new();
    let sink: Arc<dyn TaskEventSink> = Arc::new(RecordingEventSink::new());
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(DefaultClock);
    let tickets = TicketAdapter::new(Arc::new(entities.tickets.clone()), sink, clock);

    let result = EntityAdapterRegistry::builder()
        .register(Arc::new(tickets))
        .and_then(EntityAdapterRegistryBuilder::build_complete);

    assert!(matches!(
        result,
        Err(AdapterRegistryError::AdapterNotFound(EntityType::StockReceipt))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tasks_for_unknown_entities_are_refused(shop: Shop) {
    let ghost = EntityRef::new(EntityType::StockTransfer, EntityId::new("tr-ghost"));

    let result = shop
        .service
        .create_task(CreateTaskRequest::new(ghost, TaskDefinition::new("Load van")), None)
        .await;

    assert!(matches!(result, Err(TaskServiceError::EntityNotFound(_))));
}
