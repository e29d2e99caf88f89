//! Lookup table from entity type to entity adapter.
//!
//! The registry is assembled once during bootstrap through
//! [`EntityAdapterRegistryBuilder`] and is immutable afterwards. It is handed
//! to the task service by value or `Arc`, never reached through global state.

use crate::task::{domain::EntityType, ports::EntityAdapter};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while assembling or querying the adapter registry.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AdapterRegistryError {
    /// An adapter for the entity type was already registered.
    #[error("an entity adapter for {0} is already registered")]
    DuplicateAdapter(EntityType),

    /// No adapter is registered for the entity type.
    #[error("no entity adapter is registered for {0}")]
    AdapterNotFound(EntityType),
}

type AdapterSlots = [Option<Arc<dyn EntityAdapter>>; EntityType::COUNT];

/// Immutable mapping of every entity type to its adapter.
#[derive(Clone)]
pub struct EntityAdapterRegistry {
    slots: AdapterSlots,
}

impl EntityAdapterRegistry {
    /// Starts assembling a registry.
    #[must_use]
    pub fn builder() -> EntityAdapterRegistryBuilder {
        EntityAdapterRegistryBuilder::default()
    }

    /// Returns the adapter registered for `entity_type`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterRegistryError::AdapterNotFound`] when nothing was
    /// registered for the type.
    pub fn get(
        &self,
        entity_type: EntityType,
    ) -> Result<&Arc<dyn EntityAdapter>, AdapterRegistryError> {
        self.slots
            .get(entity_type.index())
            .and_then(Option::as_ref)
            .ok_or(AdapterRegistryError::AdapterNotFound(entity_type))
    }

    /// Returns the entity types that have an adapter.
    #[must_use]
    pub fn registered_types(&self) -> Vec<EntityType> {
        EntityType::ALL
            .into_iter()
            .filter(|entity_type| self.get(*entity_type).is_ok())
            .collect()
    }
}

impl fmt::Debug for EntityAdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityAdapterRegistry")
            .field("registered", &self.registered_types())
            .finish()
    }
}

/// Append-only builder for [`EntityAdapterRegistry`].
#[derive(Default)]
pub struct EntityAdapterRegistryBuilder {
    slots: AdapterSlots,
}

impl EntityAdapterRegistryBuilder {
    /// Registers an adapter under the entity type it reports.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterRegistryError::DuplicateAdapter`] when the entity type
    /// already has an adapter.
    pub fn register(
        mut self,
        adapter: Arc<dyn EntityAdapter>,
    ) -> Result<Self, AdapterRegistryError> {
        let entity_type = adapter.entity_type();
        let slot = self.slot_mut(entity_type);
        if slot.is_some() {
            return Err(AdapterRegistryError::DuplicateAdapter(entity_type));
        }
        *slot = Some(adapter);
        Ok(self)
    }

    /// Registers an adapter, replacing any existing one for the same type.
    ///
    /// Intended for test setups that swap one adapter of an otherwise
    /// standard set.
    #[must_use]
    pub fn replace(mut self, adapter: Arc<dyn EntityAdapter>) -> Self {
        let entity_type = adapter.entity_type();
        *self.slot_mut(entity_type) = Some(adapter);
        self
    }

    /// Finishes the registry, allowing entity types without adapters.
    #[must_use]
    pub fn build(self) -> EntityAdapterRegistry {
        EntityAdapterRegistry { slots: self.slots }
    }

    /// Finishes the registry, requiring an adapter for every entity type.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterRegistryError::AdapterNotFound`] naming the first
    /// entity type without an adapter.
    pub fn build_complete(self) -> Result<EntityAdapterRegistry, AdapterRegistryError> {
        let registry = self.build();
        if let Some(missing) = EntityType::ALL
            .into_iter()
            .find(|entity_type| registry.get(*entity_type).is_err())
        {
            return Err(AdapterRegistryError::AdapterNotFound(missing));
        }
        Ok(registry)
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "EntityType::index is exhaustively mapped below EntityType::COUNT"
    )]
    fn slot_mut(&mut self, entity_type: EntityType) -> &mut Option<Arc<dyn EntityAdapter>> {
        &mut self.slots[entity_type.index()]
    }
}
