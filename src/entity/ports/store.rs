//! Storage port for entity records.

use crate::{entity::domain::EntityRecord, task::domain::EntityId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for entity store operations.
pub type EntityStoreResult<T> = Result<T, EntityStoreError>;

/// Read and write access to one kind of entity record.
#[async_trait]
pub trait EntityStore<E: EntityRecord>: Send + Sync {
    /// Finds a record by identifier.
    ///
    /// Returns `None` when the record does not exist.
    async fn find(&self, id: &EntityId) -> EntityStoreResult<Option<E>>;

    /// Inserts or replaces a record.
    async fn save(&self, record: &E) -> EntityStoreResult<()>;
}

/// Errors returned by entity stores.
#[derive(Debug, Clone, Error)]
pub enum EntityStoreError {
    /// Persistence-layer failure.
    #[error("entity store persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl EntityStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
