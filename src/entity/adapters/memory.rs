//! In-memory entity stores.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::{
    entity::{
        domain::{EntityRecord, ServiceRequest, StockIssue, StockReceipt, StockTransfer, Ticket},
        ports::{EntityStore, EntityStoreError, EntityStoreResult},
    },
    task::domain::EntityId,
};

use super::EntityStores;

/// Thread-safe in-memory store for one kind of entity record.
pub struct InMemoryEntityStore<E> {
    records: Arc<RwLock<HashMap<EntityId, E>>>,
}

impl<E: EntityRecord> InMemoryEntityStore<E> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a record outside the async port.
    ///
    /// # Errors
    ///
    /// Returns [`EntityStoreError::Persistence`] if the lock is poisoned.
    pub fn insert(&self, record: E) -> EntityStoreResult<()> {
        let mut records = self.records.write().map_err(|err| {
            EntityStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        records.insert(record.id().clone(), record);
        Ok(())
    }

    /// Returns a copy of a record outside the async port.
    ///
    /// # Errors
    ///
    /// Returns [`EntityStoreError::Persistence`] if the lock is poisoned.
    pub fn get(&self, id: &EntityId) -> EntityStoreResult<Option<E>> {
        let records = self.records.read().map_err(|err| {
            EntityStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(records.get(id).cloned())
    }
}

impl<E> Default for InMemoryEntityStore<E> {
    fn default() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<E> Clone for InMemoryEntityStore<E> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<E> fmt::Debug for InMemoryEntityStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryEntityStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl<E: EntityRecord> EntityStore<E> for InMemoryEntityStore<E> {
    async fn find(&self, id: &EntityId) -> EntityStoreResult<Option<E>> {
        self.get(id)
    }

    async fn save(&self, record: &E) -> EntityStoreResult<()> {
        self.insert(record.clone())
    }
}

/// One in-memory store per entity type.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEntities {
    /// Ticket records.
    pub tickets: InMemoryEntityStore<Ticket>,
    /// Stock receipt records.
    pub stock_receipts: InMemoryEntityStore<StockReceipt>,
    /// Stock issue records.
    pub stock_issues: InMemoryEntityStore<StockIssue>,
    /// Stock transfer records.
    pub stock_transfers: InMemoryEntityStore<StockTransfer>,
    /// Service request records.
    pub service_requests: InMemoryEntityStore<ServiceRequest>,
}

impl InMemoryEntities {
    /// Creates empty stores.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stores as port trait objects sharing this state.
    #[must_use]
    pub fn stores(&self) -> EntityStores {
        EntityStores {
            tickets: Arc::new(self.tickets.clone()),
            stock_receipts: Arc::new(self.stock_receipts.clone()),
            stock_issues: Arc::new(self.stock_issues.clone()),
            stock_transfers: Arc::new(self.stock_transfers.clone()),
            service_requests: Arc::new(self.service_requests.clone()),
        }
    }
}
