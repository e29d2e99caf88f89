//! Adapter implementations for entity records.
//!
//! One [`crate::task::ports::EntityAdapter`] per entity type, plus the
//! in-memory record stores used by tests and embedded deployments.

mod memory;
mod service_request;
mod stock_issue;
mod stock_receipt;
mod stock_transfer;
mod support;
mod ticket;

pub use memory::{InMemoryEntities, InMemoryEntityStore};
pub use service_request::ServiceRequestAdapter;
pub use stock_issue::StockIssueAdapter;
pub use stock_receipt::StockReceiptAdapter;
pub use stock_transfer::StockTransferAdapter;
pub use support::ContextTemplates;
pub use ticket::TicketAdapter;

use crate::{
    entity::{
        domain::{ServiceRequest, StockIssue, StockReceipt, StockTransfer, Ticket},
        ports::EntityStore,
    },
    task::{
        ports::TaskEventSink,
        services::{AdapterRegistryError, EntityAdapterRegistry},
    },
};
use mockable::Clock;
use std::sync::Arc;

/// Record stores backing the standard adapter set.
#[derive(Clone)]
pub struct EntityStores {
    /// Ticket records.
    pub tickets: Arc<dyn EntityStore<Ticket>>,
    /// Stock receipt records.
    pub stock_receipts: Arc<dyn EntityStore<StockReceipt>>,
    /// Stock issue records.
    pub stock_issues: Arc<dyn EntityStore<StockIssue>>,
    /// Stock transfer records.
    pub stock_transfers: Arc<dyn EntityStore<StockTransfer>>,
    /// Service request records.
    pub service_requests: Arc<dyn EntityStore<ServiceRequest>>,
}

impl EntityStores {
    /// Builds a registry holding an adapter for every entity type.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterRegistryError`] if the standard set is incomplete or
    /// registers a type twice.
    pub fn registry(
        &self,
        events: &Arc<dyn TaskEventSink>,
        clock: &Arc<dyn Clock + Send + Sync>,
    ) -> Result<EntityAdapterRegistry, AdapterRegistryError> {
        EntityAdapterRegistry::builder()
            .register(Arc::new(TicketAdapter::new(
                Arc::clone(&self.tickets),
                Arc::clone(events),
                Arc::clone(clock),
            )))?
            .register(Arc::new(StockReceiptAdapter::new(
                Arc::clone(&self.stock_receipts),
                Arc::clone(events),
                Arc::clone(clock),
            )))?
            .register(Arc::new(StockIssueAdapter::new(
                Arc::clone(&self.stock_issues),
                Arc::clone(events),
                Arc::clone(clock),
            )))?
            .register(Arc::new(StockTransferAdapter::new(
                Arc::clone(&self.stock_transfers),
                Arc::clone(events),
                Arc::clone(clock),
            )))?
            .register(Arc::new(ServiceRequestAdapter::new(
                Arc::clone(&self.service_requests),
                Arc::clone(events),
                Arc::clone(clock),
            )))?
            .build_complete()
    }
}
