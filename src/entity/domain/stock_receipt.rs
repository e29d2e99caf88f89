//! Inbound stock receipts.

use super::{EntityRecord, StatusChange, status::entity_status};
use crate::task::domain::{EntityId, EntityType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

entity_status! {
    /// Stock receipt lifecycle status.
    StockReceiptStatus {
        /// Being drafted; not yet submitted for approval.
        Draft => "draft",
        /// Awaiting approval.
        Submitted => "submitted",
        /// Approved and expected at the dock.
        Approved => "approved",
        /// Goods are being checked in.
        Receiving => "receiving",
        /// Goods are on the shelves.
        Received => "received",
        /// Receipt withdrawn.
        Cancelled => "cancelled",
    }
}

impl StockReceiptStatus {
    /// Returns whether the receipt is finished or withdrawn.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Received | Self::Cancelled)
    }

    /// Returns whether receiving tasks may be worked on.
    #[must_use]
    pub const fn accepts_task_work(self) -> bool {
        matches!(self, Self::Approved | Self::Receiving)
    }
}

/// Inbound delivery from a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReceipt {
    id: EntityId,
    number: String,
    supplier: String,
    status: StockReceiptStatus,
    tasks_completed_at: Option<DateTime<Utc>>,
}

impl StockReceipt {
    /// Creates a draft receipt.
    #[must_use]
    pub fn new(id: EntityId, number: impl Into<String>, supplier: impl Into<String>) -> Self {
        Self {
            id,
            number: number.into(),
            supplier: supplier.into(),
            status: StockReceiptStatus::Draft,
            tasks_completed_at: None,
        }
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: StockReceiptStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns the receipt number.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Returns the supplier name.
    #[must_use]
    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> StockReceiptStatus {
        self.status
    }

    /// Returns when every required task was resolved.
    #[must_use]
    pub const fn tasks_completed_at(&self) -> Option<DateTime<Utc>> {
        self.tasks_completed_at
    }

    /// Moves an approved receipt into receiving.
    pub fn begin_receiving(&mut self) -> Option<StatusChange> {
        (self.status == StockReceiptStatus::Approved).then(|| {
            self.status = StockReceiptStatus::Receiving;
            StatusChange {
                from: StockReceiptStatus::Approved.as_str(),
                to: StockReceiptStatus::Receiving.as_str(),
            }
        })
    }

    /// Finishes receiving and stamps the all-tasks-done marker.
    ///
    /// Only a receipt in `receiving` advances; any other status is left
    /// untouched and `None` is returned.
    pub fn finish_receiving(&mut self, now: DateTime<Utc>) -> Option<StatusChange> {
        (self.status == StockReceiptStatus::Receiving).then(|| {
            self.status = StockReceiptStatus::Received;
            self.tasks_completed_at = Some(now);
            StatusChange {
                from: StockReceiptStatus::Receiving.as_str(),
                to: StockReceiptStatus::Received.as_str(),
            }
        })
    }
}

impl EntityRecord for StockReceipt {
    const ENTITY_TYPE: EntityType = EntityType::StockReceipt;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn status_label(&self) -> &'static str {
        self.status.as_str()
    }

    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
