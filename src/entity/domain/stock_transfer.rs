//! Stock transfers between locations.

use super::{EntityRecord, StatusChange, status::entity_status};
use crate::task::domain::{EntityId, EntityType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

entity_status! {
    /// Stock transfer lifecycle status.
    StockTransferStatus {
        /// Being drafted.
        Draft => "draft",
        /// Approved for dispatch.
        Approved => "approved",
        /// Goods are on the road.
        InTransit => "in_transit",
        /// Goods arrived at the destination.
        Received => "received",
        /// Transfer withdrawn.
        Cancelled => "cancelled",
    }
}

impl StockTransferStatus {
    /// Returns whether the transfer is finished or withdrawn.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Received | Self::Cancelled)
    }

    /// Returns whether transfer tasks may be worked on.
    #[must_use]
    pub const fn accepts_task_work(self) -> bool {
        matches!(self, Self::Approved | Self::InTransit)
    }
}

/// Movement of stock from one location to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockTransfer {
    id: EntityId,
    number: String,
    from_location: String,
    to_location: String,
    status: StockTransferStatus,
    received_at: Option<DateTime<Utc>>,
}

impl StockTransfer {
    /// Creates an approved transfer.
    #[must_use]
    pub fn new(
        id: EntityId,
        number: impl Into<String>,
        from_location: impl Into<String>,
        to_location: impl Into<String>,
    ) -> Self {
        Self {
            id,
            number: number.into(),
            from_location: from_location.into(),
            to_location: to_location.into(),
            status: StockTransferStatus::Approved,
            received_at: None,
        }
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: StockTransferStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns the transfer number.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Returns the source location.
    #[must_use]
    pub fn from_location(&self) -> &str {
        &self.from_location
    }

    /// Returns the destination location.
    #[must_use]
    pub fn to_location(&self) -> &str {
        &self.to_location
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> StockTransferStatus {
        self.status
    }

    /// Returns when the goods arrived.
    #[must_use]
    pub const fn received_at(&self) -> Option<DateTime<Utc>> {
        self.received_at
    }

    /// Dispatches an approved transfer.
    pub fn dispatch(&mut self) -> Option<StatusChange> {
        (self.status == StockTransferStatus::Approved).then(|| {
            self.status = StockTransferStatus::InTransit;
            StatusChange {
                from: StockTransferStatus::Approved.as_str(),
                to: StockTransferStatus::InTransit.as_str(),
            }
        })
    }

    /// Books the goods in at the destination.
    pub fn receive(&mut self, now: DateTime<Utc>) -> Option<StatusChange> {
        (self.status == StockTransferStatus::InTransit).then(|| {
            self.status = StockTransferStatus::Received;
            self.received_at = Some(now);
            StatusChange {
                from: StockTransferStatus::InTransit.as_str(),
                to: StockTransferStatus::Received.as_str(),
            }
        })
    }
}

impl EntityRecord for StockTransfer {
    const ENTITY_TYPE: EntityType = EntityType::StockTransfer;

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
