//! Outbound stock issues.

use super::{EntityRecord, StatusChange, status::entity_status};
use crate::task::domain::{EntityId, EntityType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

entity_status! {
    /// Stock issue lifecycle status.
    StockIssueStatus {
        /// Being drafted.
        Draft => "draft",
        /// Approved for picking.
        Approved => "approved",
        /// Parts are being picked from the shelves.
        Picking => "picking",
        /// Parts handed over.
        Issued => "issued",
        /// Issue withdrawn.
        Cancelled => "cancelled",
    }
}

impl StockIssueStatus {
    /// Returns whether the issue is finished or withdrawn.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Issued | Self::Cancelled)
    }

    /// Returns whether picking tasks may be worked on.
    #[must_use]
    pub const fn accepts_task_work(self) -> bool {
        matches!(self, Self::Approved | Self::Picking)
    }
}

/// Parts leaving the stock room, usually for a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockIssue {
    id: EntityId,
    number: String,
    requested_for: String,
    status: StockIssueStatus,
    issued_at: Option<DateTime<Utc>>,
}

impl StockIssue {
    /// Creates an approved issue.
    #[must_use]
    pub fn new(id: EntityId, number: impl Into<String>, requested_for: impl Into<String>) -> Self {
        Self {
            id,
            number: number.into(),
            requested_for: requested_for.into(),
            status: StockIssueStatus::Approved,
            issued_at: None,
        }
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: StockIssueStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns the issue number.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Returns who or what the parts are for.
    #[must_use]
    pub fn requested_for(&self) -> &str {
        &self.requested_for
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> StockIssueStatus {
        self.status
    }

    /// Returns when the parts were handed over.
    #[must_use]
    pub const fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.issued_at
    }

    /// Moves an approved issue into picking.
    pub fn begin_picking(&mut self) -> Option<StatusChange> {
        (self.status == StockIssueStatus::Approved).then(|| {
            self.status = StockIssueStatus::Picking;
            StatusChange {
                from: StockIssueStatus::Approved.as_str(),
                to: StockIssueStatus::Picking.as_str(),
            }
        })
    }

    /// Hands the picked parts over.
    pub fn finish_picking(&mut self, now: DateTime<Utc>) -> Option<StatusChange> {
        (self.status == StockIssueStatus::Picking).then(|| {
            self.status = StockIssueStatus::Issued;
            self.issued_at = Some(now);
            StatusChange {
                from: StockIssueStatus::Picking.as_str(),
                to: StockIssueStatus::Issued.as_str(),
            }
        })
    }
}

impl EntityRecord for StockIssue {
    const ENTITY_TYPE: EntityType = EntityType::StockIssue;

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
