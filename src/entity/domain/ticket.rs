//! Repair tickets.

use super::{EntityRecord, Priority, StatusChange, status::entity_status};
use crate::task::domain::{EntityId, EntityType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

entity_status! {
    /// Ticket lifecycle status.
    TicketStatus {
        /// Logged but not yet worked on.
        Pending => "pending",
        /// A technician is working on the device.
        InProgress => "in_progress",
        /// Waiting on the customer or parts.
        OnHold => "on_hold",
        /// Repair work is done.
        Completed => "completed",
        /// Device returned and ticket archived.
        Closed => "closed",
        /// Ticket abandoned.
        Cancelled => "cancelled",
    }
}

impl TicketStatus {
    /// Returns whether the ticket is archived or abandoned.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Cancelled)
    }
}

/// Repair ticket owning a diagnosis and repair checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    id: EntityId,
    number: String,
    subject: String,
    customer: Option<String>,
    status: TicketStatus,
    priority: Priority,
    tasks_completed_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Creates a pending ticket with normal priority.
    #[must_use]
    pub fn new(id: EntityId, number: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            id,
            number: number.into(),
            subject: subject.into(),
            customer: None,
            status: TicketStatus::Pending,
            priority: Priority::Normal,
            tasks_completed_at: None,
        }
    }

    /// Sets the customer name.
    #[must_use]
    pub fn with_customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = Some(customer.into());
        self
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Returns the human-facing ticket number.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Returns the ticket subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the customer name.
    #[must_use]
    pub fn customer(&self) -> Option<&str> {
        self.customer.as_deref()
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> TicketStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns when every required task was resolved.
    #[must_use]
    pub const fn tasks_completed_at(&self) -> Option<DateTime<Utc>> {
        self.tasks_completed_at
    }

    /// Moves a pending ticket into progress.
    ///
    /// Returns `None` when the ticket had already left `pending`.
    pub fn begin_work(&mut self) -> Option<StatusChange> {
        (self.status == TicketStatus::Pending).then(|| {
            self.status = TicketStatus::InProgress;
            StatusChange {
                from: TicketStatus::Pending.as_str(),
                to: TicketStatus::InProgress.as_str(),
            }
        })
    }

    /// Stamps the all-tasks-done marker.
    ///
    /// Returns `false` when the marker was already set.
    pub fn mark_tasks_completed(&mut self, now: DateTime<Utc>) -> bool {
        if self.tasks_completed_at.is_some() {
            return false;
        }
        self.tasks_completed_at = Some(now);
        true
    }
}

impl EntityRecord for Ticket {
    const ENTITY_TYPE: EntityType = EntityType::Ticket;

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
