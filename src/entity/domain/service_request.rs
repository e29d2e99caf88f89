//! Customer service intake requests.

use super::{EntityRecord, Priority, StatusChange, status::entity_status};
use crate::task::domain::{EntityId, EntityType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

entity_status! {
    /// Service request lifecycle status.
    ServiceRequestStatus {
        /// Just submitted.
        New => "new",
        /// Staff are assessing the request.
        UnderReview => "under_review",
        /// Assessment finished.
        Reviewed => "reviewed",
        /// Turned into a repair ticket.
        Converted => "converted",
        /// Turned down.
        Declined => "declined",
    }
}

impl ServiceRequestStatus {
    /// Returns whether the request was converted or declined.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Converted | Self::Declined)
    }
}

/// Customer request waiting to be assessed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRequest {
    id: EntityId,
    number: String,
    customer: String,
    summary: String,
    status: ServiceRequestStatus,
    priority: Priority,
    reviewed_at: Option<DateTime<Utc>>,
}

impl ServiceRequest {
    /// Creates a new request with normal priority.
    #[must_use]
    pub fn new(
        id: EntityId,
        number: impl Into<String>,
        customer: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            id,
            number: number.into(),
            customer: customer.into(),
            summary: summary.into(),
            status: ServiceRequestStatus::New,
            priority: Priority::Normal,
            reviewed_at: None,
        }
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: ServiceRequestStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Returns the request number.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Returns the customer name.
    #[must_use]
    pub fn customer(&self) -> &str {
        &self.customer
    }

    /// Returns the customer's description of the problem.
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> ServiceRequestStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns when the assessment finished.
    #[must_use]
    pub const fn reviewed_at(&self) -> Option<DateTime<Utc>> {
        self.reviewed_at
    }

    /// Marks a new or under-review request as reviewed.
    pub fn mark_reviewed(&mut self, now: DateTime<Utc>) -> Option<StatusChange> {
        let from = self.status;
        matches!(
            from,
            ServiceRequestStatus::New | ServiceRequestStatus::UnderReview
        )
        .then(|| {
            self.status = ServiceRequestStatus::Reviewed;
            self.reviewed_at = Some(now);
            StatusChange {
                from: from.as_str(),
                to: ServiceRequestStatus::Reviewed.as_str(),
            }
        })
    }
}

impl EntityRecord for ServiceRequest {
    const ENTITY_TYPE: EntityType = EntityType::ServiceRequest;

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
