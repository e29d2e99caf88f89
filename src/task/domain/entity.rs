//! Polymorphic owner references for tasks.

use super::{EntityId, ParseEntityTypeError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of business entity types that can own a checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// Repair ticket.
    Ticket,
    /// Inbound stock receipt.
    StockReceipt,
    /// Outbound stock issue.
    StockIssue,
    /// Stock transfer between locations.
    StockTransfer,
    /// Customer service intake request.
    ServiceRequest,
}

impl EntityType {
    /// Number of entity type variants.
    pub const COUNT: usize = 5;

    /// All entity types in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Ticket,
        Self::StockReceipt,
        Self::StockIssue,
        Self::StockTransfer,
        Self::ServiceRequest,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ticket => "ticket",
            Self::StockReceipt => "stock_receipt",
            Self::StockIssue => "stock_issue",
            Self::StockTransfer => "stock_transfer",
            Self::ServiceRequest => "service_request",
        }
    }

    /// Returns a stable slot index in `0..COUNT`.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Ticket => 0,
            Self::StockReceipt => 1,
            Self::StockIssue => 2,
            Self::StockTransfer => 3,
            Self::ServiceRequest => 4,
        }
    }
}

impl TryFrom<&str> for EntityType {
    type Error = ParseEntityTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "ticket" => Ok(Self::Ticket),
            "stock_receipt" => Ok(Self::StockReceipt),
            "stock_issue" => Ok(Self::StockIssue),
            "stock_transfer" => Ok(Self::StockTransfer),
            "service_request" => Ok(Self::ServiceRequest),
            _ => Err(ParseEntityTypeError(value.to_owned())),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies which business object a task belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    entity_type: EntityType,
    entity_id: EntityId,
}

impl EntityRef {
    /// Creates an entity reference.
    #[must_use]
    pub const fn new(entity_type: EntityType, entity_id: EntityId) -> Self {
        Self {
            entity_type,
            entity_id,
        }
    }

    /// Returns the entity type tag.
    #[must_use]
    pub const fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Returns the opaque entity identifier.
    #[must_use]
    pub const fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.entity_id)
    }
}
