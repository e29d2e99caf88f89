//! Business entities that own checklists.
//!
//! Tickets, stock receipts, stock issues, stock transfers and service
//! requests each get an [`crate::task::ports::EntityAdapter`] that encodes
//! when work may start and how the entity advances once its required tasks
//! are resolved. The module follows the same layout as [`crate::task`]:
//!
//! - Records in [`domain`]
//! - Store contract in [`ports`]
//! - Stores and task adapters in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
