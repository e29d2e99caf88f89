//! Task orchestration for Checklist.
//!
//! Tasks belong to any entity through an [`domain::EntityRef`], are
//! instantiated from workflow templates or created ad hoc, and move through
//! a single state machine regardless of the owning entity type. Entity
//! specific behaviour lives behind the [`ports::EntityAdapter`] trait and is
//! looked up through [`services::EntityAdapterRegistry`]. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod tests;
