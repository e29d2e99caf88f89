//! Checklist: polymorphic task orchestration for repair-shop workflows.
//!
//! This crate attaches checklists of tasks to business entities (tickets,
//! stock receipts, stock issues, stock transfers and service requests),
//! drives each task through one shared lifecycle state machine, and lets
//! entity-specific adapters react when work starts, blocks or finishes.
//!
//! # Architecture
//!
//! Checklist follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, in-memory,
//!   entity rules)
//! - **Services**: Orchestration over the ports
//!
//! # Modules
//!
//! - [`task`]: Task lifecycle, workflow instantiation and orchestration
//! - [`entity`]: Owning business entities and their task adapters

pub mod entity;
pub mod task;
