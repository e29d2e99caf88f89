//! Adapter implementations of the task ports.
//!
//! # Available Adapters
//!
//! - [`memory`]: thread-safe in-memory task repository, workflow catalogue
//!   and attachment index
//! - [`postgres::PostgresTaskRepository`]: `PostgreSQL` task persistence using
//!   Diesel ORM with optimistic version checks
//! - [`events`]: event sinks for `tracing` output and in-memory recording

pub mod events;
pub mod memory;
pub mod postgres;
