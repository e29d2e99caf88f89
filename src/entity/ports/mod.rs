//! Port contracts for entity records.

mod store;

pub use store::{EntityStore, EntityStoreError, EntityStoreResult};
