//! In-memory adapter implementations.
//!
//! These adapters provide simple, thread-safe implementations suitable for
//! tests and embedding without database dependencies.

mod attachment;
mod task;
mod workflow;

pub use attachment::InMemoryAttachmentIndex;
pub use task::InMemoryTaskRepository;
pub use workflow::InMemoryWorkflowCatalog;
