//! Application services for task orchestration.

mod config;
mod error;
mod orchestrator;
mod registry;
mod requests;

pub use config::TaskServiceConfig;
pub use error::{ErrorCategory, LifecycleHook, TaskServiceError, TaskServiceResult};
pub use orchestrator::TaskService;
pub use registry::{AdapterRegistryError, EntityAdapterRegistry, EntityAdapterRegistryBuilder};
pub use requests::{
    BulkCompletionItem, BulkItemOutcome, BulkReport, CreateTaskRequest, TaskFilter,
};
