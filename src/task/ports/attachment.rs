//! Port for counting attachments linked to a task.

use crate::task::domain::TaskId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Read access to the attachment store, used for photo requirements.
#[async_trait]
pub trait AttachmentCounter: Send + Sync {
    /// Returns the number of attachments linked to the task.
    async fn count_for_task(&self, task_id: TaskId) -> Result<usize, AttachmentCounterError>;
}

/// Errors returned by attachment counters.
#[derive(Debug, Clone, Error)]
pub enum AttachmentCounterError {
    /// Persistence-layer failure.
    #[error("attachment lookup failed: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AttachmentCounterError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
