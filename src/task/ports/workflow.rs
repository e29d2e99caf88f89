//! Read-only port for workflow templates.

use crate::task::domain::{WorkflowId, WorkflowTemplate};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for workflow template lookups.
pub type WorkflowReaderResult<T> = Result<T, WorkflowReaderError>;

/// Source of workflow templates. Inactive templates are still returned so
/// callers can tell "inactive" apart from "missing".
#[async_trait]
pub trait WorkflowTemplateReader: Send + Sync {
    /// Finds a template by identifier.
    ///
    /// Returns `None` when the template does not exist.
    async fn find_by_id(&self, id: WorkflowId) -> WorkflowReaderResult<Option<WorkflowTemplate>>;
}

/// Errors returned by workflow template readers.
#[derive(Debug, Clone, Error)]
pub enum WorkflowReaderError {
    /// Persistence-layer failure.
    #[error("workflow lookup failed: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl WorkflowReaderError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
