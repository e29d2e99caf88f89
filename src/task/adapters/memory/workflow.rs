//! In-memory workflow template catalogue.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{WorkflowId, WorkflowTemplate},
    ports::{WorkflowReaderError, WorkflowReaderResult, WorkflowTemplateReader},
};

/// Thread-safe in-memory workflow template store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkflowCatalog {
    templates: Arc<RwLock<HashMap<WorkflowId, WorkflowTemplate>>>,
}

impl InMemoryWorkflowCatalog {
    /// Creates an empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a template.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowReaderError::Persistence`] if the lock is poisoned.
    pub fn insert(&self, template: WorkflowTemplate) -> WorkflowReaderResult<()> {
        let mut templates = self.templates.write().map_err(|err| {
            WorkflowReaderError::persistence(std::io::Error::other(err.to_string()))
        })?;
        templates.insert(template.id(), template);
        Ok(())
    }
}

#[async_trait]
impl WorkflowTemplateReader for InMemoryWorkflowCatalog {
    async fn find_by_id(&self, id: WorkflowId) -> WorkflowReaderResult<Option<WorkflowTemplate>> {
        let templates = self.templates.read().map_err(|err| {
            WorkflowReaderError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(templates.get(&id).cloned())
    }
}
