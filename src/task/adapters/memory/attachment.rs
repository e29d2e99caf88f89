//! In-memory attachment counter.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::TaskId,
    ports::{AttachmentCounter, AttachmentCounterError},
};

/// Thread-safe in-memory attachment index keyed by task.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAttachmentIndex {
    counts: Arc<RwLock<HashMap<TaskId, usize>>>,
}

impl InMemoryAttachmentIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more attachment for the task.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentCounterError::Persistence`] if the lock is
    /// poisoned.
    pub fn attach(&self, task_id: TaskId) -> Result<(), AttachmentCounterError> {
        let mut counts = self.counts.write().map_err(|err| {
            AttachmentCounterError::persistence(std::io::Error::other(err.to_string()))
        })?;
        *counts.entry(task_id).or_default() += 1;
        Ok(())
    }
}

#[async_trait]
impl AttachmentCounter for InMemoryAttachmentIndex {
    async fn count_for_task(&self, task_id: TaskId) -> Result<usize, AttachmentCounterError> {
        let counts = self.counts.read().map_err(|err| {
            AttachmentCounterError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(counts.get(&task_id).copied().unwrap_or_default())
    }
}
