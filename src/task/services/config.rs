//! Task service configuration.

use crate::task::domain::TaskStatus;
use serde::{Deserialize, Serialize};

/// Tunables for the task service.
///
/// # Examples
///
/// ```
/// use checklist::task::services::TaskServiceConfig;
///
/// let config = TaskServiceConfig::default();
/// assert_eq!(config.min_completion_notes_len, 10);
///
/// let parsed: TaskServiceConfig =
///     serde_json::from_str(r#"{"min_completion_notes_len": 4}"#).expect("valid config");
/// assert_eq!(parsed.min_completion_notes_len, 4);
/// assert_eq!(parsed.default_statuses.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskServiceConfig {
    /// Minimum length of trimmed completion notes, in characters.
    pub min_completion_notes_len: usize,
    /// Statuses listed when a task filter names none.
    pub default_statuses: Vec<TaskStatus>,
}

impl Default for TaskServiceConfig {
    fn default() -> Self {
        Self {
            min_completion_notes_len: 10,
            default_statuses: TaskStatus::ACTIVE.to_vec(),
        }
    }
}

impl TaskServiceConfig {
    /// Creates a lenient configuration that accepts any non-empty note.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            min_completion_notes_len: 1,
            ..Default::default()
        }
    }

    /// Creates a strict configuration demanding descriptive notes.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            min_completion_notes_len: 25,
            ..Default::default()
        }
    }
}
