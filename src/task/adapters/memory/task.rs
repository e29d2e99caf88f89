//! In-memory task repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{EntityRef, Task, TaskId},
    ports::{TaskQuery, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Version checks and writes happen under one write lock, which gives the
/// single-writer-wins semantics the orchestrator relies on.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    entity_index: HashMap<EntityRef, Vec<TaskId>>,
}

impl InMemoryTaskState {
    fn check_new(&self, task: &Task, batch: &[Task]) -> TaskRepositoryResult<()> {
        if self.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        let Some(workflow_id) = task.workflow_id() else {
            return Ok(());
        };
        let stored = self
            .entity_index
            .get(task.owner())
            .into_iter()
            .flatten()
            .filter_map(|id| self.tasks.get(id));
        let taken = stored.chain(batch).any(|other| {
            other.id() != task.id()
                && other.owner() == task.owner()
                && other.workflow_id() == Some(workflow_id)
                && other.sequence_order() == task.sequence_order()
        });
        if taken {
            return Err(TaskRepositoryError::SequenceTaken(task.owner().clone()));
        }
        Ok(())
    }

    fn insert(&mut self, task: &Task) {
        self.entity_index
            .entry(task.owner().clone())
            .or_default()
            .push(task.id());
        self.tasks.insert(task.id(), task.clone());
    }
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<std::sync::RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<std::sync::RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        state.check_new(task, &[])?;
        state.insert(task);
        Ok(())
    }

    async fn store_all(&self, tasks: &[Task]) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        for (position, task) in tasks.iter().enumerate() {
            state.check_new(task, tasks.get(..position).unwrap_or_default())?;
        }
        for task in tasks {
            state.insert(task);
        }
        Ok(())
    }

    async fn update(&self, task: &Task, expected_version: u64) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;

        if stored.version() != expected_version {
            return Err(TaskRepositoryError::VersionConflict {
                task_id: task.id(),
                expected: expected_version,
            });
        }

        // The owner is immutable, so the entity index stays valid.
        *stored = task.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_by_entity(&self, owner: &EntityRef) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = state
            .entity_index
            .get(owner)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.tasks.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        tasks.sort_by_key(Task::sequence_order);
        Ok(tasks)
    }

    async fn query(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(state
            .tasks
            .values()
            .filter(|task| query.matches(task))
            .cloned()
            .collect())
    }
}
