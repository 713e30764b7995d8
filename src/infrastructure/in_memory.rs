//! In-memory repository implementation.
//!
//! Suitable for local development and tests. Each namespace is a table
//! ordered by an insertion sequence so listing is stable across reads.
//!
//! # Features
//!
//! - Thread-safe with `Arc<RwLock<...>>`
//! - Every operation takes the lock once, so single-key updates are atomic
//! - `update_many` checks every key before writing anything

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::domain::{Namespace, Task, TaskId, TaskKey, TaskPatch};
use crate::infrastructure::{RepositoryError, RepositoryResult, TaskRepository};

// =============================================================================
// Namespace Table
// =============================================================================

/// Tasks of one namespace, keyed by insertion sequence.
#[derive(Debug, Default)]
struct NamespaceTable {
    /// Sequence number handed to the next inserted task.
    next_sequence: u64,
    /// Rows in insertion order.
    rows: BTreeMap<u64, Task>,
    /// Id to sequence lookup.
    index: HashMap<TaskId, u64>,
}

impl NamespaceTable {
    fn get(&self, id: &TaskId) -> Option<&Task> {
        self.index.get(id).and_then(|sequence| self.rows.get(sequence))
    }

    fn get_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        let sequence = *self.index.get(id)?;
        self.rows.get_mut(&sequence)
    }

    fn insert(&mut self, task: Task) -> bool {
        if self.index.contains_key(&task.id) {
            return false;
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.index.insert(task.id.clone(), sequence);
        self.rows.insert(sequence, task);
        true
    }

    fn remove(&mut self, id: &TaskId) -> bool {
        self.index
            .remove(id)
            .and_then(|sequence| self.rows.remove(&sequence))
            .is_some()
    }

    fn list(&self, completed: Option<bool>) -> Vec<Task> {
        self.rows
            .values()
            .filter(|task| completed.is_none_or(|flag| task.completed == flag))
            .cloned()
            .collect()
    }
}

type Tables = HashMap<Namespace, NamespaceTable>;

// =============================================================================
// In-Memory Task Repository
// =============================================================================

/// In-memory implementation of `TaskRepository`.
///
/// # Example
///
/// ```ignore
/// use htmx_todos::infrastructure::InMemoryTaskRepository;
///
/// let repository = InMemoryTaskRepository::new();
/// repository.create(&task).await?;
/// let found = repository.get(&task.key()).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryTaskRepository {
    /// Creates a new empty in-memory task repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with the given tasks.
    ///
    /// Tasks whose key is already taken are skipped.
    #[must_use]
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut tables = Tables::new();
        for task in tasks {
            tables
                .entry(task.namespace.clone())
                .or_default()
                .insert(task);
        }
        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }
}

#[allow(clippy::significant_drop_tightening)]
impl TaskRepository for InMemoryTaskRepository {
    fn create(&self, task: &Task) -> BoxFuture<'static, RepositoryResult<()>> {
        let tables = Arc::clone(&self.tables);
        let task = task.clone();
        async move {
            let mut guard = tables.write().await;
            let key = task.key();
            if guard.entry(task.namespace.clone()).or_default().insert(task) {
                Ok(())
            } else {
                Err(RepositoryError::Conflict(key.to_string()))
            }
        }
        .boxed()
    }

    fn get(&self, key: &TaskKey) -> BoxFuture<'static, RepositoryResult<Option<Task>>> {
        let tables = Arc::clone(&self.tables);
        let key = key.clone();
        async move {
            let guard = tables.read().await;
            Ok(guard
                .get(&key.namespace)
                .and_then(|table| table.get(&key.id))
                .cloned())
        }
        .boxed()
    }

    fn list_by_namespace(
        &self,
        namespace: &Namespace,
        completed: Option<bool>,
    ) -> BoxFuture<'static, RepositoryResult<Vec<Task>>> {
        let tables = Arc::clone(&self.tables);
        let namespace = namespace.clone();
        async move {
            let guard = tables.read().await;
            Ok(guard
                .get(&namespace)
                .map(|table| table.list(completed))
                .unwrap_or_default())
        }
        .boxed()
    }

    fn update(
        &self,
        key: &TaskKey,
        patch: TaskPatch,
    ) -> BoxFuture<'static, RepositoryResult<Task>> {
        let tables = Arc::clone(&self.tables);
        let key = key.clone();
        async move {
            let mut guard = tables.write().await;
            let slot = guard
                .get_mut(&key.namespace)
                .and_then(|table| table.get_mut(&key.id))
                .ok_or_else(|| RepositoryError::NotFound(key.to_string()))?;
            let updated = slot.clone().apply(patch);
            *slot = updated.clone();
            Ok(updated)
        }
        .boxed()
    }

    fn delete(&self, key: &TaskKey) -> BoxFuture<'static, RepositoryResult<bool>> {
        let tables = Arc::clone(&self.tables);
        let key = key.clone();
        async move {
            let mut guard = tables.write().await;
            Ok(guard
                .get_mut(&key.namespace)
                .is_some_and(|table| table.remove(&key.id)))
        }
        .boxed()
    }

    fn delete_many(&self, keys: &[TaskKey]) -> BoxFuture<'static, RepositoryResult<u64>> {
        let tables = Arc::clone(&self.tables);
        let keys = keys.to_vec();
        async move {
            let mut guard = tables.write().await;
            let removed = keys
                .iter()
                .filter(|key| {
                    guard
                        .get_mut(&key.namespace)
                        .is_some_and(|table| table.remove(&key.id))
                })
                .count();
            Ok(removed as u64)
        }
        .boxed()
    }

    fn update_many(&self, tasks: &[Task]) -> BoxFuture<'static, RepositoryResult<()>> {
        let tables = Arc::clone(&self.tables);
        let tasks = tasks.to_vec();
        async move {
            let mut guard = tables.write().await;

            let failed: Vec<String> = tasks
                .iter()
                .filter(|task| {
                    guard
                        .get(&task.namespace)
                        .and_then(|table| table.get(&task.id))
                        .is_none()
                })
                .map(|task| task.key().to_string())
                .collect();

            if !failed.is_empty() {
                return Err(RepositoryError::PartialBatch { failed });
            }

            for task in tasks {
                if let Some(slot) = guard
                    .get_mut(&task.namespace)
                    .and_then(|table| table.get_mut(&task.id))
                {
                    *slot = task;
                }
            }
            Ok(())
        }
        .boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================
