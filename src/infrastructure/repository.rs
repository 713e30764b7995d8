//! Repository trait for task storage.
//!
//! The store is addressed by `(namespace, id)` and owns nothing but the
//! correctness of per-key reads and writes. Filtering is limited to the one
//! `completed` predicate every route needs.
//!
//! All methods return a boxed `'static` future so that backends can be
//! selected at runtime and held as `Arc<dyn TaskRepository>`.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{Namespace, Task, TaskKey, TaskPatch};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No record exists at the given key.
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// A record already exists at the given key.
    #[error("Entity already exists: {0}")]
    Conflict(String),

    /// Some items of a batch operation could not be applied.
    #[error("Batch operation failed for {} item(s): {}", .failed.len(), .failed.join(", "))]
    PartialBatch {
        /// Keys of the items that failed.
        failed: Vec<String>,
    },

    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Row could not be mapped to a task.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type returned by every repository future.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

// =============================================================================
// Task Repository
// =============================================================================

/// Repository trait for `Task` records.
///
/// # Example
///
/// ```ignore
/// let repository: Arc<dyn TaskRepository> = Arc::new(InMemoryTaskRepository::new());
///
/// repository.create(&task).await?;
/// let active = repository
///     .list_by_namespace(&task.namespace, Some(false))
///     .await?;
/// ```
pub trait TaskRepository: Send + Sync {
    /// Persists a new task.
    ///
    /// The task is expected to be validated already. Only storage-level
    /// constraints are checked: an existing record at the same key yields
    /// `RepositoryError::Conflict`.
    fn create(&self, task: &Task) -> BoxFuture<'static, RepositoryResult<()>>;

    /// Finds a task by key.
    ///
    /// Returns `Ok(None)` if no such task exists. Not-found is a normal outcome.
    fn get(&self, key: &TaskKey) -> BoxFuture<'static, RepositoryResult<Option<Task>>>;

    /// Lists the tasks of a namespace in insertion order.
    ///
    /// With `completed = Some(flag)` only tasks whose completion flag equals
    /// `flag` are returned.
    fn list_by_namespace(
        &self,
        namespace: &Namespace,
        completed: Option<bool>,
    ) -> BoxFuture<'static, RepositoryResult<Vec<Task>>>;

    /// Merges a partial update into an existing task and returns the result.
    ///
    /// The read-modify-write is atomic per key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no task exists at the key.
    fn update(&self, key: &TaskKey, patch: TaskPatch)
    -> BoxFuture<'static, RepositoryResult<Task>>;

    /// Deletes a task.
    ///
    /// Returns `Ok(true)` if a task was removed and `Ok(false)` if the key
    /// did not exist. Deleting a missing key is not an error.
    fn delete(&self, key: &TaskKey) -> BoxFuture<'static, RepositoryResult<bool>>;

    /// Deletes several tasks, ignoring missing keys.
    ///
    /// Returns the number of tasks actually removed.
    fn delete_many(&self, keys: &[TaskKey]) -> BoxFuture<'static, RepositoryResult<u64>>;

    /// Replaces several existing tasks.
    ///
    /// Either every record is written or none is, in which case the keys
    /// that could not be written are reported through
    /// `RepositoryError::PartialBatch`.
    fn update_many(&self, tasks: &[Task]) -> BoxFuture<'static, RepositoryResult<()>>;
}

// =============================================================================
// Tests
// =============================================================================
