//! `PostgreSQL` repository implementation.
//!
//! This module provides a `PostgreSQL`-backed `TaskRepository` using `sqlx`.
//! The table plays the role of a namespaced key-value table: rows are
//! addressed by `(namespace, id)` and scanned per namespace with an optional
//! `completed` predicate.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS todos (
//!     namespace TEXT NOT NULL,
//!     id TEXT NOT NULL,
//!     text TEXT NOT NULL CHECK (text <> ''),
//!     completed BOOLEAN NOT NULL DEFAULT FALSE,
//!     position BIGSERIAL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     PRIMARY KEY (namespace, id)
//! );
//! ```

use futures::FutureExt;
use futures::future::BoxFuture;
use sqlx::PgPool;

use crate::domain::{Namespace, Task, TaskId, TaskKey, TaskPatch, TaskText};
use crate::infrastructure::{RepositoryError, RepositoryResult, TaskRepository};

/// Statement creating the task table when it does not exist yet.
const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS todos (\
     namespace TEXT NOT NULL, \
     id TEXT NOT NULL, \
     text TEXT NOT NULL CHECK (text <> ''), \
     completed BOOLEAN NOT NULL DEFAULT FALSE, \
     position BIGSERIAL, \
     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(), \
     PRIMARY KEY (namespace, id))";

/// SQLSTATE reported by `PostgreSQL` for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Row shape shared by every `SELECT`/`RETURNING` query.
type TaskRow = (String, String, String, bool);

fn database_error(error: &sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(error.to_string())
}

/// Maps a row to a `Task`, rejecting rows that break the non-empty text invariant.
fn task_from_row((namespace, id, text, completed): TaskRow) -> RepositoryResult<Task> {
    let text = TaskText::parse(&text).ok_or_else(|| {
        RepositoryError::SerializationError(format!("empty text stored for {namespace}/{id}"))
    })?;
    Ok(Task::new(Namespace::new(namespace), TaskId::new(id), text).with_completed(completed))
}

fn tasks_from_rows(rows: Vec<TaskRow>) -> RepositoryResult<Vec<Task>> {
    rows.into_iter().map(task_from_row).collect()
}

// =============================================================================
// PostgreSQL Task Repository
// =============================================================================

/// `PostgreSQL` implementation of `TaskRepository`.
///
/// # Example
///
/// ```ignore
/// use htmx_todos::infrastructure::PostgresTaskRepository;
///
/// let pool = PgPool::connect("postgres://localhost/todos").await?;
/// let repository = PostgresTaskRepository::new(pool);
/// repository.ensure_schema().await?;
/// repository.create(&task).await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    /// Connection pool for `PostgreSQL`.
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new `PostgreSQL` task repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `todos` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if the statement fails.
    pub async fn ensure_schema(&self) -> RepositoryResult<()> {
        sqlx::query(CREATE_TABLE_SQL)
            .execute(&self.pool)
            .await
            .map_err(|error| database_error(&error))?;
        Ok(())
    }
}

impl TaskRepository for PostgresTaskRepository {
    fn create(&self, task: &Task) -> BoxFuture<'static, RepositoryResult<()>> {
        let pool = self.pool.clone();
        let task = task.clone();

        async move {
            let result = sqlx::query(
                "INSERT INTO todos (namespace, id, text, completed) VALUES ($1, $2, $3, $4)",
            )
            .bind(task.namespace.as_str())
            .bind(task.id.as_str())
            .bind(task.text.as_str())
            .bind(task.completed)
            .execute(&pool)
            .await;

            match result {
                Ok(_) => Ok(()),
                Err(sqlx::Error::Database(error))
                    if error.code().as_deref() == Some(UNIQUE_VIOLATION) =>
                {
                    Err(RepositoryError::Conflict(task.key().to_string()))
                }
                Err(error) => Err(database_error(&error)),
            }
        }
        .boxed()
    }

    fn get(&self, key: &TaskKey) -> BoxFuture<'static, RepositoryResult<Option<Task>>> {
        let pool = self.pool.clone();
        let key = key.clone();

        async move {
            let row: Option<TaskRow> = sqlx::query_as(
                "SELECT namespace, id, text, completed FROM todos \
                 WHERE namespace = $1 AND id = $2",
            )
            .bind(key.namespace.as_str())
            .bind(key.id.as_str())
            .fetch_optional(&pool)
            .await
            .map_err(|error| database_error(&error))?;

            row.map(task_from_row).transpose()
        }
        .boxed()
    }

    fn list_by_namespace(
        &self,
        namespace: &Namespace,
        completed: Option<bool>,
    ) -> BoxFuture<'static, RepositoryResult<Vec<Task>>> {
        let pool = self.pool.clone();
        let namespace = namespace.clone();

        async move {
            // A NULL filter matches every row.
            let rows: Vec<TaskRow> = sqlx::query_as(
                "SELECT namespace, id, text, completed FROM todos \
                 WHERE namespace = $1 AND ($2::BOOLEAN IS NULL OR completed = $2) \
                 ORDER BY position ASC",
            )
            .bind(namespace.as_str())
            .bind(completed)
            .fetch_all(&pool)
            .await
            .map_err(|error| database_error(&error))?;

            tasks_from_rows(rows)
        }
        .boxed()
    }

    fn update(
        &self,
        key: &TaskKey,
        patch: TaskPatch,
    ) -> BoxFuture<'static, RepositoryResult<Task>> {
        let pool = self.pool.clone();
        let key = key.clone();

        async move {
            // Single statement: the row lock makes the merge atomic per key.
            let row: Option<TaskRow> = sqlx::query_as(
                "UPDATE todos SET text = COALESCE($3, text), completed = COALESCE($4, completed) \
                 WHERE namespace = $1 AND id = $2 \
                 RETURNING namespace, id, text, completed",
            )
            .bind(key.namespace.as_str())
            .bind(key.id.as_str())
            .bind(patch.text.map(TaskText::into_inner))
            .bind(patch.completed)
            .fetch_optional(&pool)
            .await
            .map_err(|error| database_error(&error))?;

            row.map_or_else(
                || Err(RepositoryError::NotFound(key.to_string())),
                task_from_row,
            )
        }
        .boxed()
    }

    fn delete(&self, key: &TaskKey) -> BoxFuture<'static, RepositoryResult<bool>> {
        let pool = self.pool.clone();
        let key = key.clone();

        async move {
            let result = sqlx::query("DELETE FROM todos WHERE namespace = $1 AND id = $2")
                .bind(key.namespace.as_str())
                .bind(key.id.as_str())
                .execute(&pool)
                .await
                .map_err(|error| database_error(&error))?;

            Ok(result.rows_affected() > 0)
        }
        .boxed()
    }

    fn delete_many(&self, keys: &[TaskKey]) -> BoxFuture<'static, RepositoryResult<u64>> {
        let pool = self.pool.clone();
        let keys = keys.to_vec();

        async move {
            if keys.is_empty() {
                return Ok(0);
            }

            let namespaces: Vec<String> = keys
                .iter()
                .map(|key| key.namespace.as_str().to_string())
                .collect();
            let ids: Vec<String> = keys.iter().map(|key| key.id.as_str().to_string()).collect();

            let result = sqlx::query(
                "DELETE FROM todos USING UNNEST($1::TEXT[], $2::TEXT[]) AS doomed(namespace, id) \
                 WHERE todos.namespace = doomed.namespace AND todos.id = doomed.id",
            )
            .bind(namespaces)
            .bind(ids)
            .execute(&pool)
            .await
            .map_err(|error| database_error(&error))?;

            Ok(result.rows_affected())
        }
        .boxed()
    }

    fn update_many(&self, tasks: &[Task]) -> BoxFuture<'static, RepositoryResult<()>> {
        let pool = self.pool.clone();
        let tasks = tasks.to_vec();

        async move {
            if tasks.is_empty() {
                return Ok(());
            }

            let mut transaction = pool.begin().await.map_err(|error| database_error(&error))?;
            let mut failed = Vec::new();

            for task in &tasks {
                let result = sqlx::query(
                    "UPDATE todos SET text = $3, completed = $4 WHERE namespace = $1 AND id = $2",
                )
                .bind(task.namespace.as_str())
                .bind(task.id.as_str())
                .bind(task.text.as_str())
                .bind(task.completed)
                .execute(&mut *transaction)
                .await
                .map_err(|error| database_error(&error))?;

                if result.rows_affected() == 0 {
                    failed.push(task.key().to_string());
                }
            }

            if !failed.is_empty() {
                transaction
                    .rollback()
                    .await
                    .map_err(|error| database_error(&error))?;
                return Err(RepositoryError::PartialBatch { failed });
            }

            transaction
                .commit()
                .await
                .map_err(|error| database_error(&error))?;

            Ok(())
        }
        .boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================
