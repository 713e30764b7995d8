//! Common test helpers for integration tests.
//!
//! # Note
//!
//! The `#![allow(dead_code)]` attribute is necessary because Rust compiles each
//! integration test file as a separate crate, and not every file uses every helper.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use futures::FutureExt;
use futures::future::BoxFuture;
use http_body_util::BodyExt;
use tower::ServiceExt;

use htmx_todos::api::{AppState, create_router};
use htmx_todos::domain::{Namespace, Task, TaskId, TaskKey, TaskPatch, TaskText};
use htmx_todos::infrastructure::{
    InMemoryTaskRepository, RepositoryError, RepositoryResult, TaskRepository,
};

// =============================================================================
// App Creation Helpers
// =============================================================================

/// Creates a router over the given repository in the default namespace.
pub fn create_test_app(repository: Arc<dyn TaskRepository>) -> Router {
    create_router(
        AppState::new(repository, Namespace::default()),
        "public",
    )
}

/// Creates an in-memory repository holding `tasks`.
pub fn repository_with(tasks: Vec<Task>) -> Arc<InMemoryTaskRepository> {
    Arc::new(InMemoryTaskRepository::with_tasks(tasks))
}

/// Creates a task in the default namespace.
pub fn task(text: &str, completed: bool) -> Task {
    Task::new(
        Namespace::default(),
        TaskId::generate(),
        TaskText::parse(text).unwrap(),
    )
    .with_completed(completed)
}

// =============================================================================
// Request Helpers
// =============================================================================

/// Status and body text of a response.
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

/// Sends a request through a clone of the router.
pub async fn send(app: &Router, method: &str, uri: &str, form: Option<&str>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match form {
        Some(form) => {
            builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            Body::from(form.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|value| value.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    TestResponse {
        status,
        content_type,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

/// Extracts the number inside the remaining-count `<strong>` element.
pub fn remaining_in(body: &str) -> Option<usize> {
    let start = body.find(r#"id="todo-count""#)?;
    let rest = &body[start..];
    let open = rest.find("<strong>")? + "<strong>".len();
    let close = rest.find("</strong>")?;
    rest[open..close].parse().ok()
}

// =============================================================================
// Failing Repository
// =============================================================================

/// A repository whose every operation fails with a database error.
#[derive(Debug, Default)]
pub struct FailingTaskRepository;

fn unavailable<T: Send + 'static>() -> BoxFuture<'static, RepositoryResult<T>> {
    async { Err(RepositoryError::DatabaseError("connection refused".to_string())) }.boxed()
}

impl TaskRepository for FailingTaskRepository {
    fn create(&self, _task: &Task) -> BoxFuture<'static, RepositoryResult<()>> {
        unavailable()
    }

    fn get(&self, _key: &TaskKey) -> BoxFuture<'static, RepositoryResult<Option<Task>>> {
        unavailable()
    }

    fn list_by_namespace(
        &self,
        _namespace: &Namespace,
        _completed: Option<bool>,
    ) -> BoxFuture<'static, RepositoryResult<Vec<Task>>> {
        unavailable()
    }

    fn update(
        &self,
        _key: &TaskKey,
        _patch: TaskPatch,
    ) -> BoxFuture<'static, RepositoryResult<Task>> {
        unavailable()
    }

    fn delete(&self, _key: &TaskKey) -> BoxFuture<'static, RepositoryResult<bool>> {
        unavailable()
    }

    fn delete_many(&self, _keys: &[TaskKey]) -> BoxFuture<'static, RepositoryResult<u64>> {
        unavailable()
    }

    fn update_many(&self, _tasks: &[Task]) -> BoxFuture<'static, RepositoryResult<()>> {
        unavailable()
    }
}

// =============================================================================
// Vanishing Repository
// =============================================================================

/// Wraps an in-memory repository and deletes the first task of every
/// `update_many` batch just before the batch is applied, so the batch
/// always refers to a task that no longer exists.
#[derive(Debug)]
pub struct VanishingTaskRepository {
    pub inner: Arc<InMemoryTaskRepository>,
}

impl VanishingTaskRepository {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            inner: repository_with(tasks),
        }
    }
}

impl TaskRepository for VanishingTaskRepository {
    fn create(&self, task: &Task) -> BoxFuture<'static, RepositoryResult<()>> {
        self.inner.create(task)
    }

    fn get(&self, key: &TaskKey) -> BoxFuture<'static, RepositoryResult<Option<Task>>> {
        self.inner.get(key)
    }

    fn list_by_namespace(
        &self,
        namespace: &Namespace,
        completed: Option<bool>,
    ) -> BoxFuture<'static, RepositoryResult<Vec<Task>>> {
        self.inner.list_by_namespace(namespace, completed)
    }

    fn update(&self, key: &TaskKey, patch: TaskPatch) -> BoxFuture<'static, RepositoryResult<Task>> {
        self.inner.update(key, patch)
    }

    fn delete(&self, key: &TaskKey) -> BoxFuture<'static, RepositoryResult<bool>> {
        self.inner.delete(key)
    }

    fn delete_many(&self, keys: &[TaskKey]) -> BoxFuture<'static, RepositoryResult<u64>> {
        self.inner.delete_many(keys)
    }

    fn update_many(&self, tasks: &[Task]) -> BoxFuture<'static, RepositoryResult<()>> {
        let inner = Arc::clone(&self.inner);
        let victim = tasks.first().map(Task::key);
        let tasks = tasks.to_vec();
        async move {
            if let Some(key) = victim {
                inner.delete(&key).await?;
            }
            inner.update_many(&tasks).await
        }
        .boxed()
    }
}
