//! HTTP handlers for the task list.
//!
//! Each handler follows the same pipeline: validate the request, call the
//! store, render the resulting state as an ordered [`Fragments`] body.
//! Validation always completes before the first store call.
//!
//! A toggle, edit or delete whose id no longer exists answers `200` with an
//! empty body: the element the client acted on is already stale.
//!
//! Extractor rejections never reach axum's plain-text responses. A query
//! string that does not deserialize selects every task; a form body that
//! does not deserialize is answered with an HTML `400`.

use std::sync::Arc;

use axum::{
    Form,
    extract::{
        Path, Query, State,
        rejection::{FormRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};

use super::error::ApiErrorResponse;
use super::schema::{
    CreateTodoForm, EditTodoForm, FilterQuery, NewTask, ToggleAllForm, parse_filter,
    validate_create, validate_edit, validate_task_id, validate_toggle_all,
};
use crate::domain::{Filter, Namespace, Task, TaskId, TaskKey, TaskPatch};
use crate::infrastructure::{RepositoryError, RepositoryResult, TaskRepository};
use crate::render::{Fragments, index_page, todo_count, todo_item, todo_list};

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
///
/// The repository is a trait object so that the backend chosen by
/// `RepositoryFactory` at startup can be swapped without touching handlers.
#[derive(Clone)]
pub struct AppState {
    /// Task storage.
    pub task_repository: Arc<dyn TaskRepository>,
    /// Namespace every route reads and writes.
    pub namespace: Namespace,
}

impl AppState {
    #[must_use]
    pub fn new(task_repository: Arc<dyn TaskRepository>, namespace: Namespace) -> Self {
        Self {
            task_repository,
            namespace,
        }
    }

    fn key(&self, id: TaskId) -> TaskKey {
        TaskKey::new(self.namespace.clone(), id)
    }

    /// Counts the incomplete tasks of the namespace.
    async fn remaining(&self) -> RepositoryResult<usize> {
        let active = self
            .task_repository
            .list_by_namespace(&self.namespace, Some(false))
            .await?;
        Ok(active.len())
    }
}

// =============================================================================
// Fragment Response
// =============================================================================

/// A `200 text/html` response whose body is the concatenated fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentResponse(pub Fragments);

impl FragmentResponse {
    /// The silent no-op answer for a stale id.
    #[must_use]
    pub const fn empty() -> Self {
        Self(Fragments::new())
    }
}

impl From<Fragments> for FragmentResponse {
    fn from(fragments: Fragments) -> Self {
        Self(fragments)
    }
}

impl IntoResponse for FragmentResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            self.0.into_html(),
        )
            .into_response()
    }
}

type HandlerResult = Result<FragmentResponse, ApiErrorResponse>;

/// Resolves the list filter, falling back to [`Filter::All`] when the query
/// string cannot be deserialized (for example a repeated `filter` key).
fn requested_filter(query: Result<Query<FilterQuery>, QueryRejection>) -> Filter {
    match query {
        Ok(Query(query)) => parse_filter(query.filter.as_deref()),
        Err(rejection) => {
            tracing::debug!(%rejection, "Unreadable query string, showing all tasks");
            Filter::All
        }
    }
}

// =============================================================================
// Page and Health
// =============================================================================

/// `GET /` - the page shell; the list is loaded by the shell itself.
pub async fn index(query: Result<Query<FilterQuery>, QueryRejection>) -> Html<String> {
    Html(index_page(requested_filter(query)))
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}

// =============================================================================
// List
// =============================================================================

/// `GET /todos?filter=` - list fragment for the filter plus the count.
///
/// The count always covers the whole namespace, independent of the filter.
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn list_todos(
    State(state): State<AppState>,
    query: Result<Query<FilterQuery>, QueryRejection>,
) -> HandlerResult {
    let filter = requested_filter(query);

    let tasks = state
        .task_repository
        .list_by_namespace(&state.namespace, filter.completed())
        .await?;
    let remaining = state.remaining().await?;

    tracing::debug!(%filter, listed = tasks.len(), remaining, "Listed tasks");

    Ok(Fragments::new()
        .with(todo_list(&tasks))
        .with(todo_count(remaining))
        .into())
}

// =============================================================================
// Create
// =============================================================================

/// `POST /todos` - appends a task and returns its item plus the count.
///
/// # Errors
///
/// - 400 if the body is not a form, `text` is blank or `id` is not a UUID
/// - 409 if a task with the supplied `id` already exists
/// - 500 if the store fails
pub async fn create_todo(
    State(state): State<AppState>,
    form: Result<Form<CreateTodoForm>, FormRejection>,
) -> HandlerResult {
    let Form(form) = form?;
    let NewTask { id, text } = validate_create(&form)?;
    let task = Task::new(state.namespace.clone(), id, text);

    state.task_repository.create(&task).await?;
    let remaining = state.remaining().await?;

    tracing::info!(key = %task.key(), "Created task");

    Ok(Fragments::new()
        .with(todo_item(&task))
        .with(todo_count(remaining))
        .into())
}

// =============================================================================
// Toggle
// =============================================================================

/// `POST /todos/toggle/{id}` - flips one task and returns its item plus the count.
///
/// # Errors
///
/// - 400 if the id is blank
/// - 500 if the store fails
pub async fn toggle_todo(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    let key = state.key(validate_task_id(&id)?);

    let Some(task) = state.task_repository.get(&key).await? else {
        tracing::debug!(%key, "Toggle of unknown task ignored");
        return Ok(FragmentResponse::empty());
    };

    let updated = match state
        .task_repository
        .update(&key, TaskPatch::completed(!task.completed))
        .await
    {
        Ok(updated) => updated,
        Err(RepositoryError::NotFound(_)) => {
            tracing::debug!(%key, "Task deleted before toggle completed");
            return Ok(FragmentResponse::empty());
        }
        Err(error) => return Err(error.into()),
    };
    let remaining = state.remaining().await?;

    tracing::info!(%key, completed = updated.completed, "Toggled task");

    Ok(Fragments::new()
        .with(todo_item(&updated))
        .with(todo_count(remaining))
        .into())
}

/// `PUT /todos/toggle` - sets every task of the namespace to the same state.
///
/// # Errors
///
/// - 400 if the body is not a form or `allTodosDone` is neither `on` nor `off`
/// - 500 if the store fails or a task vanished during the batch
pub async fn toggle_all(
    State(state): State<AppState>,
    form: Result<Form<ToggleAllForm>, FormRejection>,
) -> HandlerResult {
    let Form(form) = form?;
    let completed = validate_toggle_all(form.all_todos_done.as_deref())?;

    let toggled: Vec<Task> = state
        .task_repository
        .list_by_namespace(&state.namespace, None)
        .await?
        .into_iter()
        .map(|task| task.with_completed(completed))
        .collect();

    state.task_repository.update_many(&toggled).await?;

    let tasks = state
        .task_repository
        .list_by_namespace(&state.namespace, None)
        .await?;
    let remaining = state.remaining().await?;

    tracing::info!(completed, count = toggled.len(), "Toggled all tasks");

    Ok(Fragments::new()
        .with(todo_list(&tasks))
        .with(todo_count(remaining))
        .into())
}

// =============================================================================
// Edit
// =============================================================================

/// `PUT /todos/{id}` - replaces the text of one task and returns its item.
///
/// # Errors
///
/// - 400 if the body is not a form, or the id or `todoText` is blank
/// - 500 if the store fails
pub async fn edit_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: Result<Form<EditTodoForm>, FormRejection>,
) -> HandlerResult {
    let key = state.key(validate_task_id(&id)?);
    let Form(form) = form?;
    let text = validate_edit(&form)?;

    if state.task_repository.get(&key).await?.is_none() {
        tracing::debug!(%key, "Edit of unknown task ignored");
        return Ok(FragmentResponse::empty());
    }

    match state
        .task_repository
        .update(&key, TaskPatch::text(text))
        .await
    {
        Ok(updated) => {
            tracing::info!(%key, "Edited task");
            Ok(Fragments::from(todo_item(&updated)).into())
        }
        Err(RepositoryError::NotFound(_)) => {
            tracing::debug!(%key, "Task deleted before edit completed");
            Ok(FragmentResponse::empty())
        }
        Err(error) => Err(error.into()),
    }
}

// =============================================================================
// Delete
// =============================================================================

/// `DELETE /todos/{id}` (also `POST`) - removes one task and returns the count.
///
/// The primary swap target is the deleted `<li>`, which the empty primary
/// content removes; only the out-of-band count is emitted.
///
/// # Errors
///
/// - 400 if the id is blank
/// - 500 if the store fails
pub async fn delete_todo(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    let key = state.key(validate_task_id(&id)?);

    if !state.task_repository.delete(&key).await? {
        tracing::debug!(%key, "Delete of unknown task ignored");
        return Ok(FragmentResponse::empty());
    }
    let remaining = state.remaining().await?;

    tracing::info!(%key, "Deleted task");

    Ok(Fragments::from(todo_count(remaining)).into())
}

/// `PUT /clear-completed` - deletes every completed task and returns the
/// remaining list plus the count.
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn clear_completed(State(state): State<AppState>) -> HandlerResult {
    let keys: Vec<TaskKey> = state
        .task_repository
        .list_by_namespace(&state.namespace, Some(true))
        .await?
        .iter()
        .map(Task::key)
        .collect();

    let removed = state.task_repository.delete_many(&keys).await?;
    let active = state
        .task_repository
        .list_by_namespace(&state.namespace, Some(false))
        .await?;

    tracing::info!(removed, "Cleared completed tasks");

    Ok(Fragments::new()
        .with(todo_list(&active))
        .with(todo_count(active.len()))
        .into())
}

// =============================================================================
// Tests
// =============================================================================
