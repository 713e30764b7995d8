//! Request shapes and their validators.
//!
//! Every inbound value is normalized here before a handler touches the
//! store:
//!
//! | Input | Rule |
//! |---|---|
//! | `text`, `todoText` | trimmed, must not be empty |
//! | `id` (create) | optional; blank means "generate", otherwise must be a UUID |
//! | `filter` | `all` / `active` / `completed`, anything else means `all` |
//! | `allTodosDone` | `on` sets, `off` or absent clears, anything else is rejected |
//! | `{id}` path parameter | trimmed, must not be empty |

use serde::Deserialize;
use uuid::Uuid;

use super::error::{FieldError, ValidationError};
use crate::domain::{Filter, TaskId, TaskText};

// =============================================================================
// Request Shapes
// =============================================================================

/// Form body of `POST /todos`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTodoForm {
    /// Label of the new task.
    #[serde(default)]
    pub text: Option<String>,
    /// Client-chosen identifier.
    #[serde(default)]
    pub id: Option<String>,
}

/// Query string of the list routes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterQuery {
    /// `all`, `active` or `completed`; see [`parse_filter`].
    #[serde(default)]
    pub filter: Option<String>,
}

/// Form body of `PUT /todos/toggle`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToggleAllForm {
    /// Checkbox value; an unchecked box omits the field.
    #[serde(default, rename = "allTodosDone")]
    pub all_todos_done: Option<String>,
}

/// Form body of `PUT /todos/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditTodoForm {
    /// Replacement label.
    #[serde(default, rename = "todoText")]
    pub todo_text: Option<String>,
}

/// A validated creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Client-supplied UUID, or a generated one.
    pub id: TaskId,
    /// Trimmed, non-empty label.
    pub text: TaskText,
}

// =============================================================================
// Validators
// =============================================================================

fn required_text(field: &str, raw: Option<&str>) -> Result<TaskText, FieldError> {
    raw.and_then(TaskText::parse)
        .ok_or_else(|| FieldError::new(field, "Task text must not be empty."))
}

/// Validates the creation form.
///
/// A missing or blank `id` yields a freshly generated one. Errors for
/// `text` and `id` are collected together.
///
/// # Errors
///
/// Returns `ValidationError` if `text` is blank or `id` is not a UUID.
pub fn validate_create(form: &CreateTodoForm) -> Result<NewTask, ValidationError> {
    let text = required_text("text", form.text.as_deref());

    let id = match form.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        None => Ok(TaskId::generate()),
        Some(raw) => Uuid::parse_str(raw)
            .map(TaskId::from_uuid)
            .map_err(|_| FieldError::new("id", "Task id must be a UUID.")),
    };

    match (text, id) {
        (Ok(text), Ok(id)) => Ok(NewTask { id, text }),
        (text, id) => Err(ValidationError::new(
            [text.err(), id.err()].into_iter().flatten().collect(),
        )),
    }
}

/// Parses the list filter. Absent or unknown values select every task.
#[must_use]
pub fn parse_filter(raw: Option<&str>) -> Filter {
    match raw {
        Some("active") => Filter::Active,
        Some("completed") => Filter::Completed,
        _ => Filter::All,
    }
}

/// Validates the toggle-all value and returns the completion flag to set.
///
/// # Errors
///
/// Returns `ValidationError` for any value other than `on`, `off` or blank.
pub fn validate_toggle_all(raw: Option<&str>) -> Result<bool, ValidationError> {
    match raw.map(str::trim) {
        Some("on") => Ok(true),
        None | Some("" | "off") => Ok(false),
        Some(_) => Err(ValidationError::single(
            "allTodosDone",
            "Toggle-all value must be 'on' or 'off'.",
        )),
    }
}

/// Validates the `{id}` path parameter.
///
/// Any non-blank string is accepted, so that ids created elsewhere still
/// resolve; whether the id exists is the store's concern.
///
/// # Errors
///
/// Returns `ValidationError` if the parameter is blank.
pub fn validate_task_id(raw: &str) -> Result<TaskId, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::single("id", "Task id must not be empty."));
    }
    Ok(TaskId::new(trimmed))
}

/// Validates the replacement text of an edit.
///
/// # Errors
///
/// Returns `ValidationError` if `todoText` is absent or blank.
pub fn validate_edit(form: &EditTodoForm) -> Result<TaskText, ValidationError> {
    required_text("todoText", form.todo_text.as_deref())
        .map_err(|error| ValidationError::new(vec![error]))
}

// =============================================================================
// Tests
// =============================================================================
