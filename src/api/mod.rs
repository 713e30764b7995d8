//! API module for HTTP handlers.
//!
//! This module contains route definitions, request validation and the
//! handlers that turn store state into HTML fragments.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod schema;

pub use error::{ApiErrorResponse, FieldError, ValidationError};
pub use handlers::{
    AppState, FragmentResponse, clear_completed, create_todo, delete_todo, edit_todo, health,
    index, list_todos, toggle_all, toggle_todo,
};
pub use routes::create_router;
pub use schema::{
    CreateTodoForm, EditTodoForm, FilterQuery, NewTask, ToggleAllForm, parse_filter,
    validate_create, validate_edit, validate_task_id, validate_toggle_all,
};
