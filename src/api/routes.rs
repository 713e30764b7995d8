//! Routing definitions.
//!
//! Wires every route of the task list to its handler and adds request
//! tracing plus the static asset directory.

use std::path::Path;

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers::{
    self, AppState, clear_completed, create_todo, delete_todo, edit_todo, list_todos,
    toggle_all, toggle_todo,
};

/// Creates the application router.
///
/// # Arguments
///
/// * `state` - Shared repository handle and namespace
/// * `static_dir` - Directory served under `/static`
///
/// # Examples
///
/// ```ignore
/// let router = create_router(AppState::new(repository, Namespace::default()), "public");
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, router).await?;
/// ```
pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/todos", get(list_todos).post(create_todo))
        // Static segment wins over the `{id}` capture.
        .route("/todos/toggle", put(toggle_all))
        .route("/todos/toggle/{id}", post(toggle_todo))
        .route(
            "/todos/{id}",
            put(edit_todo).delete(delete_todo).post(delete_todo),
        )
        .route("/clear-completed", put(clear_completed))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Tests
// =============================================================================
