//! End-to-end tests of the fragment protocol through the router.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use rstest::rstest;

use common::{
    FailingTaskRepository, VanishingTaskRepository, create_test_app, remaining_in,
    repository_with, send, task,
};
use htmx_todos::domain::{Namespace, Task};
use htmx_todos::infrastructure::TaskRepository;

async fn stored(repository: &dyn TaskRepository) -> Vec<Task> {
    repository
        .list_by_namespace(&Namespace::default(), None)
        .await
        .unwrap()
}

/// Pulls the `id="todo-..."` value of the first item in `body`.
fn first_item_id(body: &str) -> String {
    let start = body.find(r#"<li id="todo-"#).unwrap() + r#"<li id="todo-"#.len();
    let end = start + body[start..].find('"').unwrap();
    body[start..end].to_string()
}

// =============================================================================
// Scenario
// =============================================================================

#[rstest]
#[tokio::test]
async fn create_toggle_delete_scenario() {
    let repository = repository_with(Vec::new());
    let app = create_test_app(repository.clone());

    let created = send(&app, "POST", "/todos", Some("text=Buy+milk")).await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(
        created.content_type.as_deref(),
        Some("text/html; charset=utf-8")
    );
    assert!(created.body.contains("<label>Buy milk</label>"));
    assert!(!created.body.contains(r#"type="checkbox" checked"#));
    assert_eq!(remaining_in(&created.body), Some(1));
    assert!(created.body.contains("<strong>1</strong> item left"));

    let id = first_item_id(&created.body);

    let toggled = send(&app, "POST", &format!("/todos/toggle/{id}"), None).await;
    assert_eq!(toggled.status, StatusCode::OK);
    assert!(toggled.body.contains(r#"class="toggle" type="checkbox" checked"#));
    assert_eq!(remaining_in(&toggled.body), Some(0));

    let missing = send(&app, "DELETE", "/todos/does-not-exist", None).await;
    assert_eq!(missing.status, StatusCode::OK);
    assert_eq!(missing.body, "");
    assert_eq!(stored(&*repository).await.len(), 1);

    let deleted = send(&app, "DELETE", &format!("/todos/{id}"), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert!(!deleted.body.contains("<li"));
    assert_eq!(remaining_in(&deleted.body), Some(0));
    assert!(stored(&*repository).await.is_empty());
}

#[rstest]
#[tokio::test]
async fn delete_also_accepts_post() {
    let doomed = task("Learn Vim", true);
    let repository = repository_with(vec![task("Learn HTMX", false), doomed.clone()]);
    let app = create_test_app(repository.clone());

    let response = send(&app, "POST", &format!("/todos/{}", doomed.id), None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(remaining_in(&response.body), Some(1));
    assert_eq!(stored(&*repository).await.len(), 1);
}

#[rstest]
#[tokio::test]
async fn toggling_twice_restores_state() {
    let original = task("Learn HTMX", false);
    let repository = repository_with(vec![original.clone()]);
    let app = create_test_app(repository.clone());
    let uri = format!("/todos/toggle/{}", original.id);

    send(&app, "POST", &uri, None).await;
    let second = send(&app, "POST", &uri, None).await;

    assert_eq!(remaining_in(&second.body), Some(1));
    assert_eq!(stored(&*repository).await, vec![original]);
}

// =============================================================================
// Missing ids
// =============================================================================

#[rstest]
#[case("POST", "/todos/toggle/unknown", None)]
#[case("PUT", "/todos/unknown", Some("todoText=Renamed"))]
#[case("DELETE", "/todos/unknown", None)]
#[case("POST", "/todos/unknown", None)]
#[tokio::test]
async fn missing_id_is_a_silent_no_op(
    #[case] method: &str,
    #[case] uri: &str,
    #[case] form: Option<&str>,
) {
    let existing = task("Learn HTMX", false);
    let repository = repository_with(vec![existing.clone()]);
    let app = create_test_app(repository.clone());

    let response = send(&app, method, uri, form).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "");
    assert_eq!(stored(&*repository).await, vec![existing]);
}

// =============================================================================
// Edit
// =============================================================================

#[rstest]
#[tokio::test]
async fn edit_replaces_text_and_returns_item_only() {
    let original = task("Learn HTMX", true);
    let repository = repository_with(vec![original.clone()]);
    let app = create_test_app(repository.clone());

    let response = send(
        &app,
        "PUT",
        &format!("/todos/{}", original.id),
        Some("todoText=%3Cem%3ELearn+htmx+well%3C%2Fem%3E"),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.starts_with(&format!(r#"<li id="todo-{}""#, original.id)));
    assert!(response.body.contains("<label>&lt;em&gt;Learn htmx well&lt;/em&gt;</label>"));
    assert_eq!(remaining_in(&response.body), None);

    let tasks = stored(&*repository).await;
    assert_eq!(tasks[0].text.as_str(), "<em>Learn htmx well</em>");
    assert!(tasks[0].completed);
}

#[rstest]
#[case("")]
#[case("todoText=")]
#[case("todoText=+++")]
#[tokio::test]
async fn edit_with_blank_text_is_rejected(#[case] form: &str) {
    let original = task("Learn HTMX", false);
    let repository = repository_with(vec![original.clone()]);
    let app = create_test_app(repository.clone());

    let response = send(&app, "PUT", &format!("/todos/{}", original.id), Some(form)).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body.contains(r#"class="error""#));
    assert_eq!(stored(&*repository).await, vec![original]);
}

// =============================================================================
// Create
// =============================================================================

#[rstest]
#[case("")]
#[case("text=")]
#[case("text=%20%20")]
#[case("text=Buy+milk&id=not-a-uuid")]
#[tokio::test]
async fn invalid_create_is_rejected_before_storage(#[case] form: &str) {
    let repository = repository_with(Vec::new());
    let app = create_test_app(repository.clone());

    let response = send(&app, "POST", "/todos", Some(form)).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(stored(&*repository).await.is_empty());
}

#[rstest]
#[tokio::test]
async fn create_with_client_id_and_duplicate() {
    let repository = repository_with(Vec::new());
    let app = create_test_app(repository.clone());
    let form = "text=Buy+milk&id=67e55044-10b1-426f-9247-bb680e5fe0c8";

    let first = send(&app, "POST", "/todos", Some(form)).await;
    assert_eq!(first.status, StatusCode::OK);
    assert!(first.body.contains(r#"id="todo-67e55044-10b1-426f-9247-bb680e5fe0c8""#));

    let second = send(&app, "POST", "/todos", Some(form)).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(stored(&*repository).await.len(), 1);
}

#[rstest]
#[tokio::test]
async fn created_ids_are_unique_and_tasks_start_active() {
    let repository = repository_with(Vec::new());
    let app = create_test_app(repository.clone());

    for _ in 0..5 {
        send(&app, "POST", "/todos", Some("text=Same+text")).await;
    }

    let tasks = stored(&*repository).await;
    let mut ids: Vec<&str> = tasks.iter().map(|task| task.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 5);
    assert!(tasks.iter().all(|task| !task.completed));
}

// =============================================================================
// List and filters
// =============================================================================

#[rstest]
#[case("/todos", &["Learn HTMX", "Learn Vim"])]
#[case("/todos?filter=all", &["Learn HTMX", "Learn Vim"])]
#[case("/todos?filter=active", &["Learn HTMX"])]
#[case("/todos?filter=completed", &["Learn Vim"])]
#[case("/todos?filter=bogus", &["Learn HTMX", "Learn Vim"])]
#[tokio::test]
async fn list_respects_filter(#[case] uri: &str, #[case] expected: &[&str]) {
    let repository = repository_with(vec![task("Learn HTMX", false), task("Learn Vim", true)]);
    let app = create_test_app(repository);

    let response = send(&app, "GET", uri, None).await;

    assert_eq!(response.status, StatusCode::OK);
    for text in ["Learn HTMX", "Learn Vim"] {
        assert_eq!(
            response.body.contains(&format!("<label>{text}</label>")),
            expected.contains(&text),
            "{uri}: {text}"
        );
    }
    assert_eq!(remaining_in(&response.body), Some(1));
}

#[rstest]
#[case("/todos?filter=active&filter=completed")]
#[case("/todos?filter=%FF")]
#[tokio::test]
async fn unreadable_filter_query_lists_everything(#[case] uri: &str) {
    let repository = repository_with(vec![task("Learn HTMX", false), task("Learn Vim", true)]);
    let app = create_test_app(repository);

    let response = send(&app, "GET", uri, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.content_type.as_deref(),
        Some("text/html; charset=utf-8")
    );
    assert!(response.body.contains("<label>Learn HTMX</label>"));
    assert!(response.body.contains("<label>Learn Vim</label>"));
    assert_eq!(remaining_in(&response.body), Some(1));
}

#[rstest]
#[tokio::test]
async fn page_shell_with_repeated_filter_falls_back_to_all() {
    let app = create_test_app(repository_with(Vec::new()));

    let response = send(&app, "GET", "/?filter=active&filter=completed", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(r#"hx-get="/todos?filter=all""#));
}

#[rstest]
#[tokio::test]
async fn list_preserves_insertion_order() {
    let repository = repository_with(Vec::new());
    let app = create_test_app(repository);

    for text in ["first", "second", "third"] {
        send(&app, "POST", "/todos", Some(&format!("text={text}"))).await;
    }
    let body = send(&app, "GET", "/todos", None).await.body;

    let positions: Vec<usize> = ["first", "second", "third"]
        .iter()
        .map(|text| body.find(&format!("<label>{text}</label>")).unwrap())
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
}

// =============================================================================
// Toggle all and clear completed
// =============================================================================

#[rstest]
#[case("allTodosDone=on", true)]
#[case("allTodosDone=off", false)]
#[case("", false)]
#[tokio::test]
async fn toggle_all_sets_every_task(#[case] form: &str, #[case] completed: bool) {
    let repository = repository_with(vec![
        task("a", false),
        task("b", true),
        task("c", false),
    ]);
    let app = create_test_app(repository.clone());

    let response = send(&app, "PUT", "/todos/toggle", Some(form)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response
            .body
            .contains(r#"class="toggle-all" type="checkbox" checked"#),
        completed
    );
    assert_eq!(remaining_in(&response.body), Some(if completed { 0 } else { 3 }));
    assert!(
        stored(&*repository)
            .await
            .iter()
            .all(|task| task.completed == completed)
    );
}

#[rstest]
#[tokio::test]
async fn toggle_all_rejects_unknown_value() {
    let original = vec![task("a", false)];
    let repository = repository_with(original.clone());
    let app = create_test_app(repository.clone());

    let response = send(&app, "PUT", "/todos/toggle", Some("allTodosDone=maybe")).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(stored(&*repository).await, original);
}

#[rstest]
#[tokio::test]
async fn toggle_all_reports_vanished_task_without_partial_update() {
    let repository = Arc::new(VanishingTaskRepository::new(vec![
        task("a", false),
        task("b", false),
    ]));
    let app = create_test_app(repository.clone());

    let response = send(&app, "PUT", "/todos/toggle", Some("allTodosDone=on")).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.content_type.as_deref(),
        Some("text/html; charset=utf-8")
    );
    assert!(response.body.contains(r#"<p class="error" role="alert">"#));
    assert!(!response.body.contains("todo-count"));

    let remaining = stored(&*repository.inner).await;
    assert_eq!(remaining.len(), 1);
    assert!(!remaining[0].completed);
}

#[rstest]
#[tokio::test]
async fn clear_completed_removes_only_completed() {
    let repository = repository_with(vec![
        task("Learn HTMX", false),
        task("Learn Vim", true),
        task("Learn Rust", true),
    ]);
    let app = create_test_app(repository.clone());

    let response = send(&app, "PUT", "/clear-completed", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("<label>Learn HTMX</label>"));
    assert!(!response.body.contains("Learn Vim"));
    assert_eq!(remaining_in(&response.body), Some(1));

    let tasks = stored(&*repository).await;
    assert_eq!(tasks.len(), 1);
    assert!(!tasks[0].completed);
}

#[rstest]
#[tokio::test]
async fn clear_completed_without_completed_keeps_list() {
    let repository = repository_with(vec![task("Learn HTMX", false), task("Learn Rust", false)]);
    let app = create_test_app(repository.clone());

    let before = send(&app, "GET", "/todos?filter=active", None).await;
    let cleared = send(&app, "PUT", "/clear-completed", None).await;

    assert_eq!(cleared.status, StatusCode::OK);
    assert_eq!(cleared.body, before.body);
    assert!(cleared.body.contains("<li"));
    assert_eq!(stored(&*repository).await.len(), 2);
}

// =============================================================================
// Storage failures
// =============================================================================

#[rstest]
#[case("GET", "/todos", None)]
#[case("POST", "/todos", Some("text=Buy+milk"))]
#[case("POST", "/todos/toggle/abc", None)]
#[case("PUT", "/todos/toggle", Some("allTodosDone=on"))]
#[case("PUT", "/todos/abc", Some("todoText=Renamed"))]
#[case("DELETE", "/todos/abc", None)]
#[case("PUT", "/clear-completed", None)]
#[tokio::test]
async fn storage_failure_is_a_server_error_without_fragments(
    #[case] method: &str,
    #[case] uri: &str,
    #[case] form: Option<&str>,
) {
    let app = create_test_app(Arc::new(FailingTaskRepository));

    let response = send(&app, method, uri, form).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!response.body.contains("connection refused"));
    assert!(!response.body.contains("todo-count"));
    assert!(!response.body.contains("<li"));
}

#[rstest]
#[case("POST", "/todos")]
#[case("PUT", "/todos/toggle")]
#[tokio::test]
async fn body_without_form_content_type_is_an_html_bad_request(
    #[case] method: &str,
    #[case] uri: &str,
) {
    let repository = repository_with(vec![task("Learn HTMX", false)]);
    let app = create_test_app(repository.clone());
    let before = stored(&*repository).await;

    let response = send(&app, method, uri, None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.content_type.as_deref(),
        Some("text/html; charset=utf-8")
    );
    assert!(response.body.starts_with(r#"<p class="error" role="alert">"#));
    assert_eq!(stored(&*repository).await, before);
}

#[rstest]
#[tokio::test]
async fn edit_without_form_content_type_is_an_html_bad_request() {
    let existing = task("Learn HTMX", false);
    let repository = repository_with(vec![existing.clone()]);
    let app = create_test_app(repository.clone());

    let response = send(&app, "PUT", &format!("/todos/{}", existing.id), None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body.starts_with(r#"<p class="error" role="alert">"#));
    assert_eq!(stored(&*repository).await, vec![existing]);
}

#[rstest]
#[tokio::test]
async fn validation_runs_before_storage() {
    let app = create_test_app(Arc::new(FailingTaskRepository));

    let response = send(&app, "POST", "/todos", Some("text=")).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
