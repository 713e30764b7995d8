//! HTML components.
//!
//! Every function here is pure: it takes already-fetched task state and
//! returns markup. User-supplied text is escaped at the point where it is
//! interpolated.

use super::fragment::{Fragment, Target};
use crate::domain::{Filter, Task, all_completed};

/// Escapes the characters that are significant in HTML text and attribute values.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for character in raw.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

const fn checked(flag: bool) -> &'static str {
    if flag { " checked" } else { "" }
}

// =============================================================================
// Fragments
// =============================================================================

/// Renders one list entry.
///
/// The entry carries `id="todo-{id}"`; every control inside it targets
/// that id, so the response replaces exactly this `<li>`.
#[must_use]
pub fn todo_item(task: &Task) -> Fragment {
    let target = Target::Item(task.id.clone());
    let selector = escape_html(&target.selector());
    let id = escape_html(task.id.as_str());
    let text = escape_html(task.text.as_str());
    let class = if task.completed { "completed" } else { "" };

    let html = format!(
        concat!(
            r#"<li id="todo-{id}" class="{class}">"#,
            r#"<div class="view">"#,
            r#"<input class="toggle" type="checkbox"{checked} hx-post="/todos/toggle/{id}" hx-target="{selector}" hx-swap="outerHTML">"#,
            r#"<label>{text}</label>"#,
            r#"<button class="destroy" hx-delete="/todos/{id}" hx-target="{selector}" hx-swap="outerHTML"></button>"#,
            r#"</div>"#,
            r#"<input class="edit" name="todoText" value="{text}" hx-put="/todos/{id}" hx-trigger="keyup[keyCode==13]" hx-target="{selector}" hx-swap="outerHTML">"#,
            r#"</li>"#,
        ),
        id = id,
        class = class,
        checked = checked(task.completed),
        text = text,
        selector = selector,
    );

    Fragment::primary(target, html)
}

/// Renders the list section for an already filtered slice of tasks.
///
/// The toggle-all control is checked only when every task of `tasks` is
/// completed; an empty slice leaves it unchecked and renders an empty `<ul>`.
#[must_use]
pub fn todo_list(tasks: &[Task]) -> Fragment {
    let items: String = tasks.iter().map(|task| todo_item(task).html).collect();

    let html = format!(
        concat!(
            r#"<section class="main">"#,
            r#"<input id="toggle-all" name="allTodosDone" class="toggle-all" type="checkbox"{checked} hx-put="/todos/toggle" hx-target="{main}" hx-swap="outerHTML">"#,
            r#"<label for="toggle-all"></label>"#,
            r#"<ul class="todo-list">{items}</ul>"#,
            r#"</section>"#,
        ),
        checked = checked(all_completed(tasks)),
        items = items,
        main = Target::List.selector(),
    );

    Fragment::primary(Target::List, html)
}

/// Renders the remaining-count span, always out of band.
#[must_use]
pub fn todo_count(remaining: usize) -> Fragment {
    let noun = if remaining == 1 { "item" } else { "items" };
    let html = format!(
        r#"<span id="todo-count" class="todo-count" hx-swap-oob="true"><strong>{remaining}</strong> {noun} left</span>"#
    );
    Fragment::out_of_band(Target::Count, html)
}

/// Renders an error message for 4xx and 5xx responses.
#[must_use]
pub fn error_fragment(message: &str) -> String {
    format!(
        r#"<p class="error" role="alert">{}</p>"#,
        escape_html(message)
    )
}

// =============================================================================
// Page Shell
// =============================================================================

fn filter_link(filter: Filter, selected: Filter, label: &str) -> String {
    let href = match filter {
        Filter::All => "/".to_string(),
        other => format!("/?filter={other}"),
    };
    let class = if filter == selected { "selected" } else { "" };
    format!(r#"<li><a href="{href}" class="{class}">{label}</a></li>"#)
}

/// Renders the full document. The list itself is fetched by the body's
/// `load` trigger, so the shell holds no task state.
#[must_use]
pub fn index_page(filter: Filter) -> String {
    let filters: String = [
        (Filter::All, "All"),
        (Filter::Active, "Active"),
        (Filter::Completed, "Completed"),
    ]
    .into_iter()
    .map(|(candidate, label)| filter_link(candidate, filter, label))
    .collect();

    let main = Target::List.selector();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Rust + HTMX</title>
  <link rel="stylesheet" href="/static/index.css">
  <script src="https://unpkg.com/htmx.org@1.9.8"></script>
  <script src="https://unpkg.com/hyperscript.org@0.9.12"></script>
</head>
<body hx-get="/todos?filter={filter}" hx-trigger="load" hx-target=".header" hx-swap="afterend">
  <div>
    <section class="todoapp">
      <header class="header">
        <h1>todos + HTMX</h1>
        <input class="new-todo" name="text" placeholder="What needs to be done?" autofocus hx-post="/todos" hx-trigger="keyup[keyCode==13]" hx-target=".todo-list" hx-swap="beforeend" _="on htmx:afterOnLoad set target.value to ''">
      </header>
      <footer class="footer">
        <span id="todo-count" class="todo-count"></span>
        <ul class="filters">{filters}</ul>
        <button class="clear-completed" hx-put="/clear-completed" hx-target="{main}" hx-swap="outerHTML">Clear completed</button>
      </footer>
    </section>
    <footer class="info">
      <p>Double-click to edit a todo</p>
      <p>Part of <a href="http://todomvc.com">TodoMVC</a></p>
    </footer>
  </div>
</body>
</html>
"#
    )
}

// =============================================================================
// Tests
// =============================================================================
