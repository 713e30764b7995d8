//! Task domain model.
//!
//! A task is the only entity of the application. It lives inside a
//! [`Namespace`], is addressed by a [`TaskId`] and carries a non-empty
//! [`TaskText`] plus a completion flag.

use uuid::Uuid;

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Partition key grouping an independent list of tasks.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Namespace(String);

impl Namespace {
    /// Name of the namespace used when none is configured.
    pub const DEFAULT: &'static str = "default";

    /// Creates a namespace, falling back to [`Namespace::DEFAULT`] for blank input.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name: String = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            Self(Self::DEFAULT.to_string())
        } else {
            Self(trimmed.to_string())
        }
    }

    /// Returns the namespace name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Identifier of a task, unique within its namespace.
///
/// Ids are opaque strings. Freshly generated ids are UUID v4 text, but ids
/// arriving from a path parameter are only known to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(String);

impl TaskId {
    /// Wraps an already validated identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a `TaskId` from a UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }

    /// Generates a new random identifier (UUID v4).
    ///
    /// **Note**: This is an impure function (side effect: random number generation).
    #[must_use]
    pub fn generate() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Display label of a task. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskText(String);

impl TaskText {
    /// Creates a task text from raw input.
    ///
    /// Surrounding whitespace is trimmed. Returns `None` when nothing is left.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Returns the text as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the text and returns the inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for TaskText {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Storage address of a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskKey {
    /// Namespace the task belongs to.
    pub namespace: Namespace,
    /// Identifier within the namespace.
    pub id: TaskId,
}

impl TaskKey {
    /// Creates a new key.
    #[must_use]
    pub const fn new(namespace: Namespace, id: TaskId) -> Self {
        Self { namespace, id }
    }
}

impl std::fmt::Display for TaskKey {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}/{}", self.namespace, self.id)
    }
}

// =============================================================================
// Task Entity
// =============================================================================

/// A single entry of the task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Partition the task belongs to.
    pub namespace: Namespace,
    /// Identifier, immutable after creation.
    pub id: TaskId,
    /// Display label.
    pub text: TaskText,
    /// Whether the task is done.
    pub completed: bool,
}

impl Task {
    /// Creates a new, not yet completed task.
    #[must_use]
    pub const fn new(namespace: Namespace, id: TaskId, text: TaskText) -> Self {
        Self {
            namespace,
            id,
            text,
            completed: false,
        }
    }

    /// Returns a copy with the given completion flag.
    #[must_use]
    pub fn with_completed(self, completed: bool) -> Self {
        Self { completed, ..self }
    }

    /// Returns a copy with the given text.
    #[must_use]
    pub fn with_text(self, text: TaskText) -> Self {
        Self { text, ..self }
    }

    /// Returns the storage key of this task.
    #[must_use]
    pub fn key(&self) -> TaskKey {
        TaskKey::new(self.namespace.clone(), self.id.clone())
    }

    /// Applies a partial update, leaving absent fields untouched.
    #[must_use]
    pub fn apply(self, patch: TaskPatch) -> Self {
        Self {
            text: patch.text.unwrap_or(self.text),
            completed: patch.completed.unwrap_or(self.completed),
            ..self
        }
    }
}

/// Partial update of the mutable task fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// Replacement text.
    pub text: Option<TaskText>,
    /// Replacement completion flag.
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// A patch that only sets the completion flag.
    #[must_use]
    pub const fn completed(completed: bool) -> Self {
        Self {
            text: None,
            completed: Some(completed),
        }
    }

    /// A patch that only replaces the text.
    #[must_use]
    pub const fn text(text: TaskText) -> Self {
        Self {
            text: Some(text),
            completed: None,
        }
    }
}

// =============================================================================
// Filter
// =============================================================================

/// Client-selected predicate narrowing which tasks a list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Filter {
    /// Every task.
    #[default]
    All,
    /// Tasks with `completed = false`.
    Active,
    /// Tasks with `completed = true`.
    Completed,
}

impl Filter {
    /// Returns the completion flag the store should filter on, if any.
    #[must_use]
    pub const fn completed(self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Active => Some(false),
            Self::Completed => Some(true),
        }
    }

    /// Returns the query-string value of the filter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// Returns true if the task passes the filter.
    #[must_use]
    pub const fn matches(self, task: &Task) -> bool {
        match self.completed() {
            None => true,
            Some(completed) => task.completed == completed,
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Counts the tasks that are not completed yet.
#[must_use]
pub fn remaining_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|task| !task.completed).count()
}

/// Returns true if the slice is non-empty and every task is completed.
#[must_use]
pub fn all_completed(tasks: &[Task]) -> bool {
    !tasks.is_empty() && tasks.iter().all(|task| task.completed)
}

// =============================================================================
// Tests
// =============================================================================
