//! Response model: an ordered sequence of targeted HTML fragments.
//!
//! A route answers with exactly one primary fragment (the region the client
//! asked to swap) and any number of out-of-band fragments that htmx applies
//! to other regions of the page by id.

use crate::domain::TaskId;

/// Page region a fragment replaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// The `<section class="main">` holding the toggle-all control and the list.
    List,
    /// A single `<li>` of the list.
    Item(TaskId),
    /// The remaining-count `<span>` in the footer.
    Count,
}

impl Target {
    /// Returns the CSS selector of the region, as used in `hx-target`.
    #[must_use]
    pub fn selector(&self) -> String {
        match self {
            Self::List => ".main".to_string(),
            Self::Item(id) => format!("#todo-{id}"),
            Self::Count => "#todo-count".to_string(),
        }
    }
}

/// How the client applies a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Swap {
    /// Swapped into the element that issued the request.
    Primary,
    /// Swapped by id, independently of the requesting element (`hx-swap-oob`).
    OutOfBand,
}

/// One self-contained HTML snippet and the region it replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Region replaced by `html`.
    pub target: Target,
    /// Whether the region is the requester's target or addressed by id.
    pub swap: Swap,
    /// Rendered markup, with user text already escaped.
    pub html: String,
}

impl Fragment {
    /// A fragment swapped into the requesting element's `hx-target`.
    #[must_use]
    pub fn primary(target: Target, html: impl Into<String>) -> Self {
        Self {
            target,
            swap: Swap::Primary,
            html: html.into(),
        }
    }

    /// A fragment carrying `hx-swap-oob`, applied wherever its id is.
    #[must_use]
    pub fn out_of_band(target: Target, html: impl Into<String>) -> Self {
        Self {
            target,
            swap: Swap::OutOfBand,
            html: html.into(),
        }
    }

    /// Returns true if this fragment is applied out of band.
    #[must_use]
    pub const fn is_out_of_band(&self) -> bool {
        matches!(self.swap, Swap::OutOfBand)
    }
}

/// Ordered fragments making up one response body.
///
/// # Example
///
/// ```ignore
/// let body = Fragments::new()
///     .with(todo_item(&task))
///     .with(todo_count(remaining))
///     .into_html();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragments(Vec<Fragment>);

impl Fragments {
    /// An empty response: the client swaps in nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a fragment.
    #[must_use]
    pub fn with(mut self, fragment: Fragment) -> Self {
        debug_assert!(
            fragment.is_out_of_band() || self.0.iter().all(Fragment::is_out_of_band),
            "a response carries at most one primary fragment"
        );
        self.0.push(fragment);
        self
    }

    /// Returns the targets in emission order.
    #[must_use]
    pub fn targets(&self) -> Vec<&Target> {
        self.0.iter().map(|fragment| &fragment.target).collect()
    }

    /// Concatenates the fragments in order.
    #[must_use]
    pub fn into_html(self) -> String {
        self.0.into_iter().map(|fragment| fragment.html).collect()
    }
}

impl From<Fragment> for Fragments {
    fn from(fragment: Fragment) -> Self {
        Self(vec![fragment])
    }
}
