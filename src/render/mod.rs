//! Fragment renderer.
//!
//! Pure functions projecting task state into HTML fragments, and the
//! [`Fragments`] response model that orders them.

pub mod components;
pub mod fragment;

pub use components::{error_fragment, escape_html, index_page, todo_count, todo_item, todo_list};
pub use fragment::{Fragment, Fragments, Swap, Target};
