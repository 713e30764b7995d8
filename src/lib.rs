//! htmx todos
//!
//! A server-rendered task list. Browsers drive it with htmx attributes and
//! every route answers with pre-rendered HTML fragments instead of JSON.
//!
//! - [`domain`]: the task entity and the list filter
//! - [`infrastructure`]: storage backends and runtime configuration
//! - [`render`]: pure HTML fragment rendering
//! - [`api`]: request validation, handlers and the router

pub mod api;
pub mod domain;
pub mod infrastructure;
pub mod render;
