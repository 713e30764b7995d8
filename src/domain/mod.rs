//! Domain module for the task list.
//!
//! This module contains the task entity, its value objects and the
//! list-level predicates shared by the store and the renderer.

pub mod task;

pub use task::{
    Filter, Namespace, Task, TaskId, TaskKey, TaskPatch, TaskText, all_completed, remaining_count,
};
