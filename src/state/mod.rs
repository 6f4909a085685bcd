//! State module for tracking crawl progress
//!
//! Every listing page and every detail reference is handled by one task.
//! `TaskState` tracks where such a task is in its lifecycle so a phase can
//! report exactly which targets succeeded and which failed.

mod task_state;

pub use task_state::TaskState;
