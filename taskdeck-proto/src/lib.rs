//! Shared data model for the `TaskDeck` task service API.

pub mod task;

pub use task::{Priority, Task, TaskDraft, TaskId, TaskPatch};
