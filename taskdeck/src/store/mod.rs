//! Optimistic task store.
//!
//! [`TaskStore`] owns the canonical in-memory task collection and exposes
//! the state transitions of the optimistic-update discipline: apply a
//! mutation immediately, then either confirm it with the server's record or
//! roll it back exactly. The async orchestration around the remote service
//! lives in [`sync::SyncEngine`]; this type is pure state and fully testable
//! headless.

pub mod sync;

pub use sync::{OpKind, StoreEvent, SyncEngine};

use chrono::Utc;

use taskdeck_proto::{Task, TaskDraft, TaskId, TaskPatch};

/// The authoritative local task collection.
///
/// Ordering is insertion order; the store never reorders on update. The one
/// exception is [`rollback_delete`](Self::rollback_delete), which
/// re-normalizes the whole collection to descending creation time.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    /// Last provisional id handed out, kept strictly increasing.
    last_provisional: TaskId,
}

impl TaskStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given collection.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            last_provisional: 0,
        }
    }

    /// Read-only view of the collection.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Cloned snapshot of the collection.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Replaces the entire collection (successful fetch).
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// Allocates a provisional id: current epoch-millis, bumped past the
    /// previous allocation so ids stay unique even within one millisecond.
    fn alloc_provisional_id(&mut self) -> TaskId {
        let now = Utc::now().timestamp_millis();
        self.last_provisional = now.max(self.last_provisional + 1);
        self.last_provisional
    }

    /// Builds the provisional task for a create and inserts it at the head
    /// of the collection.
    ///
    /// Defaults: completed = false, priority = medium when the draft leaves
    /// it unset, both timestamps = now. The owning user id is unknown until
    /// the server confirms, so it is left at zero.
    pub fn insert_provisional(&mut self, draft: &TaskDraft) -> Task {
        let now = Utc::now();
        let task = Task {
            id: self.alloc_provisional_id(),
            user_id: 0,
            title: draft.title.clone(),
            description: draft.description.clone(),
            completed: false,
            category: draft.category.clone(),
            due_date: draft.due_date,
            priority: Some(draft.priority.unwrap_or_default()),
            is_recurring: draft.is_recurring,
            recurrence_type: draft.recurrence_type.clone(),
            recurrence_interval: draft.recurrence_interval,
            recurrence_end_date: draft.recurrence_end_date,
            parent_task_id: None,
            created_at: now,
            updated_at: now,
        };
        self.tasks.insert(0, task.clone());
        task
    }

    /// Replaces the provisional entry with the server-assigned record,
    /// preserving its position in the collection.
    pub fn confirm_create(&mut self, provisional_id: TaskId, server_task: Task) {
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == provisional_id) {
            *slot = server_task;
        }
    }

    /// Removes the provisional entry entirely (failed create).
    pub fn reject_create(&mut self, provisional_id: TaskId) {
        self.tasks.retain(|t| t.id != provisional_id);
    }

    /// Applies a partial update optimistically with a refreshed update
    /// timestamp, returning the exact pre-mutation snapshot.
    ///
    /// Returns `None` without touching anything when the id is absent; the
    /// caller treats that as a silent no-op, not an error.
    pub fn begin_update(&mut self, id: TaskId, patch: &TaskPatch) -> Option<Task> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        let snapshot = task.clone();
        patch.apply_to(task);
        task.updated_at = Utc::now();
        Some(snapshot)
    }

    /// Replaces the optimistic value with the server-confirmed record,
    /// matched by identifier.
    pub fn confirm_update(&mut self, server_task: Task) {
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == server_task.id) {
            *slot = server_task;
        }
    }

    /// Restores the exact pre-mutation snapshot for a failed update.
    pub fn rollback_update(&mut self, snapshot: Task) {
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == snapshot.id) {
            *slot = snapshot;
        }
    }

    /// Removes a task optimistically, returning it for potential rollback.
    ///
    /// Returns `None` without touching anything when the id is absent.
    pub fn begin_delete(&mut self, id: TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(index))
    }

    /// Re-inserts a task whose delete failed.
    ///
    /// The collection is re-sorted by descending creation time rather than
    /// restoring the original index; an undone delete lands in timestamp
    /// order.
    pub fn rollback_delete(&mut self, task: Task) {
        self.tasks.push(task);
        self.tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
}
