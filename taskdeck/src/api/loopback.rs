//! In-process task service for tests and offline demo mode.
//!
//! Behaves like the hosted service without any network: records live in a
//! `parking_lot::Mutex`, ids are assigned sequentially, and the list
//! endpoint returns newest-first like the real one. Tests can script
//! failures with [`LoopbackApi::fail_next`] and slow responses with
//! [`LoopbackApi::with_delay`].

use std::collections::VecDeque;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;

use taskdeck_proto::{Priority, Task, TaskDraft, TaskId, TaskPatch};

use super::{ApiError, TaskApi};

/// Owner id stamped on records created through the loopback service.
const LOCAL_USER_ID: i64 = 1;

/// In-memory task service.
pub struct LoopbackApi {
    state: Mutex<State>,
    /// Artificial latency before every response.
    delay: Option<Duration>,
}

struct State {
    tasks: Vec<Task>,
    next_id: TaskId,
    failures: VecDeque<ApiError>,
}

impl LoopbackApi {
    /// Creates an empty service.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tasks(Vec::new())
    }

    /// Creates a service pre-populated with the given records.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(State {
                tasks,
                next_id,
                failures: VecDeque::new(),
            }),
            delay: None,
        }
    }

    /// Creates a service seeded with demo tasks for offline mode.
    #[must_use]
    pub fn demo() -> Self {
        let now = Utc::now();
        let mk = |id: TaskId, title: &str, completed: bool, priority, category: Option<&str>| Task {
            id,
            user_id: LOCAL_USER_ID,
            title: title.to_string(),
            description: None,
            completed,
            category: category.map(str::to_string),
            due_date: None,
            priority,
            is_recurring: false,
            recurrence_type: None,
            recurrence_interval: None,
            recurrence_end_date: None,
            parent_task_id: None,
            created_at: now,
            updated_at: now,
        };
        Self::with_tasks(vec![
            mk(1, "Review pull requests", false, Some(Priority::High), Some("Work")),
            mk(2, "Water the plants", true, Some(Priority::Low), Some("Home")),
            mk(3, "Book dentist appointment", false, Some(Priority::Medium), Some("Health")),
            mk(4, "Write weekly summary", false, None, Some("Work")),
        ])
    }

    /// Adds latency before every response.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queues a failure for the next call (FIFO when called repeatedly).
    pub fn fail_next(&self, error: ApiError) {
        self.state.lock().failures.push_back(error);
    }

    /// Snapshot of the service-side records, for test assertions.
    #[must_use]
    pub fn records(&self) -> Vec<Task> {
        self.state.lock().tasks.clone()
    }

    /// Applies latency and scripted failures common to every endpoint.
    async fn begin(&self) -> Result<(), ApiError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.state.lock().failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for LoopbackApi {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskApi for LoopbackApi {
    async fn list(&self) -> Result<Vec<Task>, ApiError> {
        self.begin().await?;
        let mut tasks = self.state.lock().tasks.clone();
        // Newest first, matching the hosted service.
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn create(&self, draft: &TaskDraft) -> Result<Task, ApiError> {
        self.begin().await?;
        let now = Utc::now();
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        let task = Task {
            id,
            user_id: LOCAL_USER_ID,
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
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, ApiError> {
        self.begin().await?;
        let mut state = self.state.lock();
        let Some(task) = state.tasks.iter_mut().find(|t| t.id == id) else {
            return Err(ApiError::Rejected("Task not found".to_string()));
        };
        patch.apply_to(task);
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete(&self, id: TaskId) -> Result<(), ApiError> {
        self.begin().await?;
        let mut state = self.state.lock();
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != id);
        if state.tasks.len() == before {
            return Err(ApiError::Rejected("Task not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let api = LoopbackApi::new();
        let a = api.create(&TaskDraft::new("A")).await.unwrap();
        let b = api.create(&TaskDraft::new("B")).await.unwrap();
        assert_eq!(b.id, a.id + 1);
    }

    #[tokio::test]
    async fn create_defaults_priority_to_medium() {
        let api = LoopbackApi::new();
        let task = api.create(&TaskDraft::new("A")).await.unwrap();
        assert_eq!(task.priority, Some(Priority::Medium));
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let api = LoopbackApi::new();
        api.create(&TaskDraft::new("older")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        api.create(&TaskDraft::new("newer")).await.unwrap();
        let tasks = api.list().await.unwrap();
        assert_eq!(tasks[0].title, "newer");
    }

    #[tokio::test]
    async fn update_unknown_id_is_rejected() {
        let api = LoopbackApi::new();
        let err = api.update(99, &TaskPatch::completed(true)).await.unwrap_err();
        assert!(matches!(err, ApiError::Rejected(_)));
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let api = LoopbackApi::new();
        let task = api.create(&TaskDraft::new("doomed")).await.unwrap();
        api.delete(task.id).await.unwrap();
        assert!(api.records().is_empty());
    }

    #[tokio::test]
    async fn scripted_failure_fires_once() {
        let api = LoopbackApi::new();
        api.fail_next(ApiError::Network("connection reset".to_string()));
        assert!(api.list().await.is_err());
        assert!(api.list().await.is_ok());
    }

    #[tokio::test]
    async fn demo_seed_is_nonempty() {
        let api = LoopbackApi::demo();
        assert!(!api.list().await.unwrap().is_empty());
    }
}
