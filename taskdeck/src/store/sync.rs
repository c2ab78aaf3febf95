//! Async reconciliation between the local [`TaskStore`] and the remote
//! task service.
//!
//! [`SyncEngine`] applies every mutation to local state immediately, then
//! awaits the service call and either confirms the optimistic value with
//! the server record or rolls it back exactly. The UI observes state
//! through the [`StoreEvent`] channel: a full snapshot after every state
//! change, plus confirmation/failure notices.
//!
//! # Invariants
//!
//! - The store mutex is never held across an await point, so observers
//!   only ever see pre-mutation or fully-applied optimistic state.
//! - Mutations targeting the same task id are serialized through a
//!   per-id async lock; the second mutation's optimistic apply waits for
//!   the first's reconciliation.
//! - A mutation on an id absent from the collection is a silent no-op:
//!   no state change, no event, `Ok(())`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use taskdeck_proto::{Task, TaskDraft, TaskId, TaskPatch};

use super::TaskStore;
use crate::api::{ApiError, CancelToken, TaskApi};

/// Which store operation an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// Full-collection fetch.
    Fetch,
    /// Task creation.
    Create,
    /// Partial task update.
    Update,
    /// Task deletion.
    Delete,
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Events emitted toward the UI.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// The collection changed; carries a full snapshot.
    Tasks(Vec<Task>),
    /// A mutation was confirmed by the service.
    Confirmed(OpKind),
    /// An operation failed; carries the service's message verbatim.
    Failed {
        /// The operation that failed.
        op: OpKind,
        /// Human-readable failure message for display.
        message: String,
    },
}

/// Optimistic sync engine over a [`TaskApi`] implementation.
pub struct SyncEngine<A> {
    api: A,
    store: Mutex<TaskStore>,
    events: mpsc::UnboundedSender<StoreEvent>,
    /// Per-task-id serialization of in-flight mutations.
    id_locks: Mutex<HashMap<TaskId, Arc<tokio::sync::Mutex<()>>>>,
}

impl<A: TaskApi> SyncEngine<A> {
    /// Creates an engine and the event receiver the UI drains.
    #[must_use]
    pub fn new(api: A) -> (Arc<Self>, mpsc::UnboundedReceiver<StoreEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = Arc::new(Self {
            api,
            store: Mutex::new(TaskStore::new()),
            events: tx,
            id_locks: Mutex::new(HashMap::new()),
        });
        (engine, rx)
    }

    /// Current snapshot of the local collection.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Task> {
        self.store.lock().snapshot()
    }

    /// The underlying service, mainly for tests scripting its behavior.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    fn emit(&self, event: StoreEvent) {
        // The receiver dropping just means the UI is gone.
        let _ = self.events.send(event);
    }

    fn emit_tasks(&self) {
        let snapshot = self.store.lock().snapshot();
        self.emit(StoreEvent::Tasks(snapshot));
    }

    fn report_failure(&self, op: OpKind, error: &ApiError) {
        tracing::warn!(%op, error = %error, "task operation failed");
        self.emit(StoreEvent::Failed {
            op,
            message: error.to_string(),
        });
    }

    fn id_lock(&self, id: TaskId) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(self.id_locks.lock().entry(id).or_default())
    }

    /// Drops the table entry once no other mutation is waiting on it.
    fn release_id_lock(&self, id: TaskId, lock: &Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.id_locks.lock();
        // Two owners left means just the table and us.
        if Arc::strong_count(lock) == 2 {
            locks.remove(&id);
        }
    }

    /// Fetches the full collection and replaces local state on success.
    ///
    /// Cancellation leaves state exactly as it was and reports nothing;
    /// any other failure keeps the previous collection and reports.
    ///
    /// # Errors
    ///
    /// Returns the service error, [`ApiError::Cancelled`] included.
    pub async fn refresh(&self, mut cancel: CancelToken) -> Result<(), ApiError> {
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ApiError::Cancelled),
            result = self.api.list() => result,
        };
        match result {
            Ok(tasks) => {
                tracing::debug!(count = tasks.len(), "task collection fetched");
                self.store.lock().replace_all(tasks);
                self.emit_tasks();
                Ok(())
            }
            Err(error) if error.is_cancelled() => Err(error),
            Err(error) => {
                self.report_failure(OpKind::Fetch, &error);
                Err(error)
            }
        }
    }

    /// Creates a task optimistically.
    ///
    /// The provisional entry appears at the head of the collection before
    /// the request is issued; on failure it is removed entirely.
    ///
    /// # Errors
    ///
    /// Returns the service error after rollback.
    pub async fn create(&self, draft: TaskDraft) -> Result<Task, ApiError> {
        let provisional = self.store.lock().insert_provisional(&draft);
        self.emit_tasks();

        match self.api.create(&draft).await {
            Ok(server_task) => {
                self.store
                    .lock()
                    .confirm_create(provisional.id, server_task.clone());
                self.emit_tasks();
                self.emit(StoreEvent::Confirmed(OpKind::Create));
                Ok(server_task)
            }
            Err(error) => {
                self.store.lock().reject_create(provisional.id);
                self.emit_tasks();
                self.report_failure(OpKind::Create, &error);
                Err(error)
            }
        }
    }

    /// Applies a partial update optimistically.
    ///
    /// An absent id is a silent no-op. On failure the exact pre-mutation
    /// snapshot is restored, timestamps included.
    ///
    /// # Errors
    ///
    /// Returns the service error after rollback.
    pub async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<(), ApiError> {
        let lock = self.id_lock(id);
        let guard = lock.lock().await;

        let Some(snapshot) = self.store.lock().begin_update(id, &patch) else {
            drop(guard);
            self.release_id_lock(id, &lock);
            return Ok(());
        };
        self.emit_tasks();

        let result = match self.api.update(id, &patch).await {
            Ok(server_task) => {
                self.store.lock().confirm_update(server_task);
                self.emit_tasks();
                self.emit(StoreEvent::Confirmed(OpKind::Update));
                Ok(())
            }
            Err(error) => {
                self.store.lock().rollback_update(snapshot);
                self.emit_tasks();
                self.report_failure(OpKind::Update, &error);
                Err(error)
            }
        };
        drop(guard);
        self.release_id_lock(id, &lock);
        result
    }

    /// Deletes a task optimistically.
    ///
    /// An absent id is a silent no-op. On failure the task is re-inserted
    /// with the collection re-sorted by descending creation time.
    ///
    /// # Errors
    ///
    /// Returns the service error after rollback.
    pub async fn delete(&self, id: TaskId) -> Result<(), ApiError> {
        let lock = self.id_lock(id);
        let guard = lock.lock().await;

        let Some(removed) = self.store.lock().begin_delete(id) else {
            drop(guard);
            self.release_id_lock(id, &lock);
            return Ok(());
        };
        self.emit_tasks();

        let result = match self.api.delete(id).await {
            Ok(()) => {
                self.emit(StoreEvent::Confirmed(OpKind::Delete));
                Ok(())
            }
            Err(error) => {
                self.store.lock().rollback_delete(removed);
                self.emit_tasks();
                self.report_failure(OpKind::Delete, &error);
                Err(error)
            }
        };
        drop(guard);
        self.release_id_lock(id, &lock);
        result
    }
}
