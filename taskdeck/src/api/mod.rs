//! Task service abstraction for `TaskDeck`.
//!
//! Defines the [`TaskApi`] trait the sync engine talks to. Concrete
//! implementations:
//! - [`http::HttpTaskApi`] — the hosted REST service over HTTPS
//! - [`loopback::LoopbackApi`] — in-process service for tests and offline
//!   demo mode

pub mod http;
pub mod loopback;

use tokio::sync::watch;

use taskdeck_proto::{Task, TaskDraft, TaskId, TaskPatch};

/// Errors a task service call can fail with.
///
/// The sync engine only distinguishes [`Cancelled`](Self::Cancelled) from
/// everything else; the message text of the other variants is surfaced to
/// the user verbatim.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The caller abandoned the request before it completed.
    #[error("request cancelled")]
    Cancelled,

    /// The request never produced a service response.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered and refused the request.
    #[error("{0}")]
    Rejected(String),
}

impl ApiError {
    /// True for caller-initiated cancellation (never reported as a failure).
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Cancellation handle for an in-flight fetch.
///
/// Dropping the handle does not cancel; call [`CancelHandle::cancel`].
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signals cancellation to every clone of the paired token.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Observer side of a cancellation signal.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Creates a connected handle/token pair.
    #[must_use]
    pub fn pair() -> (CancelHandle, Self) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, Self { rx })
    }

    /// A token that can never be cancelled.
    #[must_use]
    pub fn never() -> Self {
        let (_, token) = Self::pair();
        token
    }

    /// Whether cancellation has been signalled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is signalled; pends forever if the
    /// handle was dropped without cancelling.
    pub async fn cancelled(&mut self) {
        if *self.rx.borrow() {
            return;
        }
        // changed() errs when the handle is gone; at that point the
        // signal can never fire, so park the future.
        while self.rx.changed().await.is_ok() {
            if *self.rx.borrow() {
                return;
            }
        }
        std::future::pending::<()>().await;
    }
}

/// Async task service trait.
///
/// Calls resolve with the server's view of the record so the caller can
/// reconcile optimistic local state against it. Transport concerns
/// (encoding, auth, endpoints) live entirely behind this seam.
pub trait TaskApi: Send + Sync {
    /// Fetch the full task collection for the authenticated user.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<Task>, ApiError>> + Send;

    /// Create a task; resolves with the server-assigned record.
    fn create(
        &self,
        draft: &TaskDraft,
    ) -> impl std::future::Future<Output = Result<Task, ApiError>> + Send;

    /// Apply a partial update; resolves with the updated record.
    fn update(
        &self,
        id: TaskId,
        patch: &TaskPatch,
    ) -> impl std::future::Future<Output = Result<Task, ApiError>> + Send;

    /// Delete a task.
    fn delete(&self, id: TaskId)
    -> impl std::future::Future<Output = Result<(), ApiError>> + Send;
}
