//! REST client for the hosted task service.
//!
//! Endpoints: `GET/POST {base}/api/tasks`, `PUT/DELETE {base}/api/tasks/{id}`.
//! Authentication is a bearer token attached to every request. Service
//! rejections carry a JSON `detail` message which is surfaced verbatim.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use taskdeck_proto::{Task, TaskDraft, TaskId, TaskPatch};

use super::{ApiError, TaskApi};

/// Task service client over HTTP/JSON.
pub struct HttpTaskApi {
    client: Client,
    /// Precomputed `{base}/api/tasks` endpoint.
    tasks_url: Url,
    bearer: Option<String>,
}

/// Wire shape of the list endpoint response.
#[derive(Debug, Deserialize)]
struct TaskListResponse {
    tasks: Vec<Task>,
}

impl HttpTaskApi {
    /// Creates a client for the service at `base` (e.g. `https://api.example.com`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the base URL cannot carry path
    /// segments or the HTTP client cannot be constructed.
    pub fn new(base: &Url, bearer: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        let mut tasks_url = base.clone();
        tasks_url
            .path_segments_mut()
            .map_err(|()| ApiError::Network(format!("invalid API base URL: {base}")))?
            .pop_if_empty()
            .extend(["api", "tasks"]);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            tasks_url,
            bearer,
        })
    }

    /// `{base}/api/tasks/{id}`.
    fn task_url(&self, id: TaskId) -> Url {
        let mut url = self.tasks_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(&id.to_string());
        }
        url
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends a request and maps transport/status failures to [`ApiError`].
    async fn dispatch(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let response = self
            .authed(builder)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Rejected(rejection_message(status, &body)))
    }
}

/// Extracts the human-readable message from a rejection body.
///
/// The service sends `{"detail": "..."}`; anything else falls back to the
/// HTTP status line.
fn rejection_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .and_then(|detail| detail.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("service error: HTTP {status}"))
}

impl TaskApi for HttpTaskApi {
    async fn list(&self) -> Result<Vec<Task>, ApiError> {
        let response = self
            .dispatch(self.client.get(self.tasks_url.clone()))
            .await?;
        let body: TaskListResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Network(format!("malformed task list: {e}")))?;
        Ok(body.tasks)
    }

    async fn create(&self, draft: &TaskDraft) -> Result<Task, ApiError> {
        let response = self
            .dispatch(self.client.post(self.tasks_url.clone()).json(draft))
            .await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Network(format!("malformed task record: {e}")))
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, ApiError> {
        let response = self
            .dispatch(self.client.put(self.task_url(id)).json(patch))
            .await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Network(format!("malformed task record: {e}")))
    }

    async fn delete(&self, id: TaskId) -> Result<(), ApiError> {
        self.dispatch(self.client.delete(self.task_url(id))).await?;
        Ok(())
    }
}
