//! Task record and API payload types for `TaskDeck`.
//!
//! Mirrors the JSON wire format of the hosted task service: task records
//! returned by the API, the create payload ([`TaskDraft`]), and the partial
//! update payload ([`TaskPatch`], only present fields are serialized).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Maximum allowed task title length in characters.
pub const MAX_TITLE_LENGTH: usize = 500;

/// Maximum allowed category label length in characters.
pub const MAX_CATEGORY_LENGTH: usize = 50;

/// Task identifier. Server-assigned ids are small positive integers;
/// provisional ids (not yet confirmed creates) are derived from epoch
/// milliseconds and therefore far outside the server's range.
pub type TaskId = i64;

/// Task priority level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// The default for new tasks.
    #[default]
    Medium,
    /// Needs attention first.
    High,
}

impl Priority {
    /// Sort rank, ascending by urgency: high = 0, medium = 1, low = 2.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    /// Parses a priority string as sent by the service.
    ///
    /// Returns `None` for anything other than `low`/`medium`/`high`
    /// (case-insensitive); callers treat an unknown priority as unset.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Deserializes a priority field, degrading unknown strings to `None`
/// instead of failing the whole record.
fn priority_lenient<'de, D>(de: D) -> Result<Option<Priority>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(de)?;
    Ok(raw.as_deref().and_then(Priority::parse))
}

/// A task record as returned by the service.
///
/// Optional fields stay optional all the way through the client; absence
/// degrades to documented defaults at the point of use (e.g. a missing
/// priority sorts as medium) rather than failing decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier (provisional until server confirmation).
    pub id: TaskId,
    /// Owning user.
    pub user_id: i64,
    /// Title (non-empty, at most [`MAX_TITLE_LENGTH`] characters).
    pub title: String,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Completion flag.
    #[serde(default)]
    pub completed: bool,
    /// Optional category label.
    #[serde(default)]
    pub category: Option<String>,
    /// Optional due date.
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Priority; `None` when unset or unrecognized on the wire.
    #[serde(default, deserialize_with = "priority_lenient")]
    pub priority: Option<Priority>,
    /// Whether this task repeats on a schedule.
    #[serde(default)]
    pub is_recurring: bool,
    /// Recurrence schedule kind (daily/weekly/monthly/yearly); opaque here.
    #[serde(default)]
    pub recurrence_type: Option<String>,
    /// Recurrence interval (e.g. every 2 days); opaque here.
    #[serde(default)]
    pub recurrence_interval: Option<i32>,
    /// When the recurrence stops; opaque here.
    #[serde(default)]
    pub recurrence_end_date: Option<DateTime<Utc>>,
    /// Parent task for recurrence-generated instances.
    #[serde(default)]
    pub parent_task_id: Option<TaskId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a task (`POST /api/tasks`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Task title (required).
    pub title: String,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional category label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Optional due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// Priority; the service defaults to medium when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Whether the task repeats.
    #[serde(default)]
    pub is_recurring: bool,
    /// Recurrence schedule kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_type: Option<String>,
    /// Recurrence interval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_interval: Option<i32>,
    /// Recurrence end date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_end_date: Option<DateTime<Utc>>,
}

impl TaskDraft {
    /// Creates a draft with just a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update payload (`PUT /api/tasks/{id}`).
///
/// `None` means "leave unchanged"; only present fields are serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New completion flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    /// New category label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// New due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// New priority.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl TaskPatch {
    /// A patch that only flips the completion flag.
    #[must_use]
    pub const fn completed(done: bool) -> Self {
        Self {
            title: None,
            description: None,
            completed: Some(done),
            category: None,
            due_date: None,
            priority: None,
        }
    }

    /// Returns true when the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && self.category.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
    }

    /// Applies the present fields onto a task, leaving the rest alone.
    ///
    /// Does not touch `updated_at`; the caller decides when to refresh
    /// timestamps.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(category) = &self.category {
            task.category = Some(category.clone());
        }
        if let Some(due_date) = self.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(priority) = self.priority {
            task.priority = Some(priority);
        }
    }
}
