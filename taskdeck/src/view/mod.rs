//! Derived views over the task collection.
//!
//! Pure, synchronous projections: given the collection plus a search
//! string, a status filter, and a sort key, produce what should be
//! displayed, plus aggregate counts and statistics. Nothing here performs
//! I/O or mutates its input, and absent optional fields degrade to
//! documented defaults instead of failing.

use std::cmp::Ordering;

use taskdeck_proto::{Priority, Task};

/// Status filter applied before search and sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Every task.
    #[default]
    All,
    /// Not yet completed.
    Active,
    /// Completed only.
    Completed,
}

impl StatusFilter {
    /// Next filter in the cycle All -> Active -> Completed -> All.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::All => Self::Active,
            Self::Active => Self::Completed,
            Self::Completed => Self::All,
        }
    }

    const fn keeps(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
        }
    }

    /// Parses a filter name as used in config files.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Sort key applied last, always stable and non-destructive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Ascending due date; tasks without one sort last.
    #[default]
    Date,
    /// Ascending urgency rank (high first).
    Priority,
    /// Title, case-insensitive.
    Name,
    /// Category, case-insensitive; missing category sorts as empty.
    Category,
}

impl SortKey {
    /// Next key in the cycle Date -> Priority -> Name -> Category -> Date.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Date => Self::Priority,
            Self::Priority => Self::Name,
            Self::Name => Self::Category,
            Self::Category => Self::Date,
        }
    }

    /// Parses a sort key name as used in config files.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "date" => Some(Self::Date),
            "priority" => Some(Self::Priority),
            "name" => Some(Self::Name),
            "category" => Some(Self::Category),
            _ => None,
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Date => write!(f, "date"),
            Self::Priority => write!(f, "priority"),
            Self::Name => write!(f, "name"),
            Self::Category => write!(f, "category"),
        }
    }
}

/// The full view query: filter, search text, sort key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Case-insensitive substring search; ignored when blank.
    pub search: String,
    /// Status filter.
    pub filter: StatusFilter,
    /// Sort key.
    pub sort: SortKey,
}

/// Per-status counts over the unfiltered collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    /// Total number of tasks.
    pub all: usize,
    /// Tasks not yet completed.
    pub active: usize,
    /// Completed tasks.
    pub completed: usize,
}

/// Aggregate statistics over the unfiltered collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    /// Total number of tasks.
    pub total: usize,
    /// Completed tasks.
    pub completed: usize,
    /// Tasks still open.
    pub pending: usize,
    /// Rounded integer percentage of completed tasks; 0 when empty.
    pub completion_rate: u32,
}

/// Projects the collection for display: status filter, then search, then a
/// stable sort. Never mutates the input.
#[must_use]
pub fn project<'a>(tasks: &'a [Task], query: &TaskQuery) -> Vec<&'a Task> {
    let needle = query.search.trim().to_lowercase();

    let mut visible: Vec<&Task> = tasks
        .iter()
        .filter(|task| query.filter.keeps(task))
        .filter(|task| needle.is_empty() || matches_search(task, &needle))
        .collect();

    match query.sort {
        SortKey::Date => visible.sort_by(|a, b| compare_due_dates(a, b)),
        SortKey::Priority => visible.sort_by_key(|task| priority_rank(task)),
        SortKey::Name => visible.sort_by(|a, b| collate(&a.title, &b.title)),
        SortKey::Category => visible.sort_by(|a, b| {
            collate(
                a.category.as_deref().unwrap_or(""),
                b.category.as_deref().unwrap_or(""),
            )
        }),
    }
    visible
}

/// A task matches when any of title, description, or category contains the
/// lowercased needle.
fn matches_search(task: &Task, needle: &str) -> bool {
    task.title.to_lowercase().contains(needle)
        || task
            .description
            .as_ref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
        || task
            .category
            .as_ref()
            .is_some_and(|c| c.to_lowercase().contains(needle))
}

/// Missing or unrecognized priority ranks as medium.
fn priority_rank(task: &Task) -> u8 {
    task.priority.map_or(Priority::Medium.rank(), Priority::rank)
}

/// Ascending due date; a task with no due date sorts after every task that
/// has one, and two tasks without one compare equal (stable sort keeps
/// their relative order).
fn compare_due_dates(a: &Task, b: &Task) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(da), Some(db)) => da.cmp(&db),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Case-insensitive Unicode ordering.
fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Per-status counts over the full, unfiltered collection.
#[must_use]
pub fn status_counts(tasks: &[Task]) -> StatusCounts {
    let completed = tasks.iter().filter(|t| t.completed).count();
    StatusCounts {
        all: tasks.len(),
        active: tasks.len() - completed,
        completed,
    }
}

/// Aggregate statistics over the full, unfiltered collection.
#[must_use]
pub fn stats(tasks: &[Task]) -> TaskStats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let completion_rate = if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    };
    TaskStats {
        total,
        completed,
        pending: total - completed,
        completion_rate,
    }
}
