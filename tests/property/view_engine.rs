//! Property-based tests for the derived view engine.
//!
//! Uses proptest to verify:
//! 1. Projection output is always a subset of the input, with no duplicates.
//! 2. Status filters partition the collection exactly.
//! 3. Every sort key orders its comparison key correctly.
//! 4. Search never surfaces a task that lacks the needle.
//! 5. Counts and statistics stay consistent with each other.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use taskdeck::view::{self, SortKey, StatusFilter, TaskQuery};
use taskdeck_proto::{Priority, Task, TaskId};

// --- Strategies for task collections ---

/// Strategy for generating arbitrary `Priority` values, absent included.
fn arb_priority() -> impl Strategy<Value = Option<Priority>> {
    prop_oneof![
        Just(None),
        Just(Some(Priority::Low)),
        Just(Some(Priority::Medium)),
        Just(Some(Priority::High)),
    ]
}

/// Strategy for generating arbitrary optional due dates in a narrow range.
fn arb_due_date() -> impl Strategy<Value = Option<DateTime<Utc>>> {
    prop_oneof![
        Just(None),
        (0i64..10_000).prop_map(|offset| {
            Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::hours(offset))
        }),
    ]
}

/// Strategy for generating arbitrary optional categories.
fn arb_category() -> impl Strategy<Value = Option<String>> {
    prop_oneof![Just(None), "[A-Za-z]{1,8}".prop_map(Some)]
}

/// Strategy for generating a collection with unique sequential ids.
fn arb_tasks() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec(
        (
            "[ -~]{1,24}",
            any::<bool>(),
            arb_priority(),
            arb_due_date(),
            arb_category(),
        ),
        0..24,
    )
    .prop_map(|rows| {
        let now = Utc.with_ymd_and_hms(2026, 2, 5, 10, 0, 0).unwrap();
        rows.into_iter()
            .enumerate()
            .map(|(i, (title, completed, priority, due_date, category))| Task {
                id: i as TaskId + 1,
                user_id: 1,
                title,
                description: None,
                completed,
                category,
                due_date,
                priority,
                is_recurring: false,
                recurrence_type: None,
                recurrence_interval: None,
                recurrence_end_date: None,
                parent_task_id: None,
                created_at: now,
                updated_at: now,
            })
            .collect()
    })
}

/// Strategy for generating arbitrary queries.
fn arb_query() -> impl Strategy<Value = TaskQuery> {
    (
        prop_oneof![Just(String::new()), "[a-z]{1,4}"],
        prop_oneof![
            Just(StatusFilter::All),
            Just(StatusFilter::Active),
            Just(StatusFilter::Completed),
        ],
        prop_oneof![
            Just(SortKey::Date),
            Just(SortKey::Priority),
            Just(SortKey::Name),
            Just(SortKey::Category),
        ],
    )
        .prop_map(|(search, filter, sort)| TaskQuery {
            search,
            filter,
            sort,
        })
}

fn rank_or_medium(task: &Task) -> u8 {
    task.priority.map_or(Priority::Medium.rank(), Priority::rank)
}

proptest! {
    /// The projection only ever shows tasks from the input, each at most once.
    #[test]
    fn projection_is_a_subset_without_duplicates(
        tasks in arb_tasks(),
        query in arb_query(),
    ) {
        let visible = view::project(&tasks, &query);
        let mut seen = std::collections::HashSet::new();
        for task in &visible {
            prop_assert!(tasks.iter().any(|t| t.id == task.id));
            prop_assert!(seen.insert(task.id), "duplicate id {}", task.id);
        }
    }

    /// Active and completed filters partition what the all filter shows.
    #[test]
    fn filters_partition_the_collection(tasks in arb_tasks(), sort_seed in 0u8..4) {
        let sort = match sort_seed {
            0 => SortKey::Date,
            1 => SortKey::Priority,
            2 => SortKey::Name,
            _ => SortKey::Category,
        };
        let query = |filter| TaskQuery { search: String::new(), filter, sort };

        let all = view::project(&tasks, &query(StatusFilter::All)).len();
        let active = view::project(&tasks, &query(StatusFilter::Active)).len();
        let completed = view::project(&tasks, &query(StatusFilter::Completed)).len();
        prop_assert_eq!(all, active + completed);
    }

    /// Name sort yields case-insensitively non-decreasing titles.
    #[test]
    fn name_sort_orders_titles(tasks in arb_tasks()) {
        let query = TaskQuery { sort: SortKey::Name, ..TaskQuery::default() };
        let visible = view::project(&tasks, &query);
        for pair in visible.windows(2) {
            prop_assert!(pair[0].title.to_lowercase() <= pair[1].title.to_lowercase());
        }
    }

    /// Priority sort yields non-decreasing urgency ranks, absent as medium.
    #[test]
    fn priority_sort_orders_ranks(tasks in arb_tasks()) {
        let query = TaskQuery { sort: SortKey::Priority, ..TaskQuery::default() };
        let visible = view::project(&tasks, &query);
        for pair in visible.windows(2) {
            prop_assert!(rank_or_medium(pair[0]) <= rank_or_medium(pair[1]));
        }
    }

    /// Date sort puts every dated task before every undated one, dated
    /// tasks ascending.
    #[test]
    fn date_sort_orders_dates_and_dumps_undated_last(tasks in arb_tasks()) {
        let query = TaskQuery { sort: SortKey::Date, ..TaskQuery::default() };
        let visible = view::project(&tasks, &query);
        for pair in visible.windows(2) {
            match (pair[0].due_date, pair[1].due_date) {
                (Some(a), Some(b)) => prop_assert!(a <= b),
                (None, Some(_)) => prop_assert!(false, "undated task before a dated one"),
                _ => {}
            }
        }
    }

    /// Every surfaced task actually contains the needle somewhere.
    #[test]
    fn search_results_contain_the_needle(tasks in arb_tasks(), needle in "[a-z]{1,4}") {
        let query = TaskQuery { search: needle.clone(), ..TaskQuery::default() };
        let visible = view::project(&tasks, &query);
        for task in visible {
            let hit = task.title.to_lowercase().contains(&needle)
                || task
                    .category
                    .as_ref()
                    .is_some_and(|c| c.to_lowercase().contains(&needle));
            prop_assert!(hit, "task {} does not match {:?}", task.id, needle);
        }
    }

    /// The projection never reorders or edits the input collection.
    #[test]
    fn projection_never_mutates_input(tasks in arb_tasks(), query in arb_query()) {
        let before = tasks.clone();
        let _ = view::project(&tasks, &query);
        prop_assert_eq!(tasks, before);
    }

    /// Counts and stats agree with each other and with the collection.
    #[test]
    fn counts_and_stats_are_consistent(tasks in arb_tasks()) {
        let counts = view::status_counts(&tasks);
        let stats = view::stats(&tasks);

        prop_assert_eq!(counts.all, tasks.len());
        prop_assert_eq!(counts.active + counts.completed, counts.all);
        prop_assert_eq!(stats.total, counts.all);
        prop_assert_eq!(stats.completed, counts.completed);
        prop_assert_eq!(stats.pending, counts.active);
        prop_assert!(stats.completion_rate <= 100);
        if tasks.is_empty() {
            prop_assert_eq!(stats.completion_rate, 0);
        }
    }
}
