//! End-to-end tests for the optimistic sync engine against the in-process
//! task service.
//!
//! Covers the full mutation lifecycle: optimistic apply, confirmation,
//! rollback on failure, silent no-ops, fetch cancellation, and the event
//! stream the UI drains.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use taskdeck::api::loopback::LoopbackApi;
use taskdeck::api::{ApiError, CancelToken};
use taskdeck::store::{OpKind, StoreEvent, SyncEngine};
use taskdeck_proto::{Task, TaskDraft, TaskPatch};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Drains every pending event from the receiver.
fn drain(rx: &mut mpsc::UnboundedReceiver<StoreEvent>) -> Vec<StoreEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Extracts the snapshots carried by `Tasks` events, in order.
fn snapshots(events: &[StoreEvent]) -> Vec<&Vec<Task>> {
    events
        .iter()
        .filter_map(|event| match event {
            StoreEvent::Tasks(tasks) => Some(tasks),
            _ => None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn initial_fetch_populates_the_store() {
    let (engine, mut rx) = SyncEngine::new(LoopbackApi::demo());
    engine.refresh(CancelToken::never()).await.unwrap();

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.len(), 4);
    let events = drain(&mut rx);
    assert_eq!(snapshots(&events).len(), 1);
}

#[tokio::test]
async fn cancelled_fetch_is_invisible() {
    let api = LoopbackApi::demo().with_delay(Duration::from_millis(100));
    let (engine, mut rx) = SyncEngine::new(api);

    let (handle, token) = CancelToken::pair();
    let fetch = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.refresh(token).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    handle.cancel();

    let result = fetch.await.unwrap();
    assert!(matches!(result, Err(ApiError::Cancelled)));
    assert!(engine.snapshot().is_empty());
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn refresh_after_cancel_still_works() {
    let (engine, mut rx) = SyncEngine::new(LoopbackApi::demo());

    let (handle, token) = CancelToken::pair();
    handle.cancel();
    assert!(engine.refresh(token).await.is_err());

    engine.refresh(CancelToken::never()).await.unwrap();
    assert_eq!(engine.snapshot().len(), 4);
    assert_eq!(snapshots(&drain(&mut rx)).len(), 1);
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_is_visible_before_the_service_responds() {
    let api = LoopbackApi::new().with_delay(Duration::from_millis(50));
    let (engine, mut rx) = SyncEngine::new(api);

    let create = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.create(TaskDraft::new("instant")).await })
    };

    // The provisional entry lands before the (delayed) service answers.
    tokio::time::sleep(Duration::from_millis(10)).await;
    let optimistic = engine.snapshot();
    assert_eq!(optimistic.len(), 1);
    assert_eq!(optimistic[0].title, "instant");
    let provisional_id = optimistic[0].id;

    let confirmed = create.await.unwrap().unwrap();
    assert_ne!(confirmed.id, provisional_id);
    assert_eq!(engine.snapshot()[0].id, confirmed.id);

    // Two snapshots (optimistic, confirmed) plus the confirmation notice.
    let events = drain(&mut rx);
    assert_eq!(snapshots(&events).len(), 2);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, StoreEvent::Confirmed(OpKind::Create)))
    );
}

#[tokio::test]
async fn failed_create_leaves_no_trace() {
    let (engine, mut rx) = SyncEngine::new(LoopbackApi::new());
    engine
        .api()
        .fail_next(ApiError::Rejected("Title too long".to_string()));

    let result = engine.create(TaskDraft::new("doomed")).await;
    assert!(result.is_err());
    assert!(engine.snapshot().is_empty());
    assert!(engine.api().records().is_empty());

    let events = drain(&mut rx);
    // Optimistic snapshot, rollback snapshot, then the failure notice.
    let shots = snapshots(&events);
    assert_eq!(shots.len(), 2);
    assert_eq!(shots[0].len(), 1);
    assert!(shots[1].is_empty());
    assert!(events.iter().any(|e| matches!(
        e,
        StoreEvent::Failed {
            op: OpKind::Create,
            ..
        }
    )));
}

#[tokio::test]
async fn failure_message_reaches_the_event_stream_verbatim() {
    let (engine, mut rx) = SyncEngine::new(LoopbackApi::new());
    engine
        .api()
        .fail_next(ApiError::Rejected("Task not found".to_string()));

    let _ = engine.create(TaskDraft::new("X")).await;
    let events = drain(&mut rx);
    let message = events.iter().find_map(|e| match e {
        StoreEvent::Failed { message, .. } => Some(message.clone()),
        _ => None,
    });
    assert_eq!(message.as_deref(), Some("Task not found"));
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn toggle_round_trips_through_the_service() {
    let (engine, _rx) = SyncEngine::new(LoopbackApi::new());
    let task = engine.create(TaskDraft::new("toggle me")).await.unwrap();

    engine
        .update(task.id, TaskPatch::completed(true))
        .await
        .unwrap();

    assert!(engine.snapshot()[0].completed);
    assert!(engine.api().records()[0].completed);
}

#[tokio::test]
async fn failed_update_rolls_back_every_field() {
    let (engine, _rx) = SyncEngine::new(LoopbackApi::new());
    let draft = TaskDraft {
        category: Some("Work".to_string()),
        ..TaskDraft::new("stable")
    };
    engine.create(draft).await.unwrap();
    let before = engine.snapshot();

    engine
        .api()
        .fail_next(ApiError::Network("connection reset".to_string()));
    let patch = TaskPatch {
        title: Some("renamed".to_string()),
        completed: Some(true),
        category: Some("Home".to_string()),
        ..TaskPatch::default()
    };
    assert!(engine.update(before[0].id, patch).await.is_err());

    // Exact restoration, updated_at included.
    assert_eq!(engine.snapshot(), before);
}

#[tokio::test]
async fn update_for_unknown_id_emits_nothing() {
    let (engine, mut rx) = SyncEngine::new(LoopbackApi::new());
    engine.update(404, TaskPatch::completed(true)).await.unwrap();
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn concurrent_toggles_on_one_task_serialize() {
    let api = LoopbackApi::new().with_delay(Duration::from_millis(10));
    let (engine, _rx) = SyncEngine::new(api);
    let task = engine.create(TaskDraft::new("contended")).await.unwrap();

    let mut handles = Vec::new();
    for completed in [true, false, true] {
        let engine = Arc::clone(&engine);
        let id = task.id;
        handles.push(tokio::spawn(async move {
            engine.update(id, TaskPatch::completed(completed)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // Local state agrees with the service after all three settle.
    assert_eq!(
        engine.snapshot()[0].completed,
        engine.api().records()[0].completed
    );
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_removes_locally_and_remotely() {
    let (engine, _rx) = SyncEngine::new(LoopbackApi::new());
    let task = engine.create(TaskDraft::new("doomed")).await.unwrap();

    engine.delete(task.id).await.unwrap();
    assert!(engine.snapshot().is_empty());
    assert!(engine.api().records().is_empty());
}

#[tokio::test]
async fn failed_delete_restores_the_task_in_timestamp_order() {
    let (engine, _rx) = SyncEngine::new(LoopbackApi::new());
    let older = engine.create(TaskDraft::new("older")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let newer = engine.create(TaskDraft::new("newer")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let newest = engine.create(TaskDraft::new("newest")).await.unwrap();

    engine
        .api()
        .fail_next(ApiError::Network("timeout".to_string()));
    assert!(engine.delete(newer.id).await.is_err());

    let ids: Vec<_> = engine.snapshot().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![newest.id, newer.id, older.id]);
}

#[tokio::test]
async fn delete_for_unknown_id_emits_nothing() {
    let (engine, mut rx) = SyncEngine::new(LoopbackApi::new());
    engine.delete(404).await.unwrap();
    assert!(drain(&mut rx).is_empty());
}

// ---------------------------------------------------------------------------
// Mixed workload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn interleaved_mutations_converge_with_the_service() {
    let (engine, _rx) = SyncEngine::new(LoopbackApi::demo());
    engine.refresh(CancelToken::never()).await.unwrap();

    let created = engine.create(TaskDraft::new("added")).await.unwrap();
    engine
        .update(created.id, TaskPatch::completed(true))
        .await
        .unwrap();
    engine.delete(1).await.unwrap();

    let mut local: Vec<_> = engine.snapshot().iter().map(|t| t.id).collect();
    let mut remote: Vec<_> = engine.api().records().iter().map(|t| t.id).collect();
    local.sort_unstable();
    remote.sort_unstable();
    assert_eq!(local, remote);
}
