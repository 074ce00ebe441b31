//! RemoteResource mirror and operation-state tests
//!
//! Uses the gated in-memory backend so overlapping requests resolve in an
//! order the test chooses.

mod common;

use common::mocks::{entry, notes_patch, GatedBackend};
use neonest::api::{Action, OpState, ReconcilePolicy, RemoteResource};
use neonest::sleep::{NewSleepEntry, SleepEntry, SleepType};
use neonest::types::{AppError, ErrorKind};
use std::sync::Arc;

type SleepLog = RemoteResource<SleepEntry, GatedBackend>;

fn draft() -> NewSleepEntry {
    NewSleepEntry {
        date: "2025-03-02".to_string(),
        time: "14:00".to_string(),
        kind: SleepType::Night,
        duration: "2 hrs".to_string(),
        mood: None,
        notes: String::new(),
        baby_name: "YourBaby".to_string(),
    }
}

fn sleep_log(records: Vec<SleepEntry>) -> SleepLog {
    RemoteResource::new(GatedBackend::new(records))
}

async fn wait_for_updates(log: &SleepLog, n: usize) {
    while log.backend().update_calls() < n {
        tokio::task::yield_now().await;
    }
}

// ============= CRUD Mirror =============

#[tokio::test]
async fn test_list_replaces_mirror() {
    let log = sleep_log(vec![entry("1", "2025-03-01", "09:00")])
        .with_records(vec![entry("stale", "2025-01-01", "08:00")]);

    let records = log.list().await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(log.records(), records);
    assert_eq!(log.state(&Action::List), OpState::Success);
}

#[tokio::test]
async fn test_create_appends_server_record() {
    let log = sleep_log(vec![entry("1", "2025-03-01", "09:00")]);
    log.list().await.unwrap();

    let created = log.create(&draft()).await.unwrap();

    assert_eq!(log.len(), 2);
    assert_eq!(log.records().last(), Some(&created));
    assert_eq!(created.kind, SleepType::Night);
    assert_eq!(log.state(&Action::Create), OpState::Success);
}

#[tokio::test]
async fn test_update_replaces_in_place() {
    let log = sleep_log(vec![
        entry("1", "2025-03-01", "09:00"),
        entry("2", "2025-03-01", "13:00"),
    ]);
    log.list().await.unwrap();

    log.update(&"1".to_string(), &notes_patch("fussy")).await.unwrap();

    let ids: Vec<String> = log.records().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert_eq!(log.get(&"1".to_string()).unwrap().notes, "fussy");
}

#[tokio::test]
async fn test_remove_drops_record() {
    let log = sleep_log(vec![
        entry("1", "2025-03-01", "09:00"),
        entry("2", "2025-03-01", "13:00"),
    ]);
    log.list().await.unwrap();

    log.remove(&"1".to_string()).await.unwrap();

    assert_eq!(log.len(), 1);
    assert!(log.get(&"1".to_string()).is_none());
    // The record is gone, so its action state is forgotten with it
    assert_eq!(log.state(&Action::Remove("1".to_string())), OpState::Idle);
    assert_eq!(log.state(&Action::List), OpState::Success);
}

// ============= Failures =============

#[tokio::test]
async fn test_network_failure_leaves_mirror_unchanged() {
    let log = sleep_log(vec![entry("1", "2025-03-01", "09:00")]);
    log.list().await.unwrap();
    let before = log.records();

    log.backend()
        .fail_next(AppError::Network("connection refused".to_string()));
    let err = log.create(&draft()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(log.records(), before);
    assert_eq!(log.state(&Action::Create), OpState::Failed(ErrorKind::Network));
    // no retry happened
    assert_eq!(log.backend().stored().len(), 1);
}

#[tokio::test]
async fn test_unauthorized_list_keeps_previous_mirror() {
    let seeded = vec![entry("1", "2025-03-01", "09:00")];
    let log = sleep_log(vec![]).with_records(seeded.clone());

    log.backend()
        .fail_next(AppError::from_status(401, Some("Unauthorized".to_string())));
    let err = log.list().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(log.records(), seeded);
    assert_eq!(log.state(&Action::List), OpState::Failed(ErrorKind::Unauthorized));
}

#[tokio::test]
async fn test_failed_action_recovers_on_next_success() {
    let log = sleep_log(vec![]);

    log.backend().fail_next(AppError::Network("timeout".to_string()));
    assert!(log.create(&draft()).await.is_err());
    log.create(&draft()).await.unwrap();

    assert_eq!(log.state(&Action::Create), OpState::Success);
    assert_eq!(log.len(), 1);
}

// ============= Operation State =============

#[tokio::test]
async fn test_states_are_per_action() {
    let log = sleep_log(vec![entry("1", "2025-03-01", "09:00")]);

    assert_eq!(log.state(&Action::List), OpState::Idle);
    log.list().await.unwrap();

    assert_eq!(log.state(&Action::List), OpState::Success);
    assert_eq!(log.state(&Action::Update("1".to_string())), OpState::Idle);
    assert!(!log.is_busy(&Action::Create));
}

#[tokio::test]
async fn test_update_in_flight_until_resolved() {
    let log = Arc::new(sleep_log(vec![entry("1", "2025-03-01", "09:00")]));
    let release = log.backend().gate("slow");
    log.list().await.unwrap();

    let task = {
        let log = Arc::clone(&log);
        tokio::spawn(async move { log.update(&"1".to_string(), &notes_patch("slow")).await })
    };
    wait_for_updates(&log, 1).await;

    let action = Action::Update("1".to_string());
    assert_eq!(log.state(&action), OpState::InFlight);
    assert!(log.is_busy(&action));
    assert!(!log.is_busy(&Action::Update("2".to_string())));

    release.send(()).unwrap();
    task.await.unwrap().unwrap();
    assert_eq!(log.state(&action), OpState::Success);
}

// ============= Overlapping Updates =============

/// Issue A then B for the same id; resolve B first, then A.
async fn overlapping_updates(policy: ReconcilePolicy) -> (Arc<SleepLog>, SleepEntry, SleepEntry) {
    let log = Arc::new(sleep_log(vec![entry("1", "2025-03-01", "09:00")]).with_policy(policy));
    let release_a = log.backend().gate("A");
    let release_b = log.backend().gate("B");
    log.list().await.unwrap();

    let spawn_update = |notes: &'static str| {
        let log = Arc::clone(&log);
        tokio::spawn(async move { log.update(&"1".to_string(), &notes_patch(notes)).await })
    };

    let a = spawn_update("A");
    wait_for_updates(&log, 1).await;
    let b = spawn_update("B");
    wait_for_updates(&log, 2).await;
    assert!(log.is_busy(&Action::Update("1".to_string())));

    release_b.send(()).unwrap();
    let resolved_b = b.await.unwrap().unwrap();
    assert_eq!(log.get(&"1".to_string()).unwrap().notes, "B");
    // A is still pending
    assert!(log.is_busy(&Action::Update("1".to_string())));

    release_a.send(()).unwrap();
    let resolved_a = a.await.unwrap().unwrap();
    assert!(!log.is_busy(&Action::Update("1".to_string())));

    (log, resolved_a, resolved_b)
}

#[tokio::test]
async fn test_last_resolved_wins_by_default() {
    let (log, resolved_a, _) = overlapping_updates(ReconcilePolicy::default()).await;

    assert_eq!(log.get(&"1".to_string()).unwrap(), resolved_a);
    assert_eq!(log.get(&"1".to_string()).unwrap().notes, "A");
}

#[tokio::test]
async fn test_latest_issued_wins_when_opted_in() {
    let (log, _, resolved_b) = overlapping_updates(ReconcilePolicy::LatestIssuedWins).await;

    assert_eq!(log.get(&"1".to_string()).unwrap(), resolved_b);
    assert_eq!(log.get(&"1".to_string()).unwrap().notes, "B");
}

// ============= Teardown =============

#[tokio::test]
async fn test_detached_resource_discards_late_results() {
    let log = Arc::new(sleep_log(vec![entry("1", "2025-03-01", "09:00")]));
    let release = log.backend().gate("late");
    log.list().await.unwrap();

    let task = {
        let log = Arc::clone(&log);
        tokio::spawn(async move { log.update(&"1".to_string(), &notes_patch("late")).await })
    };
    wait_for_updates(&log, 1).await;

    log.detach();
    release.send(()).unwrap();
    let result = task.await.unwrap().unwrap();

    assert_eq!(result.notes, "late");
    assert!(log.is_detached());
    assert_eq!(log.get(&"1".to_string()).unwrap().notes, "");
}
