//! Integration tests for reconciliation and sync passes
//!
//! These tests run the engine against an in-memory catalog and a scripted
//! remote endpoint, covering:
//! - The reconcile-then-sync scenario end to end
//! - Skipping of `Synced` records without network calls
//! - Failure isolation between records
//! - Progress persistence and its ordering
//! - Snapshot isolation of a running pass
//! - Store failures during reconcile and sync
//! - Exclusivity of sync, check and reset passes

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    BridgeError, ContentRef, ExistenceCheck, InventoryItem, ProgressSender, RemoteEntry,
    RemoteSyncEndpoint, UploadOutcome,
};
use core_library::{
    create_test_pool, CatalogRecord, CatalogRepository, LibraryError, NewCatalogRecord, Page,
    PageRequest, RecordId, SqliteCatalogRepository, SyncState,
};
use core_runtime::events::{CoreEvent, EventBus, SyncEvent};
use core_sync::{FailureKind, Reconciler, SyncConfig, SyncCoordinator, SyncError};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

// ============================================================================
// Scripted Endpoint
// ============================================================================

#[derive(Default)]
struct ScriptedEndpoint {
    /// Names the remote already has
    present: Mutex<HashSet<String>>,
    /// `exists` fails with a transport error for these names
    unreachable: HashSet<String>,
    /// `upload` fails with a 500 for these names
    rejected: HashSet<String>,
    /// `upload` answers 409 for these names
    conflicts: HashSet<String>,
    /// Byte progress reported by every upload, total 1000
    progress_steps: Vec<u64>,
    /// When set, uploads announce themselves and wait to be released
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
    exists_calls: Mutex<Vec<String>>,
    upload_calls: Mutex<Vec<String>>,
}

impl ScriptedEndpoint {
    fn new() -> Self {
        Self::default()
    }

    fn with_present(self, names: &[&str]) -> Self {
        let present = names.iter().map(|n| n.to_string()).collect();
        Self {
            present: Mutex::new(present),
            ..self
        }
    }

    fn unreachable_for(mut self, name: &str) -> Self {
        self.unreachable.insert(name.to_string());
        self
    }

    fn rejecting(mut self, name: &str) -> Self {
        self.rejected.insert(name.to_string());
        self
    }

    fn conflicting(mut self, name: &str) -> Self {
        self.conflicts.insert(name.to_string());
        self
    }

    fn with_progress(mut self, steps: &[u64]) -> Self {
        self.progress_steps = steps.to_vec();
        self
    }

    async fn exists_calls(&self) -> Vec<String> {
        self.exists_calls.lock().await.clone()
    }

    async fn upload_calls(&self) -> Vec<String> {
        self.upload_calls.lock().await.clone()
    }
}

#[async_trait]
impl RemoteSyncEndpoint for ScriptedEndpoint {
    async fn exists(&self, name: &str) -> BridgeResult<ExistenceCheck> {
        self.exists_calls.lock().await.push(name.to_string());

        if self.unreachable.contains(name) {
            return Err(BridgeError::Transport("connection refused".to_string()));
        }
        if self.present.lock().await.contains(name) {
            return Ok(ExistenceCheck::Found(RemoteEntry {
                name: name.to_string(),
                path: Some(format!("uploads/{}", name)),
                message: Some("File exists".to_string()),
            }));
        }
        Ok(ExistenceCheck::NotFound)
    }

    async fn upload(
        &self,
        _content: &ContentRef,
        name: &str,
        progress: ProgressSender,
    ) -> BridgeResult<UploadOutcome> {
        self.upload_calls.lock().await.push(name.to_string());

        if let Some((started, release)) = &self.gate {
            started.notify_one();
            release.notified().await;
        }

        for sent in &self.progress_steps {
            progress.report(*sent, 1000);
        }

        if self.rejected.contains(name) {
            return Err(BridgeError::Status {
                status: 500,
                message: "disk full".to_string(),
            });
        }
        if self.conflicts.contains(name) {
            return Ok(UploadOutcome::AlreadyExists {
                name: name.to_string(),
            });
        }

        self.present.lock().await.insert(name.to_string());
        Ok(UploadOutcome::Accepted {
            final_name: name.to_string(),
            path: Some(format!("uploads/{}", name)),
        })
    }
}

// ============================================================================
// Faulty Catalog
// ============================================================================

/// SQLite catalog that fails chosen writes for one record name.
struct FaultyCatalog {
    inner: Arc<SqliteCatalogRepository>,
    name: String,
    fail_insert: bool,
    /// `update_sync_state` into these states fails for `name`
    failing_states: Mutex<Vec<SyncState>>,
}

impl FaultyCatalog {
    fn new(inner: Arc<SqliteCatalogRepository>, name: &str) -> Self {
        Self {
            inner,
            name: name.to_string(),
            fail_insert: false,
            failing_states: Mutex::new(Vec::new()),
        }
    }

    fn failing_insert(mut self) -> Self {
        self.fail_insert = true;
        self
    }

    fn failing_states(self, states: &[SyncState]) -> Self {
        Self {
            failing_states: Mutex::new(states.to_vec()),
            ..self
        }
    }

    async fn heal(&self) {
        self.failing_states.lock().await.clear();
    }

    fn busy() -> LibraryError {
        LibraryError::Database(sqlx::Error::PoolTimedOut)
    }
}

#[async_trait]
impl CatalogRepository for FaultyCatalog {
    async fn insert(&self, record: &NewCatalogRecord) -> core_library::Result<CatalogRecord> {
        if self.fail_insert && record.name == self.name {
            return Err(Self::busy());
        }
        self.inner.insert(record).await
    }

    async fn find_by_id(&self, id: RecordId) -> core_library::Result<Option<CatalogRecord>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_name(&self, name: &str) -> core_library::Result<Option<CatalogRecord>> {
        self.inner.find_by_name(name).await
    }

    async fn list_all(&self) -> core_library::Result<Vec<CatalogRecord>> {
        self.inner.list_all().await
    }

    async fn query(&self, page_request: PageRequest) -> core_library::Result<Page<CatalogRecord>> {
        self.inner.query(page_request).await
    }

    async fn update_sync_state(
        &self,
        id: RecordId,
        state: SyncState,
        progress: f64,
    ) -> core_library::Result<()> {
        let target = self.inner.find_by_id(id).await?;
        let fails = target.is_some_and(|record| record.name == self.name)
            && self.failing_states.lock().await.contains(&state);
        if fails {
            return Err(Self::busy());
        }
        self.inner.update_sync_state(id, state, progress).await
    }

    async fn update_sync_progress(&self, id: RecordId, progress: f64) -> core_library::Result<bool> {
        self.inner.update_sync_progress(id, progress).await
    }

    async fn reset_all(&self) -> core_library::Result<u64> {
        self.inner.reset_all().await
    }

    async fn delete(&self, id: RecordId) -> core_library::Result<bool> {
        self.inner.delete(id).await
    }

    async fn clear(&self) -> core_library::Result<u64> {
        self.inner.clear().await
    }

    async fn count(&self) -> core_library::Result<i64> {
        self.inner.count().await
    }

    async fn count_by_state(&self, state: SyncState) -> core_library::Result<i64> {
        self.inner.count_by_state(state).await
    }
}

// ============================================================================
// Fixtures
// ============================================================================

struct Harness {
    catalog: Arc<SqliteCatalogRepository>,
    endpoint: Arc<ScriptedEndpoint>,
    event_bus: Arc<EventBus>,
    reconciler: Reconciler,
    coordinator: Arc<SyncCoordinator>,
}

async fn harness(endpoint: ScriptedEndpoint, granularity: f64) -> Harness {
    let pool = create_test_pool().await.unwrap();
    let catalog = Arc::new(SqliteCatalogRepository::new(pool));
    let endpoint = Arc::new(endpoint);
    let event_bus = Arc::new(EventBus::new(1024));

    let reconciler = Reconciler::new(catalog.clone(), event_bus.clone());
    let coordinator = Arc::new(SyncCoordinator::new(
        SyncConfig {
            progress_granularity: granularity,
        },
        catalog.clone(),
        endpoint.clone(),
        event_bus.clone(),
    ));

    Harness {
        catalog,
        endpoint,
        event_bus,
        reconciler,
        coordinator,
    }
}

/// Coordinator and reconciler over a [`FaultyCatalog`] wrapping a fresh store
async fn faulty_harness(
    endpoint: ScriptedEndpoint,
    wrap: impl FnOnce(Arc<SqliteCatalogRepository>) -> FaultyCatalog,
) -> (Harness, Arc<FaultyCatalog>, Reconciler, SyncCoordinator) {
    let h = harness(endpoint, 1.0).await;
    let faulty = Arc::new(wrap(h.catalog.clone()));

    let reconciler = Reconciler::new(faulty.clone(), h.event_bus.clone());
    let coordinator = SyncCoordinator::new(
        SyncConfig::default(),
        faulty.clone(),
        h.endpoint.clone(),
        h.event_bus.clone(),
    );
    (h, faulty, reconciler, coordinator)
}

fn item(id: &str, name: &str) -> InventoryItem {
    InventoryItem::new(id, name, format!("file:///photos/{}", name))
}

async fn states(catalog: &SqliteCatalogRepository) -> Vec<(String, SyncState)> {
    catalog
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|r| (r.name, r.sync_state))
        .collect()
}

fn drain(receiver: &mut tokio::sync::broadcast::Receiver<CoreEvent>) -> Vec<CoreEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_reconcile_then_sync_scenario() {
    let h = harness(ScriptedEndpoint::new().with_present(&["x.jpg"]), 1.0).await;

    h.reconciler
        .reconcile_items(vec![item("a1", "x.jpg"), item("a2", "y.jpg")])
        .await;
    assert_eq!(
        states(&h.catalog).await,
        vec![
            ("x.jpg".to_string(), SyncState::Unsynced),
            ("y.jpg".to_string(), SyncState::Unsynced),
        ]
    );

    let report = h.coordinator.sync_all().await.unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(report.already_present, 1);
    assert_eq!(report.uploaded, 1);
    assert!(report.is_clean());
    assert_eq!(h.endpoint.upload_calls().await, vec!["y.jpg"]);
    assert_eq!(
        states(&h.catalog).await,
        vec![
            ("x.jpg".to_string(), SyncState::Synced),
            ("y.jpg".to_string(), SyncState::Synced),
        ]
    );
}

#[tokio::test]
async fn test_synced_records_cause_no_network_calls() {
    let h = harness(ScriptedEndpoint::new(), 1.0).await;
    h.reconciler
        .reconcile_items(vec![item("a1", "x.jpg"), item("a2", "y.jpg")])
        .await;

    h.coordinator.sync_all().await.unwrap();
    let exists_before = h.endpoint.exists_calls().await.len();

    let report = h.coordinator.sync_all().await.unwrap();

    assert_eq!(report.skipped, 2);
    assert_eq!(report.uploaded, 0);
    assert_eq!(h.endpoint.exists_calls().await.len(), exists_before);
    assert_eq!(h.endpoint.upload_calls().await.len(), 2);
}

#[tokio::test]
async fn test_transport_error_leaves_record_unsynced_and_continues() {
    let h = harness(ScriptedEndpoint::new().unreachable_for("x.jpg"), 1.0).await;
    h.reconciler
        .reconcile_items(vec![item("a1", "x.jpg"), item("a2", "y.jpg")])
        .await;

    let report = h.coordinator.sync_all().await.unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "x.jpg");
    assert_eq!(report.failures[0].kind, FailureKind::Transport);
    assert_eq!(report.uploaded, 1);
    assert_eq!(
        states(&h.catalog).await,
        vec![
            ("x.jpg".to_string(), SyncState::Unsynced),
            ("y.jpg".to_string(), SyncState::Synced),
        ]
    );
}

#[tokio::test]
async fn test_upload_failure_does_not_stop_later_records() {
    let h = harness(ScriptedEndpoint::new().rejecting("b.jpg"), 1.0).await;
    h.reconciler
        .reconcile_items(vec![
            item("1", "a.jpg"),
            item("2", "b.jpg"),
            item("3", "c.jpg"),
        ])
        .await;

    let report = h.coordinator.sync_all().await.unwrap();

    assert_eq!(report.uploaded, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, FailureKind::Remote);
    assert_eq!(
        h.endpoint.upload_calls().await,
        vec!["a.jpg", "b.jpg", "c.jpg"]
    );

    let failed = h.catalog.find_by_name("b.jpg").await.unwrap().unwrap();
    assert_eq!(failed.sync_state, SyncState::Unsynced);
    assert_eq!(failed.sync_progress, 0.0);
}

#[tokio::test]
async fn test_conflict_counts_as_synced() {
    let h = harness(ScriptedEndpoint::new().conflicting("x.jpg"), 1.0).await;
    h.reconciler.reconcile_items(vec![item("a1", "x.jpg")]).await;

    let report = h.coordinator.sync_all().await.unwrap();

    assert_eq!(report.duplicates, 1);
    assert!(report.is_clean());
    assert_eq!(
        states(&h.catalog).await,
        vec![("x.jpg".to_string(), SyncState::Synced)]
    );
}

#[tokio::test]
async fn test_progress_is_monotonic_and_reset_after_upload() {
    let endpoint = ScriptedEndpoint::new().with_progress(&[0, 250, 125, 625, 1000]);
    let h = harness(endpoint, 0.0).await;
    h.reconciler.reconcile_items(vec![item("a1", "x.jpg")]).await;
    let mut receiver = h.event_bus.subscribe();

    h.coordinator.sync_all().await.unwrap();

    let events = drain(&mut receiver);
    let percents: Vec<f64> = events
        .iter()
        .filter_map(|event| match event {
            CoreEvent::Sync(SyncEvent::Progress { percent, .. }) => Some(*percent),
            _ => None,
        })
        .collect();
    assert_eq!(percents, vec![25.0, 62.5, 100.0]);

    let transitions: Vec<(String, String, f64)> = events
        .iter()
        .filter_map(|event| match event {
            CoreEvent::Sync(SyncEvent::StateChanged { from, to, progress, .. }) => {
                Some((from.clone(), to.clone(), *progress))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        transitions,
        vec![
            ("unsynced".to_string(), "checking".to_string(), 0.0),
            ("checking".to_string(), "uploading".to_string(), 0.0),
            ("uploading".to_string(), "synced".to_string(), 0.0),
        ]
    );

    let record = h.catalog.find_by_name("x.jpg").await.unwrap().unwrap();
    assert_eq!(record.sync_progress, 0.0);
}

#[tokio::test]
async fn test_progress_granularity_limits_writes() {
    let steps: Vec<u64> = (1..=8).map(|i| i * 125).collect();
    let h = harness(ScriptedEndpoint::new().with_progress(&steps), 25.0).await;
    h.reconciler.reconcile_items(vec![item("a1", "x.jpg")]).await;
    let mut receiver = h.event_bus.subscribe();

    h.coordinator.sync_all().await.unwrap();

    let progress_events = drain(&mut receiver)
        .into_iter()
        .filter(|event| matches!(event, CoreEvent::Sync(SyncEvent::Progress { .. })))
        .count();
    assert_eq!(progress_events, 4);
}

#[tokio::test]
async fn test_interrupted_record_restarts_from_checking() {
    let h = harness(ScriptedEndpoint::new(), 1.0).await;
    h.reconciler.reconcile_items(vec![item("a1", "x.jpg")]).await;
    let record = h.catalog.find_by_name("x.jpg").await.unwrap().unwrap();
    h.catalog
        .update_sync_state(record.id, SyncState::Checking, 0.0)
        .await
        .unwrap();
    h.catalog
        .update_sync_state(record.id, SyncState::Uploading, 0.0)
        .await
        .unwrap();

    let report = h.coordinator.sync_all().await.unwrap();

    assert_eq!(report.uploaded, 1);
    assert_eq!(
        states(&h.catalog).await,
        vec![("x.jpg".to_string(), SyncState::Synced)]
    );
}

#[tokio::test]
async fn test_completed_event_matches_report() {
    let h = harness(ScriptedEndpoint::new().with_present(&["x.jpg"]), 1.0).await;
    h.reconciler
        .reconcile_items(vec![item("a1", "x.jpg"), item("a2", "y.jpg")])
        .await;
    let mut receiver = h.event_bus.subscribe();

    let report = h.coordinator.sync_all().await.unwrap();

    let events = drain(&mut receiver);
    assert!(matches!(
        events.first(),
        Some(CoreEvent::Sync(SyncEvent::Started { total: 2, .. }))
    ));
    match events.last() {
        Some(CoreEvent::Sync(SyncEvent::Completed {
            run_id,
            already_present,
            uploaded,
            failed,
            ..
        })) => {
            assert_eq!(run_id, &report.run_id);
            assert_eq!(*already_present, 1);
            assert_eq!(*uploaded, 1);
            assert_eq!(*failed, 0);
        }
        other => panic!("expected Completed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_check_all_changes_nothing() {
    let h = harness(
        ScriptedEndpoint::new()
            .with_present(&["x.jpg"])
            .unreachable_for("z.jpg"),
        1.0,
    )
    .await;
    h.reconciler
        .reconcile_items(vec![
            item("a1", "x.jpg"),
            item("a2", "y.jpg"),
            item("a3", "z.jpg"),
        ])
        .await;

    let report = h.coordinator.check_all().await.unwrap();

    assert_eq!(report.present, vec!["x.jpg"]);
    assert_eq!(report.missing, vec!["y.jpg"]);
    assert_eq!(report.failures.len(), 1);
    assert!(h.endpoint.upload_calls().await.is_empty());
    assert_eq!(
        h.catalog.count_by_state(SyncState::Unsynced).await.unwrap(),
        3
    );
}

#[tokio::test]
async fn test_reset_all_returns_records_to_unsynced() {
    let h = harness(ScriptedEndpoint::new(), 1.0).await;
    h.reconciler
        .reconcile_items(vec![item("a1", "x.jpg"), item("a2", "y.jpg")])
        .await;
    h.coordinator.sync_all().await.unwrap();

    let count = h.coordinator.reset_all().await.unwrap();

    assert_eq!(count, 2);
    assert_eq!(
        h.catalog.count_by_state(SyncState::Unsynced).await.unwrap(),
        2
    );
    let record = h.catalog.find_by_name("x.jpg").await.unwrap().unwrap();
    assert_eq!(record.content_ref.as_str(), "file:///photos/x.jpg");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_second_pass_is_refused_while_one_runs() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let endpoint = ScriptedEndpoint {
        gate: Some((started.clone(), release.clone())),
        ..ScriptedEndpoint::new()
    };
    let h = harness(endpoint, 1.0).await;
    h.reconciler.reconcile_items(vec![item("a1", "x.jpg")]).await;

    let coordinator = h.coordinator.clone();
    let running = tokio::spawn(async move { coordinator.sync_all().await });
    started.notified().await;

    assert!(h.coordinator.is_running());
    assert!(matches!(
        h.coordinator.sync_all().await,
        Err(SyncError::SyncInProgress)
    ));
    assert!(matches!(
        h.coordinator.reset_all().await,
        Err(SyncError::SyncInProgress)
    ));
    assert!(matches!(
        h.coordinator.check_all().await,
        Err(SyncError::SyncInProgress)
    ));

    release.notify_one();
    let report = running.await.unwrap().unwrap();
    assert_eq!(report.uploaded, 1);
    assert!(!h.coordinator.is_running());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_records_added_mid_pass_wait_for_next_pass() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let endpoint = ScriptedEndpoint {
        gate: Some((started.clone(), release.clone())),
        ..ScriptedEndpoint::new()
    };
    let h = harness(endpoint, 1.0).await;
    h.reconciler.reconcile_items(vec![item("a1", "x.jpg")]).await;

    let coordinator = h.coordinator.clone();
    let running = tokio::spawn(async move { coordinator.sync_all().await });
    started.notified().await;

    let added = h.reconciler.reconcile_items(vec![item("a2", "late.jpg")]).await;
    assert_eq!(added.inserted, 1);

    release.notify_one();
    let report = running.await.unwrap().unwrap();

    assert_eq!(report.total, 1);
    assert_eq!(report.uploaded, 1);
    assert_eq!(h.endpoint.exists_calls().await, vec!["x.jpg"]);
    assert_eq!(
        states(&h.catalog).await,
        vec![
            ("x.jpg".to_string(), SyncState::Synced),
            ("late.jpg".to_string(), SyncState::Unsynced),
        ]
    );
}

#[tokio::test]
async fn test_insert_failure_is_reported_and_reconcile_continues() {
    let (h, _, reconciler, _) =
        faulty_harness(ScriptedEndpoint::new(), |inner| {
            FaultyCatalog::new(inner, "b.jpg").failing_insert()
        })
        .await;

    let report = reconciler
        .reconcile_items(vec![
            item("1", "a.jpg"),
            item("2", "b.jpg"),
            item("3", "c.jpg"),
        ])
        .await;

    assert_eq!(report.inserted, 2);
    assert!(report.skipped.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].name, "b.jpg");
    assert_eq!(report.failed[0].kind, FailureKind::Store);
    assert_eq!(
        states(&h.catalog).await,
        vec![
            ("a.jpg".to_string(), SyncState::Unsynced),
            ("c.jpg".to_string(), SyncState::Unsynced),
        ]
    );
}

#[tokio::test]
async fn test_state_write_failure_is_isolated_to_its_record() {
    let (h, _, reconciler, coordinator) =
        faulty_harness(ScriptedEndpoint::new(), |inner| {
            FaultyCatalog::new(inner, "a.jpg").failing_states(&[SyncState::Uploading])
        })
        .await;
    reconciler
        .reconcile_items(vec![item("1", "a.jpg"), item("2", "b.jpg")])
        .await;
    let mut receiver = h.event_bus.subscribe();

    let report = coordinator.sync_all().await.unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(report.uploaded, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "a.jpg");
    assert_eq!(report.failures[0].kind, FailureKind::Store);
    assert_eq!(h.endpoint.exists_calls().await, vec!["a.jpg", "b.jpg"]);
    assert_eq!(h.endpoint.upload_calls().await, vec!["b.jpg"]);

    // Restored from Checking back to Unsynced
    assert_eq!(
        states(&h.catalog).await,
        vec![
            ("a.jpg".to_string(), SyncState::Unsynced),
            ("b.jpg".to_string(), SyncState::Synced),
        ]
    );
    assert!(drain(&mut receiver).iter().any(|event| matches!(
        event,
        CoreEvent::Sync(SyncEvent::RecordFailed { name, kind, .. })
            if name == "a.jpg" && kind == "store"
    )));
}

#[tokio::test]
async fn test_record_stuck_after_failed_restore_recovers_next_pass() {
    let (h, faulty, reconciler, coordinator) =
        faulty_harness(ScriptedEndpoint::new(), |inner| {
            FaultyCatalog::new(inner, "a.jpg")
                .failing_states(&[SyncState::Synced, SyncState::Unsynced])
        })
        .await;
    reconciler
        .reconcile_items(vec![item("1", "a.jpg"), item("2", "b.jpg")])
        .await;

    let report = coordinator.sync_all().await.unwrap();

    assert_eq!(report.uploaded, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, FailureKind::Store);
    assert_eq!(h.endpoint.upload_calls().await, vec!["a.jpg", "b.jpg"]);
    // Neither Synced nor the restore to Unsynced could be written
    assert_eq!(
        states(&h.catalog).await,
        vec![
            ("a.jpg".to_string(), SyncState::Uploading),
            ("b.jpg".to_string(), SyncState::Synced),
        ]
    );

    faulty.heal().await;
    let report = coordinator.sync_all().await.unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.already_present, 1);
    assert!(report.is_clean());
    assert_eq!(h.endpoint.upload_calls().await.len(), 2);
    assert_eq!(
        h.catalog.count_by_state(SyncState::Synced).await.unwrap(),
        2
    );
}
