//! # Sync Coordinator
//!
//! Drives unsynced catalog records through the remote check/upload protocol.
//!
//! ## Overview
//!
//! A sync pass takes a snapshot of the catalog, then visits records in
//! ascending id order, one at a time:
//!
//! 1. `Unsynced -> Checking`, then ask the endpoint whether the name exists
//! 2. Found: `Checking -> Synced`, no upload
//! 3. Not found: `Checking -> Uploading` at 0%, stream the upload while
//!    persisting its progress, then `Synced` on success or conflict and
//!    `Unsynced` on failure
//! 4. Any check failure: `Checking -> Unsynced`
//!
//! Every transition is written to the catalog and followed by a
//! `SyncEvent::StateChanged`. A failure on one record is recorded in the
//! [`SyncReport`] and the pass moves on. `Synced` records are skipped without
//! a network call. Nothing is retried within a pass.
//!
//! ## Exclusivity
//!
//! `sync_all`, `check_all` and `reset_all` share one guard. A second call while
//! any of them runs fails immediately with [`SyncError::SyncInProgress`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_sync::{SyncConfig, SyncCoordinator};
//!
//! let coordinator = SyncCoordinator::new(SyncConfig::default(), catalog, endpoint, event_bus);
//! let report = coordinator.sync_all().await?;
//! println!("uploaded {} of {}", report.uploaded, report.total);
//! ```

use crate::error::{Result, SyncError};
use crate::report::{CheckReport, RecordFailure, SyncReport};
use bridge_traits::{
    progress_channel, ExistenceCheck, ProgressReceiver, RemoteSyncEndpoint, TransferProgress,
    UploadOutcome,
};
use core_library::{CatalogRecord, CatalogRepository, SyncState};
use core_runtime::events::{CatalogEvent, CoreEvent, EventBus, SyncEvent};
use core_runtime::logging::strip_path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

/// Sync coordinator configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Minimum advance, in percent, between two persisted progress values.
    /// Reaching 100% is always persisted.
    pub progress_granularity: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            progress_granularity: 1.0,
        }
    }
}

/// How one record left a sync pass.
#[derive(Debug)]
enum RecordOutcome {
    AlreadyPresent,
    Uploaded,
    Duplicate,
    Failed(RecordFailure),
}

/// Sync coordinator for the per-record protocol
pub struct SyncCoordinator {
    config: SyncConfig,
    catalog: Arc<dyn CatalogRepository>,
    endpoint: Arc<dyn RemoteSyncEndpoint>,
    event_bus: Arc<EventBus>,
    /// Held for the whole of a sync, check or reset pass
    pass_guard: Mutex<()>,
}

impl SyncCoordinator {
    pub fn new(
        config: SyncConfig,
        catalog: Arc<dyn CatalogRepository>,
        endpoint: Arc<dyn RemoteSyncEndpoint>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            config,
            catalog,
            endpoint,
            event_bus,
            pass_guard: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Whether a sync, check or reset pass holds the guard right now
    pub fn is_running(&self) -> bool {
        self.pass_guard.try_lock().is_err()
    }

    /// Take the pass guard for an administrative change to the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::SyncInProgress`] if a pass is running.
    pub fn try_exclusive(&self) -> Result<MutexGuard<'_, ()>> {
        self.pass_guard
            .try_lock()
            .map_err(|_| SyncError::SyncInProgress)
    }

    /// Run one sync pass over a snapshot of the catalog.
    ///
    /// # Errors
    ///
    /// Fails only if another pass is running or the snapshot cannot be read.
    /// Per-record failures are reported in [`SyncReport::failures`].
    #[instrument(skip(self))]
    pub async fn sync_all(&self) -> Result<SyncReport> {
        let _guard = self.try_exclusive()?;
        let started = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();

        let snapshot = self.catalog.list_all().await?;
        let mut report = SyncReport::new(&run_id, snapshot.len() as u64);

        info!(run_id = %run_id, total = report.total, "Starting sync pass");
        self.emit(SyncEvent::Started {
            run_id: run_id.clone(),
            total: report.total,
        });

        for mut record in snapshot {
            if record.is_synced() {
                report.skipped += 1;
                continue;
            }

            let outcome = match self.sync_record(&run_id, &mut record).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(record_id = %record.id, error = %e, "Sync protocol aborted for record");
                    let failure = RecordFailure::from_sync_error(&record, &e);
                    self.restore_unsynced(&run_id, &mut record).await;
                    RecordOutcome::Failed(failure)
                }
            };

            match outcome {
                RecordOutcome::AlreadyPresent => report.already_present += 1,
                RecordOutcome::Uploaded => report.uploaded += 1,
                RecordOutcome::Duplicate => report.duplicates += 1,
                RecordOutcome::Failed(failure) => {
                    self.emit(SyncEvent::RecordFailed {
                        run_id: run_id.clone(),
                        record_id: failure.record_id.value(),
                        name: failure.name.clone(),
                        kind: failure.kind.to_string(),
                        message: failure.message.clone(),
                    });
                    report.failures.push(failure);
                }
            }
        }

        report.duration = started.elapsed();
        self.emit(SyncEvent::Completed {
            run_id: run_id.clone(),
            total: report.total,
            skipped: report.skipped,
            already_present: report.already_present,
            uploaded: report.uploaded,
            duplicates: report.duplicates,
            failed: report.failed(),
            duration_ms: report.duration.as_millis() as u64,
        });
        info!(
            run_id = %run_id,
            skipped = report.skipped,
            already_present = report.already_present,
            uploaded = report.uploaded,
            duplicates = report.duplicates,
            failed = report.failed(),
            duration_ms = report.duration.as_millis() as u64,
            "Sync pass completed"
        );

        Ok(report)
    }

    /// Ask the remote about every record without changing any of them.
    #[instrument(skip(self))]
    pub async fn check_all(&self) -> Result<CheckReport> {
        let _guard = self.try_exclusive()?;
        let run_id = uuid::Uuid::new_v4().to_string();
        let snapshot = self.catalog.list_all().await?;

        let mut report = CheckReport {
            run_id: run_id.clone(),
            ..Default::default()
        };

        for record in &snapshot {
            match self.endpoint.exists(&record.name).await {
                Ok(ExistenceCheck::Found(_)) => report.present.push(record.name.clone()),
                Ok(ExistenceCheck::NotFound) => report.missing.push(record.name.clone()),
                Err(e) => {
                    debug!(record_id = %record.id, error = %e, "Existence check failed");
                    report.failures.push(RecordFailure::from_bridge(record, &e));
                }
            }
        }

        self.emit(SyncEvent::CheckCompleted {
            run_id,
            present: report.present.len() as u64,
            missing: report.missing.len() as u64,
            failed: report.failures.len() as u64,
        });
        info!(
            present = report.present.len(),
            missing = report.missing.len(),
            failed = report.failures.len(),
            "Check pass completed"
        );

        Ok(report)
    }

    /// Move every record back to `Unsynced`. Returns the number reset.
    #[instrument(skip(self))]
    pub async fn reset_all(&self) -> Result<u64> {
        let _guard = self.try_exclusive()?;
        let count = self.catalog.reset_all().await?;

        self.event_bus
            .emit(CoreEvent::Catalog(CatalogEvent::RecordsReset { count }))
            .ok();
        info!(count, "Reset all records to unsynced");
        Ok(count)
    }

    async fn sync_record(&self, run_id: &str, record: &mut CatalogRecord) -> Result<RecordOutcome> {
        self.transition(run_id, record, SyncState::Checking, 0.0).await?;

        match self.endpoint.exists(&record.name).await {
            Ok(ExistenceCheck::Found(entry)) => {
                debug!(record_id = %record.id, path = ?entry.path, "Already on remote");
                self.transition(run_id, record, SyncState::Synced, 0.0).await?;
                return Ok(RecordOutcome::AlreadyPresent);
            }
            Ok(ExistenceCheck::NotFound) => {}
            Err(e) => {
                warn!(record_id = %record.id, name = %record.name, error = %e, "Existence check failed");
                self.transition(run_id, record, SyncState::Unsynced, 0.0).await?;
                return Ok(RecordOutcome::Failed(RecordFailure::from_bridge(record, &e)));
            }
        }

        self.transition(run_id, record, SyncState::Uploading, 0.0).await?;
        debug!(
            record_id = %record.id,
            content = %strip_path(record.content_ref.as_str()),
            "Uploading"
        );

        match self.upload_with_progress(run_id, record).await {
            Ok(UploadOutcome::Accepted { final_name, .. }) => {
                if final_name != record.name {
                    debug!(record_id = %record.id, %final_name, "Remote stored under a different name");
                }
                self.transition(run_id, record, SyncState::Synced, 0.0).await?;
                Ok(RecordOutcome::Uploaded)
            }
            Ok(UploadOutcome::AlreadyExists { .. }) => {
                debug!(record_id = %record.id, "Remote reported a duplicate");
                self.transition(run_id, record, SyncState::Synced, 0.0).await?;
                Ok(RecordOutcome::Duplicate)
            }
            Err(e) => {
                warn!(record_id = %record.id, name = %record.name, error = %e, "Upload failed");
                self.transition(run_id, record, SyncState::Unsynced, 0.0).await?;
                Ok(RecordOutcome::Failed(RecordFailure::from_bridge(record, &e)))
            }
        }
    }

    /// Run the upload while draining its progress channel on the same task.
    async fn upload_with_progress(
        &self,
        run_id: &str,
        record: &CatalogRecord,
    ) -> bridge_traits::error::Result<UploadOutcome> {
        let (sender, mut receiver) = progress_channel();
        let mut tracker = ProgressTracker::new(self.config.progress_granularity);

        let upload = self.endpoint.upload(&record.content_ref, &record.name, sender);
        tokio::pin!(upload);

        let outcome = loop {
            tokio::select! {
                biased;
                Some(progress) = receiver.recv() => {
                    self.record_progress(run_id, record, progress, &mut tracker).await;
                }
                outcome = &mut upload => break outcome,
            }
        };

        self.drain_progress(run_id, record, &mut receiver, &mut tracker)
            .await;
        outcome
    }

    async fn drain_progress(
        &self,
        run_id: &str,
        record: &CatalogRecord,
        receiver: &mut ProgressReceiver,
        tracker: &mut ProgressTracker,
    ) {
        while let Ok(progress) = receiver.try_recv() {
            self.record_progress(run_id, record, progress, tracker).await;
        }
    }

    async fn record_progress(
        &self,
        run_id: &str,
        record: &CatalogRecord,
        progress: TransferProgress,
        tracker: &mut ProgressTracker,
    ) {
        let percent = progress.percent();
        if !tracker.should_persist(percent) {
            return;
        }

        match self.catalog.update_sync_progress(record.id, percent).await {
            Ok(true) => {
                tracker.persisted(percent);
                self.emit(SyncEvent::Progress {
                    run_id: run_id.to_string(),
                    record_id: record.id.value(),
                    name: record.name.clone(),
                    percent,
                    bytes_sent: progress.bytes_sent,
                    total_bytes: progress.total_bytes,
                });
            }
            Ok(false) => {
                debug!(record_id = %record.id, percent, "Progress update not applied");
            }
            Err(e) => {
                warn!(record_id = %record.id, error = %e, "Failed to persist upload progress");
            }
        }
    }

    /// Validate, persist and announce a state change.
    async fn transition(
        &self,
        run_id: &str,
        record: &mut CatalogRecord,
        to: SyncState,
        progress: f64,
    ) -> Result<()> {
        let from = record.sync_state;
        if !from.can_transition_to(to) {
            return Err(SyncError::InvalidStateTransition {
                record_id: record.id,
                from,
                to,
            });
        }

        self.catalog.update_sync_state(record.id, to, progress).await?;
        record.sync_state = to;
        record.sync_progress = progress;

        self.emit(SyncEvent::StateChanged {
            run_id: run_id.to_string(),
            record_id: record.id.value(),
            name: record.name.clone(),
            from: from.to_string(),
            to: to.to_string(),
            progress,
        });
        Ok(())
    }

    /// Best effort after an aborted protocol: leave the record `Unsynced`.
    async fn restore_unsynced(&self, run_id: &str, record: &mut CatalogRecord) {
        if record.sync_state == SyncState::Unsynced {
            return;
        }
        if let Err(e) = self
            .transition(run_id, record, SyncState::Unsynced, 0.0)
            .await
        {
            warn!(record_id = %record.id, error = %e, "Could not return record to unsynced");
        }
    }

    fn emit(&self, event: SyncEvent) {
        self.event_bus.emit(CoreEvent::Sync(event)).ok();
    }
}

/// Decides which progress values are worth a store write.
#[derive(Debug)]
struct ProgressTracker {
    granularity: f64,
    last: f64,
}

impl ProgressTracker {
    fn new(granularity: f64) -> Self {
        Self {
            granularity: granularity.max(0.0),
            last: 0.0,
        }
    }

    fn should_persist(&self, percent: f64) -> bool {
        if percent <= self.last {
            return false;
        }
        percent >= 100.0 || percent - self.last >= self.granularity
    }

    fn persisted(&mut self, percent: f64) {
        self.last = percent;
    }
}
