//! Pass reports and per-item failures
//!
//! A failure on one item is data in a report, never an early return. The
//! enclosing pass keeps going and the caller decides what to surface.

use bridge_traits::{BridgeError, InventoryItem};
use core_library::{CatalogRecord, LibraryError, RecordId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::SyncError;

/// Why a single item or record did not make it through a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Network unreachable, timeout or unreadable response
    Transport,
    /// The remote answered with an error status
    Remote,
    /// Malformed item or unreadable content
    Validation,
    /// The catalog store rejected a read or write
    Store,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::Remote => "remote",
            FailureKind::Validation => "validation",
            FailureKind::Store => "store",
        }
    }

    pub fn from_bridge(error: &BridgeError) -> Self {
        match error {
            BridgeError::Transport(_) | BridgeError::Io(_) => FailureKind::Transport,
            BridgeError::InvalidContent(_) => FailureKind::Validation,
            BridgeError::Status { .. }
            | BridgeError::NotAvailable(_)
            | BridgeError::OperationFailed(_) => FailureKind::Remote,
        }
    }

    pub fn from_sync_error(error: &SyncError) -> Self {
        match error {
            SyncError::Bridge(e) => FailureKind::from_bridge(e),
            SyncError::InvalidStateTransition { .. } => FailureKind::Validation,
            SyncError::Library(LibraryError::InvalidInput { .. }) => FailureKind::Validation,
            SyncError::Library(_) | SyncError::SyncInProgress | SyncError::Inventory(_) => {
                FailureKind::Store
            }
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inventory item the reconciler skipped or could not insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemIssue {
    pub item_id: String,
    pub name: String,
    pub kind: FailureKind,
    pub message: String,
}

impl ItemIssue {
    pub fn new(item: &InventoryItem, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            item_id: item.id.clone(),
            name: item.name.clone(),
            kind,
            message: message.into(),
        }
    }
}

/// A catalog record that a sync or check pass could not complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFailure {
    pub record_id: RecordId,
    pub name: String,
    pub kind: FailureKind,
    pub message: String,
}

impl RecordFailure {
    pub fn new(record: &CatalogRecord, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            record_id: record.id,
            name: record.name.clone(),
            kind,
            message: message.into(),
        }
    }

    pub fn from_bridge(record: &CatalogRecord, error: &BridgeError) -> Self {
        Self::new(record, FailureKind::from_bridge(error), error.to_string())
    }

    pub fn from_sync_error(record: &CatalogRecord, error: &SyncError) -> Self {
        Self::new(record, FailureKind::from_sync_error(error), error.to_string())
    }
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Records created for names not seen before
    pub inserted: u64,
    /// Items whose name already had a record
    pub existing: u64,
    /// Invalid items, left out of the catalog
    pub skipped: Vec<ItemIssue>,
    /// Valid items the store failed to insert
    pub failed: Vec<ItemIssue>,
}

impl ReconcileReport {
    pub fn seen(&self) -> u64 {
        self.inserted + self.existing + self.skipped.len() as u64 + self.failed.len() as u64
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }

    pub fn merge(&mut self, other: ReconcileReport) {
        self.inserted += other.inserted;
        self.existing += other.existing;
        self.skipped.extend(other.skipped);
        self.failed.extend(other.failed);
    }
}

/// Outcome of one sync pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub run_id: String,
    /// Records in the snapshot
    pub total: u64,
    /// Records already `Synced` when the pass reached them
    pub skipped: u64,
    /// Records the remote already had
    pub already_present: u64,
    pub uploaded: u64,
    /// Uploads the remote answered with a conflict
    pub duplicates: u64,
    pub failures: Vec<RecordFailure>,
    pub duration: Duration,
}

impl SyncReport {
    pub(crate) fn new(run_id: impl Into<String>, total: u64) -> Self {
        Self {
            run_id: run_id.into(),
            total,
            skipped: 0,
            already_present: 0,
            uploaded: 0,
            duplicates: 0,
            failures: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn failed(&self) -> u64 {
        self.failures.len() as u64
    }

    /// Records that ended the pass `Synced`
    pub fn synced(&self) -> u64 {
        self.already_present + self.uploaded + self.duplicates
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Outcome of a read-only comparison of the catalog with the remote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub run_id: String,
    /// Names the remote reported as present
    pub present: Vec<String>,
    /// Names the remote does not have
    pub missing: Vec<String>,
    pub failures: Vec<RecordFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind_from_bridge() {
        assert_eq!(
            FailureKind::from_bridge(&BridgeError::Transport("refused".to_string())),
            FailureKind::Transport
        );
        assert_eq!(
            FailureKind::from_bridge(&BridgeError::Status {
                status: 500,
                message: "boom".to_string()
            }),
            FailureKind::Remote
        );
        assert_eq!(
            FailureKind::from_bridge(&BridgeError::InvalidContent("gone".to_string())),
            FailureKind::Validation
        );
    }

    #[test]
    fn test_store_errors_map_to_store() {
        let error = SyncError::Library(LibraryError::RecordNotFound(RecordId(1)));
        assert_eq!(FailureKind::from_sync_error(&error), FailureKind::Store);
    }

    #[test]
    fn test_reconcile_report_merge() {
        let item = InventoryItem::new("a1", "", "file:///x");
        let mut report = ReconcileReport {
            inserted: 2,
            existing: 1,
            ..Default::default()
        };
        report.merge(ReconcileReport {
            inserted: 1,
            existing: 0,
            skipped: vec![ItemIssue::new(&item, FailureKind::Validation, "no name")],
            failed: Vec::new(),
        });

        assert_eq!(report.inserted, 3);
        assert_eq!(report.seen(), 5);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_sync_report_counts() {
        let mut report = SyncReport::new("run-1", 4);
        report.already_present = 1;
        report.uploaded = 1;
        report.duplicates = 1;
        report.skipped = 1;

        assert_eq!(report.synced(), 3);
        assert_eq!(report.failed(), 0);
        assert!(report.is_clean());
    }
}
