//! Domain models for the media catalog
//!
//! Records, their sync state machine and the read-only projection handed to
//! presentation layers.

use bridge_traits::content::ContentRef;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// ID Types
// =============================================================================

/// Store-assigned record identifier. Never reused, even after deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl RecordId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

// =============================================================================
// Sync State
// =============================================================================

/// Where a record stands in the sync protocol.
///
/// ```text
/// Unsynced -> Checking -> Synced
///                      -> Uploading -> Synced
///                                   -> Unsynced
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    #[default]
    Unsynced,
    Checking,
    Uploading,
    Synced,
}

impl SyncState {
    pub const ALL: [SyncState; 4] = [
        SyncState::Unsynced,
        SyncState::Checking,
        SyncState::Uploading,
        SyncState::Synced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Unsynced => "unsynced",
            SyncState::Checking => "checking",
            SyncState::Uploading => "uploading",
            SyncState::Synced => "synced",
        }
    }

    /// `Synced` records are skipped by sync passes.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncState::Synced)
    }

    /// Whether the protocol allows moving from `self` to `next`.
    ///
    /// Resetting to `Unsynced` is always allowed. A record found in `Checking`
    /// or `Uploading` at the start of a pass was interrupted mid-protocol and
    /// may restart at `Checking`.
    pub fn can_transition_to(&self, next: SyncState) -> bool {
        use SyncState::*;

        match (self, next) {
            (_, Unsynced) => true,
            (Unsynced, Checking) => true,
            (Checking, Checking) | (Uploading, Checking) => true,
            (Checking, Synced) | (Checking, Uploading) => true,
            (Uploading, Synced) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SyncState::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| format!("Unknown sync state '{}'", s))
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// A persisted catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CatalogRecord {
    pub id: RecordId,
    /// File name; one record per distinct name
    pub name: String,
    /// Handle for streaming the content at upload time
    #[sqlx(try_from = "String")]
    pub content_ref: ContentRef,
    pub sync_state: SyncState,
    /// Upload progress in percent; meaningful only while `Uploading`
    pub sync_progress: f64,
    /// Insertion time, Unix epoch milliseconds
    pub created_at: i64,
}

impl CatalogRecord {
    pub fn is_synced(&self) -> bool {
        self.sync_state.is_terminal()
    }

    pub fn view(&self) -> CatalogRecordView {
        CatalogRecordView::from(self)
    }
}

/// Input for inserting a catalog record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCatalogRecord {
    pub name: String,
    pub content_ref: ContentRef,
}

impl NewCatalogRecord {
    pub fn new(name: impl Into<String>, content_ref: impl Into<ContentRef>) -> Self {
        Self {
            name: name.into(),
            content_ref: content_ref.into(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Record name cannot be empty".to_string());
        }
        if self.content_ref.is_empty() {
            return Err(format!("Record '{}' has an empty content reference", self.name));
        }
        Ok(())
    }
}

/// Read-only projection of a record for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecordView {
    pub id: RecordId,
    pub name: String,
    pub sync_state: SyncState,
    pub sync_progress: f64,
}

impl From<&CatalogRecord> for CatalogRecordView {
    fn from(record: &CatalogRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            sync_state: record.sync_state,
            sync_progress: record.sync_progress,
        }
    }
}

/// Check that a progress value fits the stored range.
pub fn validate_progress(progress: f64) -> Result<(), String> {
    if !progress.is_finite() || !(0.0..=100.0).contains(&progress) {
        return Err(format!("Progress {} is outside 0..=100", progress));
    }
    Ok(())
}
