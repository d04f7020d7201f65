//! # Reconciliation & Sync Engine
//!
//! Keeps the media catalog in step with the device inventory and pushes
//! unsynced records to the remote store.
//!
//! ## Overview
//!
//! - Diffing enumerated inventory items against the catalog by name
//! - Inserting missing records as `Unsynced`
//! - Checking each unsynced record against the remote and uploading it
//! - Persisting state and upload progress, announcing each change on the
//!   event bus
//!
//! ## Components
//!
//! - **Reconciler** (`reconciler`): one-way insertion of missing inventory items
//! - **Sync Coordinator** (`coordinator`): sequential per-record check/upload protocol
//! - **Reports** (`report`): pass outcomes and per-item failures

pub mod coordinator;
pub mod error;
pub mod reconciler;
pub mod report;

pub use coordinator::{SyncConfig, SyncCoordinator};
pub use error::{Result, SyncError};
pub use reconciler::Reconciler;
pub use report::{CheckReport, FailureKind, ItemIssue, ReconcileReport, RecordFailure, SyncReport};
