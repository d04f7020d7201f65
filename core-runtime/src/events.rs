//! # Event Bus System
//!
//! Typed notifications from the catalog and sync engine, delivered over
//! `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! - **Event Types**: [`CatalogEvent`] for reconciliation and administration,
//!   [`SyncEvent`] for sync and check passes, both wrapped in [`CoreEvent`]
//! - **EventBus**: central broadcast channel
//! - **EventStream**: receiver wrapper with optional filtering
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐   emit   ┌───────────┐  subscribe  ┌──────────────┐
//! │ Reconciler      ├─────────>│           ├────────────>│ Presentation │
//! └─────────────────┘          │ EventBus  │             └──────────────┘
//! ┌─────────────────┐   emit   │           │  subscribe  ┌──────────────┐
//! │ SyncCoordinator ├─────────>│           ├────────────>│ Logging      │
//! └─────────────────┘          └───────────┘             └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, SyncEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Sync(SyncEvent::Started {
//!         run_id: "run-1".to_string(),
//!         total: 2,
//!     }))
//!     .ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert!(matches!(event, CoreEvent::Sync(SyncEvent::Started { .. })));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events. Non-fatal;
//!   a presentation layer should re-read the catalog to resynchronize.
//! - **`RecvError::Closed`**: all senders have been dropped (shutdown).
//!
//! Emitting never fails an engine operation: publishers call `emit(..).ok()`.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event published through the event bus.
///
/// Record states travel as their stored string form (`unsynced`, `checking`,
/// `uploading`, `synced`) so this crate does not depend on the catalog crate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Catalog reconciliation and administration
    Catalog(CatalogEvent),
    /// Sync and check passes
    Sync(SyncEvent),
}

impl CoreEvent {
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Catalog(e) => e.description(),
            CoreEvent::Sync(e) => e.description(),
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Sync(SyncEvent::RecordFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Catalog(CatalogEvent::ItemSkipped { .. }) => EventSeverity::Warning,
            CoreEvent::Sync(SyncEvent::Completed { .. }) => EventSeverity::Info,
            CoreEvent::Sync(SyncEvent::CheckCompleted { .. }) => EventSeverity::Info,
            CoreEvent::Catalog(CatalogEvent::ReconcileCompleted { .. }) => EventSeverity::Info,
            CoreEvent::Catalog(CatalogEvent::RecordsReset { .. }) => EventSeverity::Info,
            CoreEvent::Catalog(CatalogEvent::CatalogCleared { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Catalog Events
// ============================================================================

/// Events raised while reconciling or administering the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CatalogEvent {
    /// A new record was inserted for an inventory item.
    RecordAdded { record_id: i64, name: String },
    /// An inventory item could not be cataloged.
    ItemSkipped {
        item_id: String,
        name: String,
        reason: String,
    },
    /// A reconciliation pass finished.
    ReconcileCompleted {
        inserted: u64,
        existing: u64,
        skipped: u64,
        failed: u64,
    },
    /// Every record was returned to `unsynced`.
    RecordsReset { count: u64 },
    /// A record was removed by an administrative action.
    RecordDeleted { record_id: i64, name: String },
    /// The whole catalog was emptied.
    CatalogCleared { removed: u64 },
}

impl CatalogEvent {
    fn description(&self) -> &str {
        match self {
            CatalogEvent::RecordAdded { .. } => "Catalog record added",
            CatalogEvent::ItemSkipped { .. } => "Inventory item skipped",
            CatalogEvent::ReconcileCompleted { .. } => "Reconciliation completed",
            CatalogEvent::RecordsReset { .. } => "Catalog records reset",
            CatalogEvent::RecordDeleted { .. } => "Catalog record deleted",
            CatalogEvent::CatalogCleared { .. } => "Catalog cleared",
        }
    }
}

// ============================================================================
// Sync Events
// ============================================================================

/// Events raised by sync and check passes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum SyncEvent {
    /// A sync pass took its snapshot and is about to process it.
    Started {
        run_id: String,
        /// Records in the snapshot, including ones that will be skipped
        total: u64,
    },
    /// A record's persisted state changed.
    StateChanged {
        run_id: String,
        record_id: i64,
        name: String,
        from: String,
        to: String,
        progress: f64,
    },
    /// Upload progress was persisted for a record.
    Progress {
        run_id: String,
        record_id: i64,
        name: String,
        percent: f64,
        bytes_sent: u64,
        total_bytes: u64,
    },
    /// A record could not be synced during this pass.
    RecordFailed {
        run_id: String,
        record_id: i64,
        name: String,
        /// `transport`, `remote`, `validation` or `store`
        kind: String,
        message: String,
    },
    /// A sync pass visited every record in its snapshot.
    Completed {
        run_id: String,
        total: u64,
        skipped: u64,
        already_present: u64,
        uploaded: u64,
        duplicates: u64,
        failed: u64,
        duration_ms: u64,
    },
    /// A read-only check pass finished.
    CheckCompleted {
        run_id: String,
        present: u64,
        missing: u64,
        failed: u64,
    },
}

impl SyncEvent {
    fn description(&self) -> &str {
        match self {
            SyncEvent::Started { .. } => "Sync pass started",
            SyncEvent::StateChanged { .. } => "Record sync state changed",
            SyncEvent::Progress { .. } => "Upload progress",
            SyncEvent::RecordFailed { .. } => "Record sync failed",
            SyncEvent::Completed { .. } => "Sync pass completed",
            SyncEvent::CheckCompleted { .. } => "Remote check completed",
        }
    }

    /// Run identifier shared by every event of one pass.
    pub fn run_id(&self) -> &str {
        match self {
            SyncEvent::Started { run_id, .. }
            | SyncEvent::StateChanged { run_id, .. }
            | SyncEvent::Progress { run_id, .. }
            | SyncEvent::RecordFailed { run_id, .. }
            | SyncEvent::Completed { run_id, .. }
            | SyncEvent::CheckCompleted { run_id, .. } => run_id,
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to core events.
///
/// Cloning is cheap; all clones share one channel. Each subscriber has its
/// own buffer and a slow subscriber only lags itself.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with an optional filter.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let event_bus = EventBus::new(100);
/// let sync_only = EventStream::new(event_bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Sync(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking receive; `None` when nothing matching is queued.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
