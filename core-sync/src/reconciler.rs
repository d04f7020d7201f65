//! # Reconciler
//!
//! One-way insertion of inventory items missing from the catalog.
//!
//! ## Overview
//!
//! Items are visited in enumeration order and matched to catalog records by
//! `name`. A name without a record gets a new `Unsynced` record; a name with a
//! record is left alone, even if its content reference changed. Invalid items
//! and failed inserts are collected in the [`ReconcileReport`] and the pass
//! carries on.
//!
//! The reconciler keeps nothing between calls. Running it twice over the same
//! inventory inserts nothing the second time.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let reconciler = Reconciler::new(catalog, event_bus);
//! let report = reconciler.reconcile_source(inventory.as_ref()).await?;
//! println!("{} new records", report.inserted);
//! ```

use crate::error::{Result, SyncError};
use crate::report::{FailureKind, ItemIssue, ReconcileReport};
use bridge_traits::{InventoryItem, InventorySource};
use core_library::{CatalogRepository, NewCatalogRecord};
use core_runtime::events::{CatalogEvent, CoreEvent, EventBus};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Inventory items requested per page when none is configured
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Diffs inventory items against the catalog and inserts what is missing.
pub struct Reconciler {
    catalog: Arc<dyn CatalogRepository>,
    event_bus: Arc<EventBus>,
    page_size: u32,
}

impl Reconciler {
    pub fn new(catalog: Arc<dyn CatalogRepository>, event_bus: Arc<EventBus>) -> Self {
        Self {
            catalog,
            event_bus,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Reconcile a finite sequence of items.
    ///
    /// Never fails as a whole; per-item problems land in the report.
    #[instrument(skip(self, items))]
    pub async fn reconcile_items<I>(&self, items: I) -> ReconcileReport
    where
        I: IntoIterator<Item = InventoryItem> + Send,
        I::IntoIter: Send,
    {
        let mut report = ReconcileReport::default();
        for item in items {
            self.reconcile_item(&item, &mut report).await;
        }

        self.emit_completed(&report);
        info!(
            inserted = report.inserted,
            existing = report.existing,
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Reconciliation completed"
        );
        report
    }

    /// Enumerate `source` page by page and reconcile every item.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Inventory`] if a page cannot be fetched or the
    /// source hands back a cursor already used in this enumeration. Records
    /// inserted from earlier pages are kept.
    #[instrument(skip(self, source), fields(page_size = self.page_size))]
    pub async fn reconcile_source(&self, source: &dyn InventorySource) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();
        let mut cursor: Option<String> = None;
        let mut seen_cursors = HashSet::new();
        let mut pages = 0u32;

        loop {
            let page = source
                .list_page(cursor.clone(), self.page_size)
                .await
                .map_err(|e| {
                    warn!(error = %e, pages, inserted = report.inserted, "Inventory page fetch failed");
                    SyncError::Inventory(e.to_string())
                })?;
            pages += 1;
            debug!(page = pages, items = page.items.len(), "Fetched inventory page");

            for item in &page.items {
                self.reconcile_item(item, &mut report).await;
            }

            match page.next_cursor {
                None => break,
                Some(next) if !seen_cursors.insert(next.clone()) => {
                    warn!(cursor = %next, pages, "Inventory cursor repeated");
                    return Err(SyncError::Inventory(format!(
                        "cursor '{}' was already visited",
                        next
                    )));
                }
                Some(next) => cursor = Some(next),
            }
        }

        self.emit_completed(&report);
        info!(
            pages,
            inserted = report.inserted,
            existing = report.existing,
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Reconciliation completed"
        );
        Ok(report)
    }

    async fn reconcile_item(&self, item: &InventoryItem, report: &mut ReconcileReport) {
        if let Err(message) = item.validate() {
            debug!(item_id = %item.id, %message, "Skipping invalid inventory item");
            self.emit(CatalogEvent::ItemSkipped {
                item_id: item.id.clone(),
                name: item.name.clone(),
                reason: message.clone(),
            });
            report
                .skipped
                .push(ItemIssue::new(item, FailureKind::Validation, message));
            return;
        }

        match self.catalog.find_by_name(&item.name).await {
            Ok(Some(_)) => {
                report.existing += 1;
                return;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(name = %item.name, error = %e, "Catalog lookup failed");
                report
                    .failed
                    .push(ItemIssue::new(item, FailureKind::Store, e.to_string()));
                return;
            }
        }

        let record = NewCatalogRecord::new(item.name.clone(), item.content_ref.clone());
        match self.catalog.insert(&record).await {
            Ok(inserted) => {
                debug!(record_id = %inserted.id, name = %inserted.name, "Added catalog record");
                self.emit(CatalogEvent::RecordAdded {
                    record_id: inserted.id.value(),
                    name: inserted.name,
                });
                report.inserted += 1;
            }
            Err(e) => {
                warn!(name = %item.name, error = %e, "Catalog insert failed");
                report
                    .failed
                    .push(ItemIssue::new(item, FailureKind::Store, e.to_string()));
            }
        }
    }

    fn emit_completed(&self, report: &ReconcileReport) {
        self.emit(CatalogEvent::ReconcileCompleted {
            inserted: report.inserted,
            existing: report.existing,
            skipped: report.skipped.len() as u64,
            failed: report.failed.len() as u64,
        });
    }

    fn emit(&self, event: CatalogEvent) {
        self.event_bus.emit(CoreEvent::Catalog(event)).ok();
    }
}
