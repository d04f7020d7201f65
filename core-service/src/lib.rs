//! Core service façade and bootstrap helpers.
//!
//! This crate wires the host's bridges, the catalog store, the photo server
//! endpoint and the event bus into one [`PhotoStoreService`]. Presentation
//! layers talk only to the service: they start reconciliation and sync passes,
//! reset or prune the catalog, read record projections and subscribe to
//! events. Desktop apps typically enable the `desktop-shims` feature (which
//! depends on `bridge-desktop`) and call [`bootstrap_desktop`].

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::{InventoryItem, InventorySource, RemoteSyncEndpoint};
use core_library::{
    create_pool, CatalogRecordView, CatalogRepository, DatabaseConfig, Page, PageRequest,
    RecordId, SqliteCatalogRepository, SyncState,
};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CatalogEvent, CoreEvent, EventBus, EventStream};
use core_sync::{
    CheckReport, ReconcileReport, Reconciler, SyncConfig, SyncCoordinator, SyncReport,
};
use provider_photo_server::PhotoServerEndpoint;
use tokio::sync::Mutex;
use tracing::{info, instrument};

/// Everything the service needs, already constructed.
pub struct ServiceParts {
    pub catalog: Arc<dyn CatalogRepository>,
    pub endpoint: Arc<dyn RemoteSyncEndpoint>,
    pub inventory: Arc<dyn InventorySource>,
    pub event_bus: Arc<EventBus>,
    pub sync_config: SyncConfig,
    pub inventory_page_size: u32,
}

struct ServiceInner {
    catalog: Arc<dyn CatalogRepository>,
    inventory: Arc<dyn InventorySource>,
    event_bus: Arc<EventBus>,
    reconciler: Reconciler,
    coordinator: SyncCoordinator,
    /// Reconcile passes run one after another so a name is inserted once
    reconcile_lock: Mutex<()>,
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct PhotoStoreService {
    inner: Arc<ServiceInner>,
}

impl PhotoStoreService {
    /// Open the catalog and connect the photo server described by `config`.
    ///
    /// # Errors
    ///
    /// Fails if the database directory cannot be created, the database cannot
    /// be opened or migrated, or the server URL is unusable.
    #[instrument(skip(config), fields(database = %config.database_path.display(), server = %config.server_url))]
    pub async fn bootstrap(config: CoreConfig) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    CoreError::InitializationFailed(format!(
                        "cannot create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let pool = create_pool(DatabaseConfig::new(&config.database_path)).await?;
        let catalog = Arc::new(SqliteCatalogRepository::new(pool));

        let endpoint = PhotoServerEndpoint::new(
            config.http_client.clone(),
            config.content_source.clone(),
            config.server_url.clone(),
        )?
        .with_check_timeout(config.request_timeout);

        let service = Self::from_parts(ServiceParts {
            catalog,
            endpoint: Arc::new(endpoint),
            inventory: config.inventory_source.clone(),
            event_bus: Arc::new(EventBus::new(config.event_buffer_size)),
            sync_config: SyncConfig {
                progress_granularity: config.progress_granularity,
            },
            inventory_page_size: config.inventory_page_size,
        });

        info!("Photo store service ready");
        Ok(service)
    }

    /// Assemble a service from pre-built parts.
    pub fn from_parts(parts: ServiceParts) -> Self {
        let reconciler = Reconciler::new(parts.catalog.clone(), parts.event_bus.clone())
            .with_page_size(parts.inventory_page_size);
        let coordinator = SyncCoordinator::new(
            parts.sync_config,
            parts.catalog.clone(),
            parts.endpoint,
            parts.event_bus.clone(),
        );

        Self {
            inner: Arc::new(ServiceInner {
                catalog: parts.catalog,
                inventory: parts.inventory,
                event_bus: parts.event_bus,
                reconciler,
                coordinator,
                reconcile_lock: Mutex::new(()),
            }),
        }
    }

    // =========================================================================
    // Passes
    // =========================================================================

    /// Enumerate the device inventory and insert records for new names.
    pub async fn reconcile(&self) -> Result<ReconcileReport> {
        let _lock = self.inner.reconcile_lock.lock().await;
        let report = self
            .inner
            .reconciler
            .reconcile_source(self.inner.inventory.as_ref())
            .await?;
        Ok(report)
    }

    /// Reconcile an explicit list of items instead of the inventory source.
    pub async fn reconcile_items(&self, items: Vec<InventoryItem>) -> ReconcileReport {
        let _lock = self.inner.reconcile_lock.lock().await;
        self.inner.reconciler.reconcile_items(items).await
    }

    /// Run one sync pass. Refused while another pass runs.
    pub async fn sync_all(&self) -> Result<SyncReport> {
        Ok(self.inner.coordinator.sync_all().await?)
    }

    /// Compare every record with the remote without changing anything.
    pub async fn check_all(&self) -> Result<CheckReport> {
        Ok(self.inner.coordinator.check_all().await?)
    }

    /// Set every record back to `Unsynced`. Returns how many were reset.
    pub async fn reset_all(&self) -> Result<u64> {
        Ok(self.inner.coordinator.reset_all().await?)
    }

    pub fn is_syncing(&self) -> bool {
        self.inner.coordinator.is_running()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Read-only projection of every record in id order
    pub async fn records(&self) -> Result<Vec<CatalogRecordView>> {
        let records = self.inner.catalog.list_all().await?;
        Ok(records.iter().map(CatalogRecordView::from).collect())
    }

    pub async fn records_page(&self, request: PageRequest) -> Result<Page<CatalogRecordView>> {
        let page = self.inner.catalog.query(request).await?;
        Ok(page.map(|record| CatalogRecordView::from(&record)))
    }

    pub async fn record(&self, id: RecordId) -> Result<Option<CatalogRecordView>> {
        let record = self.inner.catalog.find_by_id(id).await?;
        Ok(record.as_ref().map(CatalogRecordView::from))
    }

    pub async fn count_by_state(&self, state: SyncState) -> Result<i64> {
        Ok(self.inner.catalog.count_by_state(state).await?)
    }

    /// Stream of catalog and sync events from now on
    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.inner.event_bus.subscribe())
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.inner.event_bus)
    }

    // =========================================================================
    // Administration
    // =========================================================================

    /// Remove one record. Refused while a pass runs.
    ///
    /// # Returns
    /// - `Ok(true)` if the record was deleted
    /// - `Ok(false)` if it was not found
    #[instrument(skip(self))]
    pub async fn delete_record(&self, id: RecordId) -> Result<bool> {
        let _guard = self.inner.coordinator.try_exclusive()?;

        let Some(record) = self.inner.catalog.find_by_id(id).await? else {
            return Ok(false);
        };
        let deleted = self.inner.catalog.delete(id).await?;
        if deleted {
            self.emit(CatalogEvent::RecordDeleted {
                record_id: id.value(),
                name: record.name,
            });
        }
        Ok(deleted)
    }

    /// Remove every record. Refused while a pass runs.
    #[instrument(skip(self))]
    pub async fn clear_catalog(&self) -> Result<u64> {
        let _guard = self.inner.coordinator.try_exclusive()?;

        let removed = self.inner.catalog.clear().await?;
        self.emit(CatalogEvent::CatalogCleared { removed });
        info!(removed, "Catalog cleared");
        Ok(removed)
    }

    fn emit(&self, event: CatalogEvent) {
        self.inner.event_bus.emit(CoreEvent::Catalog(event)).ok();
    }
}

/// Bootstrap from `PHOTOSTORE_*` environment variables with desktop bridges.
///
/// Without `PHOTOSTORE_DATABASE_PATH` the catalog lives in the user's data
/// directory.
#[cfg(feature = "desktop-shims")]
pub async fn bootstrap_desktop() -> Result<PhotoStoreService> {
    use core_runtime::config::{CoreConfigBuilder, ENV_DATABASE_PATH};

    let mut builder = CoreConfigBuilder::from_env()?;
    if std::env::var_os(ENV_DATABASE_PATH).is_none() {
        builder = builder.database_path(bridge_desktop::default_database_path()?);
    }

    PhotoStoreService::bootstrap(builder.build()?).await
}
