//! # Core Configuration Module
//!
//! Builder-based configuration for the sync core.
//!
//! ## Overview
//!
//! [`CoreConfig`] holds the settings and host bridges the service needs. The
//! builder validates everything up front and fails fast when a bridge is
//! missing, so a misconfigured host never gets as far as touching the catalog.
//!
//! ## Required Settings
//!
//! - `database_path` - Location of the SQLite catalog
//!
//! ## Bridges (with desktop defaults)
//!
//! - `HttpClient` - desktop default: reqwest
//! - `ContentSource` - desktop default: tokio fs for `file://` URIs
//! - `InventorySource` - desktop default: the media folder, or the user's
//!   pictures directory
//!
//! Without the `desktop-shims` feature every bridge must be injected.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .database_path("/path/to/catalog.db")
//!     .server_url("http://10.0.2.2:3000")
//!     .media_dir("/path/to/Pictures")
//!     .build()?;
//! ```
//!
//! ### From the environment
//!
//! ```ignore
//! let config = CoreConfigBuilder::from_env()?.build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{ContentSource, HttpClient, InventorySource};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";
pub const DEFAULT_INVENTORY_PAGE_SIZE: u32 = 100;
pub const MAX_INVENTORY_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = crate::events::DEFAULT_EVENT_BUFFER_SIZE;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_PROGRESS_GRANULARITY: f64 = 1.0;

pub const ENV_DATABASE_PATH: &str = "PHOTOSTORE_DATABASE_PATH";
pub const ENV_SERVER_URL: &str = "PHOTOSTORE_SERVER_URL";
pub const ENV_MEDIA_DIR: &str = "PHOTOSTORE_MEDIA_DIR";
pub const ENV_PAGE_SIZE: &str = "PHOTOSTORE_PAGE_SIZE";

/// Validated core configuration.
#[derive(Clone)]
pub struct CoreConfig {
    /// SQLite catalog location
    pub database_path: PathBuf,

    /// Base URL of the photo server, without trailing slash
    pub server_url: String,

    /// Root of the desktop media folder, if one was chosen
    pub media_dir: Option<PathBuf>,

    /// Items requested per inventory page
    pub inventory_page_size: u32,

    /// Per-subscriber event buffer
    pub event_buffer_size: usize,

    /// Timeout applied to every remote request
    pub request_timeout: Duration,

    /// Minimum change in percent between persisted progress values
    pub progress_granularity: f64,

    pub http_client: Arc<dyn HttpClient>,

    pub content_source: Arc<dyn ContentSource>,

    pub inventory_source: Arc<dyn InventorySource>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("database_path", &self.database_path)
            .field("server_url", &self.server_url)
            .field("media_dir", &self.media_dir)
            .field("inventory_page_size", &self.inventory_page_size)
            .field("event_buffer_size", &self.event_buffer_size)
            .field("request_timeout", &self.request_timeout)
            .field("progress_granularity", &self.progress_granularity)
            .field("http_client", &"HttpClient { ... }")
            .field("content_source", &"ContentSource { ... }")
            .field("inventory_source", &"InventorySource { ... }")
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(Error::Config("Database path cannot be empty".to_string()));
        }

        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "Server URL must start with http:// or https://, got '{}'",
                self.server_url
            )));
        }

        if self.inventory_page_size == 0 || self.inventory_page_size > MAX_INVENTORY_PAGE_SIZE {
            return Err(Error::Config(format!(
                "Inventory page size must be between 1 and {}",
                MAX_INVENTORY_PAGE_SIZE
            )));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if !self.progress_granularity.is_finite()
            || !(0.0..=100.0).contains(&self.progress_granularity)
        {
            return Err(Error::Config(
                "Progress granularity must be between 0 and 100 percent".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn capability_missing(capability: &str, what: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: format!(
            "{} implementation is required for {}. \
             Desktop: enable the 'desktop-shims' feature. \
             Mobile: inject the platform-native adapter.",
            capability, what
        ),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    let client = bridge_desktop::ReqwestHttpClient::with_timeout(timeout)
        .map_err(|e| Error::Internal(format!("Failed to create default HttpClient: {}", e)))?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    Err(capability_missing("HttpClient", "talking to the photo server"))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_content_source(media_dir: Option<&PathBuf>) -> Result<Arc<dyn ContentSource>> {
    use bridge_desktop::TokioContentSource;

    let source = match media_dir {
        Some(root) => TokioContentSource::with_root(root),
        None => TokioContentSource::new(),
    };
    Ok(Arc::new(source))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_content_source(
    _media_dir: Option<&PathBuf>,
) -> Result<Arc<dyn ContentSource>> {
    Err(capability_missing("ContentSource", "reading media for upload"))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_inventory_source(
    media_dir: Option<&PathBuf>,
) -> Result<Arc<dyn InventorySource>> {
    use bridge_desktop::DirectoryInventory;

    let inventory = match media_dir {
        Some(root) => DirectoryInventory::new(root),
        None => DirectoryInventory::pictures().map_err(|e| Error::CapabilityMissing {
            capability: "InventorySource".to_string(),
            message: format!("No media folder configured and {}", e),
        })?,
    };
    Ok(Arc::new(inventory))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_inventory_source(
    _media_dir: Option<&PathBuf>,
) -> Result<Arc<dyn InventorySource>> {
    Err(capability_missing("InventorySource", "enumerating device media"))
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    database_path: Option<PathBuf>,
    server_url: Option<String>,
    media_dir: Option<PathBuf>,
    inventory_page_size: Option<u32>,
    event_buffer_size: Option<usize>,
    request_timeout: Option<Duration>,
    progress_granularity: Option<f64>,
    http_client: Option<Arc<dyn HttpClient>>,
    content_source: Option<Arc<dyn ContentSource>>,
    inventory_source: Option<Arc<dyn InventorySource>>,
}

impl CoreConfigBuilder {
    /// Seed a builder from `PHOTOSTORE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Seed a builder from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::default();

        if let Some(path) = lookup(ENV_DATABASE_PATH) {
            builder = builder.database_path(path);
        }
        if let Some(url) = lookup(ENV_SERVER_URL) {
            builder = builder.server_url(url);
        }
        if let Some(dir) = lookup(ENV_MEDIA_DIR) {
            builder = builder.media_dir(dir);
        }
        if let Some(raw) = lookup(ENV_PAGE_SIZE) {
            let size = raw.trim().parse::<u32>().map_err(|e| {
                Error::Config(format!("{} must be a positive integer: {}", ENV_PAGE_SIZE, e))
            })?;
            builder = builder.inventory_page_size(size);
        }

        Ok(builder)
    }

    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = Some(path.into());
        self
    }

    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    pub fn media_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.media_dir = Some(path.into());
        self
    }

    pub fn inventory_page_size(mut self, size: u32) -> Self {
        self.inventory_page_size = Some(size);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn progress_granularity(mut self, percent: f64) -> Self {
        self.progress_granularity = Some(percent);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn content_source(mut self, source: Arc<dyn ContentSource>) -> Self {
        self.content_source = Some(source);
        self
    }

    pub fn inventory_source(mut self, source: Arc<dyn InventorySource>) -> Self {
        self.inventory_source = Some(source);
        self
    }

    pub fn build(self) -> Result<CoreConfig> {
        let database_path = self.database_path.ok_or_else(|| {
            Error::Config("Database path is required. Use .database_path() to set it.".to_string())
        })?;

        let server_url = self
            .server_url
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();
        let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(request_timeout)?,
        };

        let content_source = match self.content_source {
            Some(source) => source,
            None => provide_default_content_source(self.media_dir.as_ref())?,
        };

        let inventory_source = match self.inventory_source {
            Some(source) => source,
            None => provide_default_inventory_source(self.media_dir.as_ref())?,
        };

        let config = CoreConfig {
            database_path,
            server_url,
            media_dir: self.media_dir,
            inventory_page_size: self
                .inventory_page_size
                .unwrap_or(DEFAULT_INVENTORY_PAGE_SIZE),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            request_timeout,
            progress_granularity: self
                .progress_granularity
                .unwrap_or(DEFAULT_PROGRESS_GRANULARITY),
            http_client,
            content_source,
            inventory_source,
        };

        config.validate()?;

        Ok(config)
    }
}
