//! # Host Bridge Traits
//!
//! Capabilities the sync core needs from its host, expressed as traits.
//!
//! ## Overview
//!
//! The core never touches the device photo library, the filesystem or the
//! network directly. Each of those is reached through a trait defined here and
//! implemented per platform (desktop, iOS, Android).
//!
//! ## Traits
//!
//! ### Device side
//! - [`InventorySource`](inventory::InventorySource) - Paginated listing of device media
//! - [`ContentSource`](content::ContentSource) - Resolve a [`ContentRef`](content::ContentRef) into bytes
//!
//! ### Remote side
//! - [`RemoteSyncEndpoint`](remote::RemoteSyncEndpoint) - Existence check and upload by name
//! - [`HttpClient`](http::HttpClient) - Async HTTP with streamed multipart uploads
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//! - [`progress_channel`](progress::progress_channel) - Byte progress of a transfer
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Implemented |
//! | iOS      | TBD                 | 📋 Planned |
//! | Android  | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should map connectivity problems to `Transport`, non-success protocol
//! answers to `Status`, and unreadable content references to `InvalidContent`.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so they can be shared behind `Arc`
//! across async tasks.
//!
//! ## Example
//!
//! ```ignore
//! use bridge_traits::inventory::{InventoryItem, InventoryPage, InventorySource};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! pub struct FixedInventory(Vec<InventoryItem>);
//!
//! #[async_trait]
//! impl InventorySource for FixedInventory {
//!     async fn list_page(&self, _cursor: Option<String>, _page_size: u32) -> Result<InventoryPage> {
//!         Ok(InventoryPage::new(self.0.clone(), None))
//!     }
//! }
//! ```

pub mod content;
pub mod error;
pub mod http;
pub mod inventory;
pub mod progress;
pub mod remote;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use content::{ContentRef, ContentSource, ContentStream};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, MultipartUpload};
pub use inventory::{InventoryItem, InventoryPage, InventorySource};
pub use progress::{progress_channel, ProgressReceiver, ProgressSender, TransferProgress};
pub use remote::{ExistenceCheck, RemoteEntry, RemoteSyncEndpoint, UploadOutcome};
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, ManualClock, SystemClock};
