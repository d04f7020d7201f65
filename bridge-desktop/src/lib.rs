//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`, with streamed multipart uploads
//! - `ContentSource` using `tokio::fs` for `file://` URIs and plain paths
//! - `InventorySource` over a media folder on disk
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DirectoryInventory, ReqwestHttpClient, TokioContentSource};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let http_client = ReqwestHttpClient::new()?;
//!     let content = TokioContentSource::new();
//!     let inventory = DirectoryInventory::pictures()?;
//!
//!     // Hand these to the service bootstrap
//!     Ok(())
//! }
//! ```

mod content;
mod http;
mod inventory;
mod paths;

pub use content::{file_content_ref, TokioContentSource};
pub use http::ReqwestHttpClient;
pub use inventory::{is_media_file, DirectoryInventory};
pub use paths::{default_data_dir, default_database_path};
