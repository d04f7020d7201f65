//! Device Inventory Abstraction
//!
//! The inventory is the authoritative list of media items on the originating
//! device. Hosts expose it as a cursor-paginated listing so it can be consumed
//! lazily and restarted from the beginning at any time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::content::ContentRef;
use crate::error::Result;

/// One media item as reported by the device.
///
/// Items carry no identity across enumeration passes other than `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Device-specific asset identifier
    pub id: String,
    /// File name; the catalog keys records by this value
    pub name: String,
    /// Handle the upload path uses to read the bytes
    pub content_ref: ContentRef,
}

impl InventoryItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        content_ref: impl Into<ContentRef>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content_ref: content_ref.into(),
        }
    }

    /// Check that the item can be cataloged.
    ///
    /// # Errors
    ///
    /// Returns a description of the first missing field.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err(format!("Inventory item '{}' has no name", self.id));
        }
        if self.content_ref.is_empty() {
            return Err(format!(
                "Inventory item '{}' ({}) has no content reference",
                self.id, self.name
            ));
        }
        Ok(())
    }
}

/// One page of an inventory listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryPage {
    pub items: Vec<InventoryItem>,
    /// Cursor for the following page, `None` on the last page
    pub next_cursor: Option<String>,
}

impl InventoryPage {
    pub fn new(items: Vec<InventoryItem>, next_cursor: Option<String>) -> Self {
        Self { items, next_cursor }
    }

    pub fn has_next_page(&self) -> bool {
        self.next_cursor.is_some()
    }
}

/// Paginated lister of device media.
///
/// - Desktop: a media folder on disk
/// - iOS/Android: the platform photo library
///
/// Enumeration order must be deterministic for a fixed device state.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::inventory::InventorySource;
///
/// async fn count_items(source: &dyn InventorySource) -> Result<usize> {
///     let mut total = 0;
///     let mut cursor = None;
///     loop {
///         let page = source.list_page(cursor, 100).await?;
///         total += page.items.len();
///         match page.next_cursor {
///             Some(next) => cursor = Some(next),
///             None => return Ok(total),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// List up to `page_size` items following `cursor`
    ///
    /// A `None` cursor starts from the beginning.
    ///
    /// # Errors
    ///
    /// Returns error if the device listing cannot be read (missing permission,
    /// unreadable directory, invalid cursor).
    async fn list_page(&self, cursor: Option<String>, page_size: u32) -> Result<InventoryPage>;
}
