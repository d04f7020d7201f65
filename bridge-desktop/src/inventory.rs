//! Media Folder Inventory
//!
//! Treats a directory tree as the device photo library. Every photo or video
//! file below the root is an inventory item, listed in lexicographic order of
//! its relative path so that pagination is stable for an unchanged folder.
//!
//! The tree is walked once per enumeration: a request without a cursor scans
//! the folder, and the pages that follow are cut from that scan.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    inventory::{InventoryItem, InventoryPage, InventorySource},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::content::file_content_ref;

/// File extensions treated as media, compared case-insensitively.
const MEDIA_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "heic", "heif", "webp", "bmp", "tif", "tiff", "dng", "mp4",
    "mov", "m4v", "avi", "mkv", "3gp", "webm",
];

pub fn is_media_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            MEDIA_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Inventory backed by a folder on disk.
///
/// Item ids are paths relative to the root (always `/`-separated), names are
/// bare file names and content references are `file://` URIs. The page cursor
/// is the relative path of the last item returned.
#[derive(Debug, Clone)]
pub struct DirectoryInventory {
    root: PathBuf,
    /// Sorted scan of the current enumeration, shared between clones
    snapshot: Arc<Mutex<Option<Arc<Vec<(String, PathBuf)>>>>>,
}

impl DirectoryInventory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            snapshot: Arc::new(Mutex::new(None)),
        }
    }

    /// The current user's pictures folder
    pub fn pictures() -> Result<Self> {
        dirs::picture_dir()
            .map(Self::new)
            .ok_or_else(|| BridgeError::NotAvailable("No pictures directory".to_string()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn relative_id(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }

    /// Walk the tree and return `(relative id, absolute path)` sorted by id
    async fn scan(&self) -> Result<Vec<(String, PathBuf)>> {
        let mut found = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut read_dir = fs::read_dir(&dir).await?;
            while let Some(entry) = read_dir.next_entry().await? {
                let path = entry.path();
                let hidden = entry.file_name().to_string_lossy().starts_with('.');
                if hidden {
                    continue;
                }

                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(path);
                } else if file_type.is_file() && is_media_file(&path) {
                    if let Some(id) = self.relative_id(&path) {
                        found.push((id, path));
                    }
                }
            }
        }

        found.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(found)
    }

    /// Entries for this page request. A first page rescans the tree; later
    /// pages reuse the scan unless none is held yet.
    async fn entries(&self, first_page: bool) -> Result<Arc<Vec<(String, PathBuf)>>> {
        let mut snapshot = self.snapshot.lock().await;
        if !first_page {
            if let Some(entries) = snapshot.as_ref() {
                return Ok(Arc::clone(entries));
            }
        }

        let entries = Arc::new(self.scan().await?);
        debug!(entries = entries.len(), "Scanned media folder");
        *snapshot = Some(Arc::clone(&entries));
        Ok(entries)
    }
}

#[async_trait]
impl InventorySource for DirectoryInventory {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn list_page(&self, cursor: Option<String>, page_size: u32) -> Result<InventoryPage> {
        let page_size = page_size.max(1) as usize;
        let entries = self.entries(cursor.is_none()).await?;

        let start = match &cursor {
            Some(after) => entries.partition_point(|(id, _)| id.as_str() <= after.as_str()),
            None => 0,
        };
        let end = (start + page_size).min(entries.len());

        let items: Vec<InventoryItem> = entries[start..end]
            .iter()
            .map(|(id, path)| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| id.clone());
                InventoryItem::new(id.clone(), name, file_content_ref(path))
            })
            .collect();

        let next_cursor = if end < entries.len() {
            items.last().map(|item| item.id.clone())
        } else {
            None
        };

        debug!(
            returned = items.len(),
            total = entries.len(),
            has_next = next_cursor.is_some(),
            "Listed inventory page"
        );

        Ok(InventoryPage::new(items, next_cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    async fn media_folder() -> PathBuf {
        let dir = env::temp_dir().join(format!("photostore-inventory-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(dir.join("2024")).await.unwrap();
        fs::create_dir_all(dir.join(".thumbnails")).await.unwrap();
        for name in ["b.jpg", "a.PNG", "notes.txt"] {
            fs::write(dir.join(name), b"x").await.unwrap();
        }
        fs::write(dir.join("2024").join("c.mov"), b"x").await.unwrap();
        fs::write(dir.join(".thumbnails").join("a.jpg"), b"x").await.unwrap();
        dir
    }

    #[test]
    fn test_media_extension_filter() {
        assert!(is_media_file(Path::new("x.JPG")));
        assert!(is_media_file(Path::new("clip.mp4")));
        assert!(!is_media_file(Path::new("notes.txt")));
        assert!(!is_media_file(Path::new("README")));
    }

    #[tokio::test]
    async fn test_single_page_lists_media_in_order() {
        let dir = media_folder().await;
        let inventory = DirectoryInventory::new(&dir);

        let page = inventory.list_page(None, 100).await.unwrap();
        let ids: Vec<&str> = page.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["2024/c.mov", "a.PNG", "b.jpg"]);
        assert_eq!(page.items[0].name, "c.mov");
        assert!(page.items[0].content_ref.as_str().starts_with("file://"));
        assert!(page.next_cursor.is_none());

        fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_pagination_follows_cursor() {
        let dir = media_folder().await;
        let inventory = DirectoryInventory::new(&dir);

        let first = inventory.list_page(None, 2).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.next_cursor.as_deref(), Some("a.PNG"));

        let second = inventory.list_page(first.next_cursor, 2).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].name, "b.jpg");
        assert!(second.next_cursor.is_none());

        fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_later_pages_reuse_the_first_scan() {
        let dir = media_folder().await;
        let inventory = DirectoryInventory::new(&dir);

        let first = inventory.list_page(None, 2).await.unwrap();
        fs::write(dir.join("z.jpg"), b"x").await.unwrap();

        let second = inventory.list_page(first.next_cursor, 2).await.unwrap();
        let names: Vec<&str> = second.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["b.jpg"]);
        assert!(second.next_cursor.is_none());

        // A new enumeration sees the file
        let fresh = inventory.list_page(None, 10).await.unwrap();
        assert_eq!(fresh.items.len(), 4);
        assert_eq!(fresh.items[3].name, "z.jpg");

        fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_root_is_error() {
        let inventory = DirectoryInventory::new("/definitely/not/a/folder");
        assert!(inventory.list_page(None, 10).await.is_err());
    }
}
