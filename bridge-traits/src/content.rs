//! Content References and Streaming Access
//!
//! The sync core never reads media bytes itself. It carries an opaque
//! [`ContentRef`] from the inventory into the catalog and hands it back to the
//! upload path, which resolves it through a host-provided [`ContentSource`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::io::AsyncRead;

use crate::error::Result;

/// Opaque handle to media content on the originating device.
///
/// Typically a URI (`file:///...`, `content://...`, `ph://...`). Only the
/// [`ContentSource`] that produced it knows how to interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRef(String);

impl ContentRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A reference with no usable content.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ContentRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ContentRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// An opened content stream with its total length.
pub struct ContentStream {
    /// Byte stream of the content
    pub reader: Box<dyn AsyncRead + Send + Sync + Unpin>,
    /// Total length in bytes, used for progress reporting
    pub size: u64,
}

impl ContentStream {
    pub fn new(reader: Box<dyn AsyncRead + Send + Sync + Unpin>, size: u64) -> Self {
        Self { reader, size }
    }

    /// Wrap an in-memory buffer.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        let size = data.len() as u64;
        Self {
            reader: Box::new(std::io::Cursor::new(data)),
            size,
        }
    }
}

impl fmt::Debug for ContentStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentStream")
            .field("size", &self.size)
            .finish()
    }
}

/// Resolves content references into byte streams.
///
/// - Desktop: local file paths and `file://` URIs
/// - iOS/Android: photo library asset identifiers
///
/// # Example
///
/// ```ignore
/// use bridge_traits::content::{ContentRef, ContentSource};
///
/// async fn content_length(source: &dyn ContentSource) -> Result<u64> {
///     let stream = source.open(&ContentRef::new("file:///photos/x.jpg")).await?;
///     Ok(stream.size)
/// }
/// ```
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Open the referenced content for streaming reads
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The reference is not understood by this source
    /// - The content no longer exists or cannot be read
    async fn open(&self, content: &ContentRef) -> Result<ContentStream>;
}
