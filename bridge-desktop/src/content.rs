//! Content Source Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    content::{ContentRef, ContentSource, ContentStream},
    error::{BridgeError, Result},
};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

const FILE_SCHEME: &str = "file://";

/// Build the content reference for a file on disk.
pub fn file_content_ref(path: &Path) -> ContentRef {
    ContentRef::new(format!("{}{}", FILE_SCHEME, path.to_string_lossy()))
}

/// Resolves `file://` URIs and plain paths with `tokio::fs`.
///
/// Relative paths are resolved against the configured root, if any.
#[derive(Debug, Clone, Default)]
pub struct TokioContentSource {
    root: Option<PathBuf>,
}

impl TokioContentSource {
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Resolve relative references against `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, content: &ContentRef) -> Result<PathBuf> {
        if content.is_empty() {
            return Err(BridgeError::InvalidContent(
                "Empty content reference".to_string(),
            ));
        }

        let raw = content.as_str();
        let path = match raw.strip_prefix(FILE_SCHEME) {
            Some(rest) => PathBuf::from(rest),
            None if raw.contains("://") => {
                return Err(BridgeError::InvalidContent(format!(
                    "Unsupported content scheme: {}",
                    raw
                )))
            }
            None => PathBuf::from(raw),
        };

        Ok(match (&self.root, path.is_relative()) {
            (Some(root), true) => root.join(path),
            _ => path,
        })
    }
}

#[async_trait]
impl ContentSource for TokioContentSource {
    async fn open(&self, content: &ContentRef) -> Result<ContentStream> {
        let path = self.resolve(content)?;

        let metadata = fs::metadata(&path).await?;
        if !metadata.is_file() {
            return Err(BridgeError::InvalidContent(format!(
                "Not a regular file: {}",
                path.display()
            )));
        }

        let file = fs::File::open(&path).await?;
        debug!(path = ?path, size = metadata.len(), "Opened content for reading");
        Ok(ContentStream::new(Box::new(file), metadata.len()))
    }
}
