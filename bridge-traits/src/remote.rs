//! Remote Sync Endpoint Abstraction
//!
//! The remote store is reached through two operations: an existence check by
//! name and an upload of content under a name. Errors follow HTTP-style
//! semantics: "not found" is a regular outcome, while any other non-success
//! answer surfaces as [`BridgeError::Status`](crate::error::BridgeError::Status)
//! and connectivity problems as
//! [`BridgeError::Transport`](crate::error::BridgeError::Transport).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::content::ContentRef;
use crate::error::Result;
use crate::progress::ProgressSender;

/// Metadata the remote store reports for an item it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    /// Storage location on the remote side, if disclosed
    pub path: Option<String>,
    /// Human-readable server message
    pub message: Option<String>,
}

/// Result of an existence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExistenceCheck {
    Found(RemoteEntry),
    NotFound,
}

impl ExistenceCheck {
    pub fn is_found(&self) -> bool {
        matches!(self, ExistenceCheck::Found(_))
    }
}

/// Successful (or success-equivalent) result of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The remote store accepted and stored the content.
    Accepted {
        /// Name the remote store filed the content under
        final_name: String,
        path: Option<String>,
    },
    /// The remote store already holds an item with this name.
    AlreadyExists { name: String },
}

impl UploadOutcome {
    pub fn name(&self) -> &str {
        match self {
            UploadOutcome::Accepted { final_name, .. } => final_name,
            UploadOutcome::AlreadyExists { name } => name,
        }
    }
}

/// Remote store reachable over the network.
///
/// Implementations make exactly one attempt per call; retry policy belongs to
/// the caller.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::progress::progress_channel;
/// use bridge_traits::remote::{ExistenceCheck, RemoteSyncEndpoint};
///
/// async fn push(endpoint: &dyn RemoteSyncEndpoint, item: &ContentRef) -> Result<()> {
///     if let ExistenceCheck::NotFound = endpoint.exists("x.jpg").await? {
///         let (progress, _receiver) = progress_channel();
///         endpoint.upload(item, "x.jpg", progress).await?;
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait RemoteSyncEndpoint: Send + Sync {
    /// Ask whether the remote store holds an item called `name`
    ///
    /// # Errors
    ///
    /// - `Transport` if the store could not be reached or answered garbage
    /// - `Status` for any non-success answer other than "not found"
    async fn exists(&self, name: &str) -> Result<ExistenceCheck>;

    /// Upload the referenced content under `name`
    ///
    /// Byte progress is reported through `progress` as the body is streamed.
    /// The sender is dropped when the upload finishes.
    ///
    /// # Errors
    ///
    /// - `InvalidContent`/`Io` if the content cannot be opened
    /// - `Transport` if the transfer failed
    /// - `Status` for non-success answers other than a name conflict
    async fn upload(
        &self,
        content: &ContentRef,
        name: &str,
        progress: ProgressSender,
    ) -> Result<UploadOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existence_check() {
        let found = ExistenceCheck::Found(RemoteEntry {
            name: "x.jpg".to_string(),
            path: Some("uploads/x.jpg".to_string()),
            message: None,
        });
        assert!(found.is_found());
        assert!(!ExistenceCheck::NotFound.is_found());
    }

    #[test]
    fn test_upload_outcome_name() {
        let accepted = UploadOutcome::Accepted {
            final_name: "y.jpg".to_string(),
            path: None,
        };
        let conflict = UploadOutcome::AlreadyExists {
            name: "z.jpg".to_string(),
        };
        assert_eq!(accepted.name(), "y.jpg");
        assert_eq!(conflict.name(), "z.jpg");
    }
}
