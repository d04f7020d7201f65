//! Photo server endpoint implementation
//!
//! Implements the `RemoteSyncEndpoint` trait over the server's `/check` and
//! `/submit` routes.

use async_trait::async_trait;
use bridge_traits::content::{ContentRef, ContentSource};
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse, MultipartUpload};
use bridge_traits::progress::ProgressSender;
use bridge_traits::remote::{ExistenceCheck, RemoteEntry, RemoteSyncEndpoint, UploadOutcome};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::PhotoServerError;
use crate::types::{CheckResponse, ErrorResponse, SubmitResponse};

/// Multipart field the server reads the file from
const UPLOAD_FIELD: &str = "photo";

/// Default timeout for existence checks
const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(30);

/// Photo server API endpoint
///
/// # Example
///
/// ```ignore
/// use provider_photo_server::PhotoServerEndpoint;
/// use bridge_traits::remote::RemoteSyncEndpoint;
///
/// let endpoint = PhotoServerEndpoint::new(http_client, content_source, "http://localhost:3000")?;
/// let check = endpoint.exists("x.jpg").await?;
/// ```
pub struct PhotoServerEndpoint {
    http_client: Arc<dyn HttpClient>,
    content_source: Arc<dyn ContentSource>,
    /// Server root without a trailing slash
    base_url: String,
    check_timeout: Duration,
    /// `None` lets an upload run as long as its body takes to stream
    upload_timeout: Option<Duration>,
}

impl PhotoServerEndpoint {
    /// Create an endpoint for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` unless `base_url` is an `http` or `https` URL.
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        content_source: Arc<dyn ContentSource>,
        base_url: impl Into<String>,
    ) -> crate::error::Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(PhotoServerError::InvalidUrl(base_url));
        }

        Ok(Self {
            http_client,
            content_source,
            base_url,
            check_timeout: DEFAULT_CHECK_TIMEOUT,
            upload_timeout: None,
        })
    }

    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = timeout;
        self
    }

    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn check_url(&self, name: &str) -> String {
        format!(
            "{}/check?filename={}",
            self.base_url,
            urlencoding::encode(name)
        )
    }

    fn submit_url(&self) -> String {
        format!("{}/submit", self.base_url)
    }

    /// Turn an unexpected response into an error carrying the server's message.
    fn api_error(response: &HttpResponse) -> PhotoServerError {
        let message = response
            .json::<ErrorResponse>()
            .ok()
            .and_then(|body| body.message())
            .unwrap_or_else(|| response.body_text());

        PhotoServerError::ApiError {
            status_code: response.status,
            message,
        }
    }
}

#[async_trait]
impl RemoteSyncEndpoint for PhotoServerEndpoint {
    #[instrument(skip(self))]
    async fn exists(&self, name: &str) -> Result<ExistenceCheck> {
        let request = HttpRequest::get(self.check_url(name))
            .header("Accept", "application/json")
            .timeout(self.check_timeout);

        let response = self.http_client.execute(request).await?;

        match response.status {
            200 => {
                let body: CheckResponse = response.json()?;
                debug!(path = ?body.path, "Photo found on server");
                Ok(ExistenceCheck::Found(RemoteEntry {
                    name: name.to_string(),
                    path: body.path,
                    message: body.message,
                }))
            }
            404 => Ok(ExistenceCheck::NotFound),
            status => {
                warn!(status, "Unexpected status from check");
                Err(Self::api_error(&response).into())
            }
        }
    }

    #[instrument(skip(self, content, progress))]
    async fn upload(
        &self,
        content: &ContentRef,
        name: &str,
        progress: ProgressSender,
    ) -> Result<UploadOutcome> {
        let stream = self.content_source.open(content).await?;
        let size = stream.size;

        let mut upload = MultipartUpload::new(self.submit_url(), UPLOAD_FIELD, name, stream)
            .mime_type(guess_mime_type(name));
        if let Some(timeout) = self.upload_timeout {
            upload = upload.timeout(timeout);
        }

        let response = self.http_client.upload_multipart(upload, progress).await?;

        match response.status {
            200..=299 => {
                let body: SubmitResponse = response.json()?;
                let final_name = body.file.unwrap_or_else(|| name.to_string());
                info!(size, %final_name, "Photo submitted");
                Ok(UploadOutcome::Accepted {
                    final_name,
                    path: body.path,
                })
            }
            409 => {
                let existing = response
                    .json::<SubmitResponse>()
                    .ok()
                    .and_then(|body| body.file)
                    .unwrap_or_else(|| name.to_string());
                debug!(name = %existing, "Server already has this photo");
                Ok(UploadOutcome::AlreadyExists { name: existing })
            }
            status => {
                warn!(status, "Upload rejected");
                Err(Self::api_error(&response).into())
            }
        }
    }
}

/// MIME type for a file name, from its extension.
pub fn guess_mime_type(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        _ => "application/octet-stream",
    }
}
