//! HTTP transport seam
//!
//! The photo server protocol needs two shapes of request: a small `GET`
//! answered with JSON, and a streamed `multipart/form-data` upload. Hosts
//! implement [`HttpClient`] for both. Each call is a single attempt.

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::content::ContentStream;
use crate::error::{BridgeError, Result};
use crate::progress::ProgressSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// A request without a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    /// Overrides the client's default timeout for this request
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Whatever the server answered, including non-2xx statuses.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// A body that does not decode is a malformed response, reported as
    /// [`BridgeError::Transport`].
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| BridgeError::Transport(format!("Malformed response body: {}", e)))
    }

    /// Body as text with invalid UTF-8 replaced, trimmed
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).trim().to_string()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A streamed `multipart/form-data` upload carrying a single file part.
pub struct MultipartUpload {
    pub url: String,
    /// Form field the file is attached under
    pub field_name: String,
    /// File name announced in the part's content disposition
    pub file_name: String,
    pub mime_type: String,
    pub content: ContentStream,
    pub timeout: Option<Duration>,
}

impl MultipartUpload {
    pub fn new(
        url: impl Into<String>,
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        content: ContentStream,
    ) -> Self {
        Self {
            url: url.into(),
            field_name: field_name.into(),
            file_name: file_name.into(),
            mime_type: "application/octet-stream".to_string(),
            content,
            timeout: None,
        }
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl fmt::Debug for MultipartUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultipartUpload")
            .field("url", &self.url)
            .field("field_name", &self.field_name)
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.content.size)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Host HTTP transport.
///
/// Non-2xx answers come back as responses. Only a failure to obtain a
/// response (refused connection, timeout, broken body stream) is an error,
/// and it is reported as [`BridgeError::Transport`].
///
/// ```ignore
/// use bridge_traits::http::{HttpClient, HttpRequest};
///
/// async fn check_status(client: &dyn HttpClient) -> Result<u16> {
///     let response = client
///         .execute(HttpRequest::get("http://localhost:3000/check?filename=x.jpg"))
///         .await?;
///     Ok(response.status)
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Stream `upload` as the request body, reporting bytes handed to the
    /// transport through `progress`.
    ///
    /// The content stream is consumed, so the upload cannot be replayed.
    async fn upload_multipart(
        &self,
        upload: MultipartUpload,
        progress: ProgressSender,
    ) -> Result<HttpResponse>;
}
