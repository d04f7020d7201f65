//! reqwest transport for the photo server

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, MultipartUpload},
    progress::ProgressSender,
};
use futures_util::TryStreamExt;
use reqwest::{multipart, Client, Method};
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

/// Read size for streamed upload bodies; one progress report per chunk
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// [`HttpClient`] over a pooled `reqwest::Client`.
///
/// Every call is one attempt. A refused connection, a timeout or a body that
/// breaks off midway becomes [`BridgeError::Transport`]; any status the server
/// answers with is returned as a response.
///
/// The pooled client only bounds connection setup. Whole-request limits are
/// applied per call, so an upload without its own timeout can run as long as
/// the body takes to stream.
#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: Client,
    /// Applied to [`HttpRequest`]s that do not set a timeout; never to uploads
    request_timeout: Option<Duration>,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// `timeout` bounds `execute` calls that do not set their own.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("photostore-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                BridgeError::OperationFailed(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            request_timeout: Some(timeout),
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            request_timeout: None,
        }
    }

    fn method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        }
    }

    fn transport_error(e: reqwest::Error) -> BridgeError {
        let reason = if e.is_timeout() {
            "timed out"
        } else if e.is_connect() {
            "connection failed"
        } else if e.is_body() {
            "request body failed"
        } else {
            "request failed"
        };
        BridgeError::Transport(format!("{}: {}", reason, e))
    }

    async fn into_response(response: reqwest::Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(Self::transport_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = request.method.as_str(), url = %request.url, "Sending request");

        let mut builder = self
            .client
            .request(Self::method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(timeout) = request.timeout.or(self.request_timeout) {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, url = %request.url, "Request failed");
            Self::transport_error(e)
        })?;

        Self::into_response(response).await
    }

    async fn upload_multipart(
        &self,
        upload: MultipartUpload,
        progress: ProgressSender,
    ) -> Result<HttpResponse> {
        let MultipartUpload {
            url,
            field_name,
            file_name,
            mime_type,
            content,
            timeout,
        } = upload;
        let total = content.size;

        debug!(url = %url, file_name = %file_name, size = total, "Starting multipart upload");

        progress.report(0, total);
        let mut sent = 0u64;
        let body = ReaderStream::with_capacity(content.reader, UPLOAD_CHUNK_SIZE).inspect_ok(
            move |chunk| {
                sent += chunk.len() as u64;
                progress.report(sent, total);
            },
        );

        let part = multipart::Part::stream_with_length(reqwest::Body::wrap_stream(body), total)
            .file_name(file_name)
            .mime_str(&mime_type)
            .map_err(|e| BridgeError::OperationFailed(format!("Invalid MIME type: {}", e)))?;
        let form = multipart::Form::new().part(field_name, part);

        let mut builder = self.client.post(&url).multipart(form);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, url = %url, "Multipart upload failed");
            Self::transport_error(e)
        })?;

        Self::into_response(response).await
    }
}
