use std::error::Error as _;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::UpstreamError;
use crate::relay::ImageFile;

use super::response::{HostedImage, UpstreamResponse};
use super::ImageHost;

/// Default imgbb v1 upload endpoint.
pub const DEFAULT_UPLOAD_URL: &str = "https://api.imgbb.com/1/upload";

/// Default timeout for a single upstream upload, in seconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 60;

/// Multipart field name the upstream expects the image under.
const IMAGE_FIELD: &str = "image";

/// HTTP client for the imgbb upload API.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone)]
pub struct ImgbbClient {
    client: Client,
    upload_url: Url,
}

impl ImgbbClient {
    /// Create a client posting to `upload_url` with the given request timeout.
    pub fn new(upload_url: Url, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("imgbb-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        Ok(Self { client, upload_url })
    }

    /// Create a client around an existing reqwest client.
    pub fn with_client(client: Client, upload_url: Url) -> Self {
        Self { client, upload_url }
    }

    /// The endpoint uploads are posted to.
    pub fn upload_url(&self) -> &Url {
        &self.upload_url
    }
}

#[async_trait]
impl ImageHost for ImgbbClient {
    async fn upload(&self, api_key: &str, file: ImageFile) -> Result<HostedImage, UpstreamError> {
        let length = file.data.len() as u64;
        let mut part = Part::stream_with_length(file.data, length).file_name(file.file_name);
        if let Some(content_type) = file.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|e| UpstreamError::Transport(describe(e)))?;
        }
        let form = Form::new().part(IMAGE_FIELD, part);

        debug!(bytes = length, endpoint = %self.upload_url, "Forwarding image upstream");

        let response = self
            .client
            .post(self.upload_url.clone())
            .query(&[("key", api_key)])
            .multipart(form)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(describe(e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Transport(describe(e)))?;

        debug!(status, bytes = body.len(), "Upstream responded");

        // The body is interpreted regardless of status: rejections arrive as
        // 4xx responses with a JSON error envelope.
        let envelope: UpstreamResponse = serde_json::from_slice(&body).map_err(|e| {
            UpstreamError::InvalidResponse(format!("HTTP {} with unreadable body: {}", status, e))
        })?;

        envelope.into_result(status)
    }
}

/// Render a reqwest error with its cause chain but without the request URL,
/// which carries the API key in its query string.
fn describe(err: reqwest::Error) -> String {
    let err = err.without_url();
    if err.is_timeout() {
        return "request to upstream timed out".to_string();
    }

    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
