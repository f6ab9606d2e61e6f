//! JSON envelope returned by the upstream image host.

use serde::Deserialize;

use crate::error::UpstreamError;

/// Top-level response body from the upload endpoint.
///
/// Success responses carry `success: true` and a `data` object. Error
/// responses usually omit `success` entirely and carry an `error` object plus
/// `status_txt`, so every field is optional here.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamResponse {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub data: Option<UpstreamImage>,

    #[serde(default)]
    pub error: Option<UpstreamErrorBody>,

    /// Human-readable HTTP status, e.g. "Bad Request"
    #[serde(default)]
    pub status_txt: Option<String>,
}

/// The `data` object of a successful upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamImage {
    #[serde(default)]
    pub id: Option<String>,

    /// Title assigned by the host (usually the file stem)
    #[serde(default)]
    pub title: Option<String>,

    /// Direct link to the original image
    pub url: String,

    #[serde(default)]
    pub display_url: Option<String>,

    /// Link that deletes the image when opened
    pub delete_url: String,

    #[serde(default)]
    pub thumb: Option<UpstreamThumb>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamThumb {
    pub url: String,
}

/// The `error` object of a rejected upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Links to an image the upstream host accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedImage {
    pub url: String,
    pub thumb_url: String,
    pub delete_url: String,
    /// Upstream-assigned title, `None` when absent or empty
    pub title: Option<String>,
}

impl UpstreamResponse {
    /// Interpret the envelope, given the HTTP status it arrived with.
    pub fn into_result(self, http_status: u16) -> Result<HostedImage, UpstreamError> {
        if !self.success {
            let message = self
                .error
                .and_then(|e| e.message)
                .filter(|m| !m.is_empty())
                .or(self.status_txt)
                .unwrap_or_else(|| format!("upstream answered HTTP {}", http_status));
            return Err(UpstreamError::Rejected { message });
        }

        let data = self.data.ok_or_else(|| {
            UpstreamError::InvalidResponse("success response without data".to_string())
        })?;

        // Thumbnails are not generated for every format; fall back to the
        // direct link so the gallery always has something to show.
        let thumb_url = data
            .thumb
            .map(|t| t.url)
            .unwrap_or_else(|| data.url.clone());

        Ok(HostedImage {
            url: data.url,
            thumb_url,
            delete_url: data.delete_url,
            title: data.title.filter(|t| !t.is_empty()),
        })
    }
}
