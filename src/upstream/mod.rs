//! Upstream image host client.
//!
//! This module talks to the third-party image host that actually stores the
//! uploaded images. The relay only depends on the [`ImageHost`] trait, which
//! keeps the HTTP details (multipart construction, API key placement, JSON
//! envelope parsing) in one place and lets tests substitute a mock host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Upload Relay               │
//! └────────────────────┬────────────────────┘
//!                      │ upload(api_key, file)
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │           ImageHost Trait               │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             ImgbbClient                 │
//! │  POST {upload_url}?key=...  (multipart) │
//! │  → UpstreamResponse → HostedImage       │
//! └─────────────────────────────────────────┘
//! ```

use async_trait::async_trait;

use crate::error::UpstreamError;
use crate::relay::ImageFile;

mod client;
mod response;

pub use client::{ImgbbClient, DEFAULT_UPLOAD_URL, DEFAULT_UPSTREAM_TIMEOUT_SECS};
pub use response::{HostedImage, UpstreamErrorBody, UpstreamImage, UpstreamResponse, UpstreamThumb};

/// A service that durably stores an image and hands back links to it.
///
/// Implementations must be thread-safe; one instance is shared by every
/// request the server handles.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Upload a single image.
    ///
    /// The API key is passed per call so that the host itself holds no
    /// credentials. Implementations must not echo the key in their errors.
    async fn upload(&self, api_key: &str, file: ImageFile) -> Result<HostedImage, UpstreamError>;
}
