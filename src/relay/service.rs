//! Upload relay.
//!
//! The relay is the single authority on whether an upload is forwarded. It
//! rejects everything it can locally before spending an upstream call:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    handle_upload()                      │
//! │  1. API key configured?   (500)                         │
//! │  2. Gate passes?          (403)                         │
//! │  3. File present?         (400)                         │
//! │  4. Within size limit?    (400)                         │
//! │  5. Declared image/*?     (400)                         │
//! │  6. One upstream call  →  UploadResult | 400 | 500      │
//! └─────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::RelayError;
use crate::upstream::ImageHost;

use super::gate::AccessConfig;
use super::types::{UploadRequest, UploadResult, DEFAULT_MAX_UPLOAD_SIZE};

/// Immutable settings the relay is constructed with.
#[derive(Clone)]
pub struct RelaySettings {
    /// Upstream API key; `None` is a misconfiguration reported per request
    pub api_key: Option<String>,

    /// Shared-secret gate
    pub access: AccessConfig,

    /// Largest accepted file, in bytes
    pub max_upload_size: u64,
}

impl std::fmt::Debug for RelaySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelaySettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("access", &self.access)
            .field("max_upload_size", &self.max_upload_size)
            .finish()
    }
}

impl RelaySettings {
    /// Settings with the given API key, gate disabled and the default limit.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()),
            access: AccessConfig::open(),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        }
    }

    pub fn with_access(mut self, access: AccessConfig) -> Self {
        self.access = access;
        self
    }

    pub fn with_max_upload_size(mut self, bytes: u64) -> Self {
        self.max_upload_size = bytes;
        self
    }
}

/// Validates uploads and forwards accepted ones to an [`ImageHost`].
pub struct UploadRelay<H: ImageHost> {
    host: Arc<H>,
    settings: RelaySettings,
}

impl<H: ImageHost> UploadRelay<H> {
    pub fn new(host: H, settings: RelaySettings) -> Self {
        Self {
            host: Arc::new(host),
            settings,
        }
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// The configured API key, or [`RelayError::MissingApiKey`].
    pub fn api_key(&self) -> Result<&str, RelayError> {
        self.settings
            .api_key
            .as_deref()
            .ok_or(RelayError::MissingApiKey)
    }

    /// Run the access gate against a caller-supplied secret.
    pub fn authorize(&self, supplied: Option<&str>) -> Result<(), RelayError> {
        if self.settings.access.verify(supplied) {
            Ok(())
        } else {
            Err(RelayError::Unauthorized)
        }
    }

    /// Validate an upload and forward it upstream.
    ///
    /// Performs at most one upstream call, and none at all when any local
    /// check fails. Nothing is retried.
    pub async fn handle_upload(&self, request: UploadRequest) -> Result<UploadResult, RelayError> {
        let api_key = self.api_key()?;
        self.authorize(request.secret.as_deref())?;

        let file = request.file.ok_or(RelayError::MissingFile)?;

        if file.size > self.settings.max_upload_size {
            return Err(RelayError::FileTooLarge {
                size: file.size,
                limit: self.settings.max_upload_size,
            });
        }

        if !file.is_image() {
            return Err(RelayError::UnsupportedMediaType {
                content_type: file
                    .content_type
                    .clone()
                    .unwrap_or_else(|| "no content type".to_string()),
            });
        }

        let original_name = file.file_name.clone();
        debug!(
            file_name = %original_name,
            size = file.size,
            "Relaying upload"
        );

        let hosted = self.host.upload(api_key, file).await?;
        let result = UploadResult::from_hosted(hosted, &original_name);

        info!(file_name = %result.filename, url = %result.url, "Upload relayed");
        Ok(result)
    }
}
