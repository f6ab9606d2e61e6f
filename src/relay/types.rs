use bytes::Bytes;
use serde::Serialize;

use crate::upstream::HostedImage;

/// Default upload limit: 32 MiB.
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 32 * 1024 * 1024;

/// An uploaded file as received from the caller.
#[derive(Debug, Clone)]
pub struct ImageFile {
    /// Original file name supplied by the client
    pub file_name: String,

    /// Declared media type, if any
    pub content_type: Option<String>,

    /// Number of bytes the client sent for this file
    pub size: u64,

    /// File contents. Empty for files that were [`ImageFile::oversized`].
    pub data: Bytes,
}

impl ImageFile {
    /// Create a file whose contents were fully received.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        Self {
            file_name: file_name.into(),
            content_type: Some(content_type.into()),
            size: data.len() as u64,
            data,
        }
    }

    /// Create a record of a file whose contents were counted but discarded
    /// because they exceeded the upload limit.
    pub fn oversized(
        file_name: impl Into<String>,
        content_type: Option<String>,
        size: u64,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            size,
            data: Bytes::new(),
        }
    }

    /// Whether the declared media type is `image/*`.
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| {
                ct.get(..6)
                    .map(|prefix| prefix.eq_ignore_ascii_case("image/"))
                    .unwrap_or(false)
            })
            .unwrap_or(false)
    }
}

/// One inbound upload, as seen by the relay.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    /// The `file` part, if one was present and was a file
    pub file: Option<ImageFile>,

    /// The `password` field, if supplied
    pub secret: Option<String>,
}

impl UploadRequest {
    pub fn new(file: ImageFile) -> Self {
        Self {
            file: Some(file),
            secret: None,
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }
}

/// Successful relay response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    pub success: bool,

    /// Direct link to the image
    pub url: String,

    /// Thumbnail link
    pub thumb_url: String,

    /// Upstream deletion link
    pub delete_url: String,

    /// Upstream title, or the original file name when upstream gave none
    pub filename: String,
}

impl UploadResult {
    /// Reshape an upstream result, falling back to `original_name` when the
    /// host assigned no title.
    pub fn from_hosted(hosted: HostedImage, original_name: &str) -> Self {
        Self {
            success: true,
            url: hosted.url,
            thumb_url: hosted.thumb_url,
            delete_url: hosted.delete_url,
            filename: hosted.title.unwrap_or_else(|| original_name.to_string()),
        }
    }
}
