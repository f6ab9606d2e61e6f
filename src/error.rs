use thiserror::Error;

/// Errors from talking to the upstream image host.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    /// Network or connection failure (includes timeouts)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body was not the JSON envelope we expect
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    /// Upstream processed the request but declined it
    #[error("Upstream rejected the upload: {message}")]
    Rejected { message: String },
}

/// Errors produced by the upload relay and access gate.
///
/// Each variant belongs to exactly one class of the error taxonomy and maps to
/// a fixed HTTP status in the server layer.
#[derive(Debug, Clone, Error)]
pub enum RelayError {
    /// The upstream API key is not configured (500)
    #[error("IMGBB_API_KEY is not configured. Set the environment variable and restart the relay.")]
    MissingApiKey,

    /// Shared secret missing or wrong (403)
    #[error("This session has not passed password verification. Request blocked.")]
    Unauthorized,

    /// No `file` part, or the part is not a file (400)
    #[error("File is missing or invalid")]
    MissingFile,

    /// File exceeds the upload limit (400)
    #[error("Image too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    /// Declared media type is not an image (400)
    #[error("Only image uploads are accepted (got {content_type})")]
    UnsupportedMediaType { content_type: String },

    /// Upstream reported `success: false` (400)
    #[error("Upstream image host refused the upload")]
    UpstreamRejected { detail: String },

    /// Network or parse failure talking to upstream (500)
    #[error("Upload interrupted: {0}")]
    Transport(String),
}

impl From<UpstreamError> for RelayError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Rejected { message } => RelayError::UpstreamRejected { detail: message },
            UpstreamError::Transport(_) | UpstreamError::InvalidResponse(_) => {
                RelayError::Transport(err.to_string())
            }
        }
    }
}
