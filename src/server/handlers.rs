//! HTTP request handlers for the upload relay.
//!
//! This module contains the Axum handlers and the mapping from relay errors
//! to HTTP responses.
//!
//! # Endpoints
//!
//! - `GET /` - Upload page
//! - `POST /auth` - Password check
//! - `POST /upload` - Relay one image upstream
//! - anything else - `404` plain text

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::RelayError;
use crate::relay::{UploadRelay, UploadRequest, UploadResult};
use crate::upstream::ImageHost;

use super::form::{read_password, read_upload_form};
use super::page::render_page_with_limit;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the upload relay.
///
/// The relay carries the immutable configuration (API key, gate, limits), so
/// every request sees the same read-only values.
pub struct AppState<H: ImageHost> {
    pub relay: Arc<UploadRelay<H>>,
}

impl<H: ImageHost> AppState<H> {
    pub fn new(relay: UploadRelay<H>) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }
}

impl<H: ImageHost> Clone for AppState<H> {
    fn clone(&self) -> Self {
        Self {
            relay: Arc::clone(&self.relay),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error body returned by `/upload`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,

    /// Diagnostic passed through from the upstream host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: None,
        }
    }

    pub fn with_detail(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: Some(detail.into()),
        }
    }
}

/// Body of `/auth` responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
}

/// Plain-text body for unknown routes.
pub const NOT_FOUND_MESSAGE: &str = "404: nothing lives here";

// =============================================================================
// Error Mapping
// =============================================================================

impl RelayError {
    /// HTTP status and short machine-readable name for this error.
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            RelayError::MissingApiKey => (StatusCode::INTERNAL_SERVER_ERROR, "missing_api_key"),
            RelayError::Unauthorized => (StatusCode::FORBIDDEN, "unauthorized"),
            RelayError::MissingFile => (StatusCode::BAD_REQUEST, "missing_file"),
            RelayError::FileTooLarge { .. } => (StatusCode::BAD_REQUEST, "file_too_large"),
            RelayError::UnsupportedMediaType { .. } => {
                (StatusCode::BAD_REQUEST, "unsupported_media_type")
            }
            RelayError::UpstreamRejected { .. } => (StatusCode::BAD_REQUEST, "upstream_rejected"),
            RelayError::Transport(_) => (StatusCode::INTERNAL_SERVER_ERROR, "transport_error"),
        }
    }
}

/// Convert RelayError to HTTP response.
///
/// 5xx errors are logged at ERROR level, 4xx at WARN.
impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status();
        let message = self.to_string();

        let body = match &self {
            RelayError::UpstreamRejected { detail } => {
                warn!(
                    error_type = error_type,
                    status = status.as_u16(),
                    detail = %detail,
                    "Upstream rejected upload"
                );
                ErrorResponse::with_detail(message, detail.clone())
            }
            _ if status.is_server_error() => {
                error!(
                    error_type = error_type,
                    status = status.as_u16(),
                    "Server error: {}",
                    message
                );
                ErrorResponse::new(message)
            }
            _ => {
                warn!(
                    error_type = error_type,
                    status = status.as_u16(),
                    "Client error: {}",
                    message
                );
                ErrorResponse::new(message)
            }
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Middleware
// =============================================================================

/// Refuse every request with a plain-text 500 while the upstream API key is
/// missing. Applied to all routes, including the 404 fallback.
pub async fn require_api_key<H: ImageHost>(
    State(state): State<AppState<H>>,
    request: Request,
    next: Next,
) -> Response {
    match state.relay.api_key() {
        Ok(_) => next.run(request).await,
        Err(err) => {
            error!(
                error_type = "missing_api_key",
                path = %request.uri().path(),
                "Refusing request: {}",
                err
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                err.to_string(),
            )
                .into_response()
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Serve the upload page.
///
/// # Endpoint
///
/// `GET /`
///
/// The password overlay is shown on load only when a secret is configured.
pub async fn index_handler<H: ImageHost>(State(state): State<AppState<H>>) -> Html<String> {
    let settings = state.relay.settings();
    Html(render_page_with_limit(
        settings.access.is_enabled(),
        settings.max_upload_size,
    ))
}

/// Check a password against the gate.
///
/// # Endpoint
///
/// `POST /auth` with form field `password` (multipart or urlencoded)
///
/// # Response
///
/// - `200 OK`: `{"success": true}`
/// - `403 Forbidden`: `{"success": false}`
pub async fn auth_handler<H: ImageHost>(
    State(state): State<AppState<H>>,
    request: Request,
) -> Response {
    let password = read_password(request).await;

    match state.relay.authorize(password.as_deref()) {
        Ok(()) => {
            debug!("Password verification passed");
            Json(AuthResponse { success: true }).into_response()
        }
        Err(_) => {
            warn!(status = 403, "Password verification failed");
            (StatusCode::FORBIDDEN, Json(AuthResponse { success: false })).into_response()
        }
    }
}

/// Relay one image to the upstream host.
///
/// # Endpoint
///
/// `POST /upload` with multipart fields `file` and optional `password`
///
/// # Response
///
/// - `200 OK`: `{success, url, thumb_url, delete_url, filename}`
/// - `400 Bad Request`: missing, oversized or non-image file; upstream
///   rejection (with `detail`)
/// - `403 Forbidden`: password mismatch
/// - `500 Internal Server Error`: transport or parse failure
pub async fn upload_handler<H: ImageHost>(
    State(state): State<AppState<H>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResult>, RelayError> {
    let request = match multipart {
        Ok(multipart) => {
            read_upload_form(multipart, state.relay.settings().max_upload_size).await
        }
        Err(rejection) => {
            debug!("Upload body is not a multipart form: {}", rejection.body_text());
            UploadRequest::default()
        }
    };

    let result = state.relay.handle_upload(request).await?;
    Ok(Json(result))
}

/// Fallback for unknown paths and methods.
pub async fn not_found_handler() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
}

// =============================================================================
// Tests
// =============================================================================
