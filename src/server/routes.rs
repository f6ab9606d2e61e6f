//! Router configuration for the upload relay.
//!
//! This module defines the HTTP routes and applies middleware for the API key
//! guard, CORS and request tracing.
//!
//! # Route Structure
//!
//! ```text
//! GET  /          - Upload page
//! POST /auth      - Password check
//! POST /upload    - Relay an image upstream (no body limit; fields are capped
//!                   while the form is read)
//! *               - 404 plain text (unknown path or method)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use imgbb_relay::server::routes::{create_router, RouterConfig};
//! use imgbb_relay::upstream::ImgbbClient;
//!
//! let client = ImgbbClient::new(upload_url, Duration::from_secs(60))?;
//! let config = RouterConfig::new(Some(api_key)).with_secret("hunter2");
//!
//! let router = create_router(client, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8787").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    auth_handler, index_handler, not_found_handler, require_api_key, upload_handler, AppState,
};
use crate::relay::{AccessConfig, RelaySettings, UploadRelay};
use crate::upstream::ImageHost;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Relay settings (API key, gate, upload limit)
    pub relay: RelaySettings,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a router configuration with the given upstream API key.
    ///
    /// By default:
    /// - The password gate is disabled
    /// - Uploads are limited to 32 MiB
    /// - CORS allows any origin
    /// - Tracing is enabled
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            relay: RelaySettings::new(api_key),
            cors_origins: None,
            enable_tracing: true,
        }
    }

    /// Require `secret` on `/auth` and `/upload`. An empty secret disables the gate.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.relay.access = AccessConfig::new(Some(secret.into()));
        self
    }

    /// Set the gate from an optional secret.
    pub fn with_access(mut self, access: AccessConfig) -> Self {
        self.relay.access = access;
        self
    }

    /// Set the largest accepted file, in bytes.
    pub fn with_max_upload_size(mut self, bytes: u64) -> Self {
        self.relay.max_upload_size = bytes;
        self
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the application router around an image host.
///
/// Every route, including the 404 fallback, sits behind the API key guard so
/// a misconfigured deployment answers 500 everywhere.
pub fn create_router<H>(host: H, config: RouterConfig) -> Router
where
    H: ImageHost + 'static,
{
    let app_state = AppState::new(UploadRelay::new(host, config.relay.clone()));
    let cors = build_cors_layer(&config);

    // Method mismatches on known paths answer 404 as well, not 405
    let router = Router::new()
        .route("/", get(index_handler::<H>).fallback(not_found_handler))
        .route("/auth", post(auth_handler::<H>).fallback(not_found_handler))
        .route(
            "/upload",
            post(upload_handler::<H>)
                .fallback(not_found_handler)
                .layer(DefaultBodyLimit::disable()),
        )
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            require_api_key::<H>,
        ))
        .with_state(app_state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
