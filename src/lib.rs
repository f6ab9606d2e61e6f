//! # imgbb relay
//!
//! A small web service that relays image uploads to imgbb on behalf of
//! browser clients, so the imgbb API key never leaves the server.
//!
//! ## Features
//!
//! - **Single-page UI**: drag & drop, file picker and clipboard paste, with
//!   ready-made URL/HTML/Markdown/BBCode snippets
//! - **Optional password gate**: one shared secret guards both the page and
//!   the upload endpoint
//! - **Local validation**: missing, oversized and non-image files are refused
//!   before any upstream call
//! - **Browser-side history**: past uploads are kept in `localStorage`, never
//!   on the server
//!
//! ## Architecture
//!
//! - [`relay`] - access gate and upload validation
//! - [`upstream`] - imgbb client behind the [`ImageHost`] trait
//! - [`server`] - Axum-based HTTP server, routes and the upload page
//! - [`config`] - CLI and configuration types
//! - [`error`] - error types shared across layers
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use imgbb_relay::{create_router, ImgbbClient, RouterConfig, DEFAULT_UPLOAD_URL};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ImgbbClient::new(DEFAULT_UPLOAD_URL.parse()?, Duration::from_secs(60))?;
//!     let config = RouterConfig::new(std::env::var("IMGBB_API_KEY").ok());
//!
//!     let router = create_router(client, config);
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8787").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod relay;
pub mod server;
pub mod upstream;

// Re-export commonly used types
pub use config::Config;
pub use error::{RelayError, UpstreamError};
pub use relay::{
    verify, AccessConfig, ImageFile, RelaySettings, UploadRelay, UploadRequest, UploadResult,
    DEFAULT_MAX_UPLOAD_SIZE,
};
pub use server::{create_router, render_page, AppState, ErrorResponse, RouterConfig};
pub use upstream::{
    HostedImage, ImageHost, ImgbbClient, UpstreamResponse, DEFAULT_UPLOAD_URL,
    DEFAULT_UPSTREAM_TIMEOUT_SECS,
};
