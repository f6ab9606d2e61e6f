//! Configuration management for the upload relay.
//!
//! This module provides a configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables (the upstream key and admin password keep their
//!   conventional names, everything else uses the `RELAY_` prefix)
//! - Sensible defaults for all optional settings
//!
//! Configuration is read once at startup and handed to the router as an
//! immutable value.
//!
//! # Environment Variables
//!
//! - `RELAY_HOST` - Server bind address (default: 0.0.0.0)
//! - `RELAY_PORT` - Server port (default: 8787)
//! - `IMGBB_API_KEY` - imgbb API key (every request answers 500 without it)
//! - `ADMIN_PASSWORD` - Shared secret for the page and uploads (empty = open)
//! - `IMGBB_UPLOAD_URL` - Upstream upload endpoint
//! - `RELAY_MAX_UPLOAD_SIZE` - Largest accepted file in bytes (default: 32 MiB)
//! - `RELAY_UPSTREAM_TIMEOUT` - Upstream request timeout in seconds (default: 60)
//! - `RELAY_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::relay::{AccessConfig, DEFAULT_MAX_UPLOAD_SIZE};
use crate::server::{RouterConfig, MAX_TEXT_FIELD_BYTES};
use crate::upstream::{DEFAULT_UPLOAD_URL, DEFAULT_UPSTREAM_TIMEOUT_SECS};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8787;

/// Longest accepted admin password; longer values could never be submitted
/// through the form.
pub const MAX_SECRET_LEN: usize = MAX_TEXT_FIELD_BYTES;

// =============================================================================
// CLI Arguments
// =============================================================================

/// imgbb relay - forwards browser image uploads to imgbb.
///
/// Serves a single upload page and relays each image to imgbb using a
/// server-held API key, optionally behind a shared password.
#[derive(Parser, Debug, Clone)]
#[command(name = "imgbb-relay")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "RELAY_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "RELAY_PORT")]
    pub port: u16,

    // =========================================================================
    // Upstream Configuration
    // =========================================================================
    /// imgbb API key.
    ///
    /// Without it the server still starts, but answers 500 to every request.
    #[arg(long, env = "IMGBB_API_KEY", hide_env_values = true)]
    pub imgbb_api_key: Option<String>,

    /// imgbb upload endpoint.
    #[arg(long, default_value = DEFAULT_UPLOAD_URL, env = "IMGBB_UPLOAD_URL")]
    pub upstream_url: String,

    /// Timeout for a single upstream upload, in seconds.
    #[arg(long, default_value_t = DEFAULT_UPSTREAM_TIMEOUT_SECS, env = "RELAY_UPSTREAM_TIMEOUT")]
    pub upstream_timeout: u64,

    // =========================================================================
    // Access Configuration
    // =========================================================================
    /// Shared password required to use the page and upload endpoint.
    ///
    /// When unset or empty, anyone who can reach the server may upload.
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    /// Largest accepted file, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_SIZE, env = "RELAY_MAX_UPLOAD_SIZE")]
    pub max_upload_size: u64,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "RELAY_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    ///
    /// A missing API key is not an error here; the server reports it per
    /// request instead.
    pub fn validate(&self) -> Result<(), String> {
        self.upload_url()?;

        if self.max_upload_size == 0 {
            return Err("max_upload_size must be greater than 0".to_string());
        }

        if self.upstream_timeout == 0 {
            return Err("upstream_timeout must be greater than 0".to_string());
        }

        if let Some(ref password) = self.admin_password {
            if password.len() > MAX_SECRET_LEN {
                return Err(format!(
                    "ADMIN_PASSWORD is longer than {} bytes and could never be entered",
                    MAX_SECRET_LEN
                ));
            }
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parse the upstream endpoint, accepting only http and https URLs.
    pub fn upload_url(&self) -> Result<Url, String> {
        let url = Url::parse(&self.upstream_url)
            .map_err(|e| format!("Invalid upstream URL '{}': {}", self.upstream_url, e))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(format!(
                "Upstream URL must use http or https, got '{}'",
                other
            )),
        }
    }

    /// Upstream request timeout.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }

    /// The configured API key, treating an empty value as absent.
    pub fn api_key(&self) -> Option<&str> {
        self.imgbb_api_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Access gate built from the admin password.
    pub fn access(&self) -> AccessConfig {
        AccessConfig::new(self.admin_password.clone())
    }

    /// Build the router configuration from these settings.
    pub fn router_config(&self) -> RouterConfig {
        let mut router_config = RouterConfig::new(self.api_key().map(str::to_string))
            .with_access(self.access())
            .with_max_upload_size(self.max_upload_size)
            .with_tracing(!self.no_tracing);

        if let Some(ref origins) = self.cors_origins {
            router_config = router_config.with_cors_origins(origins.clone());
        }

        router_config
    }
}

// =============================================================================
// Tests
// =============================================================================
