//! imgbb relay - forwards browser image uploads to imgbb.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imgbb_relay::{config::Config, server::create_router, upstream::ImgbbClient};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    // validate() has already checked the URL
    let upload_url = match config.upload_url() {
        Ok(url) => url,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("imgbb relay v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Upstream: {}", upload_url);
    info!("  Upstream timeout: {}s", config.upstream_timeout);
    info!(
        "  Max upload size: {} bytes ({} MiB)",
        config.max_upload_size,
        config.max_upload_size / (1024 * 1024)
    );

    if config.api_key().is_some() {
        info!("  API key: configured");
    } else {
        warn!("  API key: MISSING - every request will answer 500");
        warn!("        Set IMGBB_API_KEY or --imgbb-api-key and restart");
    }

    if config.access().is_enabled() {
        info!("  Password gate: enabled");
    } else {
        warn!("  Password gate: DISABLED - anyone who can reach the server may upload");
        warn!("        Enable for production: ADMIN_PASSWORD=<secret>");
    }

    let client = match ImgbbClient::new(upload_url, config.upstream_timeout()) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build upstream client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let router = create_router(client, config.router_config());

    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Open the upload page in your browser:");
    info!("    open http://{}/", addr);
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "imgbb_relay=debug,tower_http=debug"
    } else {
        "imgbb_relay=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
