//! Code Cache Gateway - read-through disk cache for images keyed by numeric code
//!
//! Serves `/<code>` from a local directory, fetching and storing misses from
//! the upstream image service, and accepts explicit writes and deletes.

mod config;
mod error;
mod response;
mod routes;
#[cfg(test)]
mod test_support;
mod upstream;

use crate::config::{Args, GatewayConfig};
use crate::error::{GatewayError, Result};
use crate::routes::{start_server, ServerState, SharedState};
use crate::upstream::UpstreamFetcher;
use clap::Parser;
use flat_file_cache::FileCache;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let env_filter =
        EnvFilter::from_default_env().add_directive("code_cache_gateway=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting Code Cache Gateway...");

    let config = GatewayConfig::from_args(args)?;
    info!("Upstream: {}", config.upstream_url);

    let cache = FileCache::new(config.cache_dir.clone());
    cache.init().await?;

    let upstream = UpstreamFetcher::new(
        &config.upstream_url,
        Duration::from_secs(config.upstream_timeout_secs),
    )
    .map_err(|e| GatewayError::Config(format!("HTTP client: {}", e)))?;

    let state: SharedState = Arc::new(ServerState::new(cache, upstream, config));

    // Start HTTP server (blocking)
    start_server(state).await?;

    Ok(())
}
