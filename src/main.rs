// Category HTTP Server: URL to Markdown
//
// Serves the conversion API over HTTP. Configuration comes from
// URL_TO_MARKDOWN_* environment variables, log filtering from RUST_LOG.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use url_to_markdown::api::{AppState, build_router};
use url_to_markdown::config::ServiceConfig;
use url_to_markdown::fetch::HttpFetcher;
use url_to_markdown::filters::FilterRegistry;
use url_to_markdown::markdown_converter::PageConverter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = ServiceConfig::from_env().context("Invalid service configuration")?;
    let filters = FilterRegistry::with_builtin_sets().context("Built-in filter sets failed to compile")?;
    info!(sets = filters.len(), "Filter registry ready");

    let converter = PageConverter::new(Arc::new(filters));
    let fetcher = HttpFetcher::new(&config).context("Failed to build HTTP client")?;
    let addr = config.bind_addr();
    let app = build_router(Arc::new(AppState::new(converter, fetcher, config)));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("URL to Markdown API listening on http://{addr}");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    if let Err(err) = server.await {
        warn!("Server exited with error: {err}");
    }

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
