//! smarttask-sw entry point.
//!
//! Boots the worker host runtime as an MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use smarttask_client::{FetchClient, FetchConfig};
use smarttask_core::{AppConfig, CacheDb};
use tracing_subscriber::EnvFilter;

mod handler;
mod host;
mod runtime;
mod tools;

#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        origin = %config.origin,
        version = %config.cache_version,
        db = %config.db_path.display(),
        "Starting smarttask-sw on stdio transport"
    );

    let store = Arc::new(CacheDb::open(&config.db_path).await?);
    let network = Arc::new(FetchClient::new(FetchConfig::from_app(&config))?);
    let runtime = runtime::Runtime::new(config, store, network);

    let handler = handler::SwServer::new(Arc::new(runtime));
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
