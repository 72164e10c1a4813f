use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use folio_server::{DebugServer, ServerConfig};
use folio_sources::{Fetcher, SourceRegistry};

/// Local source-debug server for the folio reader.
#[derive(Debug, Parser)]
#[command(name = "folio", version)]
struct Args {
    /// Host to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind (0 auto-assigns).
    #[arg(long, default_value_t = 9099)]
    port: u16,

    /// JSON file with book and RSS source definitions.
    #[arg(long)]
    sources: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let registry = Arc::new(SourceRegistry::new());
    if let Some(path) = &args.sources {
        let added = registry
            .load_file(path)
            .with_context(|| format!("loading sources from {}", path.display()))?;
        tracing::info!(count = added, path = %path.display(), "sources loaded");
    } else {
        tracing::warn!("no --sources file given; registry is empty");
    }

    let fetcher = Arc::new(Fetcher::new().context("building http client")?);

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        ..ServerConfig::default()
    };
    let server = DebugServer::new(config, registry, fetcher);
    let (addr, handle) = server.listen().await.context("binding listener")?;
    tracing::info!(addr = %addr, "folio debug server ready");

    tokio::signal::ctrl_c()
        .await
        .context("listening for ctrl+c")?;

    tracing::info!("shutting down");
    server.shutdown().shutdown();
    let _ = handle.await;
    Ok(())
}
