//! Pagesmith server binary
//!
//! Wires the remote backend (when configured), the orchestrator, the
//! request coalescer, and the in-memory project store into one warp server.

mod routes;

use clap::Parser;
use pagesmith_provider::{
    ContentBackend, Orchestrator, RemoteBackend, RemoteConfig, RequestCoalescer,
};
use pagesmith_store::MemoryStore;
use routes::AppState;
use std::net::IpAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pagesmith-server", about = "Prompt-to-page generation server")]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Port to listen on
    #[arg(long, default_value_t = 8787)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = RemoteConfig::from_env();
    let remote = RemoteBackend::new(config)?;
    if remote.is_configured() {
        tracing::info!("remote backend configured");
    } else {
        tracing::warn!("no PAGESMITH_API_KEY set, serving local generation only");
    }

    let state = AppState {
        orchestrator: Arc::new(Orchestrator::new(Some(Arc::new(remote)))),
        coalescer: Arc::new(RequestCoalescer::new()),
        store: Arc::new(MemoryStore::new()),
    };

    tracing::info!(bind = %cli.bind, port = cli.port, "listening");
    warp::serve(routes::routes(state)).run((cli.bind, cli.port)).await;
    Ok(())
}
