//! Music API translation proxy.
//!
//! Sits between legacy music-player clients and a single upstream
//! music-metadata API whose query schema differs from the one clients speak.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                    MUSIC PROXY                        │
//!  Client ───────▶│  http::server ──┬─ OPTIONS ───────▶ preflight (204)   │
//!                 │  (request id,   ├─ not GET/HEAD ──▶ 405               │
//!                 │   tracing)      ├─ ?target= ──────▶ http::media ──────┼──▶ CDN
//!                 │                 └─ otherwise ─────▶ http::api         │
//!                 │                                      │ translate      │
//!                 │                                      ▼                │
//!                 │                                   upstream ──────────┼──▶ Music API
//!                 │                                                       │
//!  Client ◀───────│  security::headers (allow-list + CORS) ◀──────────────│
//!                 └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use music_proxy::config::{load_config, ProxyConfig};
use music_proxy::lifecycle::Shutdown;
use music_proxy::observability::{logging, metrics};
use music_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "music-proxy")]
#[command(about = "Translate legacy music API queries to the upstream schema", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long, env = "MUSIC_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);

    tracing::info!("music-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        api_base_url = %config.upstream.api_base_url,
        api_timeout_secs = config.upstream.api_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
