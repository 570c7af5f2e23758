//! Service gateway
//!
//! Single entry point in front of independently addressable backend services.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────┐
//!                          │                  GATEWAY                      │
//!     Client Request       │  ┌─────────┐   ┌─────────┐   ┌────────────┐  │
//!     ─────────────────────┼─▶│  http   │──▶│ routing │──▶│  registry  │  │
//!                          │  │ server  │   │ matcher │   │ name→addr  │  │
//!                          │  └─────────┘   └─────────┘   └─────┬──────┘  │
//!                          │                                    ▼         │
//!     Client Response      │  ┌─────────┐   ┌─────────────────────────┐   │
//!     ◀────────────────────┼──│response │◀──│ forward engine          │◀──┼── Backend
//!                          │  │  / 503  │   │ headers, timeout, body  │   │
//!                          │  └─────────┘   └─────────────────────────┘   │
//!                          │                                              │
//!                          │  config · observability · lifecycle          │
//!                          └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use service_gateway::config::load_config;
use service_gateway::lifecycle::{signals, Shutdown};
use service_gateway::observability::{logging, metrics};
use service_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "service-gateway")]
#[command(about = "Routes /<prefix>/<service>/... requests to backend services", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!("service-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        prefix = %config.routing.prefix,
        upstream_timeout_secs = config.upstream.timeout_secs,
        "Configuration loaded"
    );
    for (name, address) in &config.services {
        tracing::info!(service = %name, address = %address, "Registered service");
    }

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Arc::new(Shutdown::new());
    let shutdown_rx = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    let server = HttpServer::new(config);
    server.run(listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
