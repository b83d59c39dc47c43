//! Edge Authentication Gateway
//!
//! An authenticating reverse proxy in front of a backend chat/tool service,
//! built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │               EDGE GATEWAY                    │
//!   Client Request   │  ┌──────────┐   ┌──────────┐   ┌──────────┐  │
//!   ─────────────────┼─▶│  http    │──▶│   auth   │──▶│ routing  │  │
//!                    │  │ server   │   │ verifier │   │  table   │  │
//!                    │  └──────────┘   └────┬─────┘   └────┬─────┘  │
//!                    │                      │              │        │
//!                    │              403/500 ▼              ▼        │
//!   Client Response  │  ┌──────────┐   ┌──────────────────────────┐ │
//!   ◀────────────────┼──│ response │◀──│ forward / socket bridge  │◀┼──── Backend
//!                    │  └──────────┘   └──────────────────────────┘ │
//!                    │  ┌──────────────────────────────────────────┐│
//!                    │  │  config · observability · lifecycle      ││
//!                    │  └──────────────────────────────────────────┘│
//!                    └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use edge_gateway::config::loader::load_config;
use edge_gateway::lifecycle::Shutdown;
use edge_gateway::observability::{logging, metrics};
use edge_gateway::HttpServer;

#[derive(Debug, Parser)]
#[command(name = "edge-gateway", about = "Authenticating reverse proxy")]
struct Cli {
    /// Optional TOML configuration file; secrets come from the environment.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream_origin = %config.upstream.origin,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.trust.team_domain.is_none() || config.trust.audience.is_none() {
        tracing::warn!(
            team_domain_set = config.trust.team_domain.is_some(),
            audience_set = config.trust.audience.is_some(),
            "Trust configuration incomplete; every request will fail with 500 until set"
        );
    }
    if !config.trust.has_service_token() {
        tracing::info!("No service-token pair configured; that credential path is disabled");
    }

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
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
