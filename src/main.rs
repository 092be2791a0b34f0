//! reqtrace server
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ net::listener ──▶ http::server (timeout, body limit)
//!                                          │
//!                                          ▼
//!                                   routing (method + path)
//!                                          │
//!                                          ▼
//!                       AssignRequestId ──▶ TraceRequests ──▶ api handler
//!                                                  │
//!     Client Response ◀──── BufferedResponse ◀─────┘   (trace line, metrics)
//! ```

use std::path::PathBuf;

use clap::Parser;

use reqtrace::config::{load_config, ServerConfig};
use reqtrace::lifecycle::{signals, Shutdown};
use reqtrace::observability::{init_logging, metrics::init_metrics};
use reqtrace::HttpServer;

#[derive(Parser)]
#[command(name = "reqtrace")]
#[command(about = "HTTP server tracing every request with its own context", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overriding the configuration (e.g. ":8080").
    #[arg(short, long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(listen) = cli.listen {
        config.listener.bind_address = listen;
    }

    init_logging(&config.observability)?;
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_body_bytes = config.limits.max_body_bytes,
        "Configuration loaded"
    );

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server failed");
        return Err(e);
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let server = HttpServer::new(&config)?;
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    signals::forward_to(shutdown);

    server
        .bind_and_run(&config.listener.bind_address, rx)
        .await?;
    Ok(())
}
