//! CORS filter demo server.
//!
//! Loads a policy from a TOML file and answers every path with an echo
//! handler behind the CORS filter.
//!
//! ```text
//!   Client ──▶ trace ──▶ request id ──▶ timeout ──▶ CORS filter ──▶ echo
//!                                                      │
//!                                 preflight rejected ◀─┘ (401)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use cors_filter::config::{load_config, FilterConfig};
use cors_filter::lifecycle::{signals, Shutdown};
use cors_filter::observability::{logging, metrics};
use cors_filter::HttpServer;

#[derive(Parser)]
#[command(name = "cors-filter")]
#[command(about = "HTTP server guarded by a CORS policy", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => FilterConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "cors-filter starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
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
    let signal = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    let server = HttpServer::new(config);
    server.run(listener, signal).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
