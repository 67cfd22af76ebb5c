//! URL mapping service.
//!
//! # Architecture Overview
//!
//! ```text
//!  Client Request
//!  ──────────────▶ http server ──▶ PrefixRegistry ──▶ PrefixHandler
//!                  (axum, ids,     (prefix → name)    (mapper chain,
//!                   tracing)                           first match wins)
//!                                                          │
//!  Client Response                                         ▼
//!  ◀────────────── BufferedResponse ◀── Redirector ◀── ConversionResult
//!                                       (redirect or
//!                                        interstitial)
//!
//!  Cross-cutting: config (TOML + hot reload), observability, lifecycle
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use url_mapping::config::{load_config, ConfigWatcher};
use url_mapping::lifecycle::{signals, Shutdown};
use url_mapping::observability::{logging, metrics};
use url_mapping::{HttpServer, MappingService};

#[derive(Parser)]
#[command(name = "url-mapping")]
#[command(about = "Redirects legacy URLs through configurable prefix handlers", long_about = None)]
struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = "url-mapping.toml")]
    config: PathBuf,

    /// Validate the configuration, print the served prefixes and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    if cli.check {
        let service = MappingService::from_config(&config.urlmapping)?;
        println!("{}: OK", cli.config.display());
        for prefix in service.supported_prefixes() {
            let handler = service.registry().handler_for(&prefix).unwrap_or_default();
            println!("  /{} -> {}", prefix, handler);
        }
        return Ok(());
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "url-mapping starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        handlers = config.urlmapping.prefixhandlers.len(),
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

    let (watcher, config_updates) = ConfigWatcher::new(&cli.config);
    // Dropping the handle stops watching.
    let _watcher = match watcher.run() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Config hot reload disabled");
            None
        }
    };

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
