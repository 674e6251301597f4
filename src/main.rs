//! Caching proxy entrypoint.
//!
//! # Startup Sequence
//! 1. Initialize tracing subscriber for logging
//! 2. Parse the listening port (the only CLI argument)
//! 3. Build configuration from defaults and apply the port
//! 4. Bind the bounded listener
//! 5. Run the accept loop until Ctrl-C/SIGTERM

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use caching_proxy::net::Listener;
use caching_proxy::{ProxyConfig, ProxyServer, Shutdown};

/// A caching HTTP/1.0 forward proxy.
#[derive(Parser)]
#[command(name = "caching-proxy")]
#[command(about = "A caching HTTP/1.0 forward proxy", long_about = None)]
struct Cli {
    /// Port to listen on.
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caching_proxy=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = ProxyConfig::default();
    config.listener.bind_address = format!("0.0.0.0:{}", cli.port);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        max_cache_bytes = config.cache.max_total_bytes,
        max_object_bytes = config.cache.max_object_bytes,
        connect_timeout_secs = config.timeouts.connect_secs,
        "Configuration loaded"
    );

    let listener = Listener::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    shutdown.spawn_signal_listener();

    let server = ProxyServer::new(config);
    server.run(listener, shutdown.subscribe()).await;

    tracing::info!("Shutdown complete");
    Ok(())
}
