//! Proxy server setup and accept loop.
//!
//! # Responsibilities
//! - Own the shared cache and configuration
//! - Accept connections and spawn one worker task per connection
//! - Keep accepting through individual connection failures
//! - Stop accepting on the shutdown signal while in-flight workers finish

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::cache::SharedCache;
use crate::config::ProxyConfig;
use crate::http::handler;
use crate::net::Listener;

/// The caching forward proxy server.
pub struct ProxyServer {
    config: Arc<ProxyConfig>,
    cache: SharedCache,
}

impl ProxyServer {
    /// Create a new proxy server with the given configuration.
    /// The cache starts empty on every run.
    pub fn new(config: ProxyConfig) -> Self {
        let cache = SharedCache::new(&config.cache);
        Self {
            config: Arc::new(config),
            cache,
        }
    }

    /// Handle to the shared cache (cloneable, used by tests and logging).
    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    /// Reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Run the accept loop on the given listener until shutdown fires.
    ///
    /// The loop never awaits request work: every accepted connection is
    /// handed to its own task together with its permit, so a slow client
    /// or origin only occupies that task's slot. Accept errors are logged
    /// and the loop keeps going.
    pub async fn run(self, listener: Listener, mut shutdown: broadcast::Receiver<()>) {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(
                address = %addr,
                max_cache_bytes = self.config.cache.max_total_bytes,
                max_object_bytes = self.config.cache.max_object_bytes,
                "proxy accepting connections"
            );
        }

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("shutdown signal received; accept loop stopping");
                    break;
                }
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer, permit)) => {
                            let cache = self.cache.clone();
                            let config = Arc::clone(&self.config);
                            tokio::spawn(async move {
                                // Slot stays taken for the worker's lifetime.
                                let _permit = permit;
                                handler::handle_connection(stream, peer, cache, config).await;
                            });
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "accept failed");
                        }
                    }
                }
            }
        }

        tracing::info!(
            cached_entries = self.cache.len(),
            cached_bytes = self.cache.total_bytes(),
            "proxy stopped"
        );
    }
}
