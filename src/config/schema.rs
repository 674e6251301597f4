//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits and carry hand-written defaults; there is
//! no configuration file. The struct is built from `Default` and the CLI
//! applies the listening port to it.

use serde::{Deserialize, Serialize};

/// Root configuration for the caching proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Timeout configuration for origin operations.
    pub timeouts: TimeoutConfig,

    /// Cache sizing configuration.
    pub cache: CacheConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 1_024,
        }
    }
}

/// Timeout configuration for origin-side operations.
///
/// The worker itself is unbounded; only origin connect and origin reads
/// carry fixed deadlines so a hanging origin cannot pin a worker.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Origin connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Per-read timeout while receiving the origin response, in seconds.
    pub upstream_read_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_read_secs: 30,
        }
    }
}

/// Cache sizing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum aggregate size of all cached bodies, in bytes.
    pub max_total_bytes: usize,

    /// Maximum size of a single cached body, in bytes. Larger responses
    /// are relayed but never cached.
    pub max_object_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_total_bytes: 1_049_000,
            max_object_bytes: 102_400,
        }
    }
}
