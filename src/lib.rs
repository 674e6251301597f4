//! Caching HTTP Forward Proxy
//!
//! A concurrent HTTP/1.0 forwarding proxy with a byte-bounded LRU cache,
//! built on Tokio.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                CACHING PROXY                  │
//!                      │                                               │
//!   Client Request     │  ┌─────────┐    ┌──────────┐   ┌──────────┐  │
//!   ───────────────────┼─▶│   net   │───▶│  http    │──▶│  http    │  │
//!                      │  │listener │    │ server   │   │ handler  │  │
//!                      │  └─────────┘    └──────────┘   └────┬─────┘  │
//!                      │                                      │        │
//!                      │              cache hit ┌─────────────┤        │
//!                      │                        ▼             ▼        │
//!                      │                  ┌──────────┐  ┌──────────┐   │
//!                      │                  │  cache   │  │ upstream │◀──┼── Origin
//!                      │                  │  (LRU)   │◀─│  relay   │   │   Server
//!                      │                  └──────────┘  └────┬─────┘   │
//!   Client Response    │                                      │        │
//!   ◀──────────────────┼──────────────────────────────────────┘        │
//!                      │                                               │
//!                      │  ┌─────────────────────────────────────────┐  │
//!                      │  │          Cross-Cutting Concerns          │  │
//!                      │  │  ┌────────┐ ┌─────────┐ ┌────────────┐  │  │
//!                      │  │  │ config │ │  error  │ │ lifecycle  │  │  │
//!                      │  │  └────────┘ └─────────┘ └────────────┘  │  │
//!                      │  └─────────────────────────────────────────┘  │
//!                      └──────────────────────────────────────────────┘
//! ```
//!
//! One worker task serves one client connection end-to-end. The shared
//! LRU cache is the only cross-connection state; everything else is owned
//! by the worker for the duration of its single request/response cycle.

// Core subsystems
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod net;
pub mod upstream;

// Cross-cutting concerns
pub mod lifecycle;

pub use cache::SharedCache;
pub use config::ProxyConfig;
pub use error::{ProxyError, Result};
pub use http::ProxyServer;
pub use lifecycle::Shutdown;
pub use net::Listener;
