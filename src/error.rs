//! Error types for the proxy.
//!
//! Provides unified error handling using thiserror. Every failure that can
//! occur during a single proxied exchange is a `ProxyError`; the worker maps
//! it to a client-facing status code (or to silence) at its boundary.

use thiserror::Error;

/// Unified error type for a single proxied exchange.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Client closed the connection before sending a complete request line.
    #[error("client closed before sending a request")]
    EmptyRequest,

    /// Request line or header block was not valid HTTP.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Method other than GET or HEAD.
    #[error("method not implemented: {0}")]
    UnsupportedMethod(String),

    /// Absolute-form URI could not be split into host, port and path.
    #[error("invalid request URI: {0}")]
    InvalidUri(String),

    /// TCP connect to the origin failed.
    #[error("origin connect failed: {0}")]
    Connect(#[source] std::io::Error),

    /// Origin connect did not complete within the configured timeout.
    #[error("origin connect timed out")]
    ConnectTimeout,

    /// I/O error while reading from or writing to the origin.
    #[error("origin i/o error: {0}")]
    UpstreamIo(#[source] std::io::Error),

    /// Origin stopped responding within the configured read timeout.
    #[error("origin read timed out")]
    UpstreamTimeout,

    /// I/O error while reading from or writing to the client.
    #[error("client i/o error: {0}")]
    ClientIo(#[source] std::io::Error),
}

impl ProxyError {
    /// Status line to answer the client with, or `None` when the exchange
    /// terminates silently (client already gone, or nothing was sent yet
    /// that deserves a response).
    pub fn response_status(&self) -> Option<(u16, &'static str)> {
        match self {
            ProxyError::EmptyRequest | ProxyError::ClientIo(_) => None,
            ProxyError::UnsupportedMethod(_) => Some((501, "Not Implemented")),
            ProxyError::MalformedRequest(_) | ProxyError::InvalidUri(_) => {
                Some((400, "Bad Request"))
            }
            ProxyError::Connect(_)
            | ProxyError::ConnectTimeout
            | ProxyError::UpstreamIo(_)
            | ProxyError::UpstreamTimeout => Some((502, "Bad Gateway")),
        }
    }
}

/// Convenience Result type for the proxy.
pub type Result<T> = std::result::Result<T, ProxyError>;
