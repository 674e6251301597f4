//! Request line parsing.
//!
//! # Responsibilities
//! - Split the client's request line into method, URI and version
//! - Gate the method allow-list (GET/HEAD only)
//!
//! The version token is kept for logging but the forwarded request is
//! always downgraded to HTTP/1.0.

use crate::error::{ProxyError, Result};

/// The parsed first line of a client request.
#[derive(Debug, Clone)]
pub struct RequestLine {
    pub method: String,
    pub uri: String,
    pub version: String,
}

impl RequestLine {
    /// Parses `METHOD URI [VERSION]`. A line without at least a method and
    /// a URI is malformed.
    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let method = parts
            .next()
            .ok_or_else(|| ProxyError::MalformedRequest(line.to_string()))?;
        let uri = parts
            .next()
            .ok_or_else(|| ProxyError::MalformedRequest(line.to_string()))?;
        let version = parts.next().unwrap_or("HTTP/1.0");

        Ok(Self {
            method: method.to_string(),
            uri: uri.to_string(),
            version: version.to_string(),
        })
    }

    /// Whether the proxy implements this method.
    pub fn is_supported(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET") || self.method.eq_ignore_ascii_case("HEAD")
    }
}
