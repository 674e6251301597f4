//! Absolute-form URI parsing.

use crate::error::{ProxyError, Result};

/// The origin coordinates extracted from an absolute-form request URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUri {
    /// Origin host name or address.
    pub host: String,
    /// Origin port, `"80"` when the URI names none.
    pub port: String,
    /// Request path, `"/"` when the URI names none.
    pub path: String,
}

impl TargetUri {
    /// Splits `http://host[:port][/path]` into host, port and path.
    ///
    /// The scheme prefix is optional; everything before the first `/` after
    /// it is the authority. A URI with no host (for example an origin-form
    /// path like `/index.html`) is rejected.
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = match uri.find("//") {
            Some(pos) => &uri[pos + 2..],
            None => uri,
        };

        let (authority, path) = match rest.find('/') {
            Some(pos) => (&rest[..pos], &rest[pos..]),
            None => (rest, "/"),
        };

        let (host, port) = match authority.find(':') {
            Some(pos) => (&authority[..pos], &authority[pos + 1..]),
            None => (authority, "80"),
        };

        if host.is_empty() {
            return Err(ProxyError::InvalidUri(uri.to_string()));
        }
        if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ProxyError::InvalidUri(uri.to_string()));
        }

        Ok(Self {
            host: host.to_string(),
            port: port.to_string(),
            path: path.to_string(),
        })
    }

    /// `host:port`, as dialed and as synthesized into a `Host` header.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_port_path() {
        let uri = TargetUri::parse("http://example.com:8080/index.html").unwrap();
        assert_eq!(uri.host, "example.com");
        assert_eq!(uri.port, "8080");
        assert_eq!(uri.path, "/index.html");
    }

    #[test]
    fn missing_port_defaults_to_80() {
        let uri = TargetUri::parse("http://example.com/foo").unwrap();
        assert_eq!(uri.host, "example.com");
        assert_eq!(uri.port, "80");
        assert_eq!(uri.path, "/foo");
    }

    #[test]
    fn bare_host_defaults_to_root_path() {
        let uri = TargetUri::parse("http://example.com").unwrap();
        assert_eq!(uri.path, "/");
        assert_eq!(uri.authority(), "example.com:80");
    }

    #[test]
    fn bare_host_with_port() {
        let uri = TargetUri::parse("http://localhost:1234").unwrap();
        assert_eq!(uri.host, "localhost");
        assert_eq!(uri.port, "1234");
        assert_eq!(uri.path, "/");
    }

    #[test]
    fn scheme_is_optional() {
        let uri = TargetUri::parse("example.com:8080/a").unwrap();
        assert_eq!(uri.host, "example.com");
        assert_eq!(uri.port, "8080");
        assert_eq!(uri.path, "/a");
    }

    #[test]
    fn origin_form_path_is_rejected() {
        assert!(matches!(
            TargetUri::parse("/index.html"),
            Err(ProxyError::InvalidUri(_))
        ));
    }

    #[test]
    fn empty_host_is_rejected() {
        assert!(matches!(
            TargetUri::parse("http:///foo"),
            Err(ProxyError::InvalidUri(_))
        ));
    }

    #[test]
    fn garbage_port_is_rejected() {
        assert!(matches!(
            TargetUri::parse("http://example.com:http/foo"),
            Err(ProxyError::InvalidUri(_))
        ));
        assert!(matches!(
            TargetUri::parse("http://example.com:/foo"),
            Err(ProxyError::InvalidUri(_))
        ));
    }
}
