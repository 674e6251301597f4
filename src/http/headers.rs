//! Request header rewriting.
//!
//! # Responsibilities
//! - Consume the client's header block up to the blank-line terminator
//! - Normalize Host / User-Agent / Connection / Proxy-Connection
//! - Forward every other header unmodified, in original order
//! - Synthesize the specials the client omitted
//!
//! The proxy never keeps connections alive, so both `Connection` and
//! `Proxy-Connection` are forced to `close` regardless of what the client
//! asked for; `User-Agent` is always replaced with a fixed identity.

use tokio::io::AsyncBufRead;

use crate::error::{ProxyError, Result};
use crate::http::read_line;
use crate::http::uri::TargetUri;

/// The User-Agent presented to every origin.
pub const PROXY_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:10.0.3) Gecko/20120305 Firefox/10.0.3";

/// Tracks which of the four special headers the client supplied.
#[derive(Debug, Default)]
struct SpecialHeaders {
    host: bool,
    user_agent: bool,
    connection: bool,
    proxy_connection: bool,
}

/// Reads the client's header block and returns the rewritten block that
/// goes to the origin, including the terminating blank line.
pub async fn rewrite_headers<R>(reader: &mut R, target: &TargetUri) -> Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut seen = SpecialHeaders::default();
    let mut out = String::new();

    loop {
        let line = read_line(reader)
            .await
            .map_err(ProxyError::ClientIo)?
            .ok_or_else(|| {
                ProxyError::MalformedRequest("header block not terminated".to_string())
            })?;
        if line.is_empty() {
            break;
        }

        let name = header_name(&line);
        if name.eq_ignore_ascii_case("Proxy-Connection") {
            out.push_str("Proxy-Connection: close\r\n");
            seen.proxy_connection = true;
        } else if name.eq_ignore_ascii_case("Connection") {
            out.push_str("Connection: close\r\n");
            seen.connection = true;
        } else if name.eq_ignore_ascii_case("User-Agent") {
            out.push_str("User-Agent: ");
            out.push_str(PROXY_USER_AGENT);
            out.push_str("\r\n");
            seen.user_agent = true;
        } else if name.eq_ignore_ascii_case("Host") {
            out.push_str(&line);
            out.push_str("\r\n");
            seen.host = true;
        } else {
            out.push_str(&line);
            out.push_str("\r\n");
        }
    }

    if !seen.host {
        out.push_str("Host: ");
        out.push_str(&target.authority());
        out.push_str("\r\n");
    }
    if !seen.user_agent {
        out.push_str("User-Agent: ");
        out.push_str(PROXY_USER_AGENT);
        out.push_str("\r\n");
    }
    if !seen.connection {
        out.push_str("Connection: close\r\n");
    }
    if !seen.proxy_connection {
        out.push_str("Proxy-Connection: close\r\n");
    }
    out.push_str("\r\n");

    Ok(out)
}

/// Reads and discards header lines up to the blank-line terminator (or
/// EOF). Paths that answer the client without contacting an origin still
/// consume the request block, so the close is clean with bytes in flight.
pub async fn drain_headers<R>(reader: &mut R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        match read_line(reader).await.map_err(ProxyError::ClientIo)? {
            None => return Ok(()),
            Some(line) if line.is_empty() => return Ok(()),
            Some(_) => {}
        }
    }
}

fn header_name(line: &str) -> &str {
    line.split(':').next().unwrap_or("").trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    fn target() -> TargetUri {
        TargetUri {
            host: "example.com".to_string(),
            port: "80".to_string(),
            path: "/".to_string(),
        }
    }

    async fn rewrite(input: &[u8]) -> String {
        let mut reader = BufReader::new(input);
        rewrite_headers(&mut reader, &target()).await.unwrap()
    }

    #[tokio::test]
    async fn client_host_passes_through_verbatim() {
        let out = rewrite(b"Host: other.example:9999\r\n\r\n").await;
        assert!(out.contains("Host: other.example:9999\r\n"));
        assert!(!out.contains("Host: example.com:80"));
    }

    #[tokio::test]
    async fn user_agent_is_always_replaced() {
        let out = rewrite(b"User-Agent: curl/8.0\r\n\r\n").await;
        assert!(!out.contains("curl"));
        assert_eq!(out.matches(PROXY_USER_AGENT).count(), 1);
    }

    #[tokio::test]
    async fn connection_headers_forced_to_close() {
        let out = rewrite(b"Connection: keep-alive\r\nProxy-Connection: keep-alive\r\n\r\n").await;
        assert!(out.contains("Connection: close\r\n"));
        assert!(out.contains("Proxy-Connection: close\r\n"));
        assert!(!out.contains("keep-alive"));
    }

    #[tokio::test]
    async fn missing_specials_are_synthesized() {
        let out = rewrite(b"\r\n").await;
        assert!(out.contains("Host: example.com:80\r\n"));
        assert!(out.contains("Connection: close\r\n"));
        assert!(out.contains("Proxy-Connection: close\r\n"));
        assert!(out.contains(PROXY_USER_AGENT));
        assert!(out.ends_with("\r\n\r\n"));
    }

    #[tokio::test]
    async fn other_headers_keep_relative_order() {
        let out = rewrite(b"Accept: text/html\r\nX-First: 1\r\nX-Second: 2\r\n\r\n").await;
        let accept = out.find("Accept: text/html").unwrap();
        let first = out.find("X-First: 1").unwrap();
        let second = out.find("X-Second: 2").unwrap();
        assert!(accept < first && first < second);
    }

    #[tokio::test]
    async fn header_names_match_case_insensitively() {
        let out = rewrite(b"user-agent: x\r\nPROXY-CONNECTION: keep-alive\r\n\r\n").await;
        assert_eq!(out.matches(PROXY_USER_AGENT).count(), 1);
        assert_eq!(out.matches("Proxy-Connection: close").count(), 1);
    }

    #[tokio::test]
    async fn drain_consumes_through_blank_line() {
        let mut reader = BufReader::new(&b"Accept: text/html\r\nX-Other: 1\r\n\r\nleftover"[..]);
        drain_headers(&mut reader).await.unwrap();
        assert_eq!(read_line(&mut reader).await.unwrap().as_deref(), Some("leftover"));
    }

    #[tokio::test]
    async fn drain_stops_at_eof() {
        let mut reader = BufReader::new(&b"Accept: text/html\r\n"[..]);
        drain_headers(&mut reader).await.unwrap();
    }

    #[tokio::test]
    async fn unterminated_block_is_an_error() {
        let mut reader = BufReader::new(&b"Accept: text/html\r\n"[..]);
        let err = rewrite_headers(&mut reader, &target()).await.unwrap_err();
        assert!(matches!(err, ProxyError::MalformedRequest(_)));
    }
}
