//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (accept loop, one worker task per connection)
//!     → handler.rs (request line, method check, cache lookup)
//!     → uri.rs / headers.rs (absolute-form URI split, header rewrite)
//!     → [upstream relay on a cache miss]
//!     → response.rs (cache-hit and error responses)
//!     → Send to client
//! ```

pub mod handler;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;
pub mod uri;

pub use server::ProxyServer;
pub use uri::TargetUri;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Reads one CRLF-terminated line, without the terminator.
/// Returns `None` at end of stream.
pub(crate) async fn read_line<R>(reader: &mut R) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Ok(None);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn read_line_strips_crlf() {
        let mut reader = BufReader::new(&b"GET / HTTP/1.0\r\nHost: x\r\n"[..]);
        assert_eq!(
            read_line(&mut reader).await.unwrap().as_deref(),
            Some("GET / HTTP/1.0")
        );
        assert_eq!(read_line(&mut reader).await.unwrap().as_deref(), Some("Host: x"));
        assert_eq!(read_line(&mut reader).await.unwrap(), None);
    }

    #[tokio::test]
    async fn read_line_handles_bare_lf() {
        let mut reader = BufReader::new(&b"status\n"[..]);
        assert_eq!(read_line(&mut reader).await.unwrap().as_deref(), Some("status"));
    }
}
