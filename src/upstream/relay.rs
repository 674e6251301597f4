//! Origin connection and response relay.
//!
//! # Responsibilities
//! - Dial the origin within the configured connect timeout
//! - Send the reconstructed HTTP/1.0 request
//! - Stream the origin response to the client as it arrives
//! - Buffer cacheable bodies for the store
//!
//! Gateway errors (`Err`) are only returned while nothing has been
//! forwarded to the client yet; once the status line is on the wire, an
//! origin-side failure ends the relay as an incomplete outcome instead,
//! since a second status line can no longer be sent.

use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::TimeoutConfig;
use crate::error::{ProxyError, Result};
use crate::http::read_line;
use crate::http::uri::TargetUri;

/// Read chunk size while relaying a body.
const RELAY_CHUNK: usize = 8 * 1024;

/// What the relay did with one origin response.
#[derive(Debug)]
pub struct RelayOutcome {
    /// `Content-Length` declared by the origin, when present and parsable.
    pub declared_len: Option<usize>,
    /// Body bytes forwarded to the client.
    pub bytes_relayed: usize,
    /// Whether the response ended at its declared framing (or, with no
    /// declared length, at origin EOF).
    pub complete: bool,
    /// The full body, present only when it is eligible for caching:
    /// declared length known, within the per-object limit, fully read.
    pub body: Option<Vec<u8>>,
}

/// Dials the origin, bounded by the connect timeout.
pub async fn connect(target: &TargetUri, timeouts: &TimeoutConfig) -> Result<TcpStream> {
    let deadline = Duration::from_secs(timeouts.connect_secs);
    match timeout(deadline, TcpStream::connect(target.authority())).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(ProxyError::Connect(e)),
        Err(_) => Err(ProxyError::ConnectTimeout),
    }
}

/// Sends the downgraded request line and the rewritten header block.
pub async fn send_request(
    origin: &mut TcpStream,
    method: &str,
    path: &str,
    headers: &str,
) -> Result<()> {
    let request_line = format!("{method} {path} HTTP/1.0\r\n");
    origin
        .write_all(request_line.as_bytes())
        .await
        .map_err(ProxyError::UpstreamIo)?;
    origin
        .write_all(headers.as_bytes())
        .await
        .map_err(ProxyError::UpstreamIo)?;
    Ok(())
}

/// Streams the origin response to the client.
///
/// Headers are forwarded as they arrive while `Content-Length` is tracked.
/// With a declared length within the per-object limit, the body is also
/// buffered and returned for caching; with no parsable length the body is
/// relayed until origin EOF and never cached. The origin stream is dropped
/// on every path.
pub async fn relay_response<W>(
    origin: TcpStream,
    client: &mut W,
    max_object_bytes: usize,
    timeouts: &TimeoutConfig,
) -> Result<RelayOutcome>
where
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(origin);
    let deadline = Duration::from_secs(timeouts.upstream_read_secs);

    // Status line: failures here still allow a gateway error response.
    let status_line = timed(deadline, read_line(&mut reader))
        .await?
        .ok_or_else(|| {
            ProxyError::UpstreamIo(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "origin closed before sending a status line",
            ))
        })?;
    client
        .write_all(status_line.as_bytes())
        .await
        .map_err(ProxyError::ClientIo)?;
    client.write_all(b"\r\n").await.map_err(ProxyError::ClientIo)?;

    // Remaining headers.
    let mut declared_len: Option<usize> = None;
    loop {
        let line = match timed(deadline, read_line(&mut reader)).await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::warn!("origin closed inside the header block");
                return finish(client, declared_len, 0, false, None).await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "origin failed inside the header block");
                return finish(client, declared_len, 0, false, None).await;
            }
        };

        if line.is_empty() {
            client.write_all(b"\r\n").await.map_err(ProxyError::ClientIo)?;
            break;
        }
        if let Some(value) = header_value(&line, "Content-Length") {
            declared_len = value.trim().parse().ok();
        }
        client.write_all(line.as_bytes()).await.map_err(ProxyError::ClientIo)?;
        client.write_all(b"\r\n").await.map_err(ProxyError::ClientIo)?;
    }

    // Body.
    let mut buffered: Option<Vec<u8>> = match declared_len {
        Some(n) if n <= max_object_bytes => Some(Vec::with_capacity(n)),
        _ => None,
    };
    let mut relayed = 0usize;
    let mut complete = false;
    let mut chunk = vec![0u8; RELAY_CHUNK];

    loop {
        let want = match declared_len {
            Some(n) if relayed >= n => {
                complete = true;
                break;
            }
            Some(n) => (n - relayed).min(chunk.len()),
            None => chunk.len(),
        };

        let count = match timed(deadline, reader.read(&mut chunk[..want])).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(error = %e, relayed, "origin failed mid-body");
                buffered = None;
                break;
            }
        };
        if count == 0 {
            // EOF is the terminator for an undeclared length; with a
            // declared length it means the body was cut short.
            complete = declared_len.is_none();
            if !complete {
                buffered = None;
            }
            break;
        }

        client
            .write_all(&chunk[..count])
            .await
            .map_err(ProxyError::ClientIo)?;
        relayed += count;
        if let Some(buf) = buffered.as_mut() {
            buf.extend_from_slice(&chunk[..count]);
        }
    }

    finish(client, declared_len, relayed, complete, buffered).await
}

/// Flushes the client side and assembles the outcome.
async fn finish<W>(
    client: &mut W,
    declared_len: Option<usize>,
    bytes_relayed: usize,
    complete: bool,
    buffered: Option<Vec<u8>>,
) -> Result<RelayOutcome>
where
    W: AsyncWrite + Unpin,
{
    client.flush().await.map_err(ProxyError::ClientIo)?;

    let body = match (declared_len, buffered) {
        (Some(n), Some(buf)) if complete && buf.len() == n => Some(buf),
        _ => None,
    };

    Ok(RelayOutcome {
        declared_len,
        bytes_relayed,
        complete,
        body,
    })
}

/// Bounds an origin-side read with the configured deadline.
async fn timed<T, F>(deadline: Duration, operation: F) -> Result<T>
where
    F: Future<Output = std::io::Result<T>>,
{
    match timeout(deadline, operation).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ProxyError::UpstreamIo(e)),
        Err(_) => Err(ProxyError::UpstreamTimeout),
    }
}

/// Case-insensitive header value extraction.
fn header_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let (header, value) = line.split_once(':')?;
    header.trim().eq_ignore_ascii_case(name).then_some(value)
}
