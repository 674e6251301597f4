//! Per-connection worker.
//!
//! # Responsibilities
//! - Drive one client connection end-to-end: read request, consult the
//!   cache, relay from the origin on a miss, populate the cache
//! - Map failures to client-facing status codes (or silence)
//! - Close the client socket exactly once, on every path
//!
//! The worker never touches another worker's state; the shared cache is
//! the only cross-connection resource it uses.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;

use crate::cache::SharedCache;
use crate::config::ProxyConfig;
use crate::error::{ProxyError, Result};
use crate::http::headers::{drain_headers, rewrite_headers};
use crate::http::request::RequestLine;
use crate::http::uri::TargetUri;
use crate::http::{read_line, response};
use crate::net::ConnectionId;
use crate::upstream::relay;

/// Handles one accepted client connection.
///
/// Runs the exchange, answers recoverable failures with an error response,
/// and shuts the stream down once, on every path.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    cache: SharedCache,
    config: Arc<ProxyConfig>,
) {
    let conn_id = ConnectionId::new();
    let (read_half, write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut writer = BufWriter::new(write_half);

    match exchange(&mut reader, &mut writer, &cache, &config, conn_id, peer).await {
        Ok(()) => {}
        Err(err) => match err.response_status() {
            Some((status, reason)) => {
                tracing::warn!(
                    connection_id = %conn_id,
                    peer_addr = %peer,
                    error = %err,
                    status,
                    "request failed"
                );
                if let Err(e) = response::write_error(&mut writer, status, reason, &err.to_string()).await
                {
                    tracing::debug!(connection_id = %conn_id, error = %e, "error response not delivered");
                }
            }
            None => {
                tracing::debug!(connection_id = %conn_id, error = %err, "connection terminated");
            }
        },
    }

    if let Err(e) = writer.shutdown().await {
        tracing::trace!(connection_id = %conn_id, error = %e, "client shutdown failed");
    }
    tracing::trace!(connection_id = %conn_id, "connection closed");
}

/// One request/response cycle.
async fn exchange<R, W>(
    reader: &mut R,
    writer: &mut W,
    cache: &SharedCache,
    config: &ProxyConfig,
    conn_id: ConnectionId,
    peer: SocketAddr,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let line = read_line(reader)
        .await
        .map_err(ProxyError::ClientIo)?
        .ok_or(ProxyError::EmptyRequest)?;
    if line.is_empty() {
        return Err(ProxyError::EmptyRequest);
    }

    let request = match RequestLine::parse(&line) {
        Ok(request) => request,
        Err(e) => {
            let _ = drain_headers(reader).await;
            return Err(e);
        }
    };
    if !request.is_supported() {
        let _ = drain_headers(reader).await;
        return Err(ProxyError::UnsupportedMethod(request.method));
    }
    let target = match TargetUri::parse(&request.uri) {
        Ok(target) => target,
        Err(e) => {
            let _ = drain_headers(reader).await;
            return Err(e);
        }
    };

    tracing::debug!(
        connection_id = %conn_id,
        peer_addr = %peer,
        method = %request.method,
        host = %target.host,
        path = %target.path,
        version = %request.version,
        "request received"
    );

    if let Some(entry) = cache.lookup(&target.path) {
        tracing::debug!(
            connection_id = %conn_id,
            path = %target.path,
            size = entry.len(),
            "cache hit"
        );
        drain_headers(reader).await?;
        return response::write_cached(writer, &entry)
            .await
            .map_err(ProxyError::ClientIo);
    }
    tracing::debug!(connection_id = %conn_id, path = %target.path, "cache miss");

    let mut origin = match relay::connect(&target, &config.timeouts).await {
        Ok(origin) => origin,
        Err(e) => {
            let _ = drain_headers(reader).await;
            return Err(e);
        }
    };
    let headers = rewrite_headers(reader, &target).await?;
    relay::send_request(&mut origin, &request.method, &target.path, &headers).await?;
    let outcome =
        relay::relay_response(origin, writer, config.cache.max_object_bytes, &config.timeouts)
            .await?;

    tracing::debug!(
        connection_id = %conn_id,
        path = %target.path,
        declared_len = ?outcome.declared_len,
        bytes_relayed = outcome.bytes_relayed,
        complete = outcome.complete,
        "origin response relayed"
    );

    match outcome.body {
        Some(body) => {
            let size = body.len();
            if cache.store(target.path.clone(), body) {
                tracing::debug!(connection_id = %conn_id, path = %target.path, size, "response cached");
            }
        }
        None if !outcome.complete => {
            tracing::warn!(connection_id = %conn_id, path = %target.path, "origin response incomplete");
        }
        None => {}
    }

    Ok(())
}
