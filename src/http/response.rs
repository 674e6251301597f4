//! Client-facing response writers.
//!
//! # Responsibilities
//! - Emit HTTP/1.0 error responses with a small HTML body naming the cause
//! - Emit the synthesized response for a cache hit
//!
//! Relayed origin responses never pass through here; the relay forwards
//! them as they arrive.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::cache::CacheEntry;

/// Server identity announced on synthesized responses.
const SERVER_NAME: &str = "caching-proxy";

/// Writes an `HTTP/1.0 <code> <reason>` error response with an HTML body
/// naming the cause, then flushes.
pub async fn write_error<W>(
    writer: &mut W,
    status: u16,
    reason: &str,
    cause: &str,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let body = format!(
        "<html><head><title>Proxy Error</title></head>\r\n\
         <body bgcolor=\"ffffff\">\r\n\
         {status}: {reason}\r\n\
         <p>{cause}</p>\r\n\
         <hr><em>{SERVER_NAME}</em>\r\n\
         </body></html>\r\n"
    );
    let head = format!(
        "HTTP/1.0 {status} {reason}\r\n\
         Content-type: text/html\r\n\
         Content-length: {}\r\n\r\n",
        body.len()
    );

    writer.write_all(head.as_bytes()).await?;
    writer.write_all(body.as_bytes()).await?;
    writer.flush().await
}

/// Writes a cached body to the client under synthesized 200 headers,
/// then flushes.
pub async fn write_cached<W>(writer: &mut W, entry: &CacheEntry) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let head = format!(
        "HTTP/1.0 200 OK\r\n\
         Server: {SERVER_NAME}\r\n\
         Connection: close\r\n\
         Content-length: {}\r\n\r\n",
        entry.len()
    );

    writer.write_all(head.as_bytes()).await?;
    writer.write_all(entry.body()).await?;
    writer.flush().await
}
