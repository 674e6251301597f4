//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// A mock origin server plus its request counter.
pub struct MockOrigin {
    pub addr: SocketAddr,
    hits: Arc<AtomicU32>,
}

impl MockOrigin {
    /// Connections the origin has accepted so far.
    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Start a mock origin whose response body depends on the request path.
/// Every response declares its Content-Length; HEAD requests get headers
/// only.
pub async fn start_origin<F>(respond: F) -> MockOrigin
where
    F: Fn(&str) -> (u16, Vec<u8>) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicU32::new(0));
    let counter = hits.clone();
    let respond = Arc::new(respond);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let respond = respond.clone();
                    tokio::spawn(async move {
                        serve_one(socket, respond).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockOrigin { addr, hits }
}

/// Start a mock origin that answers every connection with fixed raw bytes,
/// then closes. Lets tests shape responses the helper above can't (missing
/// Content-Length, truncated bodies).
pub async fn start_raw_origin(response: &'static [u8]) -> MockOrigin {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicU32::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(async move {
                        let (read_half, mut write_half) = socket.into_split();
                        drain_request(BufReader::new(read_half)).await;
                        let _ = write_half.write_all(response).await;
                        let _ = write_half.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockOrigin { addr, hits }
}

async fn serve_one<F>(socket: TcpStream, respond: Arc<F>)
where
    F: Fn(&str) -> (u16, Vec<u8>) + Send + Sync + 'static,
{
    let (read_half, mut write_half) = socket.into_split();
    let mut reader = BufReader::new(read_half);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).await.unwrap_or(0) == 0 {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("GET").to_string();
    let path = parts.next().unwrap_or("/").to_string();
    drain_request(reader).await;

    let (status, body) = respond(&path);
    let status_text = match status {
        200 => "200 OK",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        _ => "200 OK",
    };
    let head = format!(
        "HTTP/1.0 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status_text,
        body.len()
    );
    let _ = write_half.write_all(head.as_bytes()).await;
    if !method.eq_ignore_ascii_case("HEAD") {
        let _ = write_half.write_all(&body).await;
    }
    let _ = write_half.shutdown().await;
}

/// Read and discard header lines up to the blank-line terminator.
async fn drain_request<R>(mut reader: BufReader<R>)
where
    R: tokio::io::AsyncRead + Unpin,
{
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line).await {
            Ok(0) => break,
            Ok(_) if line == "\r\n" || line == "\n" => break,
            Ok(_) => {}
            Err(_) => break,
        }
    }
}
