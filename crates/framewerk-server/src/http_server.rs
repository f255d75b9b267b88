// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Minimal HTTP/1.1 front end for the editor service.
//
// The server listens on a configurable TCP port (default 8080). Each
// connection carries exactly one request: we read the header block, then
// `Content-Length` bytes of body, answer with a JSON document and close. No
// keep-alive, no chunked bodies, no TLS.
//
// # Routes
//
//   POST /        edit (legacy path used by existing callers)
//   POST /edit    edit
//   POST /resize  resize
//   GET  /health  liveness probe
//
// Edit and resize run on the blocking pool; one failing request only ever
// produces an error response for that request.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::Serialize;
use serde_json::json;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use framewerk_core::classify::classify_error;
use framewerk_core::config::ServiceConfig;
use framewerk_core::error::{FramewerkError, Result};
use framewerk_core::types::{EditRequest, ObjectRef, ResizeRequest, ServerStatus};
use framewerk_storage::ObjectStore;

use crate::service::EditorService;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Upper bound on the request line plus headers.
const MAX_HEADER_BYTES: usize = 16 * 1024;

/// Read buffer size for socket reads.
const READ_CHUNK: usize = 8192;

// ---------------------------------------------------------------------------
// Request parsing
// ---------------------------------------------------------------------------

/// A parsed HTTP request: just what routing and the handlers need.
#[derive(Debug, Clone, PartialEq)]
struct HttpRequest {
    method: String,
    /// Path without query string.
    path: String,
    body: Vec<u8>,
}

/// Why a request could not be read.
#[derive(Debug)]
enum ReadError {
    /// Peer closed before sending anything.
    Closed,
    /// Header block or declared body exceeds the configured limits.
    TooLarge,
    /// Not something we can parse as HTTP/1.1.
    Malformed(String),
    Io(std::io::Error),
}

impl From<std::io::Error> for ReadError {
    fn from(err: std::io::Error) -> Self {
        ReadError::Io(err)
    }
}

/// The request line and the headers we care about.
#[derive(Debug, PartialEq)]
struct RequestHead {
    method: String,
    path: String,
    content_length: usize,
}

/// Parse the request line and headers (everything before `\r\n\r\n`).
fn parse_head(head: &[u8]) -> std::result::Result<RequestHead, ReadError> {
    let text = std::str::from_utf8(head)
        .map_err(|_| ReadError::Malformed("request head is not UTF-8".into()))?;
    let mut lines = text.split("\r\n");

    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let (method, target, version) = match (parts.next(), parts.next(), parts.next()) {
        (Some(m), Some(t), Some(v)) => (m, t, v),
        _ => {
            return Err(ReadError::Malformed(format!(
                "bad request line: {request_line:?}"
            )));
        }
    };
    if !version.starts_with("HTTP/1.") {
        return Err(ReadError::Malformed(format!("unsupported version: {version}")));
    }

    let mut content_length = 0usize;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value
                .parse()
                .map_err(|_| ReadError::Malformed(format!("bad Content-Length: {value:?}")))?;
        } else if name.eq_ignore_ascii_case("transfer-encoding")
            && !value.eq_ignore_ascii_case("identity")
        {
            return Err(ReadError::Malformed(format!(
                "unsupported Transfer-Encoding: {value}"
            )));
        }
    }

    let path = target.split_once('?').map_or(target, |(path, _)| path);
    Ok(RequestHead {
        method: method.to_ascii_uppercase(),
        path: path.to_string(),
        content_length,
    })
}

/// Read one request: the header block, then exactly `Content-Length` bytes.
async fn read_request<R>(
    stream: &mut R,
    max_request_bytes: usize,
) -> std::result::Result<HttpRequest, ReadError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    let header_end = loop {
        if let Some(pos) = find_subsequence(&buf, b"\r\n\r\n") {
            break pos;
        }
        if buf.len() > MAX_HEADER_BYTES {
            return Err(ReadError::TooLarge);
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(if buf.is_empty() {
                ReadError::Closed
            } else {
                ReadError::Malformed("connection closed inside headers".into())
            });
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = parse_head(&buf[..header_end])?;
    if head.content_length > max_request_bytes {
        return Err(ReadError::TooLarge);
    }

    let mut body = buf.split_off(header_end + 4);
    while body.len() < head.content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(ReadError::Malformed(format!(
                "body truncated at {} of {} bytes",
                body.len(),
                head.content_length
            )));
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(head.content_length);

    Ok(HttpRequest {
        method: head.method,
        path: head.path,
        body,
    })
}

/// Find the first occurrence of `needle` in `haystack`.
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

// ---------------------------------------------------------------------------
// Routing and responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Edit,
    Resize,
    Health,
}

/// Resolve a route, or the status to answer with (404 or 405).
fn route(method: &str, path: &str) -> std::result::Result<Route, u16> {
    let (route, allowed) = match path.trim_end_matches('/') {
        "" | "/edit" => (Route::Edit, "POST"),
        "/resize" => (Route::Resize, "POST"),
        "/health" => (Route::Health, "GET"),
        _ => return Err(404),
    };
    if method == allowed {
        Ok(route)
    } else {
        Err(405)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct HttpResponse {
    status: u16,
    body: Vec<u8>,
}

impl HttpResponse {
    fn json<T: Serialize>(status: u16, payload: &T) -> Self {
        match serde_json::to_vec(payload) {
            Ok(body) => Self { status, body },
            Err(err) => Self::error(500, &format!("response serialization failed: {err}")),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }).to_string().into_bytes(),
        }
    }

    fn from_error(err: &FramewerkError) -> Self {
        let status = classify_error(err).status_code();
        if status >= 500 {
            error!(status, error = %err, "request failed");
        } else {
            warn!(status, error = %err, "request rejected");
        }
        Self::error(status, &err.to_string())
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Write the response with `Connection: close` framing.
async fn send_response<W>(stream: &mut W, response: &HttpResponse) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let head = format!(
        "HTTP/1.1 {} {}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n",
        response.status,
        reason_phrase(response.status),
        response.body.len()
    );

    stream
        .write_all(head.as_bytes())
        .await
        .map_err(|e| FramewerkError::Server(format!("write HTTP headers: {e}")))?;
    stream
        .write_all(&response.body)
        .await
        .map_err(|e| FramewerkError::Server(format!("write HTTP body: {e}")))?;
    stream
        .flush()
        .await
        .map_err(|e| FramewerkError::Server(format!("flush: {e}")))?;
    Ok(())
}

/// Route `request` and produce its response.
async fn dispatch<S>(request: HttpRequest, service: Arc<EditorService<S>>) -> HttpResponse
where
    S: ObjectStore + 'static,
{
    let route = match route(&request.method, &request.path) {
        Ok(route) => route,
        Err(status) => {
            debug!(method = %request.method, path = %request.path, status, "no route");
            return HttpResponse::error(
                status,
                &format!("{} {}", request.method, request.path),
            );
        }
    };

    match route {
        Route::Health => HttpResponse::json(200, &json!({ "status": "ok" })),
        Route::Edit => {
            run_blocking(service, move |svc| {
                let body: EditRequest = serde_json::from_slice(&request.body)?;
                svc.edit(&body)
            })
            .await
        }
        Route::Resize => {
            run_blocking(service, move |svc| {
                let body: ResizeRequest = serde_json::from_slice(&request.body)?;
                svc.resize(&body)
            })
            .await
        }
    }
}

/// Run a handler on the blocking pool and turn its outcome into a response.
async fn run_blocking<S, F>(service: Arc<EditorService<S>>, handler: F) -> HttpResponse
where
    S: ObjectStore + 'static,
    F: FnOnce(&EditorService<S>) -> Result<ObjectRef> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || handler(&service)).await {
        Ok(Ok(object)) => HttpResponse::json(200, &object),
        Ok(Err(err)) => HttpResponse::from_error(&err),
        Err(join_err) => {
            error!(error = %join_err, "request handler panicked");
            HttpResponse::error(500, "internal error")
        }
    }
}

// ---------------------------------------------------------------------------
// HttpServer
// ---------------------------------------------------------------------------

/// Embedded HTTP server for the editor service.
pub struct HttpServer {
    /// Address to bind; port 0 picks a free port.
    bind_addr: SocketAddr,
    /// Actual bound address once running.
    local_addr: Option<SocketAddr>,
    max_request_bytes: usize,
    status: ServerStatus,
    /// Notification handle used to signal a graceful shutdown.
    shutdown_signal: Arc<Notify>,
    /// Handle to the Tokio task running the accept loop.
    task_handle: Option<JoinHandle<()>>,
    /// Counter of currently active TCP connections.
    active_connections: Arc<AtomicU32>,
}

impl HttpServer {
    /// Create a stopped server for `config`. Call [`start`](Self::start) to
    /// begin accepting connections.
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            bind_addr: config.socket_addr(),
            local_addr: None,
            max_request_bytes: config.max_request_bytes,
            status: ServerStatus::Stopped,
            shutdown_signal: Arc::new(Notify::new()),
            task_handle: None,
            active_connections: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn status(&self) -> ServerStatus {
        self.status
    }

    /// Bound address, available after `start`.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn active_connections(&self) -> u32 {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Bind the listener and spawn the accept loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is in use or cannot be bound.
    pub async fn start<S>(&mut self, service: Arc<EditorService<S>>) -> Result<()>
    where
        S: ObjectStore + 'static,
    {
        if self.status == ServerStatus::Running {
            debug!(addr = %self.bind_addr, "HTTP server already running");
            return Ok(());
        }

        self.status = ServerStatus::Starting;

        let listener = match TcpListener::bind(self.bind_addr).await {
            Ok(listener) => listener,
            Err(e) => {
                self.status = ServerStatus::Stopped;
                return Err(FramewerkError::Server(format!("bind {}: {e}", self.bind_addr)));
            }
        };
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, "HTTP server listening");

        let shutdown = Arc::clone(&self.shutdown_signal);
        let connections = Arc::clone(&self.active_connections);
        let max_request_bytes = self.max_request_bytes;

        let handle = tokio::spawn(async move {
            Self::accept_loop(listener, shutdown, connections, service, max_request_bytes).await;
        });

        self.local_addr = Some(local_addr);
        self.task_handle = Some(handle);
        self.status = ServerStatus::Running;
        Ok(())
    }

    /// Signal the accept loop to exit and wait for it. Requests already in
    /// flight run to completion on their own tasks.
    pub async fn stop(&mut self) -> Result<()> {
        if self.status != ServerStatus::Running {
            return Ok(());
        }

        info!(addr = ?self.local_addr, "stopping HTTP server");
        self.shutdown_signal.notify_one();

        if let Some(handle) = self.task_handle.take() {
            handle
                .await
                .map_err(|e| FramewerkError::Server(format!("task join: {e}")))?;
        }

        self.status = ServerStatus::Stopped;
        info!(addr = ?self.local_addr, "HTTP server stopped");
        Ok(())
    }

    /// Accept until shutdown; each connection gets its own task.
    async fn accept_loop<S>(
        listener: TcpListener,
        shutdown: Arc<Notify>,
        connections: Arc<AtomicU32>,
        service: Arc<EditorService<S>>,
        max_request_bytes: usize,
    ) where
        S: ObjectStore + 'static,
    {
        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    debug!("accept loop received shutdown signal");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            let service = Arc::clone(&service);
                            let connections = Arc::clone(&connections);
                            let span = info_span!("request", request_id = %Uuid::new_v4(), peer = %peer_addr);
                            tokio::spawn(async move {
                                connections.fetch_add(1, Ordering::Relaxed);
                                if let Err(e) = Self::handle_connection(stream, service, max_request_bytes).await {
                                    warn!(error = %e, "connection handler error");
                                }
                                connections.fetch_sub(1, Ordering::Relaxed);
                            }.instrument(span));
                        }
                        Err(e) => {
                            error!(error = %e, "failed to accept connection");
                        }
                    }
                }
            }
        }
    }

    /// Read one request, dispatch it, and write the response.
    async fn handle_connection<S>(
        mut stream: tokio::net::TcpStream,
        service: Arc<EditorService<S>>,
        max_request_bytes: usize,
    ) -> Result<()>
    where
        S: ObjectStore + 'static,
    {
        let request = match read_request(&mut stream, max_request_bytes).await {
            Ok(request) => request,
            Err(ReadError::Closed) => {
                debug!("empty request -- closing connection");
                return Ok(());
            }
            Err(ReadError::TooLarge) => {
                warn!(max_request_bytes, "request too large");
                return send_response(&mut stream, &HttpResponse::error(413, "request too large"))
                    .await;
            }
            Err(ReadError::Malformed(reason)) => {
                warn!(%reason, "malformed HTTP request");
                return send_response(&mut stream, &HttpResponse::error(400, &reason)).await;
            }
            Err(ReadError::Io(e)) => {
                return Err(FramewerkError::Server(format!("read request: {e}")));
            }
        };

        debug!(
            method = %request.method,
            path = %request.path,
            body_bytes = request.body.len(),
            "parsed HTTP request"
        );
        let (method, path) = (request.method.clone(), request.path.clone());

        let response = dispatch(request, service).await;
        send_response(&mut stream, &response).await?;

        info!(%method, %path, status = response.status, "response sent");
        Ok(())
    }
}
