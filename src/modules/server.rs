use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::modules::session::SharedSession;

pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

const CORS_HEADERS: &str = "Access-Control-Allow-Origin: *\r\nAccess-Control-Allow-Methods: *\r\nAccess-Control-Allow-Headers: *\r\n";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Response {
    status: u16,
    body: Vec<u8>,
}

impl Response {
    fn json<T: Serialize>(value: &T) -> Result<Self, String> {
        let body =
            serde_json::to_vec(value).map_err(|err| format!("failed to encode payload: {err}"))?;
        Ok(Self { status: 200, body })
    }

    fn error(status: u16, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string().into_bytes();
        Self { status, body }
    }

    fn no_content() -> Self {
        Self {
            status: 204,
            body: Vec::new(),
        }
    }
}

/// HTTP front end for a [`SharedSession`]. One thread per connection; the session
/// mutex is held for the whole of each read or mutation.
pub struct SimServer {
    listener: TcpListener,
    session: SharedSession,
}

pub struct ServerHandle {
    addr: SocketAddr,
    stop_tx: Sender<()>,
    join_handle: Option<JoinHandle<Result<(), String>>>,
}

impl SimServer {
    pub fn bind(addr: &str, session: SharedSession) -> Result<Self, String> {
        let listener = TcpListener::bind(addr)
            .map_err(|err| format!("failed to bind server at {addr}: {err}"))?;
        Ok(Self { listener, session })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, String> {
        self.listener
            .local_addr()
            .map_err(|err| format!("failed to read listener address: {err}"))
    }

    /// Start accepting on a background thread.
    pub fn spawn(self) -> Result<ServerHandle, String> {
        let addr = self.local_addr()?;
        self.listener
            .set_nonblocking(true)
            .map_err(|err| format!("failed to set listener nonblocking: {err}"))?;

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let listener = self.listener;
        let session = self.session;
        let join_handle = thread::spawn(move || accept_loop(listener, stop_rx, session));
        info!(%addr, "simulation server listening");

        Ok(ServerHandle {
            addr,
            stop_tx,
            join_handle: Some(join_handle),
        })
    }
}

impl ServerHandle {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Block until the accept loop exits.
    pub fn join(mut self) -> Result<(), String> {
        match self.join_handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| "server thread panicked".to_string())?,
            None => Ok(()),
        }
    }

    pub fn stop(mut self) -> Result<(), String> {
        let _ = self.stop_tx.send(());
        match self.join_handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| "server thread panicked".to_string())?,
            None => Ok(()),
        }
    }
}

fn accept_loop(
    listener: TcpListener,
    stop_rx: Receiver<()>,
    session: SharedSession,
) -> Result<(), String> {
    loop {
        match stop_rx.try_recv() {
            Ok(_) => return Ok(()),
            // Sender dropped without stopping: keep serving.
            Err(TryRecvError::Disconnected) | Err(TryRecvError::Empty) => {}
        }

        match listener.accept() {
            Ok((stream, peer)) => {
                let session = SharedSession::clone(&session);
                thread::spawn(move || {
                    if let Err(err) = handle_connection(stream, session) {
                        warn!(%peer, "connection failed: {err}");
                    }
                });
            }
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(10));
            }
            Err(err) => return Err(format!("accept failed: {err}")),
        }
    }
}

fn handle_connection(mut stream: TcpStream, session: SharedSession) -> Result<(), String> {
    stream
        .set_nonblocking(false)
        .map_err(|err| format!("failed to set stream blocking: {err}"))?;
    stream
        .set_read_timeout(Some(Duration::from_secs(2)))
        .map_err(|err| format!("failed to set read timeout: {err}"))?;

    let mut buffer = [0_u8; 8192];
    let bytes = stream
        .read(&mut buffer)
        .map_err(|err| format!("failed to read request: {err}"))?;
    if bytes == 0 {
        return Ok(());
    }

    let request = String::from_utf8_lossy(&buffer[..bytes]);
    let response = match request.lines().next() {
        Some(line) => {
            let mut parts = line.split_whitespace();
            let method = parts.next().unwrap_or_default();
            let target = parts.next().unwrap_or_default();
            let path = target.split('?').next().unwrap_or(target);
            debug!(method, path, "request");
            route(method, path, &session).unwrap_or_else(|err| {
                warn!(method, path, "request failed: {err}");
                Response::error(500, &err)
            })
        }
        None => Response::error(400, "bad request"),
    };

    write_response(&mut stream, &response)
        .map_err(|err| format!("failed to write {} response: {err}", response.status))
}

fn route(method: &str, path: &str, session: &SharedSession) -> Result<Response, String> {
    if method.eq_ignore_ascii_case("OPTIONS") {
        return Ok(Response::no_content());
    }

    let allowed = match path {
        "/healthz" | "/state" | "/step" => "GET",
        "/restart" => "POST",
        _ => return Ok(Response::error(404, "not found")),
    };
    if !method.eq_ignore_ascii_case(allowed) {
        return Ok(Response::error(405, "method not allowed"));
    }

    if path == "/healthz" {
        return Response::json(&serde_json::json!({ "ok": true }));
    }

    let mut locked = session
        .lock()
        .map_err(|_| "session lock poisoned".to_string())?;
    let snapshot = match path {
        "/step" => locked.tick().1,
        "/restart" => locked.reset(),
        _ => locked.snapshot(),
    };
    Response::json(&snapshot)
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        _ => "Internal Server Error",
    }
}

fn write_response(stream: &mut TcpStream, response: &Response) -> std::io::Result<()> {
    let headers = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json; charset=utf-8\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
        response.status,
        status_text(response.status),
        response.body.len(),
        CORS_HEADERS,
    );
    stream.write_all(headers.as_bytes())?;
    stream.write_all(&response.body)?;
    stream.flush()
}
