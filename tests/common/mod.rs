//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::request::Parts;
use futures_util::future::BoxFuture;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use edge_gateway::http::GatewayServer;
use edge_gateway::lifecycle::Shutdown;
use edge_gateway::security::auth::{AuthContext, AuthDenied, AuthGate};

/// A parsed request as seen by a mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Request target as sent on the wire, query string included.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Minimal HTTP/1.1 request parse: request line, headers, content-length body.
async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];
    let header_end;
    loop {
        let n = socket.read(&mut tmp).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
            header_end = pos + 4;
            break;
        }
        if buf.len() > 64 * 1024 {
            return None;
        }
    }

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let request_line = lines.next()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut tmp).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&tmp[..n]);
    }
    body.truncate(content_length);

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

async fn write_response(socket: &mut TcpStream, status: u16, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {status} Status\r\nContent-Length: {}\r\nContent-Type: text/plain\r\nX-Backend: mock\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let _ = socket.write_all(head.as_bytes()).await;
    let _ = socket.write_all(body).await;
    let _ = socket.shutdown().await;
}

/// Start a mock backend that returns a fixed response.
pub async fn start_mock_backend(addr: SocketAddr, response: &'static str) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let _ = read_request(&mut socket).await;
                        write_response(&mut socket, 200, response.as_bytes()).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Start a programmable mock backend.
pub async fn start_programmable_backend<F, Fut>(addr: SocketAddr, f: F)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let _ = read_request(&mut socket).await;
                        let (status, body) = f().await;
                        write_response(&mut socket, status, body.as_bytes()).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Captures everything a backend receives.
pub struct BackendRecorder {
    hits: AtomicU32,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl BackendRecorder {
    pub fn hit_count(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

/// Start a backend that records requests and answers 200 "ok".
pub async fn start_recording_backend(addr: SocketAddr) -> Arc<BackendRecorder> {
    let recorder = Arc::new(BackendRecorder {
        hits: AtomicU32::new(0),
        requests: Mutex::new(Vec::new()),
    });
    let listener = TcpListener::bind(addr).await.unwrap();

    let r = recorder.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let r = r.clone();
                    tokio::spawn(async move {
                        if let Some(request) = read_request(&mut socket).await {
                            r.hits.fetch_add(1, Ordering::SeqCst);
                            r.requests.lock().unwrap().push(request);
                        }
                        write_response(&mut socket, 200, b"ok").await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    recorder
}

/// Start a backend that echoes the request body back.
pub async fn start_echo_backend(addr: SocketAddr) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let body = read_request(&mut socket)
                            .await
                            .map(|r| r.body)
                            .unwrap_or_default();
                        write_response(&mut socket, 200, &body).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Auth gate test double: fixed verdict, call counting.
pub struct CountingAuthGate {
    allow: bool,
    subject: &'static str,
    calls: AtomicU32,
}

impl CountingAuthGate {
    pub fn allowing(subject: &'static str) -> Arc<Self> {
        Arc::new(Self {
            allow: true,
            subject,
            calls: AtomicU32::new(0),
        })
    }

    pub fn denying() -> Arc<Self> {
        Arc::new(Self {
            allow: false,
            subject: "",
            calls: AtomicU32::new(0),
        })
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AuthGate for CountingAuthGate {
    fn authorize<'a>(&'a self, _parts: &'a Parts) -> BoxFuture<'a, Result<AuthContext, AuthDenied>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let verdict = if self.allow {
            Ok(AuthContext {
                subject: self.subject.to_string(),
            })
        } else {
            Err(AuthDenied::unauthorized("Missing credentials."))
        };
        Box::pin(async move { verdict })
    }
}

/// Bind the gateway on `addr` and serve it in the background.
pub async fn start_gateway(server: GatewayServer, addr: SocketAddr, shutdown: &Shutdown) {
    let listener = TcpListener::bind(addr).await.unwrap();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    tokio::time::sleep(Duration::from_millis(300)).await;
}

/// Non-pooling client so every request hits the gateway fresh.
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
