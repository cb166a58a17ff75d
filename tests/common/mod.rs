//! Shared helpers for integration tests.
//!
//! Each integration test binary compiles this module independently, so any
//! single binary may leave parts of it unused.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt as _, StreamExt as _};
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use relay_ipc::{Engine, RequestKind};

// ── Settings fixture ──────────────────────────────────────────────────────────

/// A temporary directory owning a settings file.
///
/// The [`TempDir`] is kept alive for the lifetime of this struct; dropping it
/// removes the file.
pub struct ConfigFixture {
    _dir: TempDir,
    pub path: PathBuf,
}

impl ConfigFixture {
    /// Write a settings file selecting `thin` mode and pointing discovery at
    /// `bootstrap_url`.
    pub fn new(thin: bool, bootstrap_url: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            format!("thin_client = {thin}\nbootstrap_url = \"{bootstrap_url}\"\n"),
        )
        .expect("write fixture file");
        Self { _dir: dir, path }
    }

    /// Rewrite the settings file in place (picked up at the next `init`).
    pub fn rewrite(&self, thin: bool, bootstrap_url: &str) {
        std::fs::write(
            &self.path,
            format!("thin_client = {thin}\nbootstrap_url = \"{bootstrap_url}\"\n"),
        )
        .expect("rewrite fixture file");
    }
}

/// A bootstrap URL that refuses connections immediately (port 9, discard).
pub const DEAD_BOOTSTRAP: &str = "http://127.0.0.1:9/api/init";

// ── Recording engine ──────────────────────────────────────────────────────────

/// Engine double that records every call the router makes.
#[derive(Default)]
pub struct MockEngine {
    pub writable: AtomicBool,
    pub connected: AtomicBool,
    pub close_done: AtomicBool,
    pub active: Mutex<Option<RequestKind>>,
    pub writes: Mutex<Vec<Vec<u8>>>,
    pub read_data: Mutex<Vec<u8>>,
    pub intervals: Mutex<Vec<Duration>>,
    pub failures: Mutex<Vec<String>>,
    pub inits: AtomicUsize,
    pub ready_count: AtomicUsize,
    pub data_ready_count: AtomicUsize,
    pub log_queries: AtomicUsize,
}

impl MockEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_active(&self, kind: RequestKind) {
        *self.active.lock() = Some(kind);
    }
}

impl Engine for MockEngine {
    fn writable(&self) -> bool {
        self.writable.load(Ordering::Acquire)
    }
    fn write(&self, payload: &[u8]) -> usize {
        self.writes.lock().push(payload.to_vec());
        payload.len()
    }
    fn read(&self) -> Vec<u8> {
        std::mem::take(&mut *self.read_data.lock())
    }
    fn connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
    fn init(&self) {
        self.inits.fetch_add(1, Ordering::AcqRel);
    }
    fn close(&self) -> bool {
        self.close_done.load(Ordering::Acquire)
    }
    fn transport_ready(&self) {
        self.ready_count.fetch_add(1, Ordering::AcqRel);
    }
    fn data_ready(&self) {
        self.data_ready_count.fetch_add(1, Ordering::AcqRel);
    }
    fn set_interval(&self, interval: Duration) {
        self.intervals.lock().push(interval);
    }
    fn base_args(&self) -> Vec<String> {
        vec!["--cache=512".to_owned()]
    }
    fn active_request(&self) -> RequestKind {
        (*self.active.lock()).unwrap_or(RequestKind::NoRequest)
    }
    fn fail(&self, error: &str) {
        self.failures.lock().push(error.to_owned());
    }
    fn fetch_logs(&self, _addresses: &[String], _topics: &[String], _from_block: u64) {
        self.log_queries.fetch_add(1, Ordering::AcqRel);
    }
}

// ── Mock relay ────────────────────────────────────────────────────────────────

/// Instruction for the mock relay's connection task.
pub enum RelayCommand {
    /// Deliver a text frame to the connected client.
    SendText(String),
    /// Close the websocket from the server side.
    Close,
}

/// A one-connection websocket server standing in for the hosted relay.
pub struct RelayServer {
    /// `ws://` address to hand out via the mock bootstrap service.
    pub url: String,
    pub commands: mpsc::UnboundedSender<RelayCommand>,
    /// Binary payloads received from the client, in arrival order.
    pub received: mpsc::UnboundedReceiver<Vec<u8>>,
}

impl RelayServer {
    /// Bind an ephemeral port and serve a single websocket connection.
    pub async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind relay listener");
        let addr = listener.local_addr().expect("relay local addr");

        let (command_tx, mut command_rx) = mpsc::unbounded_channel::<RelayCommand>();
        let (received_tx, received_rx) = mpsc::unbounded_channel::<Vec<u8>>();

        tokio::spawn(async move {
            let (stream, _peer) = listener.accept().await.expect("accept relay client");
            let mut ws = tokio_tungstenite::accept_async(stream)
                .await
                .expect("relay websocket handshake");

            loop {
                tokio::select! {
                    command = command_rx.recv() => match command {
                        Some(RelayCommand::SendText(text)) => {
                            let _ = ws.send(Message::Text(text)).await;
                        }
                        Some(RelayCommand::Close) => {
                            let _ = ws.close(None).await;
                        }
                        None => break,
                    },
                    msg = ws.next() => match msg {
                        Some(Ok(Message::Binary(data))) => {
                            let _ = received_tx.send(data);
                        }
                        Some(Ok(_)) => {}
                        Some(Err(_)) | None => break,
                    },
                }
            }
        });

        Self {
            url: format!("ws://{addr}"),
            commands: command_tx,
            received: received_rx,
        }
    }

    /// Wait for the next binary payload from the client.
    pub async fn next_received(&mut self) -> Vec<u8> {
        tokio::time::timeout(Duration::from_secs(5), self.received.recv())
            .await
            .expect("timed out waiting for a relayed payload")
            .expect("relay connection task ended")
    }
}

// ── Mock bootstrap service ────────────────────────────────────────────────────

/// Serve `reply` as the bootstrap response on an ephemeral port and return
/// the URL to configure as `bootstrap_url`.
pub async fn spawn_bootstrap(reply: serde_json::Value) -> String {
    use axum::routing::post;

    let app = axum::Router::new().route(
        "/api/init",
        post(move || {
            let reply = reply.clone();
            async move { axum::Json(reply) }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind bootstrap listener");
    let addr = listener.local_addr().expect("bootstrap local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("bootstrap server");
    });

    format!("http://{addr}/api/init")
}

/// Bootstrap reply assigning `endpoint`.
pub fn assignment(endpoint: &str) -> serde_json::Value {
    serde_json::json!({ "success": true, "endpoint": endpoint })
}

// ── Polling helper ────────────────────────────────────────────────────────────

/// Poll `cond` every 10 ms until it holds, panicking after 5 s.
pub async fn wait_until(mut cond: impl FnMut() -> bool, what: &str) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {what}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
