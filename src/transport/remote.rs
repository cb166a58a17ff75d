//! Remote relay channel.
//!
//! Owns the websocket connection to the relay endpoint discovered at
//! startup: open, data arrival, error, and close.  The channel is
//! deliberately single-shot and single-endpoint — no pool, no failover, no
//! reconnect.  The client only ever needs one relay connection per process
//! and treats losing it as losing the underlying data source entirely, so
//! an unexpected disconnect goes straight to the engine's fatal-abort path.
//!
//! All state transitions happen either on the driver task spawned by
//! [`RemoteChannel::maybe_connect`] or on the explicit init/close paths;
//! shared fields sit behind mutexes because the tokio runtime is
//! multi-threaded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt as _, StreamExt as _};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async_tls_with_config, Connector};
use tokio_util::sync::CancellationToken;

use crate::config::OperatingMode;
use crate::engine::Engine;
use crate::transport::tls;

// ── Channel state ─────────────────────────────────────────────────────────────

/// Lifecycle state of the relay connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// No connection and none in progress.
    Unconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// The websocket is open.
    Connected,
    /// The connection was lost outside a deliberate close.
    Faulted,
}

// ── Shared interior ───────────────────────────────────────────────────────────

struct Shared {
    engine: Arc<dyn Engine>,
    /// Operating mode slot, shared with the router and updated only on the
    /// init path.
    mode: Arc<Mutex<OperatingMode>>,
    state: Mutex<ChannelState>,
    /// Relay address; empty until discovery succeeds, immutable afterwards.
    endpoint: Mutex<String>,
    /// Most recently received, not-yet-consumed payload.  A read consumes
    /// and clears it so stale data is never redelivered.
    pending: Mutex<Vec<u8>>,
    /// Sender into the driver task's outbound queue while connected.
    outbound: Mutex<Option<mpsc::UnboundedSender<Vec<u8>>>>,
    /// Set by the shutdown sequencer; suppresses the fatal-abort path for
    /// the disconnect a deliberate close produces.
    closing: AtomicBool,
    shutdown: CancellationToken,
}

/// Handle to the relay channel.  Cheap to clone; all clones share one
/// connection lifecycle.
#[derive(Clone)]
pub(crate) struct RemoteChannel {
    shared: Arc<Shared>,
}

impl RemoteChannel {
    pub(crate) fn new(engine: Arc<dyn Engine>, mode: Arc<Mutex<OperatingMode>>) -> Self {
        Self {
            shared: Arc::new(Shared {
                engine,
                mode,
                state: Mutex::new(ChannelState::Unconnected),
                endpoint: Mutex::new(String::new()),
                pending: Mutex::new(Vec::new()),
                outbound: Mutex::new(None),
                closing: AtomicBool::new(false),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Current connection state.
    pub(crate) fn state(&self) -> ChannelState {
        *self.shared.state.lock()
    }

    /// Record the discovered relay address.  First write wins: the endpoint
    /// is immutable after discovery for the lifetime of the process.
    pub(crate) fn set_endpoint(&self, endpoint: String) {
        let mut slot = self.shared.endpoint.lock();
        if !slot.is_empty() {
            tracing::warn!("relay endpoint already assigned, keeping the first one");
            return;
        }
        *slot = endpoint;
    }

    /// Open the relay connection if — and only if — the mode is thin, the
    /// channel is unconnected, and an endpoint has been discovered.
    ///
    /// Called right after discovery succeeds and again at explicit
    /// (re)initialization; a no-op in every other situation.
    pub(crate) fn maybe_connect(&self) {
        if *self.shared.mode.lock() != OperatingMode::Thin {
            return;
        }
        let endpoint = self.shared.endpoint.lock().clone();
        if endpoint.is_empty() {
            return;
        }
        {
            let mut state = self.shared.state.lock();
            if *state != ChannelState::Unconnected {
                return;
            }
            *state = ChannelState::Connecting;
        }
        tracing::info!(endpoint = %endpoint, "connecting to relay endpoint");
        tokio::spawn(drive(Arc::clone(&self.shared), endpoint));
    }

    /// Submit `payload` as a binary message, returning the number of bytes
    /// the channel accepted.  Returns 0 when no connection is open; the
    /// caller owns retry-by-resend semantics.
    pub(crate) fn write(&self, payload: &[u8]) -> usize {
        match &*self.shared.outbound.lock() {
            Some(tx) if tx.send(payload.to_vec()).is_ok() => payload.len(),
            _ => {
                tracing::warn!("relay write with no open channel");
                0
            }
        }
    }

    /// Return and clear the pending inbound payload.  Empty when nothing
    /// has arrived since the last call.
    pub(crate) fn take_pending(&self) -> Vec<u8> {
        std::mem::take(&mut *self.shared.pending.lock())
    }

    /// Mark the start of a deliberate application close.  From here on a
    /// disconnect is expected and must not trigger the abort path.
    pub(crate) fn mark_closing(&self) {
        self.shared.closing.store(true, Ordering::Release);
    }

    /// Ask the driver task to close the websocket.  The transition to
    /// [`ChannelState::Unconnected`] is observed through [`Self::state`];
    /// the shutdown sequencer polls until it lands.
    pub(crate) fn close(&self) {
        self.shared.shutdown.cancel();

        // A faulted channel has no driver left to run the transition; there
        // is nothing to drain, so it counts as closed immediately.
        let mut state = self.shared.state.lock();
        if *state == ChannelState::Faulted {
            *state = ChannelState::Unconnected;
        }
    }
}

// ── Driver task ───────────────────────────────────────────────────────────────

/// Connect to `endpoint` and run the channel until it closes.
///
/// One driver exists per process lifetime: the cancellation token, once
/// fired, also makes any later connect attempt exit immediately, so a
/// closed channel can never resurrect itself.
async fn drive(shared: Arc<Shared>, endpoint: String) {
    match url::Url::parse(&endpoint) {
        Ok(parsed) if matches!(parsed.scheme(), "ws" | "wss") => {}
        Ok(parsed) => {
            disconnect(
                &shared,
                &format!("relay endpoint has unsupported scheme '{}'", parsed.scheme()),
            );
            return;
        }
        Err(err) => {
            disconnect(&shared, &format!("relay endpoint is not a valid url: {err}"));
            return;
        }
    }

    let connector = match tls::client_config() {
        Ok(cfg) => Connector::Rustls(Arc::new(cfg)),
        Err(err) => {
            disconnect(&shared, &format!("relay tls setup failed: {err:#}"));
            return;
        }
    };

    let mut ws = tokio::select! {
        biased;
        () = shared.shutdown.cancelled() => {
            *shared.state.lock() = ChannelState::Unconnected;
            return;
        }
        result = connect_async_tls_with_config(endpoint.clone(), None, false, Some(connector)) => {
            match result {
                Ok((ws, _response)) => ws,
                Err(err) => {
                    disconnect(&shared, &format!("relay connect failed: {err}"));
                    return;
                }
            }
        }
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();
    *shared.outbound.lock() = Some(tx);
    *shared.state.lock() = ChannelState::Connected;
    tracing::info!(endpoint = %endpoint, "relay channel connected");

    // If the local side finished connecting first, both transports are now
    // up and the engine can start its RPC sequence.
    if shared.engine.connected() {
        shared.engine.transport_ready();
    }

    loop {
        tokio::select! {
            biased;
            () = shared.shutdown.cancelled() => {
                let _ = ws.close(None).await;
                *shared.state.lock() = ChannelState::Unconnected;
                tracing::info!("relay channel closed");
                break;
            }
            Some(payload) = rx.recv() => {
                if let Err(err) = ws.send(Message::Binary(payload)).await {
                    disconnect(&shared, &format!("relay send failed: {err}"));
                    break;
                }
            }
            msg = ws.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    *shared.pending.lock() = text.into_bytes();
                    shared.engine.data_ready();
                }
                Some(Ok(Message::Ping(data))) => {
                    if let Err(err) = ws.send(Message::Pong(data)).await {
                        disconnect(&shared, &format!("relay send failed: {err}"));
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    disconnect(&shared, "relay closed the connection");
                    break;
                }
                // The relay speaks text frames; other frame types carry no
                // payload for us.
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    disconnect(&shared, &format!("relay socket error: {err}"));
                    break;
                }
            }
        }
    }

    shared.outbound.lock().take();
}

/// Handle a lost or refused connection.
///
/// During a deliberate close the transition is clean; otherwise the fault is
/// recorded through the engine's shared abort path — the remote channel
/// offers no automatic reconnect.
fn disconnect(shared: &Shared, reason: &str) {
    if shared.closing.load(Ordering::Acquire) {
        *shared.state.lock() = ChannelState::Unconnected;
        tracing::debug!(reason, "relay channel closed during shutdown");
    } else {
        *shared.state.lock() = ChannelState::Faulted;
        tracing::error!(reason, "relay channel lost");
        shared.engine.fail(reason);
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
