//! Transport facade.
//!
//! [`Router`] is the surface the embedding client talks to.  Every
//! byte-level operation first classifies the request currently in flight and
//! then dispatches to the matching channel: the local inter-process channel
//! (reached through the [`Engine`] trait) or the relay websocket.
//!
//! Channel selection happens at call time against the in-flight request, not
//! against where the eventual response arrives — correct because the engine
//! serializes one request at a time.
//!
//! Construction reads the persisted settings and fires the one-shot relay
//! discovery; [`Router::init`] re-reads the settings (the first-run setup
//! dialog may have changed them) and retries the connection gate.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::classify::{route_for, Route};
use crate::config::{OperatingMode, Settings, REMOTE_POLL_INTERVAL};
use crate::discovery;
use crate::engine::Engine;
use crate::shutdown;
use crate::transport::remote::{ChannelState, RemoteChannel};

/// Arguments appended to the node command line in thin mode: the co-located
/// process is only a keystore there, so it is kept off the p2p network.
const THIN_NODE_ARGS: [&str; 3] = ["--maxpeers=0", "--nodiscover", "--nat=none"];

/// Dual-transport request router.
pub struct Router {
    engine: Arc<dyn Engine>,
    remote: RemoteChannel,
    mode: Arc<Mutex<OperatingMode>>,
    settings_path: PathBuf,
}

impl Router {
    /// Build a router over `engine`, reading the persisted settings from
    /// `settings_path` and spawning the one-shot relay discovery.
    ///
    /// Must be called from within a tokio runtime: discovery and the relay
    /// channel run as background tasks.
    pub fn new(engine: Arc<dyn Engine>, settings_path: impl Into<PathBuf>) -> Self {
        let settings_path = settings_path.into();
        let settings = Settings::load_or_default(&settings_path);
        let mode = Arc::new(Mutex::new(settings.mode()));
        let remote = RemoteChannel::new(Arc::clone(&engine), Arc::clone(&mode));

        // Fire-and-forget: issued regardless of mode, the connection attempt
        // itself is mode-gated in the channel.
        discovery::spawn(settings.bootstrap_url.clone(), remote.clone());

        Self {
            engine,
            remote,
            mode,
            settings_path,
        }
    }

    fn route(&self) -> Route {
        route_for(self.engine.active_request(), *self.mode.lock())
    }

    // ── Byte-level operations ─────────────────────────────────────────────────

    /// Whether the channel selected for the in-flight request accepts writes.
    ///
    /// The relay is assumed write-capable whenever it is open enough to
    /// matter; there is no backpressure check at this layer.
    pub fn writable(&self) -> bool {
        match self.route() {
            Route::Remote => true,
            Route::Local => self.engine.writable(),
        }
    }

    /// Write `payload` over the selected channel, returning the bytes
    /// accepted.  A short count signals a partial send; the engine owns
    /// retry-by-resend.
    pub fn write(&self, payload: &[u8]) -> usize {
        match self.route() {
            Route::Remote => self.remote.write(payload),
            Route::Local => self.engine.write(payload),
        }
    }

    /// Read whatever the selected channel has pending.  For the relay this
    /// returns and clears the single buffered message; empty when nothing
    /// is pending.
    pub fn read(&self) -> Vec<u8> {
        match self.route() {
            Route::Remote => self.remote.take_pending(),
            Route::Local => self.engine.read(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// (Re)initialize: re-read the persisted settings, retry the relay
    /// connection gate, and start the engine.
    pub fn init(&self) {
        let settings = Settings::load_or_default(&self.settings_path);
        *self.mode.lock() = settings.mode();

        self.remote.maybe_connect();
        self.engine.init();
    }

    /// The local channel finished connecting.
    ///
    /// In full mode that alone makes the transport ready.  In thin mode the
    /// ready signal waits for whichever side connects last: if the relay is
    /// already up, fire now; otherwise the relay driver fires it on connect.
    pub fn on_local_connected(&self) {
        if *self.mode.lock() == OperatingMode::Full {
            self.engine.transport_ready();
            return;
        }

        if self.remote.state() == ChannelState::Connected {
            self.engine.transport_ready();
        }
    }

    /// Drive application close one step; poll until it returns `true`.
    ///
    /// Never reports done before both channels have fully closed, and once
    /// it reports done it continues to do so.
    pub fn close_app(&self) -> bool {
        shutdown::close_step(self.engine.as_ref(), &self.remote)
    }

    /// Apply a polling interval.  Thin mode enforces
    /// [`REMOTE_POLL_INTERVAL`] regardless of `requested`, reflecting the
    /// relay's rate constraints.
    pub fn set_interval(&self, requested: Duration) {
        let interval = match *self.mode.lock() {
            OperatingMode::Thin => REMOTE_POLL_INTERVAL,
            OperatingMode::Full => requested,
        };
        self.engine.set_interval(interval);
    }

    /// Argument list for launching the co-located node process, augmented
    /// with the thin-mode flags when applicable.
    pub fn node_args(&self) -> Vec<String> {
        let mut args = self.engine.base_args();
        if *self.mode.lock() == OperatingMode::Thin {
            args.extend(THIN_NODE_ARGS.iter().map(|arg| (*arg).to_owned()));
        }
        args
    }

    /// Run a bulk log query.  Thin clients skip it entirely: the call is
    /// far too heavy for the shared relay, and the local node has no chain
    /// data to answer from.
    pub fn fetch_logs(&self, addresses: &[String], topics: &[String], from_block: u64) {
        if *self.mode.lock() == OperatingMode::Full {
            self.engine.fetch_logs(addresses, topics, from_block);
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    /// Whether the router is operating without an attached full node.
    pub fn is_thin_client(&self) -> bool {
        *self.mode.lock() == OperatingMode::Thin
    }

    /// Current relay connection state.
    pub fn remote_state(&self) -> ChannelState {
        self.remote.state()
    }
}

impl Drop for Router {
    /// Close the relay channel in case the app-close sequence was missed.
    fn drop(&mut self) {
        self.remote.mark_closing();
        self.remote.close();
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
