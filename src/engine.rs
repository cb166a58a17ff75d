//! Upstream engine contract.
//!
//! The request/response engine — framing, matching responses to pending
//! calls, timeout bookkeeping, and the inter-process channel to the
//! co-located node — lives above this crate and is consumed through the
//! [`Engine`] trait.  The router never inspects payload contents; it only
//! moves bytes and dispatches lifecycle notifications.
//!
//! Implementations must be cheap to call from multiple tokio tasks: the
//! remote channel driver invokes the notification hooks from its own task
//! while the embedder calls the byte-level operations from its request loop.

use std::time::Duration;

use crate::classify::RequestKind;

/// The engine and local-channel surface the router drives.
///
/// One object implements both concerns because the engine owns the local
/// channel: byte-level operations (`writable`/`write`/`read`) act on the
/// local inter-process socket, while the lifecycle hooks let the router
/// steer startup, polling, and shutdown.
pub trait Engine: Send + Sync + 'static {
    /// Whether the local channel currently accepts writes.
    fn writable(&self) -> bool;

    /// Write `payload` to the local channel, returning the number of bytes
    /// accepted.  A short count signals a partial write; resend policy is
    /// owned by the engine, not the router.
    fn write(&self, payload: &[u8]) -> usize;

    /// Read and consume whatever the local channel has pending.  Empty when
    /// nothing is buffered.
    fn read(&self) -> Vec<u8>;

    /// Whether the local channel has finished connecting.
    fn connected(&self) -> bool;

    /// Start the local channel and the request engine.
    fn init(&self);

    /// Drive the local side of application close one step.  Returns `true`
    /// once the local channel has fully closed; callers poll until then.
    fn close(&self) -> bool;

    /// Both transports are ready — begin the startup RPC sequence.
    fn transport_ready(&self);

    /// Inbound data is available; consume it through the router's `read`.
    fn data_ready(&self);

    /// Apply the effective polling interval.
    fn set_interval(&self, interval: Duration);

    /// Base argument list for launching the co-located node process.
    fn base_args(&self) -> Vec<String>;

    /// Type tag of the request currently in flight.  The engine serializes
    /// requests, so exactly one is active at a time; the router's channel
    /// selection depends on that discipline.
    fn active_request(&self) -> RequestKind;

    /// Record `error` as the transport layer's last error and trigger the
    /// shared fatal-abort path.  Used for unrecoverable transport faults
    /// outside a deliberate shutdown.
    fn fail(&self, error: &str);

    /// Run a bulk log query against the local node.
    fn fetch_logs(&self, addresses: &[String], topics: &[String], from_block: u64);
}

// ── Test support ──────────────────────────────────────────────────────────────
