//! Application-close sequencing.
//!
//! Closing the client is a two-phase drain, polled by the embedder rather
//! than blocking: phase 1 waits for the local channel to finish closing,
//! phase 2 then closes the relay channel.  Only when both report closed does
//! a step return `true`, permitting the process to terminate — so a
//! terminate-before-drain race is impossible.
//!
//! The first step also raises the closing flag on the relay channel, so the
//! disconnect a deliberate close produces is never misreported through the
//! fatal-abort path.

use crate::engine::Engine;
use crate::transport::remote::{ChannelState, RemoteChannel};

/// Drive the close sequence one step.  Invoke repeatedly until it returns
/// `true`; once it does, it keeps doing so.
pub(crate) fn close_step(engine: &dyn Engine, remote: &RemoteChannel) -> bool {
    remote.mark_closing();

    // Phase 1: the local channel layer drains at its own pace.
    if !engine.close() {
        return false;
    }

    // Phase 2: only after the local side is done, take the relay down.
    if remote.state() != ChannelState::Unconnected {
        remote.close();
        return false;
    }

    true
}

// ── Unit tests ────────────────────────────────────────────────────────────────
