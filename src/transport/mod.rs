//! Transport internals.
//!
//! | Module   | Responsibility                                      |
//! |----------|-----------------------------------------------------|
//! | `remote` | Relay websocket lifecycle and the inbound buffer    |
//! | `tls`    | Shared rustls config from the native cert store     |
//!
//! The local channel has no module here: it belongs to the upstream engine
//! and is reached through the [`crate::engine::Engine`] trait.

pub(crate) mod remote;
pub(crate) mod tls;
