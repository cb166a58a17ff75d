//! relay-ipc — dual-transport request router for chain JSON-RPC clients.
//!
//! Decides, per outgoing request, whether to deliver it over the local
//! inter-process channel (a co-located full node) or over a relay websocket
//! discovered at startup, and owns the remote channel's lifecycle
//! independently of the request/response engine above it.
//!
//! | Module      | Responsibility                                        |
//! |-------------|-------------------------------------------------------|
//! | `classify`  | Static request-type → transport routing table         |
//! | `config`    | Persisted settings and the operating mode             |
//! | `discovery` | One-shot bootstrap call for the relay endpoint        |
//! | `engine`    | Contract consumed from the upstream request engine    |
//! | `router`    | The write/read/writable facade over both channels     |
//! | `shutdown`  | Two-phase poll-until-closed application close         |
//! | `transport` | Relay websocket lifecycle and TLS plumbing            |
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use relay_ipc::{Engine, Router};
//!
//! # fn demo(engine: Arc<dyn Engine>) {
//! // Inside a tokio runtime; `engine` is the embedding client's
//! // request/response engine over the local node channel.
//! let router = Router::new(engine, "settings.toml");
//! router.init();
//! # }
//! ```
//!
//! Payload contents are never parsed here: both channels carry the same
//! wire format, and the router only moves bytes and sequences lifecycles.

pub mod classify;
pub mod config;
mod discovery;
pub mod engine;
pub mod router;
mod shutdown;
mod transport;

pub use classify::{route_for, RequestKind, Route};
pub use config::{ConfigError, OperatingMode, Settings, REMOTE_POLL_INTERVAL};
pub use engine::Engine;
pub use router::Router;
pub use transport::remote::ChannelState;
