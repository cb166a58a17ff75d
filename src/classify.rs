//! Request classification.
//!
//! Maps the in-flight request's type to the transport that should carry it.
//! The table is static and total: every [`RequestKind`] has exactly one
//! verdict per operating mode, and the match below has no wildcard arm, so
//! adding a request type without classifying it fails to compile.
//!
//! Under [`OperatingMode::Full`] everything is local regardless of type.
//! Under [`OperatingMode::Thin`], cheap chain-read and raw-submission
//! requests go to the relay; anything that needs local key material, local
//! node state, or is too heavy for a shared endpoint stays local.

use crate::config::OperatingMode;

// ── Request vocabulary ────────────────────────────────────────────────────────

/// The type tag of the request currently in flight.
///
/// Mirrors the full RPC vocabulary of the request engine.  `NoRequest` is the
/// idle tag reported between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    NoRequest,
    GetBlockNumber,
    GetBalance,
    GetTransactionCount,
    SendRawTransaction,
    GetGasPrice,
    EstimateGas,
    NewBlockFilter,
    NewEventFilter,
    GetFilterChanges,
    UninstallFilter,
    GetTransactionByHash,
    GetBlock,
    GetTransactionReceipt,
    Call,
    NewAccount,
    UnlockAccount,
    SignTransaction,
    GetAccountRefs,
    SendTransaction,
    GetClientVersion,
    GetNetVersion,
    GetSyncing,
    GetPeerCount,
    GetLogs,
}

impl RequestKind {
    /// Every request type, for exhaustive property tests.
    pub const ALL: [RequestKind; 25] = [
        RequestKind::NoRequest,
        RequestKind::GetBlockNumber,
        RequestKind::GetBalance,
        RequestKind::GetTransactionCount,
        RequestKind::SendRawTransaction,
        RequestKind::GetGasPrice,
        RequestKind::EstimateGas,
        RequestKind::NewBlockFilter,
        RequestKind::NewEventFilter,
        RequestKind::GetFilterChanges,
        RequestKind::UninstallFilter,
        RequestKind::GetTransactionByHash,
        RequestKind::GetBlock,
        RequestKind::GetTransactionReceipt,
        RequestKind::Call,
        RequestKind::NewAccount,
        RequestKind::UnlockAccount,
        RequestKind::SignTransaction,
        RequestKind::GetAccountRefs,
        RequestKind::SendTransaction,
        RequestKind::GetClientVersion,
        RequestKind::GetNetVersion,
        RequestKind::GetSyncing,
        RequestKind::GetPeerCount,
        RequestKind::GetLogs,
    ];
}

// ── Routing verdict ───────────────────────────────────────────────────────────

/// Which channel carries the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The inter-process channel to the co-located node.
    Local,
    /// The websocket channel to the hosted relay.
    Remote,
}

/// Classify `kind` under `mode`.
pub fn route_for(kind: RequestKind, mode: OperatingMode) -> Route {
    if mode == OperatingMode::Full {
        return Route::Local;
    }

    match kind {
        // Cheap, stateless, or chain-read-only: safe to serve from the relay.
        RequestKind::GetBlockNumber
        | RequestKind::GetBalance
        | RequestKind::GetTransactionCount
        | RequestKind::SendRawTransaction
        | RequestKind::GetGasPrice
        | RequestKind::EstimateGas
        | RequestKind::NewBlockFilter
        | RequestKind::NewEventFilter
        | RequestKind::GetFilterChanges
        | RequestKind::UninstallFilter
        | RequestKind::GetTransactionByHash
        | RequestKind::GetBlock
        | RequestKind::GetTransactionReceipt
        | RequestKind::Call => Route::Remote,

        // Needs local key material or local node state.
        RequestKind::NoRequest
        | RequestKind::NewAccount
        | RequestKind::UnlockAccount
        | RequestKind::SignTransaction
        | RequestKind::GetAccountRefs
        | RequestKind::SendTransaction
        | RequestKind::GetClientVersion
        | RequestKind::GetNetVersion
        | RequestKind::GetSyncing
        | RequestKind::GetPeerCount => Route::Local,

        // Read-only but far too heavy for a shared relay endpoint.
        RequestKind::GetLogs => Route::Local,
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
