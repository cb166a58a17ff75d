//! Configuration loading.
//!
//! Reads the persisted client settings from a TOML file and exposes the
//! operating mode the router was configured with.  Settings are read at
//! construction and re-read on explicit reinitialization; nothing else in
//! the crate mutates them.
//!
//! A missing or unreadable settings file must never take the client down —
//! callers that cannot surface a configuration error fall back to the
//! defaults via [`Settings::load_or_default`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Polling interval enforced while requests are served through the relay.
///
/// The relay is a shared endpoint with rate constraints, so thin clients
/// override whatever interval the caller asked for with this constant.
pub const REMOTE_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Bootstrap service queried for a relay endpoint assignment when no
/// `bootstrap_url` is configured.
pub const DEFAULT_BOOTSTRAP_URL: &str = "https://bootstrap.relaynet.io/api/init";

// ── Operating mode ────────────────────────────────────────────────────────────

/// How outbound requests are routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    /// No attached full node: remote-eligible requests go through the relay.
    Thin,
    /// A locally-run node answers everything over the local channel.
    Full,
}

// ── Settings ──────────────────────────────────────────────────────────────────

/// Persisted client settings relevant to transport routing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// `true` runs without an attached full node and relies on the relay for
    /// chain data.
    pub thin_client: bool,
    /// Bootstrap service used to discover the relay endpoint.
    pub bootstrap_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            thin_client: true,
            bootstrap_url: DEFAULT_BOOTSTRAP_URL.to_owned(),
        }
    }
}

/// Error reading or parsing the settings file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Settings {
    /// Load settings from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or is not valid
    /// TOML for this schema.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Load settings from `path`, falling back to the defaults when the file
    /// is missing or malformed.
    ///
    /// A missing file is the normal first-run state and is logged at `DEBUG`;
    /// a file that exists but fails to parse is logged at `WARN`.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(ConfigError::Read { path, source }) => {
                tracing::debug!(path = %path.display(), %source, "no settings file, using defaults");
                Self::default()
            }
            Err(err @ ConfigError::Parse { .. }) => {
                tracing::warn!("settings unusable, using defaults: {err}");
                Self::default()
            }
        }
    }

    /// The operating mode these settings select.
    pub fn mode(&self) -> OperatingMode {
        if self.thin_client {
            OperatingMode::Thin
        } else {
            OperatingMode::Full
        }
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
