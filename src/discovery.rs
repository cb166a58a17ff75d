//! Relay endpoint discovery.
//!
//! One bootstrap call per process: a POST with an empty JSON body to the
//! configured bootstrap service, which assigns a relay endpoint for this
//! client.  The call is fire-and-forget — failure of any kind (transport
//! error, `success=false`, malformed reply) is logged and leaves the
//! endpoint empty, which keeps remote mode permanently unable to connect
//! until the next process start.  There is no retry and no user-triggered
//! re-discovery.

use anyhow::Context as _;
use serde::Deserialize;

use crate::transport::remote::RemoteChannel;
use crate::transport::tls;

/// Body of the bootstrap service's reply.
#[derive(Debug, Deserialize)]
struct BootstrapReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    endpoint: String,
    #[serde(default)]
    error: Option<String>,
}

/// Spawn the one-shot discovery task.
///
/// On success the endpoint is handed to the remote channel, which then
/// decides whether a connection attempt is due.  On failure the channel is
/// left untouched.
pub(crate) fn spawn(url: String, remote: RemoteChannel) {
    tokio::spawn(async move {
        match fetch(&url).await {
            Ok(endpoint) => {
                tracing::info!(endpoint = %endpoint, "relay endpoint assigned");
                remote.set_endpoint(endpoint);
                remote.maybe_connect();
            }
            Err(err) => {
                // Non-fatal: the client keeps running on the local channel
                // alone, with remote capability disabled for this process.
                tracing::warn!("relay discovery failed: {err:#}");
            }
        }
    });
}

/// Issue the bootstrap POST and extract the assigned endpoint.
async fn fetch(url: &str) -> anyhow::Result<String> {
    let tls_config = tls::client_config()?;
    let client = reqwest::ClientBuilder::new()
        .use_preconfigured_tls(tls_config)
        .build()
        .context("failed to build HTTP client")?;

    tracing::debug!(url, "requesting relay endpoint assignment");

    let body = client
        .post(url)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{}")
        .send()
        .await
        .context("bootstrap request failed")?
        .text()
        .await
        .context("bootstrap reply could not be read")?;

    let reply: BootstrapReply =
        serde_json::from_str(&body).context("bootstrap reply was not valid JSON")?;

    extract_endpoint(reply)
}

/// Pull the endpoint out of a parsed reply, treating every application-level
/// failure flag as terminal.
fn extract_endpoint(reply: BootstrapReply) -> anyhow::Result<String> {
    if !reply.success {
        anyhow::bail!(
            "bootstrap rejected the request: {}",
            reply.error.as_deref().unwrap_or("unknown error")
        );
    }
    if reply.endpoint.is_empty() {
        anyhow::bail!("bootstrap reply carried no endpoint");
    }
    Ok(reply.endpoint)
}

// ── Unit tests ────────────────────────────────────────────────────────────────
