//! Shared TLS client configuration.
//!
//! Both the bootstrap HTTP call and the relay websocket use rustls with the
//! platform's native certificate store, so corporate CAs are trusted without
//! extra configuration and no OpenSSL dependency is needed.

use anyhow::Context as _;

/// Build a `rustls::ClientConfig` loaded with the platform's native root
/// certificate store.
///
/// Individual certificate load failures are logged at `DEBUG` level (they
/// are common in environments with mixed CA stores and are non-actionable
/// unless *all* certificates fail to load).  The build fails only when no
/// certificates at all could be loaded.
pub(crate) fn client_config() -> anyhow::Result<rustls::ClientConfig> {
    let mut root_store = rustls::RootCertStore::empty();
    let certs = rustls_native_certs::load_native_certs();
    for error in &certs.errors {
        tracing::debug!("skipped native cert (load error): {error}");
    }
    let mut certs_loaded: usize = 0;
    for cert in certs.certs {
        root_store
            .add(cert)
            .context("failed to add certificate to root store")?;
        certs_loaded += 1;
    }
    tracing::debug!(certs_loaded, "native TLS certificate store loaded");
    if root_store.is_empty() {
        anyhow::bail!("no native root certificates could be loaded");
    }
    Ok(rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth())
}
