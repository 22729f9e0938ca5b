//! Shared HTTP Client
//!
//! A lazily built client reused for every inference call so connections and
//! TLS sessions survive between analyses. Callers that need a different
//! timeout build their own through [`build_client`].

use crate::config::DEFAULT_REQUEST_TIMEOUT_SECS;
use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

/// Global HTTP client for inference calls
///
/// Image uploads are large and inference can be slow on CPU-only servers,
/// hence the generous timeout.
pub static INFERENCE_CLIENT: Lazy<Client> = Lazy::new(|| {
    build_client(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .expect("Failed to create inference HTTP client")
});

pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .build()
}

/// Get the global inference HTTP client
#[inline]
pub fn inference_client() -> &'static Client {
    &INFERENCE_CLIENT
}
