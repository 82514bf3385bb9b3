//! Shared HTTP client for provider requests.
//!
//! Provides a configured [`reqwest::Client`] with the per-request timeout
//! and User-Agent from [`ResolveConfig`], plus the small helper that turns
//! a provider response into a decoded body or a typed error.

use crate::config::ResolveConfig;
use crate::error::ResolveError;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// User-Agent sent when the configuration does not override it.
const DEFAULT_USER_AGENT: &str = concat!("carbon-resolve/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] configured for provider API calls.
///
/// The client has:
/// - Timeout from config (applies to each attempt independently)
/// - Custom User-Agent if configured
/// - gzip decompression
///
/// # Errors
///
/// Returns [`ResolveError::Http`] if the client cannot be constructed.
pub fn build_client(config: &ResolveConfig) -> Result<reqwest::Client, ResolveError> {
    let ua = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| ResolveError::Http(format!("failed to build HTTP client: {e}")))
}

/// Check the status of a provider response and decode its JSON body.
///
/// # Errors
///
/// - [`ResolveError::ProviderCallFailed`] for non-2xx statuses
/// - [`ResolveError::Http`] if the body cannot be read
/// - [`ResolveError::MalformedResponse`] if the body is not the expected JSON
pub async fn decode_json<T: DeserializeOwned>(
    provider: &str,
    response: reqwest::Response,
) -> Result<T, ResolveError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ResolveError::ProviderCallFailed(format!(
            "{provider} returned HTTP {status}"
        )));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| ResolveError::Http(format!("{provider} response read failed: {e}")))?;

    tracing::trace!(provider, bytes = body.len(), "provider response received");

    serde_json::from_slice(&body)
        .map_err(|e| ResolveError::MalformedResponse(format!("{provider}: {e}")))
}
