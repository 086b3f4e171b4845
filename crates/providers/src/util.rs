//! Shared utility functions for provider adapters.

use std::time::Duration;

use ob_domain::config::ProviderAuth;
use ob_domain::error::{Error, Result};

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
///
/// Timeout errors map to [`Error::Timeout`]; everything else maps to
/// [`Error::Http`].
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// Resolve the API key for a provider, failing when none is configured.
pub(crate) fn resolve_api_key(provider_id: &str, auth: &ProviderAuth) -> Result<String> {
    if auth.key.is_some() && auth.env.is_none() {
        tracing::warn!(
            provider_id,
            "API key loaded from plaintext config field 'key'; prefer 'env'"
        );
    }
    auth.resolve_key().ok_or_else(|| {
        Error::Auth(match auth.env {
            Some(ref env) => format!("environment variable '{env}' not set"),
            None => "no API key configured: set 'env' or 'key'".into(),
        })
    })
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(from_reqwest)
}

/// Turn a non-2xx provider reply into [`Error::Provider`].
pub(crate) fn provider_error(provider: &str, status: reqwest::StatusCode, body: &str) -> Error {
    let snippet: String = body.chars().take(300).collect();
    Error::Provider {
        provider: provider.to_string(),
        message: format!("HTTP {} - {}", status.as_u16(), snippet),
    }
}
