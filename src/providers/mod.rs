//! Debrid provider clients
//!
//! This module provides a trait-based architecture for talking to debrid
//! services. Each client wraps one remote API and exposes the same two
//! capabilities: self-validation (is this provider usable at all?) and
//! per-item resolution (turn candidate stream hashes into a selected file).
//!
//! ## Architecture
//!
//! The core abstraction is the [`DebridProvider`] trait. Two implementations
//! are provided:
//!
//! - [`RealDebridClient`]: Real-Debrid REST API, torrent downloads only
//! - [`TorBoxClient`]: TorBox API, torrent downloads plus an optional
//!   usenet path fed by pre-resolved NZB links
//!
//! Clients are constructed from their configuration section and validated
//! once; the resolver picks the first one that validates and routes every
//! request to it.

use reqwest::header::{self, HeaderMap, HeaderValue};
use url::Url;

use crate::error::{Error, ProviderError, Result};

mod real_debrid;
mod torbox;
mod traits;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use real_debrid::RealDebridClient;
pub use torbox::TorBoxClient;
pub use traits::DebridProvider;

/// Parse and sanity-check a configured base URL.
///
/// `key` names the configuration field for error messages.
pub(crate) fn parse_base_url(raw: &str, key: &'static str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::Config {
        message: format!("invalid base URL `{raw}`: {e}"),
        key: Some(key.to_string()),
    })?;
    if url.cannot_be_a_base() {
        return Err(Error::Config {
            message: format!("base URL `{raw}` cannot carry endpoint paths"),
            key: Some(key.to_string()),
        });
    }
    Ok(url)
}

/// Build the per-provider HTTP client with a bearer credential and, when
/// given, an outbound proxy.
pub(crate) fn build_http_client(
    api_key: &str,
    proxy_url: Option<&str>,
) -> Result<reqwest::Client> {
    let mut auth =
        HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| Error::Config {
            message: format!("API key is not a valid header value: {e}"),
            key: None,
        })?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, auth);

    let mut builder = reqwest::Client::builder().default_headers(headers);
    if let Some(proxy) = proxy_url {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    }
    Ok(builder.build()?)
}

/// Magnet link for an infohash, with the release title as display name
pub(crate) fn magnet_link(infohash: &str, display_name: &str) -> String {
    format!(
        "magnet:?xt=urn:btih:{infohash}&dn={}&tr=",
        urlencoding::encode(display_name)
    )
}

/// Map a non-success HTTP status onto a provider error
pub(crate) fn ensure_success(
    provider: &'static str,
    endpoint: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ProviderError::Api {
            provider,
            status: status.as_u16(),
            endpoint: endpoint.to_string(),
        }
        .into())
    }
}
