//! Error types for debrid-dl
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (Provider, Config)
//! - Conversions from transport and serialization errors
//! - Context information (endpoint, provider name, response detail)
//!
//! Note that provider *validation* failures (disabled, missing credential,
//! expired entitlement) are deliberately not errors: validation reports a
//! boolean outcome and resolution never starts on an unvalidated provider.

use thiserror::Error;

/// Result type alias for debrid-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for debrid-dl
///
/// This is the primary error type used throughout the library. Each variant
/// includes contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "torbox.base_url")
        key: Option<String>,
    },

    /// Provider API returned an unusable response
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// HTTP transport error (connection, timeout, body read)
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No configured provider passed validation at construction
    #[error("no available provider: all configured providers failed validation")]
    NoAvailableProvider,
}

/// Errors produced while talking to a debrid provider's API
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Endpoint answered with a non-success HTTP status
    #[error("{provider} returned HTTP {status} for {endpoint}")]
    Api {
        /// Provider name (e.g., "torbox")
        provider: &'static str,
        /// HTTP status code of the response
        status: u16,
        /// The endpoint path that was called (e.g., "/torrents/mylist")
        endpoint: String,
    },

    /// Endpoint answered 200 but reported failure in its envelope
    #[error("{provider} rejected {endpoint}: {detail}")]
    Rejected {
        /// Provider name
        provider: &'static str,
        /// The endpoint path that was called
        endpoint: String,
        /// The provider-supplied failure detail, if any
        detail: String,
    },

    /// Response body did not match the expected shape
    #[error("{provider} returned a malformed response for {endpoint}: {reason}")]
    MalformedResponse {
        /// Provider name
        provider: &'static str,
        /// The endpoint path that was called
        endpoint: String,
        /// Why the body could not be used
        reason: String,
    },
}
