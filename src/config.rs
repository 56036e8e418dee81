//! Configuration types for debrid-dl
//!
//! Configuration is an explicit struct handed to
//! [`DebridDownloader::new`](crate::DebridDownloader::new) — there is no
//! process-wide settings store. Every field carries a serde default so
//! partial documents deserialize.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration for the downloader
///
/// Fields are organized into logical sub-configs:
/// - [`real_debrid`](RealDebridConfig) — primary provider credentials
/// - [`torbox`](TorBoxConfig) — secondary provider credentials and usenet flag
/// - [`selection`](SelectionConfig) — file-selection thresholds
/// - [`hash_cache`](HashCacheConfig) — usenet-link cache sizing
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Real-Debrid provider settings (tried first)
    #[serde(default)]
    pub real_debrid: RealDebridConfig,

    /// TorBox provider settings (tried second)
    #[serde(default)]
    pub torbox: TorBoxConfig,

    /// File-selection policy settings
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Hash cache sizing
    #[serde(default)]
    pub hash_cache: HashCacheConfig,
}

/// Real-Debrid provider configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RealDebridConfig {
    /// Whether this provider may be used (default: false)
    #[serde(default)]
    pub enabled: bool,

    /// API bearer token
    #[serde(default)]
    pub api_key: String,

    /// API base URL (default: "https://api.real-debrid.com/rest/1.0")
    #[serde(default = "default_real_debrid_base_url")]
    pub base_url: String,

    /// Outbound HTTP proxy for all Real-Debrid calls (None = direct)
    #[serde(default)]
    pub proxy_url: Option<String>,
}

impl Default for RealDebridConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            base_url: default_real_debrid_base_url(),
            proxy_url: None,
        }
    }
}

/// TorBox provider configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TorBoxConfig {
    /// Whether this provider may be used (default: false)
    #[serde(default)]
    pub enabled: bool,

    /// API bearer token
    #[serde(default)]
    pub api_key: String,

    /// API base URL (default: "https://api.torbox.app/v1/api")
    #[serde(default = "default_torbox_base_url")]
    pub base_url: String,

    /// Whether the usenet path may be attempted before the torrent path
    /// (default: false)
    ///
    /// When off, resolution never issues usenet API calls, even if the hash
    /// cache holds a pre-resolved NZB link for the item.
    #[serde(default)]
    pub usenet_enabled: bool,
}

impl Default for TorBoxConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            base_url: default_torbox_base_url(),
            usenet_enabled: false,
        }
    }
}

/// File-selection policy configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Smallest acceptable file in bytes (default: 10000)
    ///
    /// Provider listings include samples, NFO files, and subtitle scraps;
    /// everything under this size is skipped before classification runs.
    #[serde(default = "default_min_file_size")]
    pub min_file_size: u64,

    /// Largest acceptable file in bytes (None = unlimited)
    #[serde(default)]
    pub max_file_size: Option<u64>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            min_file_size: default_min_file_size(),
            max_file_size: None,
        }
    }
}

/// Hash cache sizing configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HashCacheConfig {
    /// Maximum number of cached hashes before eviction (default: 10000)
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Seconds an entry stays readable after its last write (default: 900)
    #[serde(default = "default_cache_ttl", with = "duration_secs")]
    pub ttl: Duration,
}

impl Default for HashCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            ttl: default_cache_ttl(),
        }
    }
}

fn default_real_debrid_base_url() -> String {
    "https://api.real-debrid.com/rest/1.0".to_string()
}

fn default_torbox_base_url() -> String {
    "https://api.torbox.app/v1/api".to_string()
}

fn default_min_file_size() -> u64 {
    10_000
}

fn default_max_entries() -> usize {
    10_000
}

fn default_cache_ttl() -> Duration {
    Duration::from_secs(900)
}

// Duration serialization helper (plain seconds on the wire)
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
