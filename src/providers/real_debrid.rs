//! Real-Debrid provider client
//!
//! Wraps the Real-Debrid REST API (`/rest/1.0`). Real-Debrid serves torrent
//! content only; resolution runs the cache-check then the download attempt.
//! Adding a magnet does not start anything by itself, so creation is a
//! three-call sequence: `addMagnet`, `selectFiles` (all files), then
//! `torrents/info/{id}` for the file listing.

use std::collections::HashMap;
use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::RealDebridConfig;
use crate::error::Result;
use crate::selection::FileSelector;
use crate::types::{DownloadFile, DownloadId, MediaItem, Stream};

use super::{DebridProvider, build_http_client, ensure_success, magnet_link, parse_base_url};

const NAME: &str = "real-debrid";

/// Client for the Real-Debrid REST API
pub struct RealDebridClient {
    http: reqwest::Client,
    base_url: Url,
    enabled: bool,
    api_key: String,
    expires_at: OnceLock<DateTime<Utc>>,
    selector: FileSelector,
}

impl RealDebridClient {
    /// Build a client from its configuration section
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL or proxy URL does not
    /// parse, or if the API key cannot be carried in an HTTP header.
    pub fn new(config: &RealDebridConfig, selector: FileSelector) -> Result<Self> {
        let base_url = parse_base_url(&config.base_url, "real_debrid.base_url")?;
        let http = build_http_client(&config.api_key, config.proxy_url.as_deref())?;
        Ok(Self {
            http,
            base_url,
            enabled: config.enabled,
            api_key: config.api_key.clone(),
            expires_at: OnceLock::new(),
            selector,
        })
    }

    /// Entitlement expiry recorded by the last successful validation
    pub fn entitlement_expiry(&self) -> Option<DateTime<Utc>> {
        self.expires_at.get().copied()
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url.as_str().trim_end_matches('/'))
    }

    async fn fetch_user(&self) -> Result<UserInfo> {
        let response = self.http.get(self.url("user")).send().await?;
        let response = ensure_success(NAME, "user", response)?;
        Ok(response.json().await?)
    }

    /// First hash of `hashes` that Real-Debrid reports as instantly available
    async fn first_cached_hash(&self, hashes: &[&str]) -> Result<Option<String>> {
        let endpoint = format!("torrents/instantAvailability/{}", hashes.join("/"));
        let response = self.http.get(self.url(&endpoint)).send().await?;
        let response = ensure_success(NAME, "torrents/instantAvailability", response)?;

        // Values are heterogeneous: an object with "rd" containers when
        // cached, an empty array otherwise. Key casing follows the service,
        // so hashes are matched case-insensitively.
        let availability: HashMap<String, serde_json::Value> = response.json().await?;

        Ok(hashes
            .iter()
            .find(|hash| {
                availability.iter().any(|(key, value)| {
                    key.eq_ignore_ascii_case(hash) && has_instant_container(value)
                })
            })
            .map(|hash| (*hash).to_string()))
    }

    async fn find_torrent_by_hash(&self, hash: &str) -> Result<Option<DownloadId>> {
        let response = self.http.get(self.url("torrents")).send().await?;
        let response = ensure_success(NAME, "torrents", response)?;
        let torrents: Vec<TorrentSummary> = response.json().await?;
        Ok(torrents
            .into_iter()
            .find(|torrent| torrent.hash.eq_ignore_ascii_case(hash))
            .map(|torrent| torrent.id))
    }

    async fn add_magnet(&self, stream: &Stream) -> Result<DownloadId> {
        let magnet = magnet_link(&stream.infohash, &stream.raw_title);
        let response = self
            .http
            .post(self.url("torrents/addMagnet"))
            .form(&[("magnet", magnet.as_str())])
            .send()
            .await?;
        let response = ensure_success(NAME, "torrents/addMagnet", response)?;
        let added: AddedMagnet = response.json().await?;
        Ok(added.id)
    }

    async fn select_all_files(&self, id: &DownloadId) -> Result<()> {
        let response = self
            .http
            .post(self.url(&format!("torrents/selectFiles/{id}")))
            .form(&[("files", "all")])
            .send()
            .await?;
        ensure_success(NAME, "torrents/selectFiles", response)?;
        Ok(())
    }

    async fn torrent_files(&self, id: &DownloadId) -> Result<Vec<DownloadFile>> {
        let response = self
            .http
            .get(self.url(&format!("torrents/info/{id}")))
            .send()
            .await?;
        let response = ensure_success(NAME, "torrents/info", response)?;
        let info: TorrentInfo = response.json().await?;
        Ok(info
            .files
            .into_iter()
            .map(|file| DownloadFile::new(path_tail(&file.path), file.bytes))
            .collect())
    }

    /// Locate or create the torrent for `stream`; idempotent by hash
    async fn ensure_torrent(&self, stream: &Stream) -> Result<DownloadId> {
        if let Some(id) = self.find_torrent_by_hash(&stream.infohash).await? {
            debug!(provider = NAME, hash = %stream.infohash, id = %id, "reusing existing torrent");
            return Ok(id);
        }
        let id = self.add_magnet(stream).await?;
        self.select_all_files(&id).await?;
        info!(provider = NAME, hash = %stream.infohash, id = %id, "created torrent");
        Ok(id)
    }
}

#[async_trait]
impl DebridProvider for RealDebridClient {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn validate(&self) -> bool {
        if !self.enabled {
            debug!(provider = NAME, "provider disabled");
            return false;
        }
        if self.api_key.is_empty() {
            warn!(provider = NAME, "no API key configured");
            return false;
        }
        let user = match self.fetch_user().await {
            Ok(user) => user,
            Err(e) => {
                warn!(provider = NAME, error = %e, "entitlement check failed");
                return false;
            }
        };
        let expires_at = match DateTime::parse_from_rfc3339(&user.expiration) {
            Ok(parsed) => parsed.with_timezone(&Utc),
            Err(e) => {
                warn!(provider = NAME, error = %e, "unparseable account expiration");
                return false;
            }
        };
        if expires_at <= Utc::now() {
            warn!(provider = NAME, expires_at = %expires_at, "premium entitlement expired");
            return false;
        }
        let _ = self.expires_at.set(expires_at);
        debug!(provider = NAME, expires_at = %expires_at, "entitlement verified");
        true
    }

    async fn resolve(&self, item: &mut MediaItem) -> Result<()> {
        if item.streams.is_empty() {
            debug!(provider = NAME, item = %item.id, "item has no candidate streams");
            return Ok(());
        }

        let Some(hash) = self.first_cached_hash(&item.stream_hashes()).await? else {
            debug!(provider = NAME, item = %item.id, "no cached stream");
            return Ok(());
        };
        let Some(stream) = item.find_stream(&hash).cloned() else {
            // The hash came out of the item's own stream set.
            return Ok(());
        };
        item.active_stream = Some(stream.clone());

        let id = self.ensure_torrent(&stream).await?;
        let files = self.torrent_files(&id).await?;
        match self.selector.select(&files, item.kind) {
            Some(file) => {
                item.set_placement(file.short_name.clone());
                info!(
                    provider = NAME,
                    item = %item.id,
                    hash = %stream.infohash,
                    file = %file.short_name,
                    "resolved download"
                );
            }
            None => {
                debug!(provider = NAME, item = %item.id, "no file matched selection policy");
            }
        }
        Ok(())
    }
}

/// Whether an instant-availability value carries at least one "rd" container
fn has_instant_container(value: &serde_json::Value) -> bool {
    value
        .get("rd")
        .and_then(serde_json::Value::as_array)
        .is_some_and(|containers| !containers.is_empty())
}

/// Final component of a slash-separated torrent file path
fn path_tail(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    expiration: String,
}

#[derive(Debug, Deserialize)]
struct TorrentSummary {
    id: DownloadId,
    hash: String,
}

#[derive(Debug, Deserialize)]
struct AddedMagnet {
    id: DownloadId,
}

#[derive(Debug, Deserialize)]
struct TorrentInfo {
    files: Vec<TorrentInfoFile>,
}

#[derive(Debug, Deserialize)]
struct TorrentInfoFile {
    path: String,
    bytes: u64,
}
