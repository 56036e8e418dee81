//! TorBox provider client
//!
//! Wraps the TorBox v1 API. Every response arrives in a
//! `{success, detail, data}` envelope; `success: false` is surfaced as a
//! rejection carrying the service's own detail string.
//!
//! TorBox resolves in up to three attempts, terminal on first success: a
//! usenet attempt (only when enabled, fed by pre-resolved NZB links from the
//! [`HashCache`]), then the torrent cache-check, then the torrent download
//! attempt. Errors on the usenet attempt are logged and absorbed so a broken
//! usenet side never takes the torrent path down with it.

use std::sync::Arc;
use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::TorBoxConfig;
use crate::error::{ProviderError, Result};
use crate::hash_cache::HashCache;
use crate::selection::FileSelector;
use crate::types::{DownloadEntry, DownloadFile, DownloadId, MediaItem, Stream};

use super::{DebridProvider, build_http_client, ensure_success, magnet_link, parse_base_url};

const NAME: &str = "torbox";

/// Client for the TorBox API
pub struct TorBoxClient {
    http: reqwest::Client,
    base_url: Url,
    enabled: bool,
    usenet_enabled: bool,
    api_key: String,
    expires_at: OnceLock<DateTime<Utc>>,
    hash_cache: Arc<HashCache>,
    selector: FileSelector,
}

impl TorBoxClient {
    /// Build a client from its configuration section
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL does not parse or the
    /// API key cannot be carried in an HTTP header.
    pub fn new(
        config: &TorBoxConfig,
        hash_cache: Arc<HashCache>,
        selector: FileSelector,
    ) -> Result<Self> {
        let base_url = parse_base_url(&config.base_url, "torbox.base_url")?;
        let http = build_http_client(&config.api_key, None)?;
        Ok(Self {
            http,
            base_url,
            enabled: config.enabled,
            usenet_enabled: config.usenet_enabled,
            api_key: config.api_key.clone(),
            expires_at: OnceLock::new(),
            hash_cache,
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

    async fn fetch_user(&self) -> Result<UserData> {
        let response = self.http.get(self.url("user/me")).send().await?;
        let response = ensure_success(NAME, "user/me", response)?;
        let envelope: Envelope<UserData> = response.json().await?;
        envelope.into_data("user/me")
    }

    /// First hash of `hashes` that TorBox reports as cached
    async fn first_cached_hash(&self, hashes: &[&str]) -> Result<Option<String>> {
        let response = self
            .http
            .get(self.url("torrents/checkcached"))
            .query(&[("hash", hashes.join(","))])
            .send()
            .await?;
        let response = ensure_success(NAME, "torrents/checkcached", response)?;

        // When nothing is cached the data field is null or an empty object.
        let envelope: Envelope<serde_json::Value> = response.json().await?;
        let data = envelope.success_data("torrents/checkcached")?;
        let Some(cached) = data.as_ref().and_then(serde_json::Value::as_object) else {
            return Ok(None);
        };

        Ok(hashes
            .iter()
            .find(|hash| {
                cached
                    .iter()
                    .any(|(key, value)| key.eq_ignore_ascii_case(hash) && !value.is_null())
            })
            .map(|hash| (*hash).to_string()))
    }

    async fn create_torrent(&self, stream: &Stream) -> Result<DownloadId> {
        let magnet = magnet_link(&stream.infohash, &stream.raw_title);
        let created: CreatedTorrent = self
            .post_form("torrents/createtorrent", &[("magnet", magnet.as_str())])
            .await?;
        Ok(DownloadId::from(created.torrent_id))
    }

    async fn create_usenet_download(&self, nzb_link: &str) -> Result<DownloadId> {
        let created: CreatedUsenetDownload = self
            .post_form("usenet/createusenetdownload", &[("link", nzb_link)])
            .await?;
        Ok(DownloadId::from(created.usenetdownload_id))
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
    ) -> Result<T> {
        let response = self.http.post(self.url(endpoint)).form(form).send().await?;
        let response = ensure_success(NAME, endpoint, response)?;
        let envelope: Envelope<T> = response.json().await?;
        envelope.into_data(endpoint)
    }

    async fn torrent_list(&self) -> Result<Vec<DownloadEntry>> {
        self.fetch_list("torrents/mylist").await
    }

    async fn usenet_list(&self) -> Result<Vec<DownloadEntry>> {
        self.fetch_list("usenet/mylist").await
    }

    async fn fetch_list(&self, endpoint: &str) -> Result<Vec<DownloadEntry>> {
        let response = self.http.get(self.url(endpoint)).send().await?;
        let response = ensure_success(NAME, endpoint, response)?;
        let envelope: Envelope<Vec<ListEntry>> = response.json().await?;
        Ok(envelope
            .success_data(endpoint)?
            .unwrap_or_default()
            .into_iter()
            .map(DownloadEntry::from)
            .collect())
    }

    /// Usenet attempt; `Ok(true)` means placement was set
    async fn resolve_via_usenet(&self, item: &mut MediaItem) -> Result<bool> {
        let Some(stream) = item.active_stream.clone() else {
            debug!(provider = NAME, item = %item.id, "no active stream for usenet lookup");
            return Ok(false);
        };
        let Some(link) = self.hash_cache.usenet_link(&stream.infohash).await else {
            debug!(provider = NAME, item = %item.id, hash = %stream.infohash, "no usenet link cached");
            return Ok(false);
        };

        let entry = match self.find_usenet_by_hash(&stream.infohash).await? {
            Some(entry) => {
                debug!(provider = NAME, hash = %stream.infohash, id = %entry.id, "reusing existing usenet download");
                entry
            }
            None => {
                let id = self.create_usenet_download(&link).await?;
                info!(provider = NAME, hash = %stream.infohash, id = %id, "created usenet download");
                // Re-fetch so the new entry is visible.
                let Some(entry) = self.find_usenet_by_id(&id).await? else {
                    warn!(provider = NAME, id = %id, "created usenet download missing from listing");
                    return Ok(false);
                };
                entry
            }
        };

        match self.selector.select(&entry.files, item.kind) {
            Some(file) => {
                item.set_placement(file.short_name.clone());
                info!(
                    provider = NAME,
                    item = %item.id,
                    hash = %stream.infohash,
                    file = %file.short_name,
                    "resolved via usenet"
                );
                Ok(true)
            }
            None => {
                debug!(provider = NAME, item = %item.id, "no usenet file matched selection policy");
                Ok(false)
            }
        }
    }

    async fn find_usenet_by_hash(&self, hash: &str) -> Result<Option<DownloadEntry>> {
        Ok(self
            .usenet_list()
            .await?
            .into_iter()
            .find(|entry| entry.hash.eq_ignore_ascii_case(hash)))
    }

    async fn find_usenet_by_id(&self, id: &DownloadId) -> Result<Option<DownloadEntry>> {
        Ok(self
            .usenet_list()
            .await?
            .into_iter()
            .find(|entry| &entry.id == id))
    }

    async fn find_torrent_by_hash(&self, hash: &str) -> Result<Option<DownloadEntry>> {
        Ok(self
            .torrent_list()
            .await?
            .into_iter()
            .find(|entry| entry.hash.eq_ignore_ascii_case(hash)))
    }

    async fn find_torrent_by_id(&self, id: &DownloadId) -> Result<Option<DownloadEntry>> {
        Ok(self
            .torrent_list()
            .await?
            .into_iter()
            .find(|entry| &entry.id == id))
    }

    /// Cache-check plus torrent download attempt
    async fn resolve_via_torrents(&self, item: &mut MediaItem) -> Result<()> {
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

        let entry = match self.find_torrent_by_hash(&stream.infohash).await? {
            Some(entry) => {
                debug!(provider = NAME, hash = %stream.infohash, id = %entry.id, "reusing existing torrent");
                entry
            }
            None => {
                let id = self.create_torrent(&stream).await?;
                info!(provider = NAME, hash = %stream.infohash, id = %id, "created torrent");
                // Re-fetch so the new entry is visible.
                let Some(entry) = self.find_torrent_by_id(&id).await? else {
                    warn!(provider = NAME, id = %id, "created torrent missing from listing");
                    return Ok(());
                };
                entry
            }
        };

        match self.selector.select(&entry.files, item.kind) {
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

#[async_trait]
impl DebridProvider for TorBoxClient {
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
        let expires_at = match DateTime::parse_from_rfc3339(&user.premium_expires_at) {
            Ok(parsed) => parsed.with_timezone(&Utc),
            Err(e) => {
                warn!(provider = NAME, error = %e, "unparseable premium expiry");
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
        if self.usenet_enabled {
            match self.resolve_via_usenet(item).await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        provider = NAME,
                        item = %item.id,
                        error = %e,
                        "usenet attempt failed, falling back to torrents"
                    );
                }
            }
        } else {
            debug!(provider = NAME, item = %item.id, "usenet disabled, skipping usenet attempt");
        }

        self.resolve_via_torrents(item).await
    }
}

/// TorBox wraps every payload in this envelope.
///
/// Absent `detail`/`data` keys deserialize as `None` on their own; a bare
/// `#[serde(default)]` here would force a `T: Default` bound onto the
/// derived impl.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    detail: Option<String>,
    data: Option<T>,
}

impl<T> Envelope<T> {
    /// Unwrap the envelope, allowing an absent payload
    fn success_data(self, endpoint: &str) -> Result<Option<T>> {
        if self.success {
            Ok(self.data)
        } else {
            Err(ProviderError::Rejected {
                provider: NAME,
                endpoint: endpoint.to_string(),
                detail: self
                    .detail
                    .unwrap_or_else(|| "no detail given".to_string()),
            }
            .into())
        }
    }

    /// Unwrap the envelope, requiring a payload
    fn into_data(self, endpoint: &str) -> Result<T> {
        self.success_data(endpoint)?.ok_or_else(|| {
            ProviderError::MalformedResponse {
                provider: NAME,
                endpoint: endpoint.to_string(),
                reason: "response carried no data".to_string(),
            }
            .into()
        })
    }
}

#[derive(Debug, Deserialize)]
struct UserData {
    premium_expires_at: String,
}

#[derive(Debug, Deserialize)]
struct CreatedTorrent {
    torrent_id: i64,
}

#[derive(Debug, Deserialize)]
struct CreatedUsenetDownload {
    usenetdownload_id: i64,
}

#[derive(Debug, Deserialize)]
struct ListEntry {
    id: i64,
    hash: String,
    // In-progress entries report `files: null`.
    #[serde(default, deserialize_with = "files_or_empty")]
    files: Vec<ListFile>,
}

#[derive(Debug, Deserialize)]
struct ListFile {
    short_name: String,
    size: u64,
}

fn files_or_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<ListFile>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<ListFile>>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<ListEntry> for DownloadEntry {
    fn from(entry: ListEntry) -> Self {
        DownloadEntry {
            id: DownloadId::from(entry.id),
            hash: entry.hash.to_lowercase(),
            files: entry
                .files
                .into_iter()
                .map(|file| DownloadFile::new(file.short_name, file.size))
                .collect(),
        }
    }
}
