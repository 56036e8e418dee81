//! Download-resolution facade
//!
//! The resolver is the single entry point callers depend on. It selects one
//! usable provider at construction and routes every resolution request to
//! it; provider selection is never re-evaluated per item. If a resolution
//! fails because the selected provider degraded, the caller rebuilds the
//! resolver.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::classify::MediaClassifier;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::hash_cache::HashCache;
use crate::providers::{DebridProvider, RealDebridClient, TorBoxClient};
use crate::selection::FileSelector;
use crate::types::MediaItem;

/// Facade over the configured debrid providers
///
/// Construction instantiates every known provider client, validates each in
/// a fixed priority order (Real-Debrid before TorBox), and keeps the first
/// one that validates. A resolver that would have no usable provider is
/// never observable: construction fails with
/// [`Error::NoAvailableProvider`] instead.
///
/// The facade is cheap to clone; clones share the selected provider.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
///
/// use debrid_dl::config::Config;
/// use debrid_dl::hash_cache::HashCache;
/// use debrid_dl::resolver::DebridDownloader;
/// use debrid_dl::types::{MediaItem, MediaKind, Stream};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = Config::default();
/// config.real_debrid.enabled = true;
/// config.real_debrid.api_key = "token".to_string();
///
/// let hash_cache = Arc::new(HashCache::new(config.hash_cache.clone()));
/// let downloader = DebridDownloader::new(config, hash_cache).await?;
///
/// let mut item = MediaItem::new("tt0137523", "Fight Club", MediaKind::Movie)
///     .with_stream(Stream::new(
///         "2aa4f5a7e209e54b32803d43670971c4c8caaa05",
///         "Fight.Club.1999.1080p.BluRay.x264",
///     ));
/// downloader.resolve(&mut item).await?;
///
/// if let Some(file) = &item.file {
///     println!("resolved to {file}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DebridDownloader {
    provider: Arc<dyn DebridProvider>,
}

impl DebridDownloader {
    /// Select a provider and build the resolver
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoAvailableProvider`] when no configured provider
    /// passes validation. Individual provider construction or validation
    /// failures are logged and skipped, never propagated.
    pub async fn new(config: Config, hash_cache: Arc<HashCache>) -> Result<Self> {
        let selector = FileSelector::new(&config.selection);
        Self::with_selector(config, hash_cache, selector).await
    }

    /// Like [`DebridDownloader::new`], with a caller-supplied classifier
    /// driving file selection
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoAvailableProvider`] when no configured provider
    /// passes validation.
    pub async fn with_classifier(
        config: Config,
        hash_cache: Arc<HashCache>,
        classifier: Arc<dyn MediaClassifier>,
    ) -> Result<Self> {
        let selector = FileSelector::with_classifier(&config.selection, classifier);
        Self::with_selector(config, hash_cache, selector).await
    }

    async fn with_selector(
        config: Config,
        hash_cache: Arc<HashCache>,
        selector: FileSelector,
    ) -> Result<Self> {
        // Priority order is fixed: Real-Debrid, then TorBox.
        let mut candidates: Vec<Arc<dyn DebridProvider>> = Vec::new();
        match RealDebridClient::new(&config.real_debrid, selector.clone()) {
            Ok(client) => candidates.push(Arc::new(client)),
            Err(e) => warn!(provider = "real-debrid", error = %e, "provider construction failed"),
        }
        match TorBoxClient::new(&config.torbox, hash_cache, selector) {
            Ok(client) => candidates.push(Arc::new(client)),
            Err(e) => warn!(provider = "torbox", error = %e, "provider construction failed"),
        }

        for candidate in candidates {
            if candidate.validate().await {
                info!(provider = candidate.name(), "selected debrid provider");
                return Ok(Self {
                    provider: candidate,
                });
            }
            debug!(provider = candidate.name(), "provider not usable, trying next");
        }
        Err(Error::NoAvailableProvider)
    }

    /// Name of the provider serving this resolver
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Resolve a download for `item`
    ///
    /// Delegates to the selected provider exactly once; there is no
    /// per-item failover. On success the item's `active_stream` and
    /// placement fields are set; an item left without `file` had nothing
    /// resolvable.
    ///
    /// # Errors
    ///
    /// Returns an error when a remote call on the cache-check or
    /// download-creation path fails.
    pub async fn resolve(&self, item: &mut MediaItem) -> Result<()> {
        debug!(item = %item.id, title = %item.title, "resolving download");
        self.provider.resolve(item).await
    }
}

// Provider trait objects carry no Debug bound, so the facade formats
// itself by the selected provider's name.
impl std::fmt::Debug for DebridDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebridDownloader")
            .field("provider", &self.provider.name())
            .finish()
    }
}
