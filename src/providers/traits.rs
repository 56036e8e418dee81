//! The capability a debrid provider exposes to the resolver

use async_trait::async_trait;

use crate::types::MediaItem;

/// Interface every debrid provider client implements
///
/// The resolver holds providers behind this trait and never sees
/// provider-specific endpoints or payloads. Implementations wrap one remote
/// service each and own their HTTP client, credentials, and entitlement
/// state.
///
/// # Examples
///
/// ```no_run
/// use debrid_dl::config::{RealDebridConfig, SelectionConfig};
/// use debrid_dl::providers::{DebridProvider, RealDebridClient};
/// use debrid_dl::selection::FileSelector;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = RealDebridConfig {
///     enabled: true,
///     api_key: "token".to_string(),
///     ..RealDebridConfig::default()
/// };
/// let selector = FileSelector::new(&SelectionConfig::default());
/// let client = RealDebridClient::new(&config, selector)?;
///
/// if client.validate().await {
///     println!("{} is usable", client.name());
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait DebridProvider: Send + Sync {
    /// Human-readable name for logging
    fn name(&self) -> &'static str;

    /// Check whether this provider can serve downloads right now
    ///
    /// # Returns
    ///
    /// `true` when the provider is enabled, has a credential, and the remote
    /// service confirms an unexpired entitlement. Any failure along the way
    /// is logged and reported as `false`; validation never returns an error,
    /// so an unusable provider can always be skipped.
    async fn validate(&self) -> bool;

    /// Resolve a download for `item`, writing the outcome onto the item
    ///
    /// On success `active_stream`, `folder`, `alternative_folder`, and
    /// `file` are set. An item that stays without `file` simply had nothing
    /// resolvable; that is an ordinary outcome, not an error.
    ///
    /// # Arguments
    ///
    /// * `item` - The media item to resolve; mutated in place
    ///
    /// # Errors
    ///
    /// Returns an error if a remote call on the cache-check or
    /// download-creation path fails (HTTP failure, non-success status,
    /// rejected or malformed response). Failures on optional paths (usenet)
    /// are logged and absorbed.
    async fn resolve(&self, item: &mut MediaItem) -> crate::Result<()>;
}
