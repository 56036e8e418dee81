//! # debrid-dl
//!
//! Download-resolution library for debrid services.
//!
//! Given a media item and its candidate infohashes, debrid-dl picks a usable
//! provider, checks which hashes the provider already has cached, creates
//! the remote download when needed, and selects the one file that represents
//! the wanted asset. It moves no media bytes itself: the output is the
//! placement written back onto the item.
//!
//! ## Design Philosophy
//!
//! debrid-dl is designed to be:
//! - **Provider-agnostic** - Real-Debrid and TorBox behind one trait
//! - **Fail-quiet on content** - an unresolvable item is an outcome, not an
//!   error; errors are reserved for broken remote calls
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Injectable** - file classification is a trait; bring your own parser
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use debrid_dl::{Config, DebridDownloader, HashCache, MediaItem, MediaKind, Stream};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.real_debrid.enabled = true;
//!     config.real_debrid.api_key = "token".to_string();
//!
//!     let hash_cache = Arc::new(HashCache::new(config.hash_cache.clone()));
//!     let downloader = DebridDownloader::new(config, hash_cache).await?;
//!
//!     let mut item = MediaItem::new("tt0137523", "Fight Club", MediaKind::Movie)
//!         .with_stream(Stream::new(
//!             "2aa4f5a7e209e54b32803d43670971c4c8caaa05",
//!             "Fight.Club.1999.1080p.BluRay.x264",
//!         ));
//!
//!     downloader.resolve(&mut item).await?;
//!     match &item.file {
//!         Some(file) => println!("resolved to {file}"),
//!         None => println!("nothing resolvable"),
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Release-name classification
pub mod classify;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Infohash-keyed cache of pre-resolved usenet links
pub mod hash_cache;
/// Debrid provider clients
pub mod providers;
/// Download-resolution facade
pub mod resolver;
/// File-selection policy
pub mod selection;
/// Core types
pub mod types;

// Re-export commonly used types
pub use classify::{Classification, MediaClassifier, ReleaseNameClassifier};
pub use config::{Config, HashCacheConfig, RealDebridConfig, SelectionConfig, TorBoxConfig};
pub use error::{Error, ProviderError, Result};
pub use hash_cache::HashCache;
pub use providers::{DebridProvider, RealDebridClient, TorBoxClient};
pub use resolver::DebridDownloader;
pub use selection::FileSelector;
pub use types::{
    CURRENT_DIR_MARKER, DownloadEntry, DownloadFile, DownloadId, MediaItem, MediaKind, Stream,
};
