//! Core types for debrid-dl

use serde::{Deserialize, Serialize};

/// Conventional placement value meaning "the entry's own directory".
///
/// Downstream consumers (the library-update step that reads the placement
/// fields) treat this marker as "no subdirectory navigation needed".
pub const CURRENT_DIR_MARKER: &str = ".";

/// Identifier a provider assigns to a remote download
///
/// Providers disagree on the shape of this value (Real-Debrid issues opaque
/// strings, TorBox issues integers), so it is carried as a string newtype
/// and integer ids are formatted on the way in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DownloadId(pub String);

impl DownloadId {
    /// Create a new DownloadId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DownloadId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DownloadId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for DownloadId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl PartialEq<&str> for DownloadId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<DownloadId> for &str {
    fn eq(&self, other: &DownloadId) -> bool {
        *self == other.0
    }
}

impl std::fmt::Display for DownloadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of media asset an item represents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Feature-length movie
    Movie,
    /// A whole show (container; never matched by file selection)
    Show,
    /// A season pack (container; never matched by file selection)
    Season,
    /// A single episode
    Episode,
}

impl MediaKind {
    /// Lowercase name for log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Show => "show",
            MediaKind::Season => "season",
            MediaKind::Episode => "episode",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate source for a media item
///
/// Hashes are normalized to lowercase on construction, deserialization
/// included, so lookups and batch queries never depend on producer casing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    /// Torrent infohash identifying the content (lowercase hex)
    #[serde(deserialize_with = "lowercase_hash")]
    pub infohash: String,
    /// The release name this hash was scraped from
    pub raw_title: String,
}

impl Stream {
    /// Create a new Stream, normalizing the hash to lowercase
    pub fn new(infohash: impl Into<String>, raw_title: impl Into<String>) -> Self {
        Self {
            infohash: infohash.into().to_lowercase(),
            raw_title: raw_title.into(),
        }
    }
}

/// Applies [`Stream::new`]'s hash normalization on the deserialization path
fn lowercase_hash<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer).map(|hash| hash.to_lowercase())
}

/// A media item to resolve, owned by the caller
///
/// Resolution mutates only `active_stream` and the placement fields
/// (`folder`, `alternative_folder`, `file`); everything else is caller
/// state. A resolved item has `file` set; an unresolved one does not —
/// that is the whole success signal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MediaItem {
    /// Caller-side identity (opaque to this library)
    pub id: String,
    /// Display title, used for magnet names and log lines
    pub title: String,
    /// What kind of asset the selected file must classify as
    pub kind: MediaKind,
    /// Candidate streams; hashes are unique within this set, order carries
    /// no meaning (all candidates are queried together)
    pub streams: Vec<Stream>,
    /// The stream adopted as resolvable, set by resolution
    pub active_stream: Option<Stream>,
    /// Placement: directory of the selected file, set by resolution
    pub folder: Option<String>,
    /// Placement: fallback directory, set by resolution
    pub alternative_folder: Option<String>,
    /// Placement: selected file's short name, set by resolution
    pub file: Option<String>,
}

impl MediaItem {
    /// Create an item with no candidate streams
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            streams: Vec::new(),
            active_stream: None,
            folder: None,
            alternative_folder: None,
            file: None,
        }
    }

    /// Add a candidate stream (builder-style)
    #[must_use]
    pub fn with_stream(mut self, stream: Stream) -> Self {
        self.streams.push(stream);
        self
    }

    /// All candidate hashes, in stream-set order
    pub fn stream_hashes(&self) -> Vec<&str> {
        self.streams.iter().map(|s| s.infohash.as_str()).collect()
    }

    /// Find the candidate stream carrying `hash` (case-insensitive)
    pub fn find_stream(&self, hash: &str) -> Option<&Stream> {
        self.streams
            .iter()
            .find(|s| s.infohash.eq_ignore_ascii_case(hash))
    }

    /// Record the selected file, filling all placement fields
    pub fn set_placement(&mut self, file_name: impl Into<String>) {
        self.folder = Some(CURRENT_DIR_MARKER.to_string());
        self.alternative_folder = Some(CURRENT_DIR_MARKER.to_string());
        self.file = Some(file_name.into());
    }

    /// Whether resolution selected a file for this item
    pub fn is_resolved(&self) -> bool {
        self.file.is_some()
    }
}

/// One file inside a provider-side download entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadFile {
    /// Filename without any path component
    pub short_name: String,
    /// Size in bytes as reported by the provider
    pub size: u64,
}

impl DownloadFile {
    /// Create a new file descriptor
    pub fn new(short_name: impl Into<String>, size: u64) -> Self {
        Self {
            short_name: short_name.into(),
            size,
        }
    }
}

/// One entry in a provider's "my downloads" listing
///
/// Listings are re-fetched on every resolution attempt and never cached
/// locally: provider-side state can change between calls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadEntry {
    /// The provider-assigned id
    pub id: DownloadId,
    /// Infohash of the content, as reported by the provider
    pub hash: String,
    /// Files inside the entry, in the provider's own order
    pub files: Vec<DownloadFile>,
}
