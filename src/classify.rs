//! Release-name classification
//!
//! Providers describe a download's contents as bare filenames. This module
//! decides what kind of media asset a filename represents, so file selection
//! can match it against what an item expects. Classification is total: a
//! name that fits nothing is [`Classification::Unrecognized`], never an
//! error.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::MediaKind;

/// Filename extensions treated as playable video
const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "m4v", "mov", "wmv", "ts", "mpg", "mpeg", "webm",
];

/// Substrings that mark a file as promotional or filler material.
///
/// Matching is substring-based and deliberately conservative to mirror how
/// release groups actually name these files; "resampled" style false
/// positives are accepted.
const JUNK_MARKERS: &[&str] = &["sample", "trailer", "featurette", "proof"];

/// What a filename was recognized as
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// A feature-length movie release
    Movie {
        /// Release year, when the name carries one
        year: Option<u16>,
    },
    /// A single-episode release
    Episode {
        /// Season number parsed from the name
        season: u32,
        /// Episode number parsed from the name
        episode: u32,
    },
    /// Nothing recognizable; never selected
    Unrecognized,
}

impl Classification {
    /// Whether this classification satisfies the kind an item expects
    ///
    /// Container kinds (show, season) are never satisfied by a single file.
    #[must_use]
    pub fn matches(&self, kind: MediaKind) -> bool {
        matches!(
            (self, kind),
            (Classification::Movie { .. }, MediaKind::Movie)
                | (Classification::Episode { .. }, MediaKind::Episode)
        )
    }
}

/// Capability that classifies a provider-reported filename
///
/// Implementations must be total: an unparseable name is
/// [`Classification::Unrecognized`], never a panic or an error.
pub trait MediaClassifier: Send + Sync {
    /// Classify `filename` (a short name without path components)
    fn classify(&self, filename: &str) -> Classification;
}

/// Default classifier built on scene release-name conventions
///
/// Rules, in order:
/// 1. anything without a video extension is unrecognized;
/// 2. names carrying a junk marker ("sample", "trailer", ...) are
///    unrecognized;
/// 3. an episode marker (`S01E02`, `1x02`) makes it an episode;
/// 4. everything else is a movie, with the release year extracted when the
///    name carries one.
///
/// # Examples
///
/// ```
/// use debrid_dl::classify::{Classification, MediaClassifier, ReleaseNameClassifier};
///
/// let classifier = ReleaseNameClassifier;
/// assert_eq!(
///     classifier.classify("Movie.2020.1080p.BluRay.x264.mkv"),
///     Classification::Movie { year: Some(2020) },
/// );
/// assert_eq!(
///     classifier.classify("Show.S01E02.720p.WEB-DL.mkv"),
///     Classification::Episode { season: 1, episode: 2 },
/// );
/// assert_eq!(
///     classifier.classify("movie-sample.mkv"),
///     Classification::Unrecognized,
/// );
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ReleaseNameClassifier;

impl MediaClassifier for ReleaseNameClassifier {
    fn classify(&self, filename: &str) -> Classification {
        let lowered = filename.to_lowercase();

        if !has_video_extension(&lowered) {
            return Classification::Unrecognized;
        }
        if JUNK_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            return Classification::Unrecognized;
        }
        if let Some((season, episode)) = episode_numbers(&lowered) {
            return Classification::Episode { season, episode };
        }

        Classification::Movie {
            year: release_year(&lowered),
        }
    }
}

fn has_video_extension(lowered: &str) -> bool {
    lowered
        .rsplit_once('.')
        .is_some_and(|(_, ext)| VIDEO_EXTENSIONS.contains(&ext))
}

/// Season/episode numbers from `S01E02`-style or `1x02`-style markers
fn episode_numbers(lowered: &str) -> Option<(u32, u32)> {
    let caps = episode_se_pattern()
        .and_then(|re| re.captures(lowered))
        .or_else(|| episode_x_pattern().and_then(|re| re.captures(lowered)))?;
    let season = caps.get(1)?.as_str().parse().ok()?;
    let episode = caps.get(2)?.as_str().parse().ok()?;
    Some((season, episode))
}

/// A plausible release year anywhere in the name
fn release_year(lowered: &str) -> Option<u16> {
    let caps = year_pattern()?.captures(lowered)?;
    caps.get(0)?.as_str().parse().ok()
}

// The patterns are constants, so compilation cannot realistically fail; if
// it ever does, the affected rule degrades to "no match" rather than
// aborting classification.

fn episode_se_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bs(\d{1,2})[ ._-]?e(\d{1,3})\b").ok())
        .as_ref()
}

fn episode_x_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{1,2})x(\d{2,3})\b").ok())
        .as_ref()
}

fn year_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(19|20)\d{2}\b").ok())
        .as_ref()
}
