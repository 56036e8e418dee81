//! File selection within a finished or cached download
//!
//! A download usually contains more than the asset an item asked for:
//! samples, subtitles, extras. Selection reduces the provider-reported file
//! list to the single file the item should play, or to nothing when the
//! download cannot serve the item.

use std::sync::Arc;

use tracing::debug;

use crate::classify::{MediaClassifier, ReleaseNameClassifier};
use crate::config::SelectionConfig;
use crate::types::{DownloadFile, MediaKind};

/// Picks the file an item should adopt from a download's contents
///
/// Files pass through two gates in order: a size gate that removes
/// below-threshold entries (and, when configured, oversize ones), then a
/// classification gate that keeps only files matching the item's kind. The
/// first file to pass both wins; provider-reported order is preserved, so
/// selection over the same listing is deterministic.
#[derive(Clone)]
pub struct FileSelector {
    min_file_size: u64,
    max_file_size: Option<u64>,
    classifier: Arc<dyn MediaClassifier>,
}

impl FileSelector {
    /// Create a selector with the default release-name classifier
    #[must_use]
    pub fn new(config: &SelectionConfig) -> Self {
        Self::with_classifier(config, Arc::new(ReleaseNameClassifier))
    }

    /// Create a selector with a caller-supplied classifier
    #[must_use]
    pub fn with_classifier(
        config: &SelectionConfig,
        classifier: Arc<dyn MediaClassifier>,
    ) -> Self {
        Self {
            min_file_size: config.min_file_size,
            max_file_size: config.max_file_size,
            classifier,
        }
    }

    /// First file that passes the size gate and matches `kind`
    ///
    /// The size gate is strict: a file of exactly the minimum size is
    /// rejected. The optional maximum is inclusive.
    pub fn select<'a>(&self, files: &'a [DownloadFile], kind: MediaKind) -> Option<&'a DownloadFile> {
        let selected = files
            .iter()
            .filter(|file| self.passes_size_gate(file))
            .find(|file| self.classifier.classify(&file.short_name).matches(kind));

        match selected {
            Some(file) => {
                debug!(
                    short_name = %file.short_name,
                    size = file.size,
                    kind = %kind,
                    "selected file"
                );
            }
            None => {
                debug!(candidates = files.len(), kind = %kind, "no selectable file");
            }
        }
        selected
    }

    fn passes_size_gate(&self, file: &DownloadFile) -> bool {
        if file.size <= self.min_file_size {
            return false;
        }
        match self.max_file_size {
            Some(max) => file.size <= max,
            None => true,
        }
    }
}
