//! Media locators and protocol sniffing

use serde::{Deserialize, Serialize};

/// File extension of adaptive streaming manifests
pub const MANIFEST_EXTENSION: &str = "m3u8";

/// What the host wants played
///
/// Immutable once bound; binding a different source rebuilds everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSource {
    pub locator: String,
    pub poster_image: Option<String>,
    pub display_title: String,
}

impl MediaSource {
    pub fn new(locator: impl Into<String>, display_title: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            poster_image: None,
            display_title: display_title.into(),
        }
    }

    pub fn with_poster(mut self, poster_image: impl Into<String>) -> Self {
        self.poster_image = Some(poster_image.into());
        self
    }

    pub fn is_segmented(&self) -> bool {
        is_segmented_locator(&self.locator)
    }
}

/// Whether a locator names a segmented (manifest-based) stream
///
/// Only the path's extension matters; query strings and fragments are
/// ignored and the comparison is case-insensitive.
pub fn is_segmented_locator(locator: &str) -> bool {
    let path = locator
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    match path.rsplit_once('.') {
        Some((_, extension)) => extension.eq_ignore_ascii_case(MANIFEST_EXTENSION),
        None => false,
    }
}
