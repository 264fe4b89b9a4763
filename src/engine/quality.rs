//! Quality ladder

use serde::{Deserialize, Serialize};

/// Display name bucket for a vertical resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityName {
    #[serde(rename = "4K")]
    Uhd4k,
    #[serde(rename = "1440p")]
    P1440,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "360p")]
    P360,
    #[serde(rename = "240p")]
    P240,
}

impl QualityName {
    /// Bucket a height; anything under 360 lines is "240p"
    pub fn from_height(height: u32) -> Self {
        match height {
            h if h >= 2160 => QualityName::Uhd4k,
            h if h >= 1440 => QualityName::P1440,
            h if h >= 1080 => QualityName::P1080,
            h if h >= 720 => QualityName::P720,
            h if h >= 480 => QualityName::P480,
            h if h >= 360 => QualityName::P360,
            _ => QualityName::P240,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QualityName::Uhd4k => "4K",
            QualityName::P1440 => "1440p",
            QualityName::P1080 => "1080p",
            QualityName::P720 => "720p",
            QualityName::P480 => "480p",
            QualityName::P360 => "360p",
            QualityName::P240 => "240p",
        }
    }
}

impl std::fmt::Display for QualityName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Level as described by the adaptive session, in session order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    pub height: u32,
    pub bitrate: u64,
}

/// One rung of the quality ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QualityLevel {
    pub vertical_resolution: u32,
    pub bitrate: u64,
    pub display_name: QualityName,
}

impl From<LevelInfo> for QualityLevel {
    fn from(info: LevelInfo) -> Self {
        Self {
            vertical_resolution: info.height,
            bitrate: info.bitrate,
            display_name: QualityName::from_height(info.height),
        }
    }
}

/// Requested quality mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum QualitySelection {
    /// Adaptive bitrate selection
    #[default]
    Auto,

    /// Pin a ladder index
    Level(usize),
}

impl QualitySelection {
    /// Parse the host convention where `-1` means automatic
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            -1 => Some(QualitySelection::Auto),
            i if i >= 0 => Some(QualitySelection::Level(i as usize)),
            _ => None,
        }
    }
}

/// Quality ladder ordered by ascending vertical resolution
///
/// The session may list its levels in any order; ladder indices are what the
/// host sees and are translated to session indices at the boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QualityLadder {
    levels: Vec<QualityLevel>,
    session_indices: Vec<usize>,
}

impl QualityLadder {
    pub fn from_session_levels(levels: &[LevelInfo]) -> Self {
        let mut order: Vec<usize> = (0..levels.len()).collect();
        order.sort_by_key(|&i| (levels[i].height, levels[i].bitrate));

        Self {
            levels: order.iter().map(|&i| QualityLevel::from(levels[i])).collect(),
            session_indices: order,
        }
    }

    pub fn levels(&self) -> &[QualityLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&QualityLevel> {
        self.levels.get(index)
    }

    /// Ladder index to session index
    pub fn to_session(&self, index: usize) -> Option<usize> {
        self.session_indices.get(index).copied()
    }

    /// Session index to ladder index
    pub fn from_session(&self, session_index: usize) -> Option<usize> {
        self.session_indices.iter().position(|&i| i == session_index)
    }
}
