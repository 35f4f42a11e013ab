//! Shared type definitions for event data

use serde::{Deserialize, Serialize};

/// Metadata published to the now-playing surface
///
/// Sent on every metadata or transport change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NowPlayingInfo {
    pub title: String,
    /// Artist names in credit order
    pub artists: Vec<String>,
    pub album_name: String,
    pub artwork_url: Option<String>,
    pub duration_seconds: f64,
    pub position_seconds: f64,
    pub is_playing: bool,
}

/// Why a track could not be played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No playable stream URL
    Resolution,
    /// Output reported a decode or network error
    Output,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Resolution => write!(f, "resolution"),
            FailureKind::Output => write!(f, "output"),
        }
    }
}
