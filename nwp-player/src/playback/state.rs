//! Observable player status
//!
//! The engine publishes a fresh `PlayerStatus` through a `watch` channel
//! after every mutation. Readers get a consistent copy; nothing outside the
//! engine can change it.

use crate::lyrics::LyricLine;
use crate::track::{Track, TrackId};
use nwp_common::{PlaybackMode, PlaybackState, QualityTier};
use serde::Serialize;

/// Snapshot of everything a UI needs to render the player
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerStatus {
    pub state: PlaybackState,
    pub mode: PlaybackMode,
    pub quality: QualityTier,
    pub queue: Vec<Track>,
    /// Cursor index (None = no current track)
    pub current_index: Option<usize>,
    pub current_track: Option<Track>,
    pub position_seconds: f64,
    pub duration_seconds: f64,
    /// 0-100, 0 when duration is unknown
    pub progress_percent: f64,
    pub volume: f64,
    pub muted: bool,
    pub buffering: bool,
    pub lyrics: Vec<LyricLine>,
    pub lyric_index: Option<usize>,
    pub radio_active: bool,
    pub failed_track_ids: Vec<TrackId>,
}

impl PlayerStatus {
    /// Whether audio is (or is about to be) audible
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Text of the active lyric line
    pub fn current_lyric(&self) -> Option<&str> {
        self.lyric_index
            .and_then(|i| self.lyrics.get(i))
            .map(|l| l.text.as_str())
    }
}

/// Percentage of `position` through `duration`
pub fn progress_percent(position: f64, duration: f64) -> f64 {
    if duration <= 0.0 {
        return 0.0;
    }
    (position / duration * 100.0).clamp(0.0, 100.0)
}
