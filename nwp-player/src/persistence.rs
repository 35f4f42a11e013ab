//! Session persistence
//!
//! **Responsibilities:**
//! - `PersistedSnapshot`: the whole-session record (queue, cursor, lyric
//!   table and cursor, playing intent) stored under a single key
//! - Scalar preferences (volume, mode, quality) and play history stored
//!   under their own keys so a queue clear leaves them intact
//! - `StateStore` seam so the engine can run against SQLite or a test double

use crate::db::settings::{self, PLAYER_STATE_KEY, PLAY_HISTORY_KEY};
use crate::error::Result;
use crate::lyrics::LyricLine;
use crate::track::Track;
use async_trait::async_trait;
use nwp_common::{PlaybackMode, QualityTier};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use tracing::warn;

/// Current snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Durable record of a playback session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    pub version: u32,
    pub queue: Vec<Track>,
    /// Cursor index (None = no current track)
    pub index: Option<usize>,
    pub position_seconds: f64,
    pub duration_seconds: f64,
    /// Whether audio was playing when the snapshot was taken
    ///
    /// Informational only: restore always comes back paused.
    pub is_playing: bool,
    #[serde(default)]
    pub lyrics: Vec<LyricLine>,
    #[serde(default)]
    pub lyric_index: Option<usize>,
}

impl PersistedSnapshot {
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a stored snapshot
    ///
    /// Undecodable JSON and unknown versions are logged and read as "no
    /// snapshot". An out-of-range cursor is dropped rather than rejected.
    pub fn decode(raw: &str) -> Option<Self> {
        let mut snapshot: PersistedSnapshot = match serde_json::from_str(raw) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Discarding undecodable player snapshot");
                return None;
            }
        };

        if snapshot.version != SNAPSHOT_VERSION {
            warn!(
                version = snapshot.version,
                expected = SNAPSHOT_VERSION,
                "Discarding player snapshot with unknown version"
            );
            return None;
        }

        if snapshot.index.is_some_and(|i| i >= snapshot.queue.len()) {
            snapshot.index = None;
        }
        if snapshot
            .lyric_index
            .is_some_and(|i| i >= snapshot.lyrics.len())
        {
            snapshot.lyric_index = None;
        }
        Some(snapshot)
    }
}

/// Independently persisted scalar preferences
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preferences {
    pub volume: f64,
    pub mode: PlaybackMode,
    pub quality: QualityTier,
}

/// Durable storage used by the engine
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load_snapshot(&self) -> Result<Option<PersistedSnapshot>>;

    /// Whole-object overwrite of the snapshot key
    async fn save_snapshot(&self, snapshot: &PersistedSnapshot) -> Result<()>;

    async fn clear_snapshot(&self) -> Result<()>;

    /// Stored preferences, with `defaults` filling anything missing
    async fn load_preferences(&self, defaults: Preferences) -> Result<Preferences>;

    async fn save_volume(&self, volume: f64) -> Result<()>;

    async fn save_mode(&self, mode: PlaybackMode) -> Result<()>;

    async fn save_quality(&self, quality: QualityTier) -> Result<()>;

    /// Play history, newest first
    async fn load_history(&self) -> Result<Vec<Track>>;

    async fn save_history(&self, history: &[Track]) -> Result<()>;
}

/// `StateStore` over the SQLite `settings` table
#[derive(Clone)]
pub struct SqliteStateStore {
    db: Pool<Sqlite>,
}

impl SqliteStateStore {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StateStore for SqliteStateStore {
    async fn load_snapshot(&self) -> Result<Option<PersistedSnapshot>> {
        let raw = settings::get_setting::<String>(&self.db, PLAYER_STATE_KEY).await?;
        Ok(raw.as_deref().and_then(PersistedSnapshot::decode))
    }

    async fn save_snapshot(&self, snapshot: &PersistedSnapshot) -> Result<()> {
        settings::set_setting(&self.db, PLAYER_STATE_KEY, snapshot.encode()?).await
    }

    async fn clear_snapshot(&self) -> Result<()> {
        settings::delete_setting(&self.db, PLAYER_STATE_KEY).await
    }

    async fn load_preferences(&self, defaults: Preferences) -> Result<Preferences> {
        let volume = settings::get_volume(&self.db, defaults.volume)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Using default volume");
                defaults.volume
            });
        let mode = settings::get_play_mode(&self.db)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Using default playback mode");
                defaults.mode
            });
        let quality = settings::get_quality_tier(&self.db, defaults.quality)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Using default quality tier");
                defaults.quality
            });

        Ok(Preferences {
            volume,
            mode,
            quality,
        })
    }

    async fn save_volume(&self, volume: f64) -> Result<()> {
        settings::set_volume(&self.db, volume).await
    }

    async fn save_mode(&self, mode: PlaybackMode) -> Result<()> {
        settings::set_play_mode(&self.db, mode).await
    }

    async fn save_quality(&self, quality: QualityTier) -> Result<()> {
        settings::set_quality_tier(&self.db, quality).await
    }

    async fn load_history(&self) -> Result<Vec<Track>> {
        let Some(raw) = settings::get_setting::<String>(&self.db, PLAY_HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(history) => Ok(history),
            Err(e) => {
                warn!(error = %e, "Discarding undecodable play history");
                Ok(Vec::new())
            }
        }
    }

    async fn save_history(&self, history: &[Track]) -> Result<()> {
        let raw = serde_json::to_string(history)?;
        settings::set_setting(&self.db, PLAY_HISTORY_KEY, raw).await
    }
}
