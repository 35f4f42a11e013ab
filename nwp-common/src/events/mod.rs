//! Event types for the NeWPlayer event system
//!
//! Provides the shared `PlayerEvent` enum and the `EventBus` used by the
//! engine to notify observers (SSE clients, now-playing surfaces).

// Sub-modules (supporting types)
mod playback_types;
mod queue_types;
mod shared_types;

pub use playback_types::{PlaybackMode, PlaybackState, QualityTier};
pub use queue_types::QueueChangeTrigger;
pub use shared_types::{FailureKind, NowPlayingInfo};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// NeWPlayer event types
///
/// Events are broadcast via EventBus and can be serialized for SSE transmission.
/// Observers never mutate engine state; they only react to these notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// Transport state changed
    ///
    /// Triggers:
    /// - SSE: Update UI controls (Loading renders as a spinner)
    /// - Now-playing surface: Update play/pause indicator
    PlaybackStateChanged {
        /// State before change
        old_state: PlaybackState,
        /// State after change
        new_state: PlaybackState,
        /// When state changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Track loaded successfully and assigned to the output
    ///
    /// Triggers:
    /// - SSE: Update now-playing display
    /// - History: Record play
    TrackStarted {
        /// Track id that was loaded
        track_id: u64,
        /// Queue index of the track
        index: usize,
        /// Track title for display
        title: String,
        /// When the track became ready
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Track could not be played and was recorded in the failed set
    ///
    /// Auto-advance follows after the recovery delay unless an explicit
    /// intent arrives first.
    TrackFailed {
        /// Track id that failed
        track_id: u64,
        /// Resolution or output failure
        kind: FailureKind,
        /// Human readable cause
        message: String,
        /// When the failure was observed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback progress update
    ///
    /// Emitted on every position tick from the output.
    PlaybackProgress {
        /// Currently playing track id
        track_id: u64,
        /// Current position (seconds)
        position_seconds: f64,
        /// Track duration (seconds, 0 if unknown)
        duration_seconds: f64,
        /// Progress update timestamp
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Queue changed
    QueueChanged {
        /// Queue track ids in order
        track_ids: Vec<u64>,
        /// Cursor index after the change (None = no current track)
        current_index: Option<usize>,
        /// Why queue changed
        trigger: QueueChangeTrigger,
        /// When queue changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback mode changed
    ModeChanged {
        old_mode: PlaybackMode,
        new_mode: PlaybackMode,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Volume or mute changed
    VolumeChanged {
        /// Volume (0.0-1.0)
        volume: f64,
        /// Whether output is muted
        muted: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Stream quality tier changed
    QualityChanged {
        quality: QualityTier,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Active lyric line changed
    LyricLineChanged {
        /// Index into the lyric table (None = before first line or no lyrics)
        index: Option<usize>,
        /// Primary text of the active line
        text: Option<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Now-playing metadata published
    ///
    /// This is the outbound side of the now-playing surface.
    NowPlayingChanged {
        info: NowPlayingInfo,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Output started or stopped waiting for data
    BufferingChanged {
        buffering: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Personal radio entered or left
    RadioStateChanged {
        /// Whether personal radio is active after the change
        active: bool,
        /// True when the feed ran dry and radio was exited
        exhausted: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PlayerEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            PlayerEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            PlayerEvent::TrackStarted { .. } => "TrackStarted",
            PlayerEvent::TrackFailed { .. } => "TrackFailed",
            PlayerEvent::PlaybackProgress { .. } => "PlaybackProgress",
            PlayerEvent::QueueChanged { .. } => "QueueChanged",
            PlayerEvent::ModeChanged { .. } => "ModeChanged",
            PlayerEvent::VolumeChanged { .. } => "VolumeChanged",
            PlayerEvent::QualityChanged { .. } => "QualityChanged",
            PlayerEvent::LyricLineChanged { .. } => "LyricLineChanged",
            PlayerEvent::NowPlayingChanged { .. } => "NowPlayingChanged",
            PlayerEvent::BufferingChanged { .. } => "BufferingChanged",
            PlayerEvent::RadioStateChanged { .. } => "RadioStateChanged",
        }
    }
}

/// Central event distribution bus
///
/// Thin wrapper over a tokio broadcast channel. Slow subscribers lag and
/// lose the oldest events rather than blocking the engine.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PlayerEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use nwp_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(256);
    /// assert_eq!(event_bus.capacity(), 256);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: PlayerEvent,
    ) -> Result<usize, broadcast::error::SendError<PlayerEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: PlayerEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
