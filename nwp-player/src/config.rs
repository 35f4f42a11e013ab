//! Engine tuning parameters
//!
//! Bootstrap settings (database path, port, API server) live in
//! `nwp_common::config::TomlConfig`; runtime preferences (volume, mode,
//! quality) live in the `settings` table. This struct holds the timing
//! constants the engine itself needs, with defaults that match normal use.
//! Tests construct it with much shorter delays.

use nwp_common::QualityTier;
use std::time::Duration;

/// Tuning knobs for the playback engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Delay between a failed track and the automatic advance
    pub failure_recovery_delay: Duration,

    /// Minimum interval between snapshot writes caused by position ticks
    pub snapshot_interval: Duration,

    /// Maximum entries kept in play history
    pub history_capacity: usize,

    /// Event bus channel capacity
    pub event_capacity: usize,

    /// Step used by remote seek commands that carry no explicit offset
    pub seek_step_seconds: f64,

    /// Quality tier used when no preference has been stored
    pub default_quality: QualityTier,

    /// Volume used when no preference has been stored
    pub default_volume: f64,

    /// Consecutive failures after which personal radio gives up
    pub radio_failure_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            failure_recovery_delay: Duration::from_millis(1000),
            snapshot_interval: Duration::from_millis(1000),
            history_capacity: 100,
            event_capacity: 256,
            seek_step_seconds: 10.0,
            default_quality: QualityTier::ExHigh,
            default_volume: 0.8,
            radio_failure_limit: 10,
        }
    }
}
