//! Playback-related type definitions
//!
//! Supporting enums for transport state, play-order mode and stream quality.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Transport lifecycle state
///
/// The internal "failed" pseudo-state is never published; a failed load
/// goes straight into auto-advance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// No current track
    #[default]
    Idle,
    /// Resolving a stream and waiting for the output to become ready
    Loading,
    Playing,
    Paused,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "idle"),
            PlaybackState::Loading => write!(f, "loading"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
        }
    }
}

/// Play-order policy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    #[default]
    Sequential,
    Random,
    /// Single-track repeat
    Loop,
    /// Server-fed infinite queue
    PersonalRadio,
}

impl PlaybackMode {
    /// Next mode in the user-facing rotation (Sequential → Random → Loop → Sequential).
    ///
    /// PersonalRadio is not part of the rotation and maps to itself.
    pub fn cycled(self) -> Self {
        match self {
            PlaybackMode::Sequential => PlaybackMode::Random,
            PlaybackMode::Random => PlaybackMode::Loop,
            PlaybackMode::Loop => PlaybackMode::Sequential,
            PlaybackMode::PersonalRadio => PlaybackMode::PersonalRadio,
        }
    }
}

impl std::fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackMode::Sequential => write!(f, "sequential"),
            PlaybackMode::Random => write!(f, "random"),
            PlaybackMode::Loop => write!(f, "loop"),
            PlaybackMode::PersonalRadio => write!(f, "personal_radio"),
        }
    }
}

impl FromStr for PlaybackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sequential" => Ok(PlaybackMode::Sequential),
            "random" => Ok(PlaybackMode::Random),
            "loop" => Ok(PlaybackMode::Loop),
            "personal_radio" => Ok(PlaybackMode::PersonalRadio),
            other => Err(format!("unknown playback mode: {}", other)),
        }
    }
}

/// Stream quality tier requested from the resolver
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Standard,
    Higher,
    #[default]
    ExHigh,
    Lossless,
}

impl QualityTier {
    /// Requested bitrate in bits per second
    pub fn bitrate(self) -> u32 {
        match self {
            QualityTier::Standard => 128_000,
            QualityTier::Higher => 192_000,
            QualityTier::ExHigh => 320_000,
            QualityTier::Lossless => 999_000,
        }
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityTier::Standard => write!(f, "standard"),
            QualityTier::Higher => write!(f, "higher"),
            QualityTier::ExHigh => write!(f, "exhigh"),
            QualityTier::Lossless => write!(f, "lossless"),
        }
    }
}

impl FromStr for QualityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(QualityTier::Standard),
            "higher" => Ok(QualityTier::Higher),
            "exhigh" => Ok(QualityTier::ExHigh),
            "lossless" => Ok(QualityTier::Lossless),
            other => Err(format!("unknown quality tier: {}", other)),
        }
    }
}
