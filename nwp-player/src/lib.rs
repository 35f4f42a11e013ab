//! # NeWPlayer Engine Library (nwp-player)
//!
//! Playback engine for a streaming music client.
//!
//! **Purpose:** Own the play queue and transport state, resolve tracks to
//! stream URLs, advance past unplayable tracks, drive personal radio, keep
//! lyrics in sync with playback and persist the session across restarts.
//!
//! **Architecture:** A single engine task receives intents over a channel
//! and publishes status snapshots and `PlayerEvent`s. Network access goes
//! through the `TrackResolver` seam, audio through `AudioOutput`, storage
//! through `StateStore`.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod lyrics;
pub mod now_playing;
pub mod persistence;
pub mod playback;
pub mod resolver;
pub mod track;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use playback::{PlayerEngine, PlayerStatus};
pub use track::{Track, TrackId};
