//! # NeWPlayer Common Library
//!
//! Shared code for the player engine and the front ends that talk to it:
//! - Event types (`PlayerEvent`) and the `EventBus`
//! - Playback supporting enums (state, mode, quality tier)
//! - Bootstrap configuration loading
//! - Database initialization
//! - Time helpers

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod time;

pub use error::{Error, Result};
pub use events::{EventBus, PlaybackMode, PlaybackState, PlayerEvent, QualityTier};
