//! Track resolver boundary
//!
//! The engine asks a [`TrackResolver`] for everything that lives on the
//! catalogue server: stream URLs, lyrics, personal radio batches, dislike
//! reports and (optionally) richer track metadata. The production
//! implementation talks HTTP; tests script it.

pub mod http;

pub use crate::lyrics::LyricText;
pub use http::HttpTrackResolver;

use crate::error::Result;
use crate::track::{Track, TrackId};
use async_trait::async_trait;
use nwp_common::QualityTier;

/// Playable stream for a track
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub url: String,
    /// Delivered bitrate in bits/s when the server reports it
    pub bitrate: Option<u32>,
}

#[async_trait]
pub trait TrackResolver: Send + Sync {
    /// Stream URL at the requested quality tier
    ///
    /// An `Ok` with an empty URL is treated by the engine like an error.
    async fn resolve_stream(&self, id: TrackId, quality: QualityTier) -> Result<StreamInfo>;

    /// Time-tagged lyrics; `Ok(None)` when the track has none
    async fn fetch_lyrics(&self, id: TrackId) -> Result<Option<LyricText>>;

    /// Next personal radio batch (may be empty)
    async fn fetch_radio_batch(&self) -> Result<Vec<Track>>;

    /// Tell the server the user dislikes a radio track
    async fn report_dislike(&self, id: TrackId) -> Result<()>;

    /// Full metadata for a track, used to backfill missing artwork
    async fn fetch_track_detail(&self, _id: TrackId) -> Result<Option<Track>> {
        Ok(None)
    }
}
