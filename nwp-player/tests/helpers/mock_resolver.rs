//! Scripted track resolver

use async_trait::async_trait;
use nwp_common::QualityTier;
use nwp_player::resolver::{LyricText, StreamInfo, TrackResolver};
use nwp_player::track::{Track, TrackId};
use nwp_player::{Error, Result};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Stream URL the mock hands out for a track
pub fn stream_url(id: TrackId) -> String {
    format!("mock://track/{}", id)
}

/// Resolver whose answers are set up by the test
#[derive(Default)]
pub struct MockResolver {
    unresolvable: Mutex<HashSet<TrackId>>,
    delays: Mutex<HashMap<TrackId, Duration>>,
    lyrics: Mutex<HashMap<TrackId, LyricText>>,
    details: Mutex<HashMap<TrackId, Track>>,
    radio_batches: Mutex<VecDeque<Vec<Track>>>,
    resolve_calls: Mutex<Vec<(TrackId, QualityTier)>>,
    lyric_calls: Mutex<Vec<TrackId>>,
    dislikes: Mutex<Vec<TrackId>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make stream resolution fail for `id`
    pub fn fail(&self, id: TrackId) {
        self.unresolvable.lock().unwrap().insert(id);
    }

    /// Delay stream resolution for `id`
    pub fn delay(&self, id: TrackId, delay: Duration) {
        self.delays.lock().unwrap().insert(id, delay);
    }

    pub fn set_lyrics(&self, id: TrackId, primary: &str) {
        self.lyrics.lock().unwrap().insert(
            id,
            LyricText {
                primary: primary.to_string(),
                ..Default::default()
            },
        );
    }

    pub fn set_detail(&self, track: Track) {
        self.details.lock().unwrap().insert(track.id, track);
    }

    /// Queue a radio batch; once the script runs out every fetch is empty
    pub fn push_radio_batch(&self, ids: &[TrackId]) {
        self.radio_batches.lock().unwrap().push_back(tracks(ids));
    }

    pub fn resolve_calls(&self) -> Vec<(TrackId, QualityTier)> {
        self.resolve_calls.lock().unwrap().clone()
    }

    pub fn lyric_calls(&self) -> Vec<TrackId> {
        self.lyric_calls.lock().unwrap().clone()
    }

    pub fn dislikes(&self) -> Vec<TrackId> {
        self.dislikes.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrackResolver for MockResolver {
    async fn resolve_stream(&self, id: TrackId, quality: QualityTier) -> Result<StreamInfo> {
        self.resolve_calls.lock().unwrap().push((id, quality));
        let delay = self.delays.lock().unwrap().get(&id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.unresolvable.lock().unwrap().contains(&id) {
            return Err(Error::Resolution(format!("no stream for {}", id)));
        }
        Ok(StreamInfo {
            url: stream_url(id),
            bitrate: Some(quality.bitrate()),
        })
    }

    async fn fetch_lyrics(&self, id: TrackId) -> Result<Option<LyricText>> {
        self.lyric_calls.lock().unwrap().push(id);
        Ok(self.lyrics.lock().unwrap().get(&id).cloned())
    }

    async fn fetch_radio_batch(&self) -> Result<Vec<Track>> {
        Ok(self.radio_batches.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn report_dislike(&self, id: TrackId) -> Result<()> {
        self.dislikes.lock().unwrap().push(id);
        Ok(())
    }

    async fn fetch_track_detail(&self, id: TrackId) -> Result<Option<Track>> {
        Ok(self.details.lock().unwrap().get(&id).cloned())
    }
}

/// Minimal tracks named after their ids
pub fn tracks(ids: &[TrackId]) -> Vec<Track> {
    ids.iter().map(|&id| Track::new(id, format!("Track {}", id))).collect()
}
