//! Track metadata model
//!
//! Tracks are immutable values once constructed; equality is by id only so
//! that a backfilled copy (artwork added later) still compares equal to the
//! queue entry it came from.

use serde::{Deserialize, Serialize};

/// Remote catalogue id of a track
pub type TrackId = u64;

/// Credited artist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: u64,
    pub name: String,
}

/// Album a track belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub artwork_url: Option<String>,
}

/// Playable track reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub album: Album,
    /// Duration from catalogue metadata (0 if unknown)
    #[serde(default)]
    pub duration_seconds: f64,
    #[serde(default)]
    pub artwork_url: Option<String>,
}

impl Track {
    /// Minimal track with only id and title
    pub fn new(id: TrackId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            artists: Vec::new(),
            album: Album::default(),
            duration_seconds: 0.0,
            artwork_url: None,
        }
    }

    /// Artwork for display: track artwork, else album artwork
    pub fn display_artwork(&self) -> Option<&str> {
        self.artwork_url
            .as_deref()
            .or(self.album.artwork_url.as_deref())
    }

    /// Whether a detail lookup could fill in missing display metadata
    pub fn needs_backfill(&self) -> bool {
        self.display_artwork().is_none()
    }

    /// Artist names in credit order
    pub fn artist_names(&self) -> Vec<String> {
        self.artists.iter().map(|a| a.name.clone()).collect()
    }

    /// Fill artwork, album and artists from a detail record of the same track
    ///
    /// Title and duration are kept; a detail record for a different id is ignored.
    pub fn backfilled_from(mut self, detail: Track) -> Self {
        if detail.id != self.id {
            return self;
        }
        if self.artwork_url.is_none() {
            self.artwork_url = detail.display_artwork().map(str::to_string);
        }
        if !detail.album.name.is_empty() || detail.album.artwork_url.is_some() {
            self.album = detail.album;
        }
        if !detail.artists.is_empty() {
            self.artists = detail.artists;
        }
        if self.duration_seconds <= 0.0 {
            self.duration_seconds = detail.duration_seconds;
        }
        self
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_is_by_id() {
        let a = Track::new(1, "First");
        let mut b = Track::new(1, "Renamed");
        b.duration_seconds = 99.0;
        assert_eq!(a, b);
        assert_ne!(a, Track::new(2, "First"));
    }

    #[test]
    fn test_backfill_fills_missing_artwork_and_album() {
        let track = Track::new(7, "Song");
        assert!(track.needs_backfill());

        let detail = Track {
            id: 7,
            title: "Song (detail)".to_string(),
            artists: vec![Artist { id: 3, name: "Singer".to_string() }],
            album: Album {
                id: 9,
                name: "Record".to_string(),
                artwork_url: Some("http://img/9.jpg".to_string()),
            },
            duration_seconds: 201.5,
            artwork_url: None,
        };

        let filled = track.backfilled_from(detail);
        assert_eq!(filled.title, "Song");
        assert_eq!(filled.display_artwork(), Some("http://img/9.jpg"));
        assert_eq!(filled.album.name, "Record");
        assert_eq!(filled.artist_names(), vec!["Singer".to_string()]);
        assert_eq!(filled.duration_seconds, 201.5);
        assert!(!filled.needs_backfill());
    }

    #[test]
    fn test_backfill_ignores_other_track() {
        let track = Track::new(1, "Song");
        let filled = track.backfilled_from(Track::new(2, "Other"));
        assert!(filled.needs_backfill());
    }
}
