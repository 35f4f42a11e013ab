//! Play queue bookkeeping
//!
//! **Responsibilities:**
//! - Ordered track list with duplicate ids collapsed on insert
//! - Cursor (current index) kept pointing at the same logical track across
//!   removals
//! - Failed-track set for the current session
//!
//! Pure data structure: no I/O, no events. The engine owns the only instance.

use crate::track::{Track, TrackId};
use std::collections::HashSet;

/// Result of removing an entry
#[derive(Debug, Clone)]
pub struct Removal {
    /// The removed track
    pub track: Track,
    /// Index the track occupied
    pub index: usize,
    /// Whether the removed entry was the current one
    pub was_current: bool,
}

/// Play queue with cursor and failed set
#[derive(Debug, Default, Clone)]
pub struct PlayQueue {
    tracks: Vec<Track>,
    cursor: Option<usize>,
    failed: HashSet<TrackId>,
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn ids(&self) -> Vec<TrackId> {
        self.tracks.iter().map(|t| t.id).collect()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Current index (None = no current track)
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&Track> {
        self.cursor.and_then(|i| self.tracks.get(i))
    }

    pub fn position_of(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    /// Move the cursor; out-of-range indices are rejected
    pub fn set_cursor(&mut self, cursor: Option<usize>) -> bool {
        match cursor {
            Some(i) if i >= self.tracks.len() => false,
            _ => {
                self.cursor = cursor;
                true
            }
        }
    }

    /// Replace the whole queue; cursor and failed set are reset
    ///
    /// Duplicate ids are collapsed, first occurrence wins.
    pub fn replace(&mut self, tracks: Vec<Track>) {
        let mut seen = HashSet::new();
        self.tracks = tracks.into_iter().filter(|t| seen.insert(t.id)).collect();
        self.cursor = None;
        self.failed.clear();
    }

    /// Index of `track`, inserting it right after the cursor if absent
    ///
    /// The cursor itself is not moved.
    pub fn locate_or_insert(&mut self, track: Track) -> usize {
        if let Some(index) = self.position_of(track.id) {
            return index;
        }
        let index = self.cursor.map_or(0, |c| c + 1);
        self.tracks.insert(index, track);
        index
    }

    /// Append if not already present; returns whether the queue changed
    pub fn append(&mut self, track: Track) -> bool {
        if self.position_of(track.id).is_some() {
            return false;
        }
        self.tracks.push(track);
        true
    }

    /// Append several tracks, skipping ids already queued
    ///
    /// Returns the index of the first appended track, if any.
    pub fn append_batch(&mut self, tracks: Vec<Track>) -> Option<usize> {
        let first = self.tracks.len();
        for track in tracks {
            self.append(track);
        }
        (self.tracks.len() > first).then_some(first)
    }

    /// Remove the entry at `index`, keeping the cursor on the same track
    ///
    /// Removing the current entry leaves the cursor on the entry before it
    /// (None when it was the first), so a sequential advance lands on the
    /// track that shifted into the removed slot.
    pub fn remove(&mut self, index: usize) -> Option<Removal> {
        if index >= self.tracks.len() {
            return None;
        }
        let track = self.tracks.remove(index);
        let was_current = self.cursor == Some(index);

        self.cursor = match self.cursor {
            Some(c) if c == index => index.checked_sub(1),
            Some(c) if c > index => Some(c - 1),
            other => other,
        };

        Some(Removal {
            track,
            index,
            was_current,
        })
    }

    /// Remove by track id
    pub fn remove_id(&mut self, id: TrackId) -> Option<Removal> {
        let index = self.position_of(id)?;
        self.remove(index)
    }

    /// Empty the queue, reset the cursor and forget failures
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.cursor = None;
        self.failed.clear();
    }

    /// Swap in an updated copy of the track at `index` (same id only)
    pub fn update_track(&mut self, index: usize, track: Track) -> bool {
        match self.tracks.get_mut(index) {
            Some(slot) if slot.id == track.id => {
                *slot = track;
                true
            }
            _ => false,
        }
    }

    /// First index after the cursor, if the queue extends past it
    pub fn next_after_cursor(&self) -> Option<usize> {
        let next = self.cursor.map_or(0, |c| c + 1);
        (next < self.tracks.len()).then_some(next)
    }

    pub fn mark_failed(&mut self, id: TrackId) {
        self.failed.insert(id);
    }

    pub fn clear_failed(&mut self, id: TrackId) {
        self.failed.remove(&id);
    }

    pub fn is_failed(&self, id: TrackId) -> bool {
        self.failed.contains(&id)
    }

    /// True when the queue is non-empty and every entry has failed
    pub fn all_failed(&self) -> bool {
        !self.tracks.is_empty() && self.tracks.iter().all(|t| self.failed.contains(&t.id))
    }

    /// Failed ids, sorted for stable output
    pub fn failed_ids(&self) -> Vec<TrackId> {
        let mut ids: Vec<_> = self.failed.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Failed flags aligned with queue order
    pub fn failed_mask(&self) -> Vec<bool> {
        self.tracks.iter().map(|t| self.failed.contains(&t.id)).collect()
    }
}
