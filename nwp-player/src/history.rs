//! Recently played tracks
//!
//! Most-recent-first list, one entry per track id, bounded capacity.

use crate::track::Track;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct PlayHistory {
    entries: VecDeque<Track>,
    capacity: usize,
}

impl PlayHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(128)),
            capacity: capacity.max(1),
        }
    }

    /// Rebuild from persisted entries (newest first), enforcing the invariants
    pub fn from_entries(entries: Vec<Track>, capacity: usize) -> Self {
        let mut history = Self::new(capacity);
        for track in entries.into_iter().rev() {
            history.record(track);
        }
        history
    }

    /// Move `track` to the front, dropping the oldest entry past capacity
    pub fn record(&mut self, track: Track) {
        self.entries.retain(|t| t.id != track.id);
        self.entries.push_front(track);
        self.entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> Vec<Track> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(h: &PlayHistory) -> Vec<u64> {
        h.entries().iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_record_moves_to_front_without_duplicates() {
        let mut h = PlayHistory::new(10);
        h.record(Track::new(1, "a"));
        h.record(Track::new(2, "b"));
        h.record(Track::new(1, "a"));
        assert_eq!(ids(&h), vec![1, 2]);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut h = PlayHistory::new(2);
        for id in 1..=3 {
            h.record(Track::new(id, "t"));
        }
        assert_eq!(ids(&h), vec![3, 2]);
    }

    #[test]
    fn test_from_entries_preserves_order() {
        let stored = vec![Track::new(5, "e"), Track::new(4, "d"), Track::new(5, "dup")];
        let h = PlayHistory::from_entries(stored, 10);
        assert_eq!(ids(&h), vec![5, 4]);
    }
}
