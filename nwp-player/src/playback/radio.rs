//! Personal radio feed bookkeeping
//!
//! Tracks whether radio is active, which fetch session is current, the ids
//! already delivered this session and the prefetched lookahead batch. The
//! engine performs the actual fetches and queue mutations; this type only
//! answers "is this batch still wanted" and "what should be appended".

use crate::track::{Track, TrackId};
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct RadioFeed {
    active: bool,
    /// Bumped on every start/stop so late batches from an old session are dropped
    session: u64,
    history: HashSet<TrackId>,
    lookahead: Option<Vec<Track>>,
    fetch_in_flight: bool,
}

impl RadioFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    /// Enter radio mode with a fresh fetch session
    ///
    /// Delivery history is kept: it spans the whole process session.
    pub fn start(&mut self) -> u64 {
        self.active = true;
        self.session += 1;
        self.lookahead = None;
        self.fetch_in_flight = false;
        self.session
    }

    /// Leave radio mode, discarding any prefetched batch
    pub fn stop(&mut self) {
        self.active = false;
        self.session += 1;
        self.lookahead = None;
        self.fetch_in_flight = false;
    }

    /// Whether a batch fetched under `session` should still be used
    pub fn accepts(&self, session: u64) -> bool {
        self.active && session == self.session
    }

    /// Claim the single fetch slot; returns the session to tag the fetch with
    pub fn begin_fetch(&mut self) -> Option<u64> {
        if !self.active || self.fetch_in_flight {
            return None;
        }
        self.fetch_in_flight = true;
        Some(self.session)
    }

    pub fn fetch_in_flight(&self) -> bool {
        self.fetch_in_flight
    }

    pub fn finish_fetch(&mut self) {
        self.fetch_in_flight = false;
    }

    pub fn take_lookahead(&mut self) -> Option<Vec<Track>> {
        self.lookahead.take()
    }

    pub fn store_lookahead(&mut self, batch: Vec<Track>) {
        self.lookahead = Some(batch);
    }

    pub fn has_lookahead(&self) -> bool {
        self.lookahead.is_some()
    }

    /// Record an id as delivered (played or trashed)
    pub fn remember(&mut self, id: TrackId) {
        self.history.insert(id);
    }

    pub fn has_delivered(&self, id: TrackId) -> bool {
        self.history.contains(&id)
    }

    /// Drop already-delivered tracks from a batch and record the rest
    ///
    /// Best effort: if every track was delivered before, the raw batch is
    /// returned so the feed does not stall on a server that repeats itself.
    pub fn admit(&mut self, batch: Vec<Track>) -> Vec<Track> {
        let fresh: Vec<Track> = batch
            .iter()
            .filter(|t| !self.history.contains(&t.id))
            .cloned()
            .collect();
        let admitted = if fresh.is_empty() { batch } else { fresh };
        for track in &admitted {
            self.history.insert(track.id);
        }
        admitted
    }
}
