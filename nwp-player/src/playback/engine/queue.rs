//! Queue intents
//!
//! **Responsibilities:**
//! - Play a specific track or index, next/prev through the sequencing policy
//! - Playlist replacement, append, removal and clear
//! - QueueChanged emission with the trigger that caused it
//!
//! Out-of-range indices and operations on an empty queue are no-ops that
//! reply `Ok(())`.

use super::core::{EngineCore, LoadIntent};
use super::Reply;
use crate::playback::sequencing::{next_index, prev_index};
use crate::track::Track;
use nwp_common::events::QueueChangeTrigger;
use nwp_common::{PlaybackMode, PlaybackState};
use tracing::{debug, info, warn};

impl EngineCore {
    /// Play `track`, inserting it after the current entry when not queued
    pub(super) async fn play(&mut self, track: Track, autostart: bool, reply: Reply<()>) {
        let known = self.queue.position_of(track.id).is_some();
        let index = self.queue.locate_or_insert(track);
        if !known {
            self.emit_queue_changed(QueueChangeTrigger::UserPlay);
        }
        self.begin_load(index, LoadIntent::autostart(autostart), Some(reply))
            .await;
    }

    pub(super) async fn play_at(&mut self, index: usize, reply: Reply<()>) {
        if index >= self.queue.len() {
            debug!(index, len = self.queue.len(), "play_at index out of range");
            let _ = reply.send(Ok(()));
            return;
        }
        self.begin_load(index, LoadIntent::autostart(true), Some(reply))
            .await;
    }

    /// Explicit next; `reply` is None when triggered internally
    pub(super) async fn next(&mut self, reply: Option<Reply<()>>) {
        if self.radio.is_active() {
            self.radio_advance(true, reply).await;
            return;
        }

        match next_index(self.queue.len(), self.queue.cursor(), self.mode, &mut self.rng) {
            Some(index) => {
                self.begin_load(index, LoadIntent::autostart(true), reply)
                    .await
            }
            None => {
                debug!("next ignored, queue is empty");
                if let Some(reply) = reply {
                    let _ = reply.send(Ok(()));
                }
            }
        }
    }

    pub(super) async fn prev(&mut self, reply: Reply<()>) {
        if self.radio.is_active() {
            debug!("prev ignored in personal radio");
            let _ = reply.send(Ok(()));
            return;
        }

        match prev_index(self.queue.len(), self.queue.cursor(), self.mode, &mut self.rng) {
            Some(index) => {
                self.begin_load(index, LoadIntent::autostart(true), Some(reply))
                    .await
            }
            None => {
                debug!("prev ignored, queue is empty");
                let _ = reply.send(Ok(()));
            }
        }
    }

    /// Replace the queue, leaving radio, and start at `start_index`
    pub(super) async fn set_playlist(&mut self, tracks: Vec<Track>, start_index: usize, reply: Reply<()>) {
        if self.radio.is_active() {
            self.leave_radio(false).await;
            self.change_mode(PlaybackMode::Sequential).await;
        }
        self.interrupt();

        self.queue.replace(tracks);
        self.failure_streak = 0;
        info!(len = self.queue.len(), start_index, "Playlist replaced");
        self.emit_queue_changed(QueueChangeTrigger::PlaylistReplaced);

        if start_index < self.queue.len() {
            self.begin_load(start_index, LoadIntent::autostart(true), Some(reply))
                .await;
        } else {
            self.go_idle().await;
            let _ = reply.send(Ok(()));
        }
    }

    pub(super) async fn add_to_playlist(&mut self, track: Track, reply: Reply<()>) {
        let id = track.id;
        if self.queue.append(track) {
            debug!(track_id = id, "Track appended to queue");
            self.emit_queue_changed(QueueChangeTrigger::UserEnqueue);
            self.publish_status();
            self.write_snapshot(true).await;
        } else {
            debug!(track_id = id, "Track already queued");
        }
        let _ = reply.send(Ok(()));
    }

    /// Remove the entry at `index`
    ///
    /// Removing the current entry advances (Loop replays whatever shifted
    /// into the slot). Replies once the queue is updated; it does not wait
    /// for the follow-up load.
    pub(super) async fn remove_from_playlist(&mut self, index: usize, reply: Reply<()>) {
        let Some(removal) = self.queue.remove(index) else {
            debug!(index, "remove index out of range");
            let _ = reply.send(Ok(()));
            return;
        };
        let _ = reply.send(Ok(()));

        debug!(track_id = removal.track.id, index, "Track removed from queue");
        self.emit_queue_changed(QueueChangeTrigger::UserDequeue);

        if self.queue.is_empty() {
            self.go_idle().await;
            return;
        }

        if removal.was_current {
            if self.mode == PlaybackMode::Loop {
                let index = removal.index.min(self.queue.len() - 1);
                let autostart = self.playing_intent();
                self.begin_load(index, LoadIntent::autostart(autostart), None)
                    .await;
            } else {
                let autostart = self.playing_intent();
                self.advance_after_removal(autostart).await;
            }
            return;
        }

        self.publish_status();
        self.write_snapshot(true).await;
    }

    async fn advance_after_removal(&mut self, autostart: bool) {
        if self.radio.is_active() {
            self.radio_advance(autostart, None).await;
            return;
        }
        match next_index(self.queue.len(), self.queue.cursor(), self.mode, &mut self.rng) {
            Some(index) => {
                self.begin_load(index, LoadIntent::autostart(autostart), None)
                    .await
            }
            None => self.go_idle().await,
        }
    }

    /// Empty the queue and leave radio; preferences are kept
    pub(super) async fn clear(&mut self, reply: Reply<()>) {
        self.interrupt();
        if self.radio.is_active() {
            self.leave_radio(false).await;
            self.change_mode(PlaybackMode::Sequential).await;
        }

        self.queue.clear();
        self.position = 0.0;
        self.duration = 0.0;
        self.lyrics.clear();
        self.lyric_index = None;
        self.failure_streak = 0;
        self.set_state(PlaybackState::Idle);
        info!("Queue cleared");

        self.emit_queue_changed(QueueChangeTrigger::Cleared);
        self.publish_now_playing();
        self.publish_status();
        if let Err(e) = self.store.clear_snapshot().await {
            warn!(error = %e, "Failed to clear player snapshot");
        }
        let _ = reply.send(Ok(()));
    }
}
