//! Personal radio intents
//!
//! Radio extends the queue with server-fed batches. At most one batch fetch
//! is in flight; a batch that arrives while nothing is waiting for it is kept
//! as lookahead for the next advance. Batches from a stopped or restarted
//! session are dropped by session number.

use super::core::{EngineCore, Internal, LoadIntent, RadioWait};
use super::Reply;
use crate::error::{Error, Result};
use crate::track::{Track, TrackId};
use nwp_common::events::QueueChangeTrigger;
use nwp_common::{time, PlaybackMode, PlaybackState, PlayerEvent};
use std::sync::Arc;
use tracing::{debug, info, warn};

impl EngineCore {
    /// Clear the queue, enter radio mode and play the first batch
    ///
    /// Replies once the first track is ready, or `RadioExhausted` if the
    /// initial batch is empty.
    pub(super) async fn radio_start(&mut self, reply: Reply<()>) {
        self.interrupt();
        self.queue.clear();
        self.failure_streak = 0;
        self.position = 0.0;
        self.duration = 0.0;
        self.lyrics.clear();
        self.lyric_index = None;

        let session = self.radio.start();
        self.change_mode(PlaybackMode::PersonalRadio).await;
        info!(session, "Personal radio started");
        self.emit(PlayerEvent::RadioStateChanged {
            active: true,
            exhausted: false,
            timestamp: time::now(),
        });
        self.emit_queue_changed(QueueChangeTrigger::Cleared);

        self.set_state(PlaybackState::Loading);
        self.radio_wait = Some(RadioWait {
            autostart: true,
            reply: Some(reply),
        });
        self.request_radio_batch();
        self.publish_now_playing();
        self.publish_status();
    }

    /// Start a batch fetch unless one is already running
    pub(super) fn request_radio_batch(&mut self) {
        let Some(session) = self.radio.begin_fetch() else {
            debug!("Radio batch fetch already in flight");
            return;
        };

        let resolver = Arc::clone(&self.resolver);
        let internal_tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = resolver.fetch_radio_batch().await;
            let _ = internal_tx.send(Internal::RadioBatch { session, result });
        });
    }

    pub(super) async fn on_radio_batch(&mut self, session: u64, result: Result<Vec<Track>>) {
        if !self.radio.accepts(session) {
            debug!(session, "Dropping radio batch from an old session");
            return;
        }
        self.radio.finish_fetch();

        let batch = result.unwrap_or_else(|e| {
            warn!(error = %e, "Radio batch fetch failed");
            Vec::new()
        });
        debug!(session, len = batch.len(), "Radio batch received");

        match self.radio_wait.take() {
            Some(wait) => {
                self.append_radio_batch(batch, wait.autostart, wait.reply)
                    .await
            }
            None if !batch.is_empty() => self.radio.store_lookahead(batch),
            None => {}
        }
    }

    /// Append a batch and play its first new entry
    ///
    /// Exits radio when the batch adds nothing.
    async fn append_radio_batch(
        &mut self,
        batch: Vec<Track>,
        autostart: bool,
        reply: Option<Reply<()>>,
    ) {
        let admitted = self.radio.admit(batch);
        let Some(first) = self.queue.append_batch(admitted) else {
            self.exhaust_radio(reply).await;
            return;
        };
        self.emit_queue_changed(QueueChangeTrigger::RadioBatch);
        self.begin_load(first, LoadIntent::autostart(autostart), reply)
            .await;
        self.prefetch_radio();
    }

    /// Keep one batch ready once the queue has no entry after the cursor
    fn prefetch_radio(&mut self) {
        if self.queue.next_after_cursor().is_none() && !self.radio.has_lookahead() {
            self.request_radio_batch();
        }
    }

    /// Move to the next radio track, fetching a batch if needed
    pub(super) async fn radio_advance(&mut self, autostart: bool, reply: Option<Reply<()>>) {
        if let Some(index) = self.queue.next_after_cursor() {
            self.begin_load(index, LoadIntent::autostart(autostart), reply)
                .await;
            self.prefetch_radio();
            return;
        }

        if let Some(batch) = self.radio.take_lookahead() {
            debug!(len = batch.len(), "Using prefetched radio batch");
            self.append_radio_batch(batch, autostart, reply).await;
            return;
        }

        debug!("Waiting for a radio batch");
        self.interrupt();
        self.set_state(PlaybackState::Loading);
        self.radio_wait = Some(RadioWait { autostart, reply });
        self.request_radio_batch();
        self.publish_status();
    }

    /// Leave radio after the feed ran dry and stop playback
    pub(super) async fn exhaust_radio(&mut self, reply: Option<Reply<()>>) {
        warn!("Personal radio exhausted, leaving radio mode");
        self.leave_radio(true).await;
        self.change_mode(PlaybackMode::Sequential).await;
        self.go_idle().await;
        if let Some(reply) = reply {
            let _ = reply.send(Err(Error::RadioExhausted));
        }
    }

    /// Exit radio mode, keeping the queue and whatever is playing
    ///
    /// A radio advance still waiting for a batch is abandoned and playback
    /// stops. The caller sets the new mode.
    pub(super) async fn leave_radio(&mut self, exhausted: bool) {
        self.radio.stop();
        if self.radio_wait.is_some() {
            self.go_idle().await;
        }
        info!(exhausted, "Personal radio stopped");
        self.emit(PlayerEvent::RadioStateChanged {
            active: false,
            exhausted,
            timestamp: time::now(),
        });
    }

    pub(super) async fn radio_stop(&mut self, reply: Reply<()>) {
        if !self.radio.is_active() {
            let _ = reply.send(Ok(()));
            return;
        }
        self.leave_radio(false).await;
        self.change_mode(PlaybackMode::Sequential).await;
        self.publish_status();
        self.write_snapshot(true).await;
        let _ = reply.send(Ok(()));
    }

    pub(super) async fn radio_skip(&mut self, reply: Reply<()>) {
        if !self.radio.is_active() {
            debug!("Radio skip ignored, radio is not active");
            let _ = reply.send(Ok(()));
            return;
        }
        self.radio_advance(true, Some(reply)).await;
    }

    /// Dislike a track: report it, drop it from the queue and skip if current
    pub(super) async fn radio_trash(&mut self, track_id: Option<TrackId>, reply: Reply<()>) {
        if !self.radio.is_active() {
            debug!("Radio trash ignored, radio is not active");
            let _ = reply.send(Ok(()));
            return;
        }
        let Some(id) = track_id.or_else(|| self.current_track_id()) else {
            let _ = reply.send(Ok(()));
            return;
        };

        self.radio.remember(id);
        let resolver = Arc::clone(&self.resolver);
        tokio::spawn(async move {
            if let Err(e) = resolver.report_dislike(id).await {
                warn!(track_id = id, error = %e, "Failed to report radio dislike");
            }
        });

        let Some(removal) = self.queue.remove_id(id) else {
            let _ = reply.send(Ok(()));
            return;
        };
        info!(track_id = id, "Radio track trashed");
        self.emit_queue_changed(QueueChangeTrigger::RadioTrash);

        if removal.was_current {
            self.radio_advance(true, Some(reply)).await;
        } else {
            self.publish_status();
            self.write_snapshot(true).await;
            let _ = reply.send(Ok(()));
        }
    }
}
