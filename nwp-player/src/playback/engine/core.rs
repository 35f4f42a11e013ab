//! Engine task core: lifecycle, load pipeline and output feedback
//!
//! **Load pipeline:**
//! 1. `begin_load` bumps the generation, moves the cursor, stops the output
//!    and enters `Loading`
//! 2. A spawned task resolves the stream (plus metadata backfill and
//!    lyrics) and posts `Internal::Resolved` tagged with the generation
//! 3. A matching result is assigned to the output with the generation as
//!    its source token; a stale one is dropped
//! 4. The output answers `Ready` (→ Playing/Paused) or `Error` (→ failure)
//!
//! **Failure recovery:** a failed track is added to the failed set and the
//! engine advances after `failure_recovery_delay`. Any load-starting intent
//! cancels the pending advance. The chain ends in `Idle` once every queued
//! track has failed, or once as many consecutive failures as queue entries
//! have been seen.

use super::{EngineCommand, Reply};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::history::PlayHistory;
use crate::lyrics::{current_line, LyricLine, LyricText};
use crate::now_playing::{NowPlayingSurface, RemoteCommand};
use crate::persistence::{Preferences, StateStore};
use crate::playback::output::{AudioOutput, OutputEvent, OutputEvents, OutputFactory};
use crate::playback::queue::PlayQueue;
use crate::playback::radio::RadioFeed;
use crate::playback::sequencing::next_playable;
use crate::playback::state::{progress_percent, PlayerStatus};
use crate::resolver::{StreamInfo, TrackResolver};
use crate::track::{Track, TrackId};
use nwp_common::events::{FailureKind, NowPlayingInfo, QueueChangeTrigger};
use nwp_common::{time, EventBus, PlaybackMode, PlaybackState, PlayerEvent, QualityTier};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Results of background work, delivered back to the engine task
pub(super) enum Internal {
    Resolved {
        generation: u64,
        result: Result<ResolvedTrack>,
    },
    RecoveryDue {
        token: u64,
    },
    RadioBatch {
        session: u64,
        result: Result<Vec<Track>>,
    },
}

pub(super) struct ResolvedTrack {
    stream: StreamInfo,
    detail: Option<Track>,
    lyrics: Option<LyricText>,
}

/// Receivers owned by the run loop
pub(super) struct CoreInbox {
    internal_rx: mpsc::UnboundedReceiver<Internal>,
    output_rx: mpsc::UnboundedReceiver<OutputEvent>,
}

/// Session state carried into a load that resumes a snapshot
#[derive(Debug, Clone)]
pub(super) struct RestorePoint {
    pub(super) position: f64,
    pub(super) duration: f64,
    pub(super) lyrics: Vec<LyricLine>,
    pub(super) lyric_index: Option<usize>,
}

/// How a load should finish
#[derive(Debug, Clone)]
pub(super) struct LoadIntent {
    pub(super) autostart: bool,
    pub(super) restore: Option<RestorePoint>,
}

impl LoadIntent {
    pub(super) fn autostart(autostart: bool) -> Self {
        Self {
            autostart,
            restore: None,
        }
    }
}

/// Load in progress for the current generation
pub(super) struct PendingLoad {
    pub(super) generation: u64,
    pub(super) track_id: TrackId,
    pub(super) autostart: bool,
    pub(super) restore: Option<RestorePoint>,
    pub(super) reply: Option<Reply<()>>,
}

/// Scheduled advance after a failure
pub(super) struct Recovery {
    token: u64,
    pub(super) autostart: bool,
    handle: JoinHandle<()>,
}

/// Radio advance waiting for a batch
pub(super) struct RadioWait {
    pub(super) autostart: bool,
    pub(super) reply: Option<Reply<()>>,
}

pub(super) struct EngineCore {
    pub(super) config: EngineConfig,
    pub(super) resolver: Arc<dyn TrackResolver>,
    pub(super) store: Arc<dyn StateStore>,
    surface: Arc<dyn NowPlayingSurface>,
    event_bus: EventBus,
    status_tx: watch::Sender<PlayerStatus>,
    pub(super) internal_tx: mpsc::UnboundedSender<Internal>,
    output_tx: OutputEvents,
    output_factory: Option<OutputFactory>,
    pub(super) output: Option<Box<dyn AudioOutput>>,

    pub(super) queue: PlayQueue,
    pub(super) radio: RadioFeed,
    pub(super) history: PlayHistory,
    pub(super) rng: StdRng,

    pub(super) state: PlaybackState,
    pub(super) mode: PlaybackMode,
    pub(super) quality: QualityTier,
    pub(super) volume: f64,
    pub(super) muted: bool,
    pub(super) buffering: bool,
    pub(super) position: f64,
    pub(super) duration: f64,
    pub(super) lyrics: Vec<LyricLine>,
    pub(super) lyric_index: Option<usize>,

    /// Bumped by every load; also the output source token
    pub(super) generation: u64,
    /// Generation whose stream is currently assigned to the output
    loaded_source: Option<u64>,
    pub(super) pending: Option<PendingLoad>,
    pub(super) recovery: Option<Recovery>,
    recovery_token: u64,
    pub(super) radio_wait: Option<RadioWait>,
    pub(super) failure_streak: usize,

    last_published: Option<NowPlayingInfo>,
    pub(super) last_snapshot_at: Option<Instant>,
}

impl EngineCore {
    pub(super) fn new(
        config: EngineConfig,
        resolver: Arc<dyn TrackResolver>,
        store: Arc<dyn StateStore>,
        surface: Arc<dyn NowPlayingSurface>,
        event_bus: EventBus,
        status_tx: watch::Sender<PlayerStatus>,
        output_factory: OutputFactory,
    ) -> (Self, CoreInbox) {
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let (output_tx, output_rx) = mpsc::unbounded_channel();

        let core = Self {
            history: PlayHistory::new(config.history_capacity),
            quality: config.default_quality,
            volume: config.default_volume,
            config,
            resolver,
            store,
            surface,
            event_bus,
            status_tx,
            internal_tx,
            output_tx,
            output_factory: Some(output_factory),
            output: None,
            queue: PlayQueue::new(),
            radio: RadioFeed::new(),
            rng: StdRng::from_entropy(),
            state: PlaybackState::Idle,
            mode: PlaybackMode::Sequential,
            muted: false,
            buffering: false,
            position: 0.0,
            duration: 0.0,
            lyrics: Vec::new(),
            lyric_index: None,
            generation: 0,
            loaded_source: None,
            pending: None,
            recovery: None,
            recovery_token: 0,
            radio_wait: None,
            failure_streak: 0,
            last_published: None,
            last_snapshot_at: None,
        };

        (
            core,
            CoreInbox {
                internal_rx,
                output_rx,
            },
        )
    }

    /// Load preferences and history, then restore the last session
    pub(super) async fn initialize(&mut self) {
        let defaults = Preferences {
            volume: self.config.default_volume,
            mode: PlaybackMode::Sequential,
            quality: self.config.default_quality,
        };
        match self.store.load_preferences(defaults).await {
            Ok(prefs) => {
                self.volume = prefs.volume;
                self.mode = prefs.mode;
                self.quality = prefs.quality;
            }
            Err(e) => warn!(error = %e, "Failed to load preferences, using defaults"),
        }

        match self.store.load_history().await {
            Ok(entries) => {
                self.history = PlayHistory::from_entries(entries, self.config.history_capacity)
            }
            Err(e) => warn!(error = %e, "Failed to load play history"),
        }

        self.restore().await;
        self.publish_status();
    }

    pub(super) async fn run(
        mut self,
        mut cmd_rx: mpsc::UnboundedReceiver<EngineCommand>,
        inbox: CoreInbox,
        mut remote_rx: Option<mpsc::Receiver<RemoteCommand>>,
    ) {
        let CoreInbox {
            mut internal_rx,
            mut output_rx,
        } = inbox;

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(EngineCommand::Shutdown { reply }) => {
                        self.shutdown().await;
                        let _ = reply.send(Ok(()));
                        break;
                    }
                    Some(cmd) => self.handle_command(cmd).await,
                    None => {
                        self.shutdown().await;
                        break;
                    }
                },
                Some(msg) = internal_rx.recv() => self.handle_internal(msg).await,
                Some(event) = output_rx.recv() => self.handle_output_event(event).await,
                remote = recv_remote(&mut remote_rx) => match remote {
                    Some(command) => self.handle_remote(command).await,
                    None => {
                        debug!("Remote command channel closed");
                        remote_rx = None;
                    }
                },
            }
        }

        info!("Player engine stopped");
    }

    pub(super) async fn handle_command(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::Play {
                track,
                autostart,
                reply,
            } => self.play(track, autostart, reply).await,
            EngineCommand::PlayAt { index, reply } => self.play_at(index, reply).await,
            EngineCommand::Toggle { reply } => self.toggle(reply).await,
            EngineCommand::Pause { reply } => self.pause(reply).await,
            EngineCommand::Resume { reply } => self.resume(reply).await,
            EngineCommand::Next { reply } => self.next(Some(reply)).await,
            EngineCommand::Prev { reply } => self.prev(reply).await,
            EngineCommand::Seek { position, reply } => self.seek(position, reply).await,
            EngineCommand::SeekBy { delta, reply } => {
                let delta = delta.unwrap_or(self.config.seek_step_seconds);
                self.seek(self.position + delta, reply).await
            }
            EngineCommand::SetVolume { volume, reply } => self.set_volume(volume, reply).await,
            EngineCommand::ToggleMute { reply } => self.toggle_mute(reply),
            EngineCommand::SetMode { mode, reply } => self.set_mode(mode, reply).await,
            EngineCommand::CycleMode { reply } => self.cycle_mode(reply).await,
            EngineCommand::SetQuality { quality, reply } => self.set_quality(quality, reply).await,
            EngineCommand::SetPlaylist {
                tracks,
                start_index,
                reply,
            } => self.set_playlist(tracks, start_index, reply).await,
            EngineCommand::AddToPlaylist { track, reply } => self.add_to_playlist(track, reply).await,
            EngineCommand::RemoveFromPlaylist { index, reply } => {
                self.remove_from_playlist(index, reply).await
            }
            EngineCommand::Clear { reply } => self.clear(reply).await,
            EngineCommand::RadioStart { reply } => self.radio_start(reply).await,
            EngineCommand::RadioStop { reply } => self.radio_stop(reply).await,
            EngineCommand::RadioSkip { reply } => self.radio_skip(reply).await,
            EngineCommand::RadioTrash { track_id, reply } => self.radio_trash(track_id, reply).await,
            EngineCommand::History { reply } => {
                let _ = reply.send(Ok(self.history.entries()));
            }
            EngineCommand::Shutdown { reply } => {
                // Handled by the run loop; only reachable if re-dispatched
                self.shutdown().await;
                let _ = reply.send(Ok(()));
            }
        }
    }

    /// Remote commands behave exactly like the matching local intent
    async fn handle_remote(&mut self, command: RemoteCommand) {
        debug!(?command, "Remote command received");
        let step = self.config.seek_step_seconds;
        let (reply, _) = oneshot::channel();
        let cmd = match command {
            RemoteCommand::Play => EngineCommand::Resume { reply },
            RemoteCommand::Pause => EngineCommand::Pause { reply },
            RemoteCommand::Next => EngineCommand::Next { reply },
            RemoteCommand::Prev => EngineCommand::Prev { reply },
            RemoteCommand::SeekTo(position) => EngineCommand::Seek { position, reply },
            RemoteCommand::SeekForward(offset) => EngineCommand::SeekBy {
                delta: Some(offset.unwrap_or(step)),
                reply,
            },
            RemoteCommand::SeekBackward(offset) => EngineCommand::SeekBy {
                delta: Some(-offset.unwrap_or(step)),
                reply,
            },
        };
        self.handle_command(cmd).await;
    }

    async fn handle_internal(&mut self, msg: Internal) {
        match msg {
            Internal::Resolved { generation, result } => self.on_resolved(generation, result).await,
            Internal::RecoveryDue { token } => {
                let due = self.recovery.as_ref().is_some_and(|r| r.token == token);
                if !due {
                    debug!(token, "Ignoring cancelled recovery timer");
                    return;
                }
                if let Some(recovery) = self.recovery.take() {
                    debug!("Failure recovery delay elapsed, advancing");
                    self.auto_advance(recovery.autostart).await;
                }
            }
            Internal::RadioBatch { session, result } => self.on_radio_batch(session, result).await,
        }
    }

    // ========================================================================
    // Load pipeline
    // ========================================================================

    /// Start loading the queue entry at `index`
    ///
    /// Supersedes any load, pending recovery or radio wait in progress.
    pub(super) async fn begin_load(&mut self, index: usize, intent: LoadIntent, reply: Option<Reply<()>>) {
        let Some(track) = self.queue.get(index).cloned() else {
            debug!(index, "Load index out of range, ignoring");
            if let Some(reply) = reply {
                let _ = reply.send(Ok(()));
            }
            return;
        };

        self.interrupt();
        self.queue.set_cursor(Some(index));

        match &intent.restore {
            Some(point) => {
                self.position = point.position;
                self.duration = if point.duration > 0.0 {
                    point.duration
                } else {
                    track.duration_seconds
                };
                self.lyrics = point.lyrics.clone();
                self.lyric_index = point.lyric_index;
            }
            None => {
                self.position = 0.0;
                self.duration = track.duration_seconds;
                self.lyrics.clear();
                self.lyric_index = None;
            }
        }

        self.set_state(PlaybackState::Loading);
        info!(track_id = track.id, index, title = %track.title, "Loading track");

        let generation = self.generation;
        self.spawn_resolution(&track, generation, intent.restore.is_none());
        self.pending = Some(PendingLoad {
            generation,
            track_id: track.id,
            autostart: intent.autostart,
            restore: intent.restore,
            reply,
        });

        self.publish_now_playing();
        self.publish_status();
        self.write_snapshot(true).await;
    }

    /// Abandon whatever the output and the previous intent were doing
    pub(super) fn interrupt(&mut self) {
        self.cancel_recovery();
        self.supersede_pending();
        self.supersede_radio_wait();
        self.generation += 1;
        self.stop_output();
        self.buffering = false;
    }

    fn spawn_resolution(&self, track: &Track, generation: u64, fetch_lyrics: bool) {
        let resolver = Arc::clone(&self.resolver);
        let internal_tx = self.internal_tx.clone();
        let id = track.id;
        let quality = self.quality;
        let needs_backfill = track.needs_backfill();

        tokio::spawn(async move {
            let result = async {
                let stream = resolver.resolve_stream(id, quality).await?;
                if stream.url.is_empty() {
                    return Err(Error::Resolution(format!("Empty stream URL for track {}", id)));
                }

                let detail = if needs_backfill {
                    resolver.fetch_track_detail(id).await.unwrap_or_else(|e| {
                        debug!(track_id = id, error = %e, "Metadata backfill failed");
                        None
                    })
                } else {
                    None
                };

                let lyrics = if fetch_lyrics {
                    resolver.fetch_lyrics(id).await.unwrap_or_else(|e| {
                        debug!(track_id = id, error = %e, "Lyric fetch failed");
                        None
                    })
                } else {
                    None
                };

                Ok(ResolvedTrack {
                    stream,
                    detail,
                    lyrics,
                })
            }
            .await;

            let _ = internal_tx.send(Internal::Resolved { generation, result });
        });
    }

    async fn on_resolved(&mut self, generation: u64, result: Result<ResolvedTrack>) {
        let current = self
            .pending
            .as_ref()
            .is_some_and(|p| p.generation == generation && generation == self.generation);
        if !current {
            debug!(generation, "Discarding superseded resolution result");
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };

        let resolved = match result {
            Ok(resolved) => resolved,
            Err(e) => {
                let message = match e {
                    Error::Resolution(msg) => msg,
                    other => other.to_string(),
                };
                self.handle_failure(
                    pending.track_id,
                    FailureKind::Resolution,
                    message,
                    pending.autostart,
                    pending.reply,
                )
                .await;
                return;
            }
        };

        let Some(index) = self.queue.position_of(pending.track_id) else {
            debug!(track_id = pending.track_id, "Resolved track left the queue");
            if let Some(reply) = pending.reply {
                let _ = reply.send(Err(Error::Superseded));
            }
            return;
        };

        if let Some(detail) = resolved.detail {
            if let Some(track) = self.queue.get(index).cloned() {
                self.queue.update_track(index, track.backfilled_from(detail));
            }
        }

        if pending.restore.is_none() {
            self.lyrics = resolved.lyrics.map(|l| l.parse()).unwrap_or_default();
            self.lyric_index = None;
        }

        let duration_hint = self
            .queue
            .get(index)
            .map(|t| t.duration_seconds)
            .unwrap_or(0.0);

        if let Err(e) = self.ensure_output() {
            self.handle_failure(
                pending.track_id,
                FailureKind::Output,
                e.to_string(),
                pending.autostart,
                pending.reply,
            )
            .await;
            return;
        }

        debug!(
            track_id = pending.track_id,
            bitrate = ?resolved.stream.bitrate,
            "Assigning stream to output"
        );
        if let Some(output) = self.output.as_mut() {
            output.load(generation, &resolved.stream.url, duration_hint);
        }
        self.loaded_source = Some(generation);
        self.pending = Some(pending);
        self.publish_now_playing();
        self.publish_status();
    }

    fn ensure_output(&mut self) -> Result<()> {
        if self.output.is_some() {
            return Ok(());
        }
        let factory = self
            .output_factory
            .take()
            .ok_or_else(|| Error::Output("Playback output unavailable".to_string()))?;
        let mut output = factory(self.output_tx.clone());
        output.set_volume(self.volume);
        output.set_muted(self.muted);
        info!("Playback output created");
        self.output = Some(output);
        Ok(())
    }

    pub(super) fn stop_output(&mut self) {
        if let Some(output) = self.output.as_mut() {
            output.stop();
        }
        self.loaded_source = None;
    }

    // ========================================================================
    // Output feedback
    // ========================================================================

    async fn handle_output_event(&mut self, event: OutputEvent) {
        if self.loaded_source != Some(event.source()) {
            debug!(source = event.source(), "Ignoring event from replaced stream");
            return;
        }

        match event {
            OutputEvent::Ready { duration, .. } => self.on_ready(duration).await,
            OutputEvent::Position { position, .. } => self.on_position(position).await,
            OutputEvent::Ended { .. } => self.on_ended().await,
            OutputEvent::Error { message, .. } => {
                let Some(track_id) = self.current_track_id() else {
                    return;
                };
                let (autostart, reply) = match self.pending.take() {
                    Some(p) => (p.autostart, p.reply),
                    None => (self.playing_intent(), None),
                };
                self.handle_failure(track_id, FailureKind::Output, message, autostart, reply)
                    .await;
            }
            OutputEvent::Buffering { buffering, .. } => {
                if self.buffering != buffering {
                    self.buffering = buffering;
                    self.emit(PlayerEvent::BufferingChanged {
                        buffering,
                        timestamp: time::now(),
                    });
                    self.publish_status();
                }
            }
        }
    }

    async fn on_ready(&mut self, duration: f64) {
        let Some(pending) = self.pending.take() else {
            debug!("Ready without a pending load, ignoring");
            return;
        };
        let Some(index) = self.queue.cursor() else {
            return;
        };
        let Some(track) = self.queue.get(index).cloned() else {
            return;
        };

        if duration > 0.0 {
            self.duration = duration;
        }
        self.failure_streak = 0;
        self.queue.clear_failed(track.id);

        self.history.record(track.clone());
        if self.radio.is_active() {
            self.radio.remember(track.id);
        }
        if let Err(e) = self.store.save_history(&self.history.entries()).await {
            warn!(error = %e, "Failed to persist play history");
        }

        if let Some(point) = &pending.restore {
            let target = if self.duration > 0.0 {
                point.position.clamp(0.0, self.duration)
            } else {
                point.position.max(0.0)
            };
            if target > 0.0 {
                if let Some(output) = self.output.as_mut() {
                    output.seek(target);
                }
            }
            self.position = target;
            self.lyric_index = current_line(&self.lyrics, target, point.lyric_index);
            info!(track_id = track.id, position = %time::format_time(target), "Restored session position");
        }

        if pending.autostart {
            let started = match self.output.as_mut() {
                Some(output) => output.play(),
                None => Err(Error::Output("Playback output unavailable".to_string())),
            };
            if let Err(e) = started {
                self.handle_failure(track.id, FailureKind::Output, e.to_string(), true, pending.reply)
                    .await;
                return;
            }
            self.set_state(PlaybackState::Playing);
        } else {
            self.set_state(PlaybackState::Paused);
        }

        info!(track_id = track.id, index, autostart = pending.autostart, "Track ready");
        self.emit(PlayerEvent::TrackStarted {
            track_id: track.id,
            index,
            title: track.title.clone(),
            timestamp: time::now(),
        });
        self.publish_now_playing();
        self.publish_status();
        self.write_snapshot(true).await;

        if let Some(reply) = pending.reply {
            let _ = reply.send(Ok(()));
        }
    }

    async fn on_position(&mut self, position: f64) {
        if !position.is_finite() {
            debug!(position, "Ignoring non-finite position");
            return;
        }
        self.position = if self.duration > 0.0 {
            position.clamp(0.0, self.duration)
        } else {
            position.max(0.0)
        };
        self.update_lyric_index();

        if let Some(track_id) = self.current_track_id() {
            self.emit(PlayerEvent::PlaybackProgress {
                track_id,
                position_seconds: self.position,
                duration_seconds: self.duration,
                timestamp: time::now(),
            });
        }
        self.publish_now_playing();
        self.publish_status();
        self.write_snapshot(false).await;
    }

    async fn on_ended(&mut self) {
        debug!(track_id = ?self.current_track_id(), "Track ended");
        if self.mode == PlaybackMode::Loop {
            self.position = 0.0;
            self.lyric_index = None;
            self.update_lyric_index();
            let restarted = match self.output.as_mut() {
                Some(output) => {
                    output.seek(0.0);
                    output.play()
                }
                None => Err(Error::Output("Playback output unavailable".to_string())),
            };
            if let Err(e) = restarted {
                if let Some(track_id) = self.current_track_id() {
                    self.handle_failure(track_id, FailureKind::Output, e.to_string(), true, None)
                        .await;
                }
                return;
            }
            self.publish_now_playing();
            self.publish_status();
            return;
        }

        self.auto_advance(true).await;
    }

    // ========================================================================
    // Failure recovery
    // ========================================================================

    pub(super) async fn handle_failure(
        &mut self,
        track_id: TrackId,
        kind: FailureKind,
        message: String,
        autostart: bool,
        reply: Option<Reply<()>>,
    ) {
        self.queue.mark_failed(track_id);
        self.failure_streak += 1;
        warn!(track_id, %kind, message = %message, streak = self.failure_streak, "Track failed");

        self.emit(PlayerEvent::TrackFailed {
            track_id,
            kind,
            message: message.clone(),
            timestamp: time::now(),
        });

        if let Some(reply) = reply {
            let error = match kind {
                FailureKind::Resolution => Error::Resolution(message),
                FailureKind::Output => Error::Output(message),
            };
            let _ = reply.send(Err(error));
        }

        self.stop_output();
        self.buffering = false;

        if self.radio.is_active() {
            if self.failure_streak >= self.config.radio_failure_limit {
                self.exhaust_radio(None).await;
                return;
            }
        } else if self.queue.all_failed() {
            warn!(
                streak = self.failure_streak,
                "No playable track left, stopping auto-advance"
            );
            self.go_idle().await;
            return;
        }

        self.set_state(PlaybackState::Loading);
        self.schedule_recovery(autostart);
        self.publish_status();
    }

    fn schedule_recovery(&mut self, autostart: bool) {
        self.cancel_recovery();
        self.recovery_token += 1;
        let token = self.recovery_token;
        let delay = self.config.failure_recovery_delay;
        let internal_tx = self.internal_tx.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = internal_tx.send(Internal::RecoveryDue { token });
        });
        self.recovery = Some(Recovery {
            token,
            autostart,
            handle,
        });
    }

    pub(super) fn cancel_recovery(&mut self) {
        if let Some(recovery) = self.recovery.take() {
            debug!(token = recovery.token, "Cancelling failure recovery");
            recovery.handle.abort();
        }
    }

    fn supersede_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            if let Some(reply) = pending.reply {
                let _ = reply.send(Err(Error::Superseded));
            }
        }
    }

    pub(super) fn supersede_radio_wait(&mut self) {
        if let Some(wait) = self.radio_wait.take() {
            if let Some(reply) = wait.reply {
                let _ = reply.send(Err(Error::Superseded));
            }
        }
    }

    /// Advance after end of track or failure, skipping failed entries
    pub(super) async fn auto_advance(&mut self, autostart: bool) {
        if self.radio.is_active() {
            self.radio_advance(autostart, None).await;
            return;
        }

        let mask = self.queue.failed_mask();
        match next_playable(&mask, self.queue.cursor(), self.mode, &mut self.rng) {
            Some(index) => {
                self.begin_load(index, LoadIntent::autostart(autostart), None)
                    .await
            }
            None => {
                info!("Nothing left to play");
                self.go_idle().await;
            }
        }
    }

    /// Stop playback, keep the queue, forget the cursor
    pub(super) async fn go_idle(&mut self) {
        self.interrupt();
        self.queue.set_cursor(None);
        self.position = 0.0;
        self.duration = 0.0;
        self.lyrics.clear();
        self.lyric_index = None;
        self.set_state(PlaybackState::Idle);
        self.publish_now_playing();
        self.publish_status();
        self.write_snapshot(true).await;
    }

    // ========================================================================
    // Observation
    // ========================================================================

    pub(super) fn emit(&self, event: PlayerEvent) {
        self.event_bus.emit_lossy(event);
    }

    pub(super) fn emit_queue_changed(&self, trigger: QueueChangeTrigger) {
        self.emit(PlayerEvent::QueueChanged {
            track_ids: self.queue.ids(),
            current_index: self.queue.cursor(),
            trigger,
            timestamp: time::now(),
        });
    }

    pub(super) fn set_state(&mut self, new_state: PlaybackState) {
        if self.state == new_state {
            return;
        }
        let old_state = self.state;
        self.state = new_state;
        info!(%old_state, %new_state, "Playback state changed");
        self.emit(PlayerEvent::PlaybackStateChanged {
            old_state,
            new_state,
            timestamp: time::now(),
        });
    }

    pub(super) fn current_track_id(&self) -> Option<TrackId> {
        self.queue.current().map(|t| t.id)
    }

    /// Whether audio is playing or will start once the current load finishes
    pub(super) fn playing_intent(&self) -> bool {
        match self.state {
            PlaybackState::Playing => true,
            PlaybackState::Loading => {
                if let Some(pending) = &self.pending {
                    pending.autostart
                } else if let Some(recovery) = &self.recovery {
                    recovery.autostart
                } else if let Some(wait) = &self.radio_wait {
                    wait.autostart
                } else {
                    false
                }
            }
            PlaybackState::Idle | PlaybackState::Paused => false,
        }
    }

    /// Change the playing intent of whatever is loading
    pub(super) fn set_loading_autostart(&mut self, autostart: bool) {
        if let Some(pending) = self.pending.as_mut() {
            pending.autostart = autostart;
        } else if let Some(recovery) = self.recovery.as_mut() {
            recovery.autostart = autostart;
        } else if let Some(wait) = self.radio_wait.as_mut() {
            wait.autostart = autostart;
        }
    }

    /// Recompute the active lyric line, emitting on change
    pub(super) fn update_lyric_index(&mut self) {
        let index = current_line(&self.lyrics, self.position, self.lyric_index);
        if index == self.lyric_index {
            return;
        }
        self.lyric_index = index;
        let text = index
            .and_then(|i| self.lyrics.get(i))
            .map(|l| l.text.clone());
        debug!(?index, "Lyric line changed");
        self.emit(PlayerEvent::LyricLineChanged {
            index,
            text,
            timestamp: time::now(),
        });
    }

    fn build_status(&self) -> PlayerStatus {
        PlayerStatus {
            state: self.state,
            mode: self.mode,
            quality: self.quality,
            queue: self.queue.tracks().to_vec(),
            current_index: self.queue.cursor(),
            current_track: self.queue.current().cloned(),
            position_seconds: self.position,
            duration_seconds: self.duration,
            progress_percent: progress_percent(self.position, self.duration),
            volume: self.volume,
            muted: self.muted,
            buffering: self.buffering,
            lyrics: self.lyrics.clone(),
            lyric_index: self.lyric_index,
            radio_active: self.radio.is_active(),
            failed_track_ids: self.queue.failed_ids(),
        }
    }

    pub(super) fn publish_status(&self) {
        let status = self.build_status();
        self.status_tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }

    /// Push metadata to the now-playing surface if anything changed
    pub(super) fn publish_now_playing(&mut self) {
        let info = match self.queue.current() {
            Some(track) => NowPlayingInfo {
                title: track.title.clone(),
                artists: track.artist_names(),
                album_name: track.album.name.clone(),
                artwork_url: track.display_artwork().map(str::to_string),
                duration_seconds: self.duration,
                position_seconds: self.position,
                is_playing: self.state == PlaybackState::Playing,
            },
            None => NowPlayingInfo::default(),
        };

        if self.last_published.as_ref() == Some(&info) {
            return;
        }
        self.surface.publish(&info);
        self.last_published = Some(info);
    }
}

async fn recv_remote(rx: &mut Option<mpsc::Receiver<RemoteCommand>>) -> Option<RemoteCommand> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
