//! Transport intents: toggle/pause/resume, seek, volume, mode and quality

use super::core::{EngineCore, LoadIntent};
use super::Reply;
use crate::error::{Error, Result};
use nwp_common::events::FailureKind;
use nwp_common::{time, PlaybackMode, PlaybackState, PlayerEvent, QualityTier};
use tracing::{debug, info, warn};

impl EngineCore {
    pub(super) async fn toggle(&mut self, reply: Reply<()>) {
        match self.state {
            PlaybackState::Idle => {
                let _ = reply.send(Ok(()));
            }
            PlaybackState::Loading => {
                let intent = self.playing_intent();
                self.set_loading_autostart(!intent);
                self.publish_status();
                let _ = reply.send(Ok(()));
            }
            PlaybackState::Playing => self.pause(reply).await,
            PlaybackState::Paused => self.resume(reply).await,
        }
    }

    pub(super) async fn pause(&mut self, reply: Reply<()>) {
        match self.state {
            PlaybackState::Playing => {
                if let Some(output) = self.output.as_mut() {
                    output.pause();
                }
                self.set_state(PlaybackState::Paused);
                self.publish_now_playing();
                self.publish_status();
                self.write_snapshot(true).await;
            }
            PlaybackState::Loading => {
                self.set_loading_autostart(false);
                self.publish_status();
            }
            PlaybackState::Idle | PlaybackState::Paused => {}
        }
        let _ = reply.send(Ok(()));
    }

    pub(super) async fn resume(&mut self, reply: Reply<()>) {
        match self.state {
            PlaybackState::Paused => {
                if let Err(e) = self.start_output() {
                    if let Some(track_id) = self.current_track_id() {
                        self.handle_failure(
                            track_id,
                            FailureKind::Output,
                            e.to_string(),
                            true,
                            Some(reply),
                        )
                        .await;
                        return;
                    }
                    let _ = reply.send(Err(e));
                    return;
                }
                self.set_state(PlaybackState::Playing);
                self.publish_now_playing();
                self.publish_status();
                self.write_snapshot(true).await;
            }
            PlaybackState::Loading => {
                self.set_loading_autostart(true);
                self.publish_status();
            }
            PlaybackState::Idle | PlaybackState::Playing => {}
        }
        let _ = reply.send(Ok(()));
    }

    fn start_output(&mut self) -> Result<()> {
        match self.output.as_mut() {
            Some(output) => output.play(),
            None => Err(Error::Output("Playback output unavailable".to_string())),
        }
    }

    /// Seek within the current track
    ///
    /// Ignored while nothing is loaded or the duration is unknown. The
    /// target is clamped to `[0, duration]`.
    pub(super) async fn seek(&mut self, position: f64, reply: Reply<()>) {
        let seekable = matches!(self.state, PlaybackState::Playing | PlaybackState::Paused)
            && self.duration > 0.0
            && position.is_finite();
        if !seekable {
            debug!(position, state = %self.state, "Seek ignored");
            let _ = reply.send(Ok(()));
            return;
        }

        let target = position.clamp(0.0, self.duration);
        debug!(position = %time::format_time(target), "Seek");
        if let Some(output) = self.output.as_mut() {
            output.seek(target);
        }
        self.position = target;
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
        self.write_snapshot(true).await;
        let _ = reply.send(Ok(()));
    }

    pub(super) async fn set_volume(&mut self, volume: f64, reply: Reply<()>) {
        if !volume.is_finite() {
            debug!(volume, "Ignoring non-finite volume");
            let _ = reply.send(Ok(()));
            return;
        }

        self.volume = volume.clamp(0.0, 1.0);
        if let Some(output) = self.output.as_mut() {
            output.set_volume(self.volume);
        }
        if let Err(e) = self.store.save_volume(self.volume).await {
            warn!(error = %e, "Failed to persist volume");
        }

        self.emit(PlayerEvent::VolumeChanged {
            volume: self.volume,
            muted: self.muted,
            timestamp: time::now(),
        });
        self.publish_status();
        let _ = reply.send(Ok(()));
    }

    /// Mute is session-only and never persisted
    pub(super) fn toggle_mute(&mut self, reply: Reply<bool>) {
        self.muted = !self.muted;
        if let Some(output) = self.output.as_mut() {
            output.set_muted(self.muted);
        }
        self.emit(PlayerEvent::VolumeChanged {
            volume: self.volume,
            muted: self.muted,
            timestamp: time::now(),
        });
        self.publish_status();
        let _ = reply.send(Ok(self.muted));
    }

    pub(super) async fn set_mode(&mut self, mode: PlaybackMode, reply: Reply<()>) {
        if mode == PlaybackMode::PersonalRadio {
            if self.radio.is_active() {
                let _ = reply.send(Ok(()));
            } else {
                self.radio_start(reply).await;
            }
            return;
        }

        if self.radio.is_active() {
            self.leave_radio(false).await;
        }
        self.change_mode(mode).await;
        self.publish_status();
        let _ = reply.send(Ok(()));
    }

    /// Rotate Sequential → Random → Loop; no-op while radio is active
    pub(super) async fn cycle_mode(&mut self, reply: Reply<PlaybackMode>) {
        if !self.radio.is_active() {
            self.change_mode(self.mode.cycled()).await;
            self.publish_status();
        }
        let _ = reply.send(Ok(self.mode));
    }

    /// Switch mode, persisting it (radio is stored as sequential)
    pub(super) async fn change_mode(&mut self, mode: PlaybackMode) {
        if self.mode == mode {
            return;
        }
        let old_mode = self.mode;
        self.mode = mode;
        info!(%old_mode, new_mode = %mode, "Playback mode changed");
        self.emit(PlayerEvent::ModeChanged {
            old_mode,
            new_mode: mode,
            timestamp: time::now(),
        });
        if let Err(e) = self.store.save_mode(mode).await {
            warn!(error = %e, "Failed to persist playback mode");
        }
    }

    /// Change stream quality, reloading the current track at the new tier
    ///
    /// The reload starts from the beginning and keeps the playing intent.
    pub(super) async fn set_quality(&mut self, quality: QualityTier, reply: Reply<()>) {
        if self.quality == quality {
            let _ = reply.send(Ok(()));
            return;
        }

        self.quality = quality;
        info!(%quality, "Quality tier changed");
        if let Err(e) = self.store.save_quality(quality).await {
            warn!(error = %e, "Failed to persist quality tier");
        }
        self.emit(PlayerEvent::QualityChanged {
            quality,
            timestamp: time::now(),
        });
        let _ = reply.send(Ok(()));

        match self.queue.cursor() {
            Some(index) if self.state != PlaybackState::Idle => {
                let autostart = self.playing_intent();
                self.begin_load(index, LoadIntent::autostart(autostart), None)
                    .await;
            }
            _ => self.publish_status(),
        }
    }
}
