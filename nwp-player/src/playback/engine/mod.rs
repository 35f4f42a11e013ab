//! Player engine
//!
//! **Module Structure:**
//! - `core.rs`: Engine task, load pipeline, output feedback, failure recovery
//! - `transport.rs`: Play/pause/seek, volume, mode and quality
//! - `queue.rs`: Queue intents (play, next/prev, set/add/remove/clear)
//! - `radio.rs`: Personal radio start/advance/trash/stop
//! - `session.rs`: Snapshot writes, restore and shutdown
//!
//! All engine state lives in a single task. [`PlayerEngine`] is a cheap,
//! cloneable handle that sends commands to it and reads the published
//! [`PlayerStatus`]. Intents are applied strictly one at a time, in arrival
//! order; network work runs in spawned tasks whose results come back as
//! messages tagged with a generation so superseded results are dropped.

mod core;
mod queue;
mod radio;
mod session;
mod transport;

use self::core::EngineCore;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::now_playing::{BroadcastSurface, NowPlayingSurface, RemoteCommand};
use crate::persistence::StateStore;
use crate::playback::output::{ClockOutput, OutputFactory};
use crate::playback::state::PlayerStatus;
use crate::resolver::TrackResolver;
use crate::track::{Track, TrackId};
use nwp_common::{EventBus, PlaybackMode, PlayerEvent, QualityTier};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::info;

pub(crate) type Reply<T> = oneshot::Sender<Result<T>>;

/// Intent sent to the engine task
///
/// Load-starting intents (play, play_at, next, prev, set_playlist, radio
/// start/skip/trash) reply once the new track is ready, fails, or is
/// superseded. Everything else replies as soon as it is applied.
pub(crate) enum EngineCommand {
    Play { track: Track, autostart: bool, reply: Reply<()> },
    PlayAt { index: usize, reply: Reply<()> },
    Toggle { reply: Reply<()> },
    Pause { reply: Reply<()> },
    Resume { reply: Reply<()> },
    Next { reply: Reply<()> },
    Prev { reply: Reply<()> },
    Seek { position: f64, reply: Reply<()> },
    SeekBy { delta: Option<f64>, reply: Reply<()> },
    SetVolume { volume: f64, reply: Reply<()> },
    ToggleMute { reply: Reply<bool> },
    SetMode { mode: PlaybackMode, reply: Reply<()> },
    CycleMode { reply: Reply<PlaybackMode> },
    SetQuality { quality: QualityTier, reply: Reply<()> },
    SetPlaylist { tracks: Vec<Track>, start_index: usize, reply: Reply<()> },
    AddToPlaylist { track: Track, reply: Reply<()> },
    RemoveFromPlaylist { index: usize, reply: Reply<()> },
    Clear { reply: Reply<()> },
    RadioStart { reply: Reply<()> },
    RadioStop { reply: Reply<()> },
    RadioSkip { reply: Reply<()> },
    RadioTrash { track_id: Option<TrackId>, reply: Reply<()> },
    History { reply: Reply<Vec<Track>> },
    Shutdown { reply: Reply<()> },
}

/// Handle to a running player engine
#[derive(Clone)]
pub struct PlayerEngine {
    cmd_tx: mpsc::UnboundedSender<EngineCommand>,
    status_rx: watch::Receiver<PlayerStatus>,
    event_bus: EventBus,
}

impl PlayerEngine {
    /// Start configuring an engine
    pub fn builder(resolver: Arc<dyn TrackResolver>, store: Arc<dyn StateStore>) -> EngineBuilder {
        EngineBuilder {
            resolver,
            store,
            config: EngineConfig::default(),
            output_factory: None,
            surface: None,
            remote_rx: None,
            event_bus: None,
        }
    }

    /// Latest published status
    pub fn status(&self) -> PlayerStatus {
        self.status_rx.borrow().clone()
    }

    /// Status receiver for change notification
    pub fn watch_status(&self) -> watch::Receiver<PlayerStatus> {
        self.status_rx.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.event_bus.subscribe()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> EngineCommand) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(build(reply))
            .map_err(|_| Error::EngineStopped)?;
        rx.await.map_err(|_| Error::EngineStopped)?
    }

    /// Play `track`, inserting it after the current entry if not queued
    pub async fn play(&self, track: Track) -> Result<()> {
        self.play_with(track, true).await
    }

    /// Like [`play`](Self::play), optionally leaving the track paused once loaded
    pub async fn play_with(&self, track: Track, autostart: bool) -> Result<()> {
        self.request(|reply| EngineCommand::Play {
            track,
            autostart,
            reply,
        })
        .await
    }

    pub async fn play_at(&self, index: usize) -> Result<()> {
        self.request(|reply| EngineCommand::PlayAt { index, reply }).await
    }

    /// Replay a track from history
    pub async fn play_from_history(&self, track: Track) -> Result<()> {
        self.play(track).await
    }

    pub async fn toggle(&self) -> Result<()> {
        self.request(|reply| EngineCommand::Toggle { reply }).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.request(|reply| EngineCommand::Pause { reply }).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.request(|reply| EngineCommand::Resume { reply }).await
    }

    pub async fn next(&self) -> Result<()> {
        self.request(|reply| EngineCommand::Next { reply }).await
    }

    pub async fn prev(&self) -> Result<()> {
        self.request(|reply| EngineCommand::Prev { reply }).await
    }

    pub async fn seek(&self, position: f64) -> Result<()> {
        self.request(|reply| EngineCommand::Seek { position, reply })
            .await
    }

    /// Relative seek; `None` uses the configured step
    pub async fn seek_by(&self, delta: Option<f64>) -> Result<()> {
        self.request(|reply| EngineCommand::SeekBy { delta, reply })
            .await
    }

    pub async fn set_volume(&self, volume: f64) -> Result<()> {
        self.request(|reply| EngineCommand::SetVolume { volume, reply })
            .await
    }

    /// Returns the new mute state
    pub async fn toggle_mute(&self) -> Result<bool> {
        self.request(|reply| EngineCommand::ToggleMute { reply }).await
    }

    pub async fn set_mode(&self, mode: PlaybackMode) -> Result<()> {
        self.request(|reply| EngineCommand::SetMode { mode, reply })
            .await
    }

    /// Returns the mode in effect afterwards
    pub async fn cycle_mode(&self) -> Result<PlaybackMode> {
        self.request(|reply| EngineCommand::CycleMode { reply }).await
    }

    pub async fn set_quality(&self, quality: QualityTier) -> Result<()> {
        self.request(|reply| EngineCommand::SetQuality { quality, reply })
            .await
    }

    pub async fn set_playlist(&self, tracks: Vec<Track>, start_index: usize) -> Result<()> {
        self.request(|reply| EngineCommand::SetPlaylist {
            tracks,
            start_index,
            reply,
        })
        .await
    }

    pub async fn add_to_playlist(&self, track: Track) -> Result<()> {
        self.request(|reply| EngineCommand::AddToPlaylist { track, reply })
            .await
    }

    pub async fn remove_from_playlist(&self, index: usize) -> Result<()> {
        self.request(|reply| EngineCommand::RemoveFromPlaylist { index, reply })
            .await
    }

    pub async fn clear(&self) -> Result<()> {
        self.request(|reply| EngineCommand::Clear { reply }).await
    }

    pub async fn radio_start(&self) -> Result<()> {
        self.request(|reply| EngineCommand::RadioStart { reply }).await
    }

    pub async fn radio_stop(&self) -> Result<()> {
        self.request(|reply| EngineCommand::RadioStop { reply }).await
    }

    pub async fn radio_skip(&self) -> Result<()> {
        self.request(|reply| EngineCommand::RadioSkip { reply }).await
    }

    /// Dislike a radio track (the current one when `track_id` is None)
    pub async fn radio_trash(&self, track_id: Option<TrackId>) -> Result<()> {
        self.request(|reply| EngineCommand::RadioTrash { track_id, reply })
            .await
    }

    /// Recently played tracks, newest first
    pub async fn history(&self) -> Result<Vec<Track>> {
        self.request(|reply| EngineCommand::History { reply }).await
    }

    /// Write a final snapshot and stop the engine task
    pub async fn shutdown(&self) -> Result<()> {
        self.request(|reply| EngineCommand::Shutdown { reply }).await
    }
}

/// Engine configuration and collaborators
pub struct EngineBuilder {
    resolver: Arc<dyn TrackResolver>,
    store: Arc<dyn StateStore>,
    config: EngineConfig,
    output_factory: Option<OutputFactory>,
    surface: Option<Arc<dyn NowPlayingSurface>>,
    remote_rx: Option<mpsc::Receiver<RemoteCommand>>,
    event_bus: Option<EventBus>,
}

impl EngineBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Output constructor, invoked on the first load (default: [`ClockOutput`])
    pub fn output_factory(mut self, factory: OutputFactory) -> Self {
        self.output_factory = Some(factory);
        self
    }

    /// Now-playing surface (default: [`BroadcastSurface`] on the engine's bus)
    pub fn surface(mut self, surface: Arc<dyn NowPlayingSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Inbound remote transport commands
    pub fn remote_commands(mut self, rx: mpsc::Receiver<RemoteCommand>) -> Self {
        self.remote_rx = Some(rx);
        self
    }

    pub fn event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Spawn the engine task
    ///
    /// Preferences, history and the last snapshot are loaded before this
    /// returns. A restored track starts loading (never playing) in the
    /// background.
    pub async fn spawn(self) -> Result<PlayerEngine> {
        let event_bus = self
            .event_bus
            .unwrap_or_else(|| EventBus::new(self.config.event_capacity));
        let surface = self
            .surface
            .unwrap_or_else(|| Arc::new(BroadcastSurface::new(event_bus.clone())));
        let output_factory = self.output_factory.unwrap_or_else(ClockOutput::factory);

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(PlayerStatus::default());
        let (init_tx, init_rx) = oneshot::channel();

        let (mut core, inbox) = EngineCore::new(
            self.config,
            self.resolver,
            self.store,
            surface,
            event_bus.clone(),
            status_tx,
            output_factory,
        );
        let remote_rx = self.remote_rx;

        tokio::spawn(async move {
            core.initialize().await;
            let _ = init_tx.send(());
            core.run(cmd_rx, inbox, remote_rx).await;
        });

        init_rx
            .await
            .map_err(|_| Error::Internal("Player engine failed to start".to_string()))?;
        info!("Player engine started");

        Ok(PlayerEngine {
            cmd_tx,
            status_rx,
            event_bus,
        })
    }
}
