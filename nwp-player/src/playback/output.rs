//! Playback output seam
//!
//! The engine never decodes audio. It drives a single output instance
//! through [`AudioOutput`] and receives device feedback (ready, position
//! ticks, end of track, errors) as [`OutputEvent`]s on a channel it owns.
//!
//! Every event carries the `source` token passed to the `load` call it
//! belongs to, so feedback from a replaced stream can be discarded.

use crate::error::Result;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Feedback from the output device
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    /// Stream is ready to play; `duration` is 0 when unknown
    Ready { source: u64, duration: f64 },
    /// Position tick
    Position { source: u64, position: f64 },
    /// Reached end of stream
    Ended { source: u64 },
    /// Decode or network failure
    Error { source: u64, message: String },
    /// Waiting for data (true) or able to continue (false)
    Buffering { source: u64, buffering: bool },
}

impl OutputEvent {
    pub fn source(&self) -> u64 {
        match self {
            OutputEvent::Ready { source, .. }
            | OutputEvent::Position { source, .. }
            | OutputEvent::Ended { source }
            | OutputEvent::Error { source, .. }
            | OutputEvent::Buffering { source, .. } => *source,
        }
    }
}

/// Sender half handed to an output at construction
pub type OutputEvents = mpsc::UnboundedSender<OutputEvent>;

/// Builds the output lazily on first load
pub type OutputFactory = Box<dyn FnOnce(OutputEvents) -> Box<dyn AudioOutput> + Send>;

/// Single shared playback output
///
/// Calls are made only from the engine task. Implementations report
/// asynchronous outcomes through the [`OutputEvents`] sender they were built
/// with rather than through return values.
pub trait AudioOutput: Send {
    /// Assign a new stream; answers with `Ready` or `Error` for `source`
    fn load(&mut self, source: u64, url: &str, duration_hint: f64);

    /// Start or resume playback of the loaded stream
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    fn seek(&mut self, position: f64);

    /// Drop the loaded stream
    fn stop(&mut self);

    fn set_volume(&mut self, volume: f64);

    fn set_muted(&mut self, muted: bool);
}

const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Headless output that only keeps a playback clock
///
/// Used by the service binary where no audio device is attached: the
/// stream is considered ready immediately with the catalogue duration, and
/// position advances in real time while playing.
pub struct ClockOutput {
    events: OutputEvents,
    source: Option<u64>,
    duration: f64,
    /// Position at the last play/seek/pause
    base_position: f64,
    ticker: Option<JoinHandle<()>>,
    started_at: Option<Instant>,
    volume: f64,
    muted: bool,
}

impl ClockOutput {
    pub fn new(events: OutputEvents) -> Self {
        Self {
            events,
            source: None,
            duration: 0.0,
            base_position: 0.0,
            ticker: None,
            started_at: None,
            volume: 1.0,
            muted: false,
        }
    }

    /// Factory suitable for `EngineBuilder::output_factory`
    pub fn factory() -> OutputFactory {
        Box::new(|events| Box::new(ClockOutput::new(events)) as Box<dyn AudioOutput>)
    }

    /// Current clock position
    pub fn position(&self) -> f64 {
        let elapsed = self
            .started_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        let position = self.base_position + elapsed;
        if self.duration > 0.0 {
            position.min(self.duration)
        } else {
            position
        }
    }

    pub fn volume(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    fn halt_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    fn start_ticker(&mut self, source: u64) {
        self.halt_ticker();
        let events = self.events.clone();
        let base = self.base_position;
        let duration = self.duration;
        let started = Instant::now();
        self.started_at = Some(started);

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let position = base + started.elapsed().as_secs_f64();
                if duration > 0.0 && position >= duration {
                    let _ = events.send(OutputEvent::Position {
                        source,
                        position: duration,
                    });
                    let _ = events.send(OutputEvent::Ended { source });
                    break;
                }
                if events.send(OutputEvent::Position { source, position }).is_err() {
                    break;
                }
            }
        }));
    }
}

impl AudioOutput for ClockOutput {
    fn load(&mut self, source: u64, url: &str, duration_hint: f64) {
        self.stop();
        debug!(source, url, "Clock output loaded stream");
        self.source = Some(source);
        self.duration = duration_hint.max(0.0);
        let _ = self.events.send(OutputEvent::Ready {
            source,
            duration: self.duration,
        });
    }

    fn play(&mut self) -> Result<()> {
        let Some(source) = self.source else {
            return Err(crate::error::Error::Output("No stream loaded".to_string()));
        };
        if self.ticker.is_none() {
            self.start_ticker(source);
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.base_position = self.position();
        self.started_at = None;
        self.halt_ticker();
    }

    fn seek(&mut self, position: f64) {
        let playing = self.ticker.is_some();
        self.halt_ticker();
        self.started_at = None;
        self.base_position = position.max(0.0);
        if playing {
            if let Some(source) = self.source {
                self.start_ticker(source);
            }
        }
    }

    fn stop(&mut self) {
        self.halt_ticker();
        self.source = None;
        self.started_at = None;
        self.base_position = 0.0;
        self.duration = 0.0;
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}

impl Drop for ClockOutput {
    fn drop(&mut self) {
        self.halt_ticker();
    }
}
