//! Now-playing surface adapter
//!
//! Outbound: the engine publishes [`NowPlayingInfo`] to a
//! [`NowPlayingSurface`] whenever metadata or transport state changes.
//! Inbound: platform transport controls arrive as [`RemoteCommand`]s on an
//! mpsc channel and are handled exactly like local intents.

use crate::error::Error;
use nwp_common::events::NowPlayingInfo;
use nwp_common::{time, EventBus, PlayerEvent};
use std::str::FromStr;

/// Platform-level now-playing display
pub trait NowPlayingSurface: Send + Sync {
    fn publish(&self, info: &NowPlayingInfo);
}

/// Surface that forwards now-playing updates onto the event bus
#[derive(Clone)]
pub struct BroadcastSurface {
    event_bus: EventBus,
}

impl BroadcastSurface {
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }
}

impl NowPlayingSurface for BroadcastSurface {
    fn publish(&self, info: &NowPlayingInfo) {
        self.event_bus.emit_lossy(PlayerEvent::NowPlayingChanged {
            info: info.clone(),
            timestamp: time::now(),
        });
    }
}

/// Transport command from the now-playing surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RemoteCommand {
    Play,
    Pause,
    Next,
    Prev,
    SeekTo(f64),
    /// Relative seek forward; `None` uses the configured step
    SeekForward(Option<f64>),
    /// Relative seek backward; `None` uses the configured step
    SeekBackward(Option<f64>),
}

impl RemoteCommand {
    /// Parse a route segment plus optional numeric argument
    ///
    /// Accepted names: `play`, `pause`, `next`, `prev` (or `previous`),
    /// `seekto` (requires a value), `seekforward`, `seekbackward`.
    pub fn from_parts(name: &str, value: Option<f64>) -> Result<Self, Error> {
        match name.to_ascii_lowercase().as_str() {
            "play" => Ok(RemoteCommand::Play),
            "pause" => Ok(RemoteCommand::Pause),
            "next" | "nexttrack" => Ok(RemoteCommand::Next),
            "prev" | "previous" | "previoustrack" => Ok(RemoteCommand::Prev),
            "seekto" => value
                .map(RemoteCommand::SeekTo)
                .ok_or_else(|| Error::BadRequest("seekto requires a position".to_string())),
            "seekforward" => Ok(RemoteCommand::SeekForward(value.map(f64::abs))),
            "seekbackward" => Ok(RemoteCommand::SeekBackward(value.map(f64::abs))),
            other => Err(Error::BadRequest(format!("unknown remote command: {}", other))),
        }
    }
}

impl FromStr for RemoteCommand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RemoteCommand::from_parts(s, None)
    }
}
