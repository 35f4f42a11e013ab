//! Controllable playback output
//!
//! The engine owns the `MockOutput`; the test keeps an `OutputProbe` to the
//! same state to inspect calls and inject ticks, end of track and errors.

use nwp_player::playback::{AudioOutput, OutputEvent, OutputEvents, OutputFactory};
use nwp_player::{Error, Result};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct ProbeState {
    events: Option<OutputEvents>,
    /// (source, url) of every load, oldest first
    pub loads: Vec<(u64, String)>,
    pub source: Option<u64>,
    pub playing: bool,
    pub seeks: Vec<f64>,
    pub volume: Option<f64>,
    pub muted: bool,
    /// Duration reported with `Ready`
    pub duration: f64,
    failing_urls: HashSet<String>,
}

#[derive(Clone)]
pub struct OutputProbe {
    state: Arc<Mutex<ProbeState>>,
}

impl OutputProbe {
    pub fn new(duration: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(ProbeState {
                duration,
                ..Default::default()
            })),
        }
    }

    pub fn factory(&self) -> OutputFactory {
        let probe = self.clone();
        Box::new(move |events| {
            probe.state.lock().unwrap().events = Some(events);
            Box::new(MockOutput { probe }) as Box<dyn AudioOutput>
        })
    }

    /// Answer loads of `url` with an output error
    pub fn fail_url(&self, url: String) {
        self.state.lock().unwrap().failing_urls.insert(url);
    }

    pub fn with<T>(&self, f: impl FnOnce(&ProbeState) -> T) -> T {
        f(&self.state.lock().unwrap())
    }

    pub fn last_source(&self) -> Option<u64> {
        self.with(|s| s.loads.last().map(|(source, _)| *source))
    }

    pub fn load_count(&self) -> usize {
        self.with(|s| s.loads.len())
    }

    pub fn is_playing(&self) -> bool {
        self.with(|s| s.playing)
    }

    pub fn send(&self, event: OutputEvent) {
        let state = self.state.lock().unwrap();
        if let Some(events) = &state.events {
            let _ = events.send(event);
        }
    }

    pub fn tick(&self, position: f64) {
        if let Some(source) = self.with(|s| s.source) {
            self.send(OutputEvent::Position { source, position });
        }
    }

    pub fn end(&self) {
        if let Some(source) = self.with(|s| s.source) {
            self.send(OutputEvent::Ended { source });
        }
    }

    pub fn error(&self, message: &str) {
        if let Some(source) = self.with(|s| s.source) {
            self.send(OutputEvent::Error {
                source,
                message: message.to_string(),
            });
        }
    }
}

pub struct MockOutput {
    probe: OutputProbe,
}

impl AudioOutput for MockOutput {
    fn load(&mut self, source: u64, url: &str, duration_hint: f64) {
        let mut state = self.probe.state.lock().unwrap();
        state.loads.push((source, url.to_string()));
        state.source = Some(source);
        state.playing = false;

        let event = if state.failing_urls.contains(url) {
            OutputEvent::Error {
                source,
                message: format!("cannot decode {}", url),
            }
        } else {
            let duration = if state.duration > 0.0 {
                state.duration
            } else {
                duration_hint
            };
            OutputEvent::Ready { source, duration }
        };
        if let Some(events) = &state.events {
            let _ = events.send(event);
        }
    }

    fn play(&mut self) -> Result<()> {
        let mut state = self.probe.state.lock().unwrap();
        if state.source.is_none() {
            return Err(Error::Output("nothing loaded".to_string()));
        }
        state.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.probe.state.lock().unwrap().playing = false;
    }

    fn seek(&mut self, position: f64) {
        self.probe.state.lock().unwrap().seeks.push(position);
    }

    fn stop(&mut self) {
        let mut state = self.probe.state.lock().unwrap();
        state.playing = false;
        state.source = None;
    }

    fn set_volume(&mut self, volume: f64) {
        self.probe.state.lock().unwrap().volume = Some(volume);
    }

    fn set_muted(&mut self, muted: bool) {
        self.probe.state.lock().unwrap().muted = muted;
    }
}
