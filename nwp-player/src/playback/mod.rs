//! Playback engine, queue and output

pub mod engine;
pub mod output;
pub mod queue;
pub mod radio;
pub mod sequencing;
pub mod state;

pub use engine::{EngineBuilder, PlayerEngine};
pub use output::{AudioOutput, ClockOutput, OutputEvent, OutputEvents, OutputFactory};
pub use queue::PlayQueue;
pub use state::PlayerStatus;
