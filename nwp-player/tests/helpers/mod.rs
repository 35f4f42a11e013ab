//! Shared test infrastructure for nwp-player integration tests
//!
//! - MockResolver: scripted stream/lyrics/radio answers
//! - OutputProbe: controllable output device
//! - TestPlayer: engine wired to both plus an in-memory SQLite store

#![allow(dead_code)]

pub mod mock_output;
pub mod mock_resolver;
pub mod test_player;

pub use mock_output::OutputProbe;
pub use mock_resolver::{stream_url, tracks, MockResolver};
pub use test_player::{setup_test_db, test_config, TestPlayer};
