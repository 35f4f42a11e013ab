//! Error types for nwp-player
//!
//! Defines module-specific error types using thiserror for clear error propagation.
//! Validation failures (out-of-range index, empty queue) are deliberately not
//! represented here: those intents are no-ops that return `Ok(())`.

use thiserror::Error;

/// Main error type for nwp-player
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client or server errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// No playable stream URL for a track
    #[error("Resolution failed: {0}")]
    Resolution(String),

    /// Output reported a decode or network error during playback
    #[error("Output error: {0}")]
    Output(String),

    /// Personal radio could not obtain another batch
    #[error("Personal radio exhausted")]
    RadioExhausted,

    /// A newer intent replaced this one before it completed
    #[error("Superseded by a newer request")]
    Superseded,

    /// Invalid state for operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Engine task is no longer running
    #[error("Playback engine stopped")]
    EngineStopped,

    /// Invalid request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<nwp_common::Error> for Error {
    fn from(e: nwp_common::Error) -> Self {
        match e {
            nwp_common::Error::Database(e) => Error::Database(e),
            nwp_common::Error::Io(e) => Error::Io(e),
            nwp_common::Error::Config(msg) => Error::Config(msg),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Internal(format!("JSON error: {}", e))
    }
}

/// Convenience Result type using nwp-player Error
pub type Result<T> = std::result::Result<T, Error>;
