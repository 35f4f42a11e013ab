//! REST API for the player engine
//!
//! JSON endpoints under `/api/v1` that forward to [`PlayerEngine`], plus an
//! SSE stream of `PlayerEvent`s and a relay for now-playing remote commands.

pub mod handlers;
pub mod sse;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::now_playing::RemoteCommand;
use crate::playback::PlayerEngine;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Player engine handle
    pub engine: PlayerEngine,
    /// Inbound side of the now-playing remote command channel
    pub remote_tx: mpsc::Sender<RemoteCommand>,
    /// Server port
    pub port: u16,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .route("/health", get(handlers::health))
                // Transport
                .route("/player/status", get(handlers::get_status))
                .route("/player/play", post(handlers::play))
                .route("/player/play_at", post(handlers::play_at))
                .route("/player/toggle", post(handlers::toggle))
                .route("/player/pause", post(handlers::pause))
                .route("/player/resume", post(handlers::resume))
                .route("/player/next", post(handlers::next))
                .route("/player/prev", post(handlers::prev))
                .route("/player/seek", post(handlers::seek))
                .route("/player/volume", post(handlers::set_volume))
                .route("/player/mute", post(handlers::toggle_mute))
                .route("/player/mode", post(handlers::set_mode))
                .route("/player/mode/cycle", post(handlers::cycle_mode))
                .route("/player/quality", post(handlers::set_quality))
                // Queue
                .route("/queue", get(handlers::get_queue).post(handlers::set_playlist))
                .route("/queue/add", post(handlers::add_to_queue))
                .route("/queue/clear", post(handlers::clear_queue))
                .route("/queue/:index", delete(handlers::remove_from_queue))
                // Personal radio
                .route("/radio/start", post(handlers::radio_start))
                .route("/radio/stop", post(handlers::radio_stop))
                .route("/radio/skip", post(handlers::radio_skip))
                .route("/radio/trash", post(handlers::radio_trash))
                .route("/history", get(handlers::get_history))
                .route("/remote/:command", post(handlers::remote_command))
                .route("/events", get(sse::event_stream)),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
