//! HTTP request handlers
//!
//! Each handler forwards one intent to the engine. Intents that are no-ops
//! in the current state (out-of-range index, empty queue) still answer 200.

use crate::api::AppState;
use crate::error::Error;
use crate::now_playing::RemoteCommand;
use crate::playback::PlayerStatus;
use crate::track::{Track, TrackId};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use nwp_common::{PlaybackMode, QualityTier};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
    port: u16,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    track: Track,
    #[serde(default = "default_autostart")]
    autostart: bool,
}

fn default_autostart() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct IndexRequest {
    index: usize,
}

/// Absolute `position`, or relative `delta` (configured step when both are absent)
#[derive(Debug, Deserialize)]
pub struct SeekRequest {
    #[serde(default)]
    position: Option<f64>,
    #[serde(default)]
    delta: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    /// 0.0-1.0
    volume: f64,
}

#[derive(Debug, Serialize)]
pub struct MuteResponse {
    muted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModeRequest {
    mode: PlaybackMode,
}

#[derive(Debug, Serialize)]
pub struct ModeResponse {
    mode: PlaybackMode,
}

#[derive(Debug, Deserialize)]
pub struct QualityRequest {
    quality: QualityTier,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistRequest {
    tracks: Vec<Track>,
    #[serde(default)]
    start_index: usize,
}

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    track: Track,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrashRequest {
    #[serde(default)]
    track_id: Option<TrackId>,
}

#[derive(Debug, Deserialize)]
pub struct RemoteQuery {
    value: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct QueueResponse {
    tracks: Vec<Track>,
    current_index: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    tracks: Vec<Track>,
}

type ApiError = (StatusCode, Json<StatusResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn ok() -> ApiResult<StatusResponse> {
    Ok(Json(StatusResponse {
        status: "ok".to_string(),
    }))
}

/// Map an engine error onto an HTTP status
fn error_response(e: Error) -> ApiError {
    let code = match &e {
        Error::BadRequest(_) => StatusCode::BAD_REQUEST,
        Error::Superseded => StatusCode::CONFLICT,
        Error::Resolution(_) | Error::Output(_) | Error::RadioExhausted => StatusCode::BAD_GATEWAY,
        Error::EngineStopped => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warn!(status = %code, error = %e, "Request failed");
    (
        code,
        Json(StatusResponse {
            status: format!("error: {}", e),
        }),
    )
}

fn respond(result: crate::error::Result<()>) -> ApiResult<StatusResponse> {
    result.map_err(error_response)?;
    ok()
}

// ============================================================================
// Health / Status
// ============================================================================

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "nwp-player".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        port: state.port,
    })
}

/// GET /player/status
pub async fn get_status(State(state): State<AppState>) -> Json<PlayerStatus> {
    Json(state.engine.status())
}

// ============================================================================
// Transport
// ============================================================================

/// POST /player/play - play a track, inserting it after the current entry
pub async fn play(State(state): State<AppState>, Json(req): Json<PlayRequest>) -> ApiResult<StatusResponse> {
    info!(track_id = req.track.id, "Play request");
    respond(state.engine.play_with(req.track, req.autostart).await)
}

/// POST /player/play_at
pub async fn play_at(State(state): State<AppState>, Json(req): Json<IndexRequest>) -> ApiResult<StatusResponse> {
    respond(state.engine.play_at(req.index).await)
}

/// POST /player/toggle
pub async fn toggle(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    respond(state.engine.toggle().await)
}

/// POST /player/pause
pub async fn pause(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    respond(state.engine.pause().await)
}

/// POST /player/resume
pub async fn resume(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    respond(state.engine.resume().await)
}

/// POST /player/next
pub async fn next(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    respond(state.engine.next().await)
}

/// POST /player/prev
pub async fn prev(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    respond(state.engine.prev().await)
}

/// POST /player/seek
pub async fn seek(State(state): State<AppState>, Json(req): Json<SeekRequest>) -> ApiResult<StatusResponse> {
    let result = match req.position {
        Some(position) => state.engine.seek(position).await,
        None => state.engine.seek_by(req.delta).await,
    };
    respond(result)
}

/// POST /player/volume
pub async fn set_volume(State(state): State<AppState>, Json(req): Json<VolumeRequest>) -> ApiResult<StatusResponse> {
    if !req.volume.is_finite() {
        return Err(error_response(Error::BadRequest("volume must be a number".to_string())));
    }
    respond(state.engine.set_volume(req.volume).await)
}

/// POST /player/mute - toggle mute
pub async fn toggle_mute(State(state): State<AppState>) -> ApiResult<MuteResponse> {
    let muted = state.engine.toggle_mute().await.map_err(error_response)?;
    Ok(Json(MuteResponse { muted }))
}

/// POST /player/mode
pub async fn set_mode(State(state): State<AppState>, Json(req): Json<ModeRequest>) -> ApiResult<StatusResponse> {
    info!(mode = %req.mode, "Set mode request");
    respond(state.engine.set_mode(req.mode).await)
}

/// POST /player/mode/cycle
pub async fn cycle_mode(State(state): State<AppState>) -> ApiResult<ModeResponse> {
    let mode = state.engine.cycle_mode().await.map_err(error_response)?;
    Ok(Json(ModeResponse { mode }))
}

/// POST /player/quality
pub async fn set_quality(State(state): State<AppState>, Json(req): Json<QualityRequest>) -> ApiResult<StatusResponse> {
    respond(state.engine.set_quality(req.quality).await)
}

// ============================================================================
// Queue
// ============================================================================

/// GET /queue
pub async fn get_queue(State(state): State<AppState>) -> Json<QueueResponse> {
    let status = state.engine.status();
    Json(QueueResponse {
        tracks: status.queue,
        current_index: status.current_index,
    })
}

/// POST /queue - replace the playlist
pub async fn set_playlist(State(state): State<AppState>, Json(req): Json<PlaylistRequest>) -> ApiResult<StatusResponse> {
    info!(len = req.tracks.len(), start_index = req.start_index, "Set playlist request");
    respond(state.engine.set_playlist(req.tracks, req.start_index).await)
}

/// POST /queue/add
pub async fn add_to_queue(State(state): State<AppState>, Json(req): Json<AddRequest>) -> ApiResult<StatusResponse> {
    respond(state.engine.add_to_playlist(req.track).await)
}

/// DELETE /queue/:index
pub async fn remove_from_queue(State(state): State<AppState>, Path(index): Path<usize>) -> ApiResult<StatusResponse> {
    respond(state.engine.remove_from_playlist(index).await)
}

/// POST /queue/clear
pub async fn clear_queue(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    info!("Clear queue request");
    respond(state.engine.clear().await)
}

// ============================================================================
// Personal radio
// ============================================================================

/// POST /radio/start
pub async fn radio_start(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    info!("Radio start request");
    respond(state.engine.radio_start().await)
}

/// POST /radio/stop
pub async fn radio_stop(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    respond(state.engine.radio_stop().await)
}

/// POST /radio/skip
pub async fn radio_skip(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    respond(state.engine.radio_skip().await)
}

/// POST /radio/trash - body optional; trashes the current track by default
pub async fn radio_trash(
    State(state): State<AppState>,
    req: Option<Json<TrashRequest>>,
) -> ApiResult<StatusResponse> {
    let Json(req) = req.unwrap_or_default();
    respond(state.engine.radio_trash(req.track_id).await)
}

// ============================================================================
// History / Remote
// ============================================================================

/// GET /history
pub async fn get_history(State(state): State<AppState>) -> ApiResult<HistoryResponse> {
    let tracks = state.engine.history().await.map_err(error_response)?;
    Ok(Json(HistoryResponse { tracks }))
}

/// POST /remote/:command?value=N - relay a now-playing transport command
pub async fn remote_command(
    State(state): State<AppState>,
    Path(command): Path<String>,
    Query(query): Query<RemoteQuery>,
) -> ApiResult<StatusResponse> {
    let command = RemoteCommand::from_parts(&command, query.value).map_err(error_response)?;
    state
        .remote_tx
        .send(command)
        .await
        .map_err(|_| error_response(Error::EngineStopped))?;
    ok()
}
