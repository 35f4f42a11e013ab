//! Settings database access
//!
//! Read/write player preferences and session state in the `settings`
//! key/value table. Scalar preferences (volume, mode, quality) live under
//! their own keys so they survive an explicit queue clear.

use crate::error::{Error, Result};
use nwp_common::{PlaybackMode, QualityTier};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

pub const VOLUME_KEY: &str = "volume_level";
pub const PLAY_MODE_KEY: &str = "play_mode";
pub const QUALITY_KEY: &str = "quality_tier";
pub const PLAYER_STATE_KEY: &str = "player_state";
pub const PLAY_HISTORY_KEY: &str = "play_history";

/// Get volume setting (0.0-1.0), falling back to `default`
pub async fn get_volume(db: &Pool<Sqlite>, default: f64) -> Result<f64> {
    match get_setting::<f64>(db, VOLUME_KEY).await? {
        Some(vol) if vol.is_finite() => Ok(vol.clamp(0.0, 1.0)),
        _ => Ok(default.clamp(0.0, 1.0)),
    }
}

/// Set volume setting (clamped to 0.0-1.0)
pub async fn set_volume(db: &Pool<Sqlite>, volume: f64) -> Result<()> {
    set_setting(db, VOLUME_KEY, volume.clamp(0.0, 1.0)).await
}

/// Get stored playback mode
///
/// Personal radio is never restored: a stored radio mode reads back as
/// sequential.
pub async fn get_play_mode(db: &Pool<Sqlite>) -> Result<PlaybackMode> {
    match get_setting::<PlaybackMode>(db, PLAY_MODE_KEY).await? {
        Some(PlaybackMode::PersonalRadio) | None => Ok(PlaybackMode::Sequential),
        Some(mode) => Ok(mode),
    }
}

/// Set playback mode (personal radio is stored as sequential)
pub async fn set_play_mode(db: &Pool<Sqlite>, mode: PlaybackMode) -> Result<()> {
    let stored = match mode {
        PlaybackMode::PersonalRadio => PlaybackMode::Sequential,
        other => other,
    };
    set_setting(db, PLAY_MODE_KEY, stored).await
}

/// Get stream quality tier, falling back to `default`
pub async fn get_quality_tier(db: &Pool<Sqlite>, default: QualityTier) -> Result<QualityTier> {
    Ok(get_setting::<QualityTier>(db, QUALITY_KEY)
        .await?
        .unwrap_or(default))
}

/// Set stream quality tier
pub async fn set_quality_tier(db: &Pool<Sqlite>, quality: QualityTier) -> Result<()> {
    set_setting(db, QUALITY_KEY, quality).await
}

/// Generic setting getter
///
/// Returns None if key doesn't exist in database.
/// Parses value from string using FromStr trait.
pub async fn get_setting<T: FromStr>(db: &Pool<Sqlite>, key: &str) -> Result<Option<T>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;

    match value {
        Some(s) => match s.parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(Error::Config(format!(
                "Failed to parse setting '{}' value: {}",
                key, s
            ))),
        },
        None => Ok(None),
    }
}

/// Generic setting setter
///
/// Inserts or updates setting in database.
pub async fn set_setting<T: ToString>(db: &Pool<Sqlite>, key: &str, value: T) -> Result<()> {
    let value_str = value.to_string();

    sqlx::query(
        r#"
        INSERT INTO settings (key, value, updated_at)
        VALUES (?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(value_str)
    .execute(db)
    .await?;

    Ok(())
}

/// Remove a setting; missing keys are not an error
pub async fn delete_setting(db: &Pool<Sqlite>, key: &str) -> Result<()> {
    sqlx::query("DELETE FROM settings WHERE key = ?")
        .bind(key)
        .execute(db)
        .await?;
    Ok(())
}
