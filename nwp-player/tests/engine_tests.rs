//! Player engine integration tests: transport, queue, sequencing, failure
//! recovery and lyric sync against a mock resolver and output.

mod helpers;

use helpers::test_player::TRACK_SECONDS;
use helpers::{stream_url, test_config, tracks, MockResolver, TestPlayer};
use nwp_common::events::FailureKind;
use nwp_common::{PlaybackMode, PlaybackState, PlayerEvent, QualityTier};
use nwp_player::now_playing::RemoteCommand;
use nwp_player::playback::OutputEvent;
use nwp_player::track::Track;
use nwp_player::Error;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Queue and transport
// ============================================================================

#[tokio::test]
async fn test_set_playlist_starts_requested_index() {
    let player = TestPlayer::new().await;
    player.engine.set_playlist(tracks(&[1, 2, 3]), 1).await.unwrap();

    let status = player.engine.status();
    assert_eq!(status.state, PlaybackState::Playing);
    assert_eq!(status.current_index, Some(1));
    assert_eq!(player.current_id(), Some(2));
    assert_eq!(status.duration_seconds, TRACK_SECONDS);
    assert!(player.output.is_playing());
    assert_eq!(player.output.with(|s| s.loads[0].1.clone()), stream_url(2));
}

#[tokio::test]
async fn test_play_inserts_after_current() {
    let player = TestPlayer::new().await;
    player.engine.set_playlist(tracks(&[1, 2, 3]), 0).await.unwrap();

    player.engine.play(Track::new(9, "Nine")).await.unwrap();

    let status = player.engine.status();
    let ids: Vec<u64> = status.queue.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 9, 2, 3]);
    assert_eq!(status.current_index, Some(1));
    assert_eq!(status.state, PlaybackState::Playing);
}

#[tokio::test]
async fn test_play_queued_track_moves_cursor_without_duplicate() {
    let player = TestPlayer::new().await;
    player.engine.set_playlist(tracks(&[1, 2, 3]), 0).await.unwrap();

    player.engine.play(Track::new(3, "Track 3")).await.unwrap();

    let status = player.engine.status();
    assert_eq!(status.queue.len(), 3);
    assert_eq!(status.current_index, Some(2));
}

#[tokio::test]
async fn test_play_without_autostart_loads_paused() {
    let player = TestPlayer::new().await;
    player.engine.play_with(Track::new(5, "Five"), false).await.unwrap();

    assert_eq!(player.engine.status().state, PlaybackState::Paused);
    assert!(!player.output.is_playing());
}

#[tokio::test]
async fn test_next_prev_wrap_in_sequential_mode() {
    let player = TestPlayer::new().await;
    player.engine.set_playlist(tracks(&[1, 2, 3]), 2).await.unwrap();

    player.engine.next().await.unwrap();
    assert_eq!(player.engine.status().current_index, Some(0));

    player.engine.prev().await.unwrap();
    assert_eq!(player.engine.status().current_index, Some(2));

    player.engine.prev().await.unwrap();
    assert_eq!(player.engine.status().current_index, Some(1));
}

#[tokio::test]
async fn test_invalid_intents_are_noops() {
    let player = TestPlayer::new().await;

    // Empty queue
    player.engine.next().await.unwrap();
    player.engine.prev().await.unwrap();
    player.engine.toggle().await.unwrap();
    player.engine.remove_from_playlist(0).await.unwrap();
    assert_eq!(player.engine.status().state, PlaybackState::Idle);

    player.engine.set_playlist(tracks(&[1, 2]), 0).await.unwrap();
    player.engine.play_at(7).await.unwrap();
    player.engine.remove_from_playlist(7).await.unwrap();

    let status = player.engine.status();
    assert_eq!(status.current_index, Some(0));
    assert_eq!(status.queue.len(), 2);
    assert_eq!(player.output.load_count(), 1);
}

#[tokio::test]
async fn test_set_playlist_past_end_leaves_idle() {
    let player = TestPlayer::new().await;
    player.engine.set_playlist(tracks(&[1, 2]), 5).await.unwrap();

    let status = player.engine.status();
    assert_eq!(status.state, PlaybackState::Idle);
    assert_eq!(status.current_index, None);
    assert_eq!(status.queue.len(), 2);
}

#[tokio::test]
async fn test_toggle_pause_resume() {
    let player = TestPlayer::new().await;
    player.engine.set_playlist(tracks(&[1]), 0).await.unwrap();

    player.engine.toggle().await.unwrap();
    assert_eq!(player.engine.status().state, PlaybackState::Paused);
    assert!(!player.output.is_playing());

    player.engine.toggle().await.unwrap();
    assert_eq!(player.engine.status().state, PlaybackState::Playing);
    assert!(player.output.is_playing());

    player.engine.pause().await.unwrap();
    player.engine.pause().await.unwrap();
    assert_eq!(player.engine.status().state, PlaybackState::Paused);

    player.engine.resume().await.unwrap();
    assert_eq!(player.engine.status().state, PlaybackState::Playing);
}

#[tokio::test]
async fn test_pause_while_loading_keeps_track_paused() {
    let resolver = MockResolver::new();
    resolver.delay(1, Duration::from_millis(150));
    let player = TestPlayer::with_resolver(resolver).await;

    let engine = player.engine.clone();
    let load = tokio::spawn(async move { engine.set_playlist(tracks(&[1]), 0).await });
    player.wait_for(|s| s.state == PlaybackState::Loading).await;

    player.engine.pause().await.unwrap();
    load.await.unwrap().unwrap();

    assert_eq!(player.engine.status().state, PlaybackState::Paused);
    assert!(!player.output.is_playing());
}

#[tokio::test]
async fn test_seek_clamps_to_duration() {
    let player = TestPlayer::new().await;
    player.engine.set_playlist(tracks(&[1]), 0).await.unwrap();

    player.engine.seek(500.0).await.unwrap();
    assert_eq!(player.engine.status().position_seconds, TRACK_SECONDS);

    player.engine.seek(-3.0).await.unwrap();
    assert_eq!(player.engine.status().position_seconds, 0.0);

    player.engine.seek(42.0).await.unwrap();
    assert_eq!(player.engine.status().position_seconds, 42.0);
    assert_eq!(player.output.with(|s| s.seeks.clone()), vec![TRACK_SECONDS, 0.0, 42.0]);

    player.engine.seek_by(None).await.unwrap();
    assert_eq!(player.engine.status().position_seconds, 52.0);
}

#[tokio::test]
async fn test_seek_ignored_when_idle() {
    let player = TestPlayer::new().await;
    player.engine.seek(10.0).await.unwrap();

    assert_eq!(player.engine.status().position_seconds, 0.0);
}

#[tokio::test]
async fn test_volume_clamped_and_mute_toggles() {
    let player = TestPlayer::new().await;
    player.engine.set_playlist(tracks(&[1]), 0).await.unwrap();

    player.engine.set_volume(1.7).await.unwrap();
    assert_eq!(player.engine.status().volume, 1.0);
    assert_eq!(player.output.with(|s| s.volume), Some(1.0));

    player.engine.set_volume(f64::NAN).await.unwrap();
    assert_eq!(player.engine.status().volume, 1.0);

    player.engine.set_volume(-0.5).await.unwrap();
    assert_eq!(player.engine.status().volume, 0.0);

    assert!(player.engine.toggle_mute().await.unwrap());
    assert!(player.output.with(|s| s.muted));
    assert!(!player.engine.toggle_mute().await.unwrap());
}

#[tokio::test]
async fn test_cycle_mode_rotation() {
    let player = TestPlayer::new().await;

    assert_eq!(player.engine.cycle_mode().await.unwrap(), PlaybackMode::Random);
    assert_eq!(player.engine.cycle_mode().await.unwrap(), PlaybackMode::Loop);
    assert_eq!(player.engine.cycle_mode().await.unwrap(), PlaybackMode::Sequential);
    assert_eq!(player.engine.status().mode, PlaybackMode::Sequential);
}

#[tokio::test]
async fn test_random_next_stays_in_bounds() {
    let player = TestPlayer::new().await;
    player.engine.set_mode(PlaybackMode::Random).await.unwrap();
    player.engine.set_playlist(tracks(&[1, 2, 3, 4]), 0).await.unwrap();

    for _ in 0..10 {
        player.engine.next().await.unwrap();
        let status = player.engine.status();
        assert!(status.current_index.is_some_and(|i| i < 4));
        assert_eq!(status.state, PlaybackState::Playing);
    }
}

#[tokio::test]
async fn test_remove_current_advances_to_shifted_entry() {
    let player = TestPlayer::new().await;
    player.engine.set_playlist(tracks(&[1, 2, 3]), 1).await.unwrap();

    player.engine.remove_from_playlist(1).await.unwrap();

    let status = player
        .wait_for(|s| s.state == PlaybackState::Playing && s.current_track.as_ref().is_some_and(|t| t.id == 3))
        .await;
    assert_eq!(status.queue.len(), 2);
    assert_eq!(status.current_index, Some(1));
}

#[tokio::test]
async fn test_remove_current_in_loop_mode_plays_shifted_slot() {
    let player = TestPlayer::new().await;
    player.engine.set_mode(PlaybackMode::Loop).await.unwrap();
    player.engine.set_playlist(tracks(&[1, 2, 3]), 2).await.unwrap();

    player.engine.remove_from_playlist(2).await.unwrap();

    player
        .wait_for(|s| s.state == PlaybackState::Playing && s.current_track.as_ref().is_some_and(|t| t.id == 2))
        .await;
}

#[tokio::test]
async fn test_remove_before_current_keeps_track() {
    let player = TestPlayer::new().await;
    player.engine.set_playlist(tracks(&[1, 2, 3]), 2).await.unwrap();

    player.engine.remove_from_playlist(0).await.unwrap();

    let status = player.wait_for(|s| s.queue.len() == 2).await;
    assert_eq!(status.current_index, Some(1));
    assert_eq!(status.current_track.map(|t| t.id), Some(3));
    assert_eq!(player.output.load_count(), 1);
}

#[tokio::test]
async fn test_remove_last_entry_goes_idle() {
    let player = TestPlayer::new().await;
    player.engine.set_playlist(tracks(&[1]), 0).await.unwrap();

    player.engine.remove_from_playlist(0).await.unwrap();

    let status = player.wait_for(|s| s.state == PlaybackState::Idle).await;
    assert!(status.queue.is_empty());
    assert!(!player.output.is_playing());
}

#[tokio::test]
async fn test_add_to_playlist_ignores_duplicates() {
    let player = TestPlayer::new().await;
    player.engine.add_to_playlist(Track::new(1, "a")).await.unwrap();
    player.engine.add_to_playlist(Track::new(2, "b")).await.unwrap();
    player.engine.add_to_playlist(Track::new(1, "a")).await.unwrap();

    let status = player.engine.status();
    assert_eq!(status.queue.len(), 2);
    // Appending never starts playback
    assert_eq!(status.state, PlaybackState::Idle);
}

#[tokio::test]
async fn test_clear_resets_queue_and_keeps_volume() {
    let player = TestPlayer::new().await;
    player.engine.set_playlist(tracks(&[1, 2]), 0).await.unwrap();
    player.engine.set_volume(0.3).await.unwrap();

    player.engine.clear().await.unwrap();

    let status = player.engine.status();
    assert_eq!(status.state, PlaybackState::Idle);
    assert!(status.queue.is_empty());
    assert_eq!(status.current_index, None);
    assert_eq!(status.position_seconds, 0.0);
    assert!(status.lyrics.is_empty());
    assert_eq!(status.volume, 0.3);
    assert!(!player.output.is_playing());
}

#[tokio::test]
async fn test_history_newest_first() {
    let player = TestPlayer::new().await;
    player.engine.set_playlist(tracks(&[1, 2]), 0).await.unwrap();
    player.engine.next().await.unwrap();

    let ids: Vec<u64> = player.engine.history().await.unwrap().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![2, 1]);
}

// ============================================================================
// End of track and output feedback
// ============================================================================

#[tokio::test]
async fn test_end_of_track_advances() {
    let player = TestPlayer::new().await;
    player.engine.set_playlist(tracks(&[1, 2]), 0).await.unwrap();

    player.output.end();
    player
        .wait_for(|s| s.state == PlaybackState::Playing && s.current_index == Some(1))
        .await;

    player.output.end();
    player
        .wait_for(|s| s.state == PlaybackState::Playing && s.current_index == Some(0))
        .await;
}

#[tokio::test]
async fn test_loop_mode_restarts_track() {
    let player = TestPlayer::new().await;
    player.engine.set_mode(PlaybackMode::Loop).await.unwrap();
    player.engine.set_playlist(tracks(&[1, 2]), 0).await.unwrap();

    player.output.tick(120.0);
    player.wait_for(|s| s.position_seconds == 120.0).await;

    player.output.end();
    let status = player.wait_for(|s| s.position_seconds == 0.0).await;
    assert_eq!(status.current_index, Some(0));
    assert_eq!(status.state, PlaybackState::Playing);
    assert_eq!(player.output.load_count(), 1);
    assert_eq!(player.output.with(|s| s.seeks.clone()), vec![0.0]);
}

#[tokio::test]
async fn test_stale_output_events_ignored() {
    let player = TestPlayer::new().await;
    player.engine.set_playlist(tracks(&[1, 2]), 0).await.unwrap();
    let old_source = player.output.last_source().unwrap();

    player.engine.next().await.unwrap();
    player.output.send(OutputEvent::Ended { source: old_source });
    player.output.send(OutputEvent::Position {
        source: old_source,
        position: 99.0,
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let status = player.engine.status();
    assert_eq!(status.current_index, Some(1));
    assert_eq!(status.state, PlaybackState::Playing);
    assert_eq!(status.position_seconds, 0.0);
}

#[tokio::test]
async fn test_position_ticks_update_status() {
    let player = TestPlayer::new().await;
    player.engine.set_playlist(tracks(&[1]), 0).await.unwrap();

    player.output.tick(50.0);
    let status = player.wait_for(|s| s.position_seconds == 50.0).await;
    assert_eq!(status.progress_percent, 25.0);
}

#[tokio::test]
async fn test_non_finite_position_is_ignored() {
    let resolver = MockResolver::new();
    resolver.set_lyrics(1, "[00:00.00]intro\n[00:30.00]verse");
    let player = TestPlayer::with_resolver(resolver).await;
    player.engine.set_playlist(tracks(&[1]), 0).await.unwrap();

    player.output.tick(40.0);
    player.wait_for(|s| s.position_seconds == 40.0).await;

    player.output.tick(f64::NAN);
    player.output.tick(f64::INFINITY);
    player.output.tick(45.0);

    let status = player.wait_for(|s| s.position_seconds == 45.0).await;
    assert_eq!(status.lyric_index, Some(1));
    assert_eq!(status.state, PlaybackState::Playing);
}

#[tokio::test]
async fn test_buffering_flag_follows_output() {
    let player = TestPlayer::new().await;
    player.engine.set_playlist(tracks(&[1]), 0).await.unwrap();
    let source = player.output.last_source().unwrap();

    player.output.send(OutputEvent::Buffering {
        source,
        buffering: true,
    });
    player.wait_for(|s| s.buffering).await;

    player.output.send(OutputEvent::Buffering {
        source,
        buffering: false,
    });
    player.wait_for(|s| !s.buffering).await;
}

// ============================================================================
// Failure recovery
// ============================================================================

#[tokio::test]
async fn test_unresolvable_track_is_skipped() {
    let resolver = MockResolver::new();
    resolver.fail(2);
    let player = TestPlayer::with_resolver(resolver).await;

    let result = player.engine.set_playlist(tracks(&[1, 2, 3]), 1).await;
    assert!(matches!(result, Err(Error::Resolution(_))));

    let status = player
        .wait_for(|s| s.state == PlaybackState::Playing && s.current_index == Some(2))
        .await;
    assert_eq!(status.failed_track_ids, vec![2]);
}

#[tokio::test]
async fn test_output_error_is_skipped() {
    let player = TestPlayer::new().await;
    player.output.fail_url(stream_url(2));

    let result = player.engine.set_playlist(tracks(&[1, 2, 3]), 1).await;
    assert!(matches!(result, Err(Error::Output(_))));

    let status = player
        .wait_for(|s| s.state == PlaybackState::Playing && s.current_index == Some(2))
        .await;
    assert_eq!(status.failed_track_ids, vec![2]);
}

#[tokio::test]
async fn test_error_during_playback_advances() {
    let player = TestPlayer::new().await;
    player.engine.set_playlist(tracks(&[1, 2]), 0).await.unwrap();

    player.output.error("network reset");

    let status = player
        .wait_for(|s| s.state == PlaybackState::Playing && s.current_index == Some(1))
        .await;
    assert_eq!(status.failed_track_ids, vec![1]);
}

#[tokio::test]
async fn test_failures_skip_known_failed_entries() {
    let resolver = MockResolver::new();
    resolver.fail(1);
    resolver.fail(2);
    let player = TestPlayer::with_resolver(resolver).await;

    let _ = player.engine.set_playlist(tracks(&[1, 2, 3]), 0).await;

    player
        .wait_for(|s| s.state == PlaybackState::Playing && s.current_index == Some(2))
        .await;
}

#[tokio::test]
async fn test_all_tracks_failing_ends_idle() {
    let resolver = MockResolver::new();
    for id in 1..=3 {
        resolver.fail(id);
    }
    let player = TestPlayer::with_resolver(resolver).await;

    let result = player.engine.set_playlist(tracks(&[1, 2, 3]), 0).await;
    assert!(result.is_err());

    let status = player
        .wait_for(|s| s.state == PlaybackState::Idle && s.failed_track_ids.len() == 3)
        .await;
    assert_eq!(status.current_index, None);
    assert_eq!(status.queue.len(), 3);

    // No further attempts once idle
    let attempts = player.resolver.resolve_calls().len();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(player.resolver.resolve_calls().len(), attempts);
}

#[tokio::test]
async fn test_explicit_intent_cancels_pending_recovery() {
    let resolver = Arc::new(MockResolver::new());
    resolver.fail(1);
    let mut config = test_config();
    config.failure_recovery_delay = Duration::from_millis(300);
    let player = TestPlayer::start(resolver, helpers::setup_test_db().await, config).await;

    let _ = player.engine.set_playlist(tracks(&[1, 2, 3]), 0).await;
    player.engine.play_at(2).await.unwrap();

    tokio::time::sleep(Duration::from_millis(450)).await;
    let status = player.engine.status();
    assert_eq!(status.current_index, Some(2));
    assert_eq!(status.state, PlaybackState::Playing);
    assert_eq!(player.output.load_count(), 1);
}

#[tokio::test]
async fn test_retrying_failed_track_still_reaches_playable_entry() {
    let resolver = Arc::new(MockResolver::new());
    resolver.fail(1);
    let mut config = test_config();
    config.failure_recovery_delay = Duration::from_millis(200);
    let player = TestPlayer::start(resolver, helpers::setup_test_db().await, config).await;

    let _ = player.engine.set_playlist(tracks(&[1, 2]), 0).await;
    // Retry the broken entry before the recovery timer fires
    let retry = player.engine.play_at(0).await;
    assert!(matches!(retry, Err(Error::Resolution(_))));

    let status = player
        .wait_for(|s| s.state == PlaybackState::Playing && s.current_index == Some(1))
        .await;
    assert_eq!(status.failed_track_ids, vec![1]);
}

#[tokio::test]
async fn test_newer_play_supersedes_pending_load() {
    let resolver = MockResolver::new();
    resolver.delay(1, Duration::from_millis(300));
    let player = TestPlayer::with_resolver(resolver).await;
    player.engine.set_playlist(tracks(&[1, 2]), 9).await.unwrap();

    let engine = player.engine.clone();
    let first = tokio::spawn(async move { engine.play_at(0).await });
    player.wait_for(|s| s.state == PlaybackState::Loading).await;

    player.engine.play_at(1).await.unwrap();
    assert!(matches!(first.await.unwrap(), Err(Error::Superseded)));

    // The slow resolution for track 1 must not take over
    tokio::time::sleep(Duration::from_millis(400)).await;
    let status = player.engine.status();
    assert_eq!(status.current_index, Some(1));
    assert_eq!(player.output.load_count(), 1);
}

#[tokio::test]
async fn test_failure_event_emitted() {
    let resolver = MockResolver::new();
    resolver.fail(1);
    let player = TestPlayer::with_resolver(resolver).await;
    let mut events = player.engine.subscribe();

    let _ = player.engine.set_playlist(tracks(&[1, 2]), 0).await;

    let failed = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let PlayerEvent::TrackFailed { track_id, kind, .. } = events.recv().await.unwrap() {
                return (track_id, kind);
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(failed, (1, FailureKind::Resolution));
}

// ============================================================================
// Lyrics, metadata and quality
// ============================================================================

#[tokio::test]
async fn test_lyric_line_follows_position() {
    let resolver = MockResolver::new();
    resolver.set_lyrics(1, "[00:01.00]one\n[00:05.00]five\n[00:10.00]ten");
    let player = TestPlayer::with_resolver(resolver).await;
    player.engine.set_playlist(tracks(&[1]), 0).await.unwrap();
    assert_eq!(player.engine.status().lyrics.len(), 3);

    player.output.tick(6.0);
    let status = player.wait_for(|s| s.position_seconds == 6.0).await;
    assert_eq!(status.lyric_index, Some(1));
    assert_eq!(status.current_lyric(), Some("five"));

    player.output.tick(0.5);
    let status = player.wait_for(|s| s.position_seconds == 0.5).await;
    assert_eq!(status.lyric_index, None);

    player.output.tick(12.0);
    let status = player.wait_for(|s| s.position_seconds == 12.0).await;
    assert_eq!(status.lyric_index, Some(2));

    player.engine.seek(2.0).await.unwrap();
    assert_eq!(player.engine.status().lyric_index, Some(0));
}

#[tokio::test]
async fn test_missing_artwork_is_backfilled() {
    let resolver = MockResolver::new();
    let mut detail = Track::new(1, "Track 1");
    detail.artwork_url = Some("http://img.example/1.jpg".to_string());
    resolver.set_detail(detail);
    let player = TestPlayer::with_resolver(resolver).await;

    player.engine.set_playlist(tracks(&[1]), 0).await.unwrap();

    let status = player.engine.status();
    let track = status.current_track.unwrap();
    assert_eq!(track.display_artwork(), Some("http://img.example/1.jpg"));
}

#[tokio::test]
async fn test_quality_change_reloads_current_track() {
    let player = TestPlayer::new().await;
    player.engine.set_playlist(tracks(&[1]), 0).await.unwrap();
    player.output.tick(30.0);
    player.wait_for(|s| s.position_seconds == 30.0).await;

    player.engine.set_quality(QualityTier::Lossless).await.unwrap();

    let output = player.output.clone();
    let status = player
        .wait_for(move |s| s.state == PlaybackState::Playing && output.load_count() == 2)
        .await;
    assert_eq!(status.quality, QualityTier::Lossless);
    assert_eq!(status.position_seconds, 0.0);
    assert_eq!(
        player.resolver.resolve_calls().last(),
        Some(&(1, QualityTier::Lossless))
    );

    // Same tier again is a no-op
    player.engine.set_quality(QualityTier::Lossless).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(player.output.load_count(), 2);
}

// ============================================================================
// Remote commands
// ============================================================================

#[tokio::test]
async fn test_remote_commands_drive_transport() {
    let player = TestPlayer::new().await;
    player.engine.set_playlist(tracks(&[1, 2]), 0).await.unwrap();

    player.remote_tx.send(RemoteCommand::Pause).await.unwrap();
    player.wait_for(|s| s.state == PlaybackState::Paused).await;

    player.remote_tx.send(RemoteCommand::Play).await.unwrap();
    player.wait_for(|s| s.state == PlaybackState::Playing).await;

    player.remote_tx.send(RemoteCommand::SeekTo(42.0)).await.unwrap();
    player.wait_for(|s| s.position_seconds == 42.0).await;

    player.remote_tx.send(RemoteCommand::SeekForward(None)).await.unwrap();
    player.wait_for(|s| s.position_seconds == 52.0).await;

    player
        .remote_tx
        .send(RemoteCommand::SeekBackward(Some(100.0)))
        .await
        .unwrap();
    player.wait_for(|s| s.position_seconds == 0.0).await;

    player.remote_tx.send(RemoteCommand::Next).await.unwrap();
    player
        .wait_for(|s| s.current_index == Some(1) && s.state == PlaybackState::Playing)
        .await;
}

#[tokio::test]
async fn test_now_playing_published() {
    let player = TestPlayer::new().await;
    let mut events = player.engine.subscribe();

    player.engine.set_playlist(tracks(&[1]), 0).await.unwrap();

    let info = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let PlayerEvent::NowPlayingChanged { info, .. } = events.recv().await.unwrap() {
                if info.is_playing {
                    return info;
                }
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(info.title, "Track 1");
    assert_eq!(info.duration_seconds, TRACK_SECONDS);
}
