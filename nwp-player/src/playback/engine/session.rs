//! Session persistence: snapshot writes, restore and shutdown

use super::core::{EngineCore, LoadIntent, RestorePoint};
use crate::persistence::{PersistedSnapshot, SNAPSHOT_VERSION};
use nwp_common::events::QueueChangeTrigger;
use std::time::Instant;
use tracing::{debug, info, warn};

impl EngineCore {
    fn build_snapshot(&self) -> PersistedSnapshot {
        PersistedSnapshot {
            version: SNAPSHOT_VERSION,
            queue: self.queue.tracks().to_vec(),
            index: self.queue.cursor(),
            position_seconds: self.position,
            duration_seconds: self.duration,
            is_playing: self.playing_intent(),
            lyrics: self.lyrics.clone(),
            lyric_index: self.lyric_index,
        }
    }

    /// Persist the session
    ///
    /// Position ticks pass `force = false` and are limited to one write per
    /// `snapshot_interval`; every other mutation writes immediately. Write
    /// failures are logged and never interrupt playback.
    pub(super) async fn write_snapshot(&mut self, force: bool) {
        let now = Instant::now();
        if !force {
            let recent = self
                .last_snapshot_at
                .is_some_and(|at| now.duration_since(at) < self.config.snapshot_interval);
            if recent {
                return;
            }
        }

        let snapshot = self.build_snapshot();
        if let Err(e) = self.store.save_snapshot(&snapshot).await {
            warn!(error = %e, "Failed to persist player snapshot");
            return;
        }
        self.last_snapshot_at = Some(now);
    }

    /// Rebuild the queue from the last snapshot
    ///
    /// The restored track is loaded paused at its saved position, without
    /// refetching lyrics. Playback never starts on its own after a restart.
    pub(super) async fn restore(&mut self) {
        let snapshot = match self.store.load_snapshot().await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                debug!("No player snapshot to restore");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Failed to load player snapshot");
                return;
            }
        };

        self.queue.replace(snapshot.queue);
        info!(
            len = self.queue.len(),
            index = ?snapshot.index,
            position = snapshot.position_seconds,
            "Restoring player session"
        );
        self.emit_queue_changed(QueueChangeTrigger::Restored);

        match snapshot.index.filter(|&i| i < self.queue.len()) {
            Some(index) => {
                let point = RestorePoint {
                    position: snapshot.position_seconds.max(0.0),
                    duration: snapshot.duration_seconds,
                    lyrics: snapshot.lyrics,
                    lyric_index: snapshot.lyric_index,
                };
                let intent = LoadIntent {
                    autostart: false,
                    restore: Some(point),
                };
                self.begin_load(index, intent, None).await;
            }
            None => self.publish_status(),
        }
    }

    /// Final snapshot before the engine task exits
    pub(super) async fn shutdown(&mut self) {
        info!("Player engine shutting down");
        self.cancel_recovery();
        self.write_snapshot(true).await;
        self.stop_output();
    }
}
