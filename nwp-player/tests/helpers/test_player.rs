//! Engine harness

use super::{MockResolver, OutputProbe};
use nwp_player::config::EngineConfig;
use nwp_player::now_playing::RemoteCommand;
use nwp_player::persistence::SqliteStateStore;
use nwp_player::playback::{PlayerEngine, PlayerStatus};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const WAIT_TIMEOUT: Duration = Duration::from_secs(3);

/// Duration reported by the mock output for every track
pub const TRACK_SECONDS: f64 = 200.0;

pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    nwp_common::db::create_settings_table(&pool).await.unwrap();
    pool
}

/// Short delays so recovery paths finish quickly
pub fn test_config() -> EngineConfig {
    EngineConfig {
        failure_recovery_delay: Duration::from_millis(50),
        snapshot_interval: Duration::from_millis(0),
        radio_failure_limit: 3,
        ..EngineConfig::default()
    }
}

pub struct TestPlayer {
    pub engine: PlayerEngine,
    pub resolver: Arc<MockResolver>,
    pub output: OutputProbe,
    pub pool: SqlitePool,
    pub remote_tx: mpsc::Sender<RemoteCommand>,
}

impl TestPlayer {
    pub async fn new() -> Self {
        Self::start(Arc::new(MockResolver::new()), setup_test_db().await, test_config()).await
    }

    pub async fn with_resolver(resolver: MockResolver) -> Self {
        Self::start(Arc::new(resolver), setup_test_db().await, test_config()).await
    }

    pub async fn start(resolver: Arc<MockResolver>, pool: SqlitePool, config: EngineConfig) -> Self {
        let output = OutputProbe::new(TRACK_SECONDS);
        let (remote_tx, remote_rx) = mpsc::channel(8);
        let engine = PlayerEngine::builder(resolver.clone(), Arc::new(SqliteStateStore::new(pool.clone())))
            .config(config)
            .output_factory(output.factory())
            .remote_commands(remote_rx)
            .spawn()
            .await
            .unwrap();

        Self {
            engine,
            resolver,
            output,
            pool,
            remote_tx,
        }
    }

    /// Wait until the published status satisfies `pred`
    pub async fn wait_for(&self, pred: impl Fn(&PlayerStatus) -> bool) -> PlayerStatus {
        let mut rx = self.engine.watch_status();
        tokio::time::timeout(WAIT_TIMEOUT, async {
            loop {
                {
                    let status = rx.borrow_and_update();
                    if pred(&status) {
                        return status.clone();
                    }
                }
                rx.changed().await.expect("engine stopped");
            }
        })
        .await
        .unwrap_or_else(|_| panic!("timed out; last status: {:?}", self.engine.status()))
    }

    /// Id of the track under the cursor
    pub fn current_id(&self) -> Option<u64> {
        self.engine.status().current_track.map(|t| t.id)
    }
}
