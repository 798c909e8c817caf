//! # Test Fixtures
//!
//! A complete deployment in a temporary directory: one SQLite file per
//! shard plus an in-memory ranked set. Also shard backends that fail in
//! the two ways a real connection does.

use std::sync::Arc;

use async_trait::async_trait;
use leaderboard_core::{
    connection_name, BackendError, GameId, InMemoryRankedSet, LeaderboardConfig,
    LeaderboardService, Metrics, PlayerId, ScoreRecord, ShardBackend, SqliteShard,
};
use tempfile::TempDir;

/// Service type exercised by the integration tests.
pub type SqliteService = LeaderboardService<SqliteShard, InMemoryRankedSet>;

/// A running deployment. The directory is removed on drop.
pub struct Deployment {
    pub service: SqliteService,
    pub ranked: Arc<InMemoryRankedSet>,
    pub metrics: Arc<Metrics>,
    pub config: LeaderboardConfig,
    pub dir: TempDir,
}

impl Deployment {
    /// Fresh deployment with `shard_count` empty shards.
    pub fn new(shard_count: i64) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = LeaderboardConfig {
            shard_count,
            data_dir: dir.path().to_path_buf(),
            ..LeaderboardConfig::for_testing()
        };
        let ranked = Arc::new(InMemoryRankedSet::new());
        let metrics = Arc::new(Metrics::new());
        let service = open(&config, ranked.clone()).with_metrics(metrics.clone());
        Self {
            service,
            ranked,
            metrics,
            config,
            dir,
        }
    }

    /// A second process over the same shard files, with its own empty index.
    pub fn reopen(&self) -> (SqliteService, Arc<InMemoryRankedSet>) {
        let ranked = Arc::new(InMemoryRankedSet::new());
        (open(&self.config, ranked.clone()), ranked)
    }
}

fn open(config: &LeaderboardConfig, ranked: Arc<InMemoryRankedSet>) -> SqliteService {
    let shard_count = config.shard_count().expect("valid shard count");
    let shards = (0..shard_count)
        .map(|shard_id| {
            let name = connection_name(&config.connection_prefix, shard_id);
            Arc::new(SqliteShard::open_in_dir(&config.data_dir, name).expect("open shard"))
        })
        .collect();
    LeaderboardService::new(config, shards, ranked).expect("service")
}

fn refused<T>() -> Result<T, BackendError> {
    Err(BackendError::Unavailable("connection refused".into()))
}

/// Shard whose connection is always refused.
pub struct DeadShard;

#[async_trait]
impl ShardBackend for DeadShard {
    fn name(&self) -> &str {
        "dead"
    }
    async fn upsert(&self, _: ScoreRecord) -> Result<ScoreRecord, BackendError> {
        refused()
    }
    async fn find_one(
        &self,
        _: PlayerId,
        _: GameId,
    ) -> Result<Option<ScoreRecord>, BackendError> {
        refused()
    }
    async fn scan_game(&self, _: GameId) -> Result<Vec<ScoreRecord>, BackendError> {
        refused()
    }
    async fn distinct_game_ids(&self) -> Result<Vec<GameId>, BackendError> {
        refused()
    }
    async fn ping(&self) -> Result<(), BackendError> {
        refused()
    }
}

/// Shard that never answers.
pub struct HangingShard;

#[async_trait]
impl ShardBackend for HangingShard {
    fn name(&self) -> &str {
        "hanging"
    }
    async fn upsert(&self, _: ScoreRecord) -> Result<ScoreRecord, BackendError> {
        futures::future::pending().await
    }
    async fn find_one(
        &self,
        _: PlayerId,
        _: GameId,
    ) -> Result<Option<ScoreRecord>, BackendError> {
        futures::future::pending().await
    }
    async fn scan_game(&self, _: GameId) -> Result<Vec<ScoreRecord>, BackendError> {
        futures::future::pending().await
    }
    async fn distinct_game_ids(&self) -> Result<Vec<GameId>, BackendError> {
        futures::future::pending().await
    }
    async fn ping(&self) -> Result<(), BackendError> {
        futures::future::pending().await
    }
}
