//! # Domain Entities
//!
//! The score record owned by the sharded store, and the configuration that
//! fixes how records are spread across shards.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use super::errors::{GameId, LeaderboardError, PlayerId, Score};
use super::invariants::{
    validate_shard_count, DEFAULT_CONNECTION_PREFIX, DEFAULT_SHARD_COUNT, MAX_PAGE_LIMIT,
};

/// A player's score in one game.
///
/// Natural key is `(player_id, game_id)`. Records are only ever upserted,
/// never deleted in normal operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Player identifier (sharding key), >= 1.
    pub player_id: PlayerId,
    /// Game identifier, >= 1.
    pub game_id: GameId,
    /// Score, >= 0.
    pub score: Score,
}

impl ScoreRecord {
    /// Create a new record.
    pub fn new(player_id: PlayerId, game_id: GameId, score: Score) -> Self {
        Self {
            player_id,
            game_id,
            score,
        }
    }

    /// The `(player_id, game_id)` natural key.
    pub fn natural_key(&self) -> (PlayerId, GameId) {
        (self.player_id, self.game_id)
    }
}

/// Leaderboard configuration.
///
/// `shard_count` is fixed at deployment; changing it without a reshard
/// procedure strands every record on its old shard.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    /// Total number of shards. Kept signed so that a misconfigured negative
    /// value is caught by `validate` instead of wrapping.
    pub shard_count: i64,
    /// Shard connections are named `{connection_prefix}_{shard_id}`.
    pub connection_prefix: String,
    /// Directory holding one database file per shard.
    pub data_dir: PathBuf,
    /// Largest page `get_leaderboard` will serve.
    pub max_page_size: usize,
    /// Deadline for any single store or index call.
    pub operation_timeout_ms: u64,
    /// Shards queried in parallel during a scan.
    pub scan_concurrency: usize,
    /// Games rebuilt in parallel by `rebuild_all` (1 = sequential).
    pub rebuild_concurrency: usize,
    /// Members sent per batched ranked-set call during bulk load.
    pub bulk_load_batch_size: usize,
    /// Ranked-set service shared by the deployment. `None` keeps the index
    /// in process.
    pub redis_url: Option<String>,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT as i64,
            connection_prefix: DEFAULT_CONNECTION_PREFIX.to_string(),
            data_dir: PathBuf::from("./data"),
            max_page_size: MAX_PAGE_LIMIT,
            operation_timeout_ms: 5_000,
            scan_concurrency: 4,
            rebuild_concurrency: 1,
            bulk_load_batch_size: 500,
            redis_url: None,
        }
    }
}

impl LeaderboardConfig {
    /// Create config for testing.
    pub fn for_testing() -> Self {
        Self {
            shard_count: 4,
            connection_prefix: "test_shard".to_string(),
            data_dir: env::temp_dir(),
            max_page_size: 1000,
            operation_timeout_ms: 500,
            scan_concurrency: 2,
            rebuild_concurrency: 2,
            bulk_load_batch_size: 3,
            redis_url: None,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LB_SHARD_COUNT`: Number of shards (default: 2)
    /// - `LB_CONNECTION_PREFIX`: Shard connection prefix (default: score_shard)
    /// - `LB_DATA_DIR`: Shard database directory (default: ./data)
    /// - `LB_MAX_PAGE_SIZE`: Largest leaderboard page (default: 1000)
    /// - `LB_OPERATION_TIMEOUT_MS`: Per-call deadline (default: 5000)
    /// - `LB_SCAN_CONCURRENCY`: Parallel shard scans (default: 4)
    /// - `LB_REBUILD_CONCURRENCY`: Parallel game rebuilds (default: 1)
    /// - `LB_BULK_LOAD_BATCH`: Members per bulk-load batch (default: 500)
    /// - `LB_REDIS_URL`: Shared ranked-set service (default: unset, in-process)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            shard_count: parse_env("LB_SHARD_COUNT").unwrap_or(defaults.shard_count),
            connection_prefix: env::var("LB_CONNECTION_PREFIX")
                .unwrap_or(defaults.connection_prefix),
            data_dir: env::var("LB_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            max_page_size: parse_env("LB_MAX_PAGE_SIZE").unwrap_or(defaults.max_page_size),
            operation_timeout_ms: parse_env("LB_OPERATION_TIMEOUT_MS")
                .unwrap_or(defaults.operation_timeout_ms),
            scan_concurrency: parse_env("LB_SCAN_CONCURRENCY")
                .unwrap_or(defaults.scan_concurrency),
            rebuild_concurrency: parse_env("LB_REBUILD_CONCURRENCY")
                .unwrap_or(defaults.rebuild_concurrency),
            bulk_load_batch_size: parse_env("LB_BULK_LOAD_BATCH")
                .unwrap_or(defaults.bulk_load_batch_size),
            redis_url: env::var("LB_REDIS_URL")
                .ok()
                .filter(|url| !url.trim().is_empty())
                .or(defaults.redis_url),
        }
    }

    /// Validate the configuration. Any failure here is fatal at startup.
    pub fn validate(&self) -> Result<(), LeaderboardError> {
        validate_shard_count(self.shard_count)?;

        if self.connection_prefix.is_empty() {
            return Err(LeaderboardError::InvalidConfiguration(
                "connection prefix must not be empty".to_string(),
            ));
        }
        if self.max_page_size == 0 {
            return Err(LeaderboardError::InvalidConfiguration(
                "max page size must be at least 1".to_string(),
            ));
        }
        if self.operation_timeout_ms == 0 {
            return Err(LeaderboardError::InvalidConfiguration(
                "operation timeout must be non-zero".to_string(),
            ));
        }
        if self.scan_concurrency == 0
            || self.rebuild_concurrency == 0
            || self.bulk_load_batch_size == 0
        {
            return Err(LeaderboardError::InvalidConfiguration(
                "concurrency and batch sizes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Validated shard count.
    pub fn shard_count(&self) -> Result<u32, LeaderboardError> {
        validate_shard_count(self.shard_count)
    }

    /// Per-call deadline.
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
