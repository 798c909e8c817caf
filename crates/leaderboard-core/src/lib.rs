//! # Leaderboard Core
//!
//! Per-game leaderboards over a sharded store of record.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Persist `(player_id, game_id, score)` records across N fixed shards,
//!   routed by `player_id % N`
//! - Serve ranked reads from a per-game sorted index
//! - Rebuild any game's index from the shards on demand
//!
//! The store is the source of truth. The index is a cache that may lag a
//! write whose index update failed, and is healed by the next write for that
//! key or by a rebuild.
//!
//! ## Module Structure
//!
//! ```text
//! leaderboard-core/
//! ├── domain/          # ScoreRecord, config, errors, input rules
//! ├── algorithms/      # Shard routing, rank arithmetic
//! ├── ports/           # LeaderboardApi + shard / ranked-set traits
//! ├── adapters/        # SQLite shards, Redis and in-memory ranked sets
//! ├── service/         # Score store, ranked index, write path, rebuild
//! └── metrics.rs       # Operation counters
//! ```
//!
//! ## Usage Example
//!
//! ```ignore
//! use leaderboard_core::{InMemoryRankedSet, LeaderboardApi, LeaderboardConfig,
//!     LeaderboardService, SqliteShard};
//! use std::sync::Arc;
//!
//! let config = LeaderboardConfig::from_env();
//! let shards = (0..config.shard_count()?)
//!     .map(|id| SqliteShard::open_in_dir(&config.data_dir, format!("score_shard_{}", id)).map(Arc::new))
//!     .collect::<Result<Vec<_>, _>>()?;
//! let service = LeaderboardService::new(&config, shards, Arc::new(InMemoryRankedSet::new()))?;
//!
//! service.store_score(42, 1, 1_500).await?;
//! let top = service.get_leaderboard(1, 0, 10).await?;
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{InMemoryRankedSet, InMemoryShard, RedisRankedSet, SqliteShard};
pub use algorithms::{assign, connection_name, resolve_shard};
pub use domain::{
    validate_game_id, validate_page, validate_player_id, validate_score, validate_shard_count,
    BackendError, GameId, GameRebuild, LeaderboardConfig, LeaderboardEntry, LeaderboardError,
    PlayerId, PlayerRank, RebuildReport, Score, ScoreRecord, Severity, ShardAssignment,
    ShardHealth, ShardId, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, MAX_STORABLE_VALUE,
};
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use ports::{LeaderboardApi, RankedMember, RankedSetStore, ShardBackend};
pub use service::{game_key, LeaderboardService, RankedIndex, ShardedScoreStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
