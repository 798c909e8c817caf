//! Service Layer
//!
//! `LeaderboardService` wires the sharded score store and the ranked index
//! together and implements the `LeaderboardApi` port.
//!
//! - `score_store` - routing, upserts and fan-out scans over the shards
//! - `ranked_index` - per-game ranking on the ranked-set service
//! - `write_path` - store-then-index score writes
//! - `rebuild` - index recomputation from the store

pub mod ranked_index;
mod rebuild;
pub mod score_store;
mod write_path;

pub use ranked_index::{game_key, RankedIndex};
pub use score_store::ShardedScoreStore;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::domain::{
    GameId, GameRebuild, LeaderboardConfig, LeaderboardEntry, LeaderboardError, PlayerId,
    PlayerRank, RebuildReport, Score, ScoreRecord,
};
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::inbound::LeaderboardApi;
use crate::ports::outbound::{RankedSetStore, ShardBackend};

/// Leaderboard service implementation
///
/// Implements the `LeaderboardApi` port using injected stores.
pub struct LeaderboardService<S: ShardBackend, R: RankedSetStore> {
    store: ShardedScoreStore<S>,
    index: RankedIndex<R>,
    rebuild_concurrency: usize,
    metrics: Arc<dyn MetricsRecorder>,
}

impl<S: ShardBackend, R: RankedSetStore> LeaderboardService<S, R> {
    /// Build the service from configuration, one backend per shard, and the
    /// ranked-set store.
    pub fn new(
        config: &LeaderboardConfig,
        shards: Vec<Arc<S>>,
        ranked: Arc<R>,
    ) -> Result<Self, LeaderboardError> {
        Ok(Self::from_parts(
            ShardedScoreStore::new(config, shards)?,
            RankedIndex::new(config, ranked)?,
            config.rebuild_concurrency,
        ))
    }

    /// Assemble from already-built components.
    pub fn from_parts(
        store: ShardedScoreStore<S>,
        index: RankedIndex<R>,
        rebuild_concurrency: usize,
    ) -> Self {
        Self {
            store,
            index,
            rebuild_concurrency: rebuild_concurrency.max(1),
            metrics: Arc::new(NoOpMetrics),
        }
    }

    /// Record operations into `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    /// The score store of record.
    pub fn store(&self) -> &ShardedScoreStore<S> {
        &self.store
    }

    /// The ranked index.
    pub fn index(&self) -> &RankedIndex<R> {
        &self.index
    }
}

#[async_trait]
impl<S, R> LeaderboardApi for LeaderboardService<S, R>
where
    S: ShardBackend + 'static,
    R: RankedSetStore + 'static,
{
    async fn store_score(
        &self,
        player_id: PlayerId,
        game_id: GameId,
        score: Score,
    ) -> Result<ScoreRecord, LeaderboardError> {
        self.write_score(player_id, game_id, score).await
    }

    async fn get_leaderboard(
        &self,
        game_id: GameId,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let entries = self.index.get_range(game_id, offset, limit).await?;
        self.metrics.record_read();
        debug!(game_id, offset, limit, returned = entries.len(), "Served leaderboard page");
        Ok(entries)
    }

    async fn get_player_rank(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<PlayerRank, LeaderboardError> {
        let rank = self.index.get_member_rank(game_id, player_id).await?;
        self.metrics.record_read();
        Ok(rank)
    }

    async fn rebuild_game(&self, game_id: GameId) -> Result<GameRebuild, LeaderboardError> {
        crate::domain::validate_game_id(game_id)?;
        self.rebuild_one(game_id).await
    }

    async fn rebuild_all(&self) -> Result<RebuildReport, LeaderboardError> {
        self.rebuild_every_game().await
    }
}
