//! # Sharded Score Store
//!
//! The store of record: `ScoreRecord`s partitioned over N fixed shards by
//! player id. Every call resolves its target shard explicitly through the
//! router; nothing rewrites a record's placement after the fact.
//!
//! Scans fan out to every shard, because `game_id` is not the sharding key.
//! A scan fails as a whole if any shard is unreachable, naming the shard,
//! so a rebuild never loads a silently partial leaderboard.
//!
//! Unreachable or slow shards surface as `StoreUnavailable`; a query the
//! shard refused surfaces as `StoreRejected`.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, warn};

use crate::algorithms::{assign, connection_name, resolve_shard};
use crate::domain::{
    validate_game_id, validate_player_id, validate_score, BackendError, GameId, LeaderboardConfig,
    LeaderboardError, PlayerId, Score, ScoreRecord, ShardAssignment, ShardHealth, ShardId,
};
use crate::ports::outbound::ShardBackend;

/// Score store spread over a fixed set of shard backends.
pub struct ShardedScoreStore<B: ShardBackend> {
    shards: Vec<Arc<B>>,
    shard_count: u32,
    connection_prefix: String,
    timeout: Duration,
    scan_concurrency: usize,
}

impl<B: ShardBackend> ShardedScoreStore<B> {
    /// Build the store. `shards[i]` must be the connection for shard `i`.
    pub fn new(config: &LeaderboardConfig, shards: Vec<Arc<B>>) -> Result<Self, LeaderboardError> {
        config.validate()?;
        let shard_count = config.shard_count()?;

        if shards.len() != shard_count as usize {
            return Err(LeaderboardError::InvalidConfiguration(format!(
                "expected {} shard connections, got {}",
                shard_count,
                shards.len()
            )));
        }

        Ok(Self {
            shards,
            shard_count,
            connection_prefix: config.connection_prefix.clone(),
            timeout: config.operation_timeout(),
            scan_concurrency: config.scan_concurrency,
        })
    }

    /// Number of shards.
    pub fn shard_count(&self) -> u32 {
        self.shard_count
    }

    /// Where a player's records live.
    pub fn assignment(&self, player_id: PlayerId) -> Result<ShardAssignment, LeaderboardError> {
        assign(player_id, &self.connection_prefix, self.shard_count)
    }

    /// Insert-or-update on `(player_id, game_id)` in the player's shard.
    pub async fn upsert(
        &self,
        player_id: PlayerId,
        game_id: GameId,
        score: Score,
    ) -> Result<ScoreRecord, LeaderboardError> {
        validate_player_id(player_id)?;
        validate_game_id(game_id)?;
        validate_score(score)?;

        let shard_id = resolve_shard(player_id, self.shard_count)?;
        let shard = self.shard(shard_id)?;
        debug!(player_id, game_id, shard_id, shard = shard.name(), "Routing upsert");

        let record = ScoreRecord::new(player_id, game_id, score);
        self.call(shard_id, "upsert", shard.upsert(record)).await
    }

    /// Point lookup in the player's shard.
    pub async fn find_one(
        &self,
        player_id: PlayerId,
        game_id: GameId,
    ) -> Result<Option<ScoreRecord>, LeaderboardError> {
        validate_player_id(player_id)?;
        validate_game_id(game_id)?;

        let shard_id = resolve_shard(player_id, self.shard_count)?;
        let shard = self.shard(shard_id)?;
        self.call(shard_id, "find_one", shard.find_one(player_id, game_id))
            .await
    }

    /// Every record of a game, across all shards, concatenated in shard order.
    pub async fn scan_game(&self, game_id: GameId) -> Result<Vec<ScoreRecord>, LeaderboardError> {
        validate_game_id(game_id)?;

        let mut per_shard: Vec<(ShardId, Vec<ScoreRecord>)> = self
            .fan_out("scan_game", move |shard| async move {
                shard.scan_game(game_id).await
            })
            .await?;
        per_shard.sort_by_key(|(shard_id, _)| *shard_id);

        let records: Vec<ScoreRecord> = per_shard
            .into_iter()
            .flat_map(|(_, records)| records)
            .collect();
        debug!(game_id, records = records.len(), "Scanned game across shards");
        Ok(records)
    }

    /// Distinct game ids held anywhere in the store, ascending.
    pub async fn scan_all_game_ids(&self) -> Result<Vec<GameId>, LeaderboardError> {
        let per_shard: Vec<(ShardId, Vec<GameId>)> = self
            .fan_out("scan_all_game_ids", |shard| async move {
                shard.distinct_game_ids().await
            })
            .await?;

        let ids: BTreeSet<GameId> = per_shard
            .into_iter()
            .flat_map(|(_, ids)| ids)
            .collect();
        Ok(ids.into_iter().collect())
    }

    /// Ping every shard. Never fails; unreachable shards carry their error.
    pub async fn shard_health(&self) -> Vec<ShardHealth> {
        let mut health = Vec::with_capacity(self.shards.len());
        for (index, shard) in self.shards.iter().enumerate() {
            let shard_id = index as ShardId;
            let error = match tokio::time::timeout(self.timeout, shard.ping()).await {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(_) => Some(BackendError::Timeout(self.timeout).to_string()),
            };
            health.push(ShardHealth {
                shard_id,
                connection_name: connection_name(&self.connection_prefix, shard_id),
                error,
            });
        }
        health
    }

    fn shard(&self, shard_id: ShardId) -> Result<&Arc<B>, LeaderboardError> {
        self.shards.get(shard_id as usize).ok_or_else(|| {
            LeaderboardError::InvalidConfiguration(format!("no connection for shard {}", shard_id))
        })
    }

    /// Run one backend call under the operation deadline.
    async fn call<T>(
        &self,
        shard_id: ShardId,
        operation: &'static str,
        fut: impl Future<Output = Result<T, BackendError>>,
    ) -> Result<T, LeaderboardError> {
        let result = match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout(self.timeout)),
        };
        result.map_err(|e| {
            warn!(shard_id, operation, error = %e, "Shard call failed");
            LeaderboardError::from_shard(shard_id, operation, e)
        })
    }

    /// Apply `f` to every shard with bounded concurrency. The first failure
    /// aborts the whole fan-out.
    async fn fan_out<'a, T, F, Fut>(
        &'a self,
        operation: &'static str,
        f: F,
    ) -> Result<Vec<(ShardId, T)>, LeaderboardError>
    where
        T: Send + 'a,
        F: Fn(Arc<B>) -> Fut,
        Fut: Future<Output = Result<T, BackendError>> + Send + 'a,
    {
        let calls: Vec<BoxFuture<'a, Result<(ShardId, T), LeaderboardError>>> = self
            .shards
            .iter()
            .enumerate()
            .map(|(index, shard)| {
                let shard_id = index as ShardId;
                let fut = f(Arc::clone(shard));
                async move {
                    self.call(shard_id, operation, fut)
                        .await
                        .map(|value| (shard_id, value))
                }
                .boxed()
            })
            .collect();

        stream::iter(calls)
            .buffer_unordered(self.scan_concurrency)
            .try_collect()
            .await
    }
}
