//! # Ranked Index
//!
//! Per-game descending-score ranking on top of a ranked-set service. The
//! index is a rebuildable cache: losing it costs a rebuild, never data.
//!
//! Each game lives in its own set under `leaderboard:game:{game_id}`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::algorithms::{page_bounds, rank_for_position};
use crate::domain::{
    validate_game_id, validate_page, validate_player_id, BackendError, GameId,
    LeaderboardConfig, LeaderboardEntry, LeaderboardError, PlayerId, PlayerRank, Score,
    LEADERBOARD_KEY_PREFIX,
};
use crate::ports::outbound::{RankedMember, RankedSetStore};

/// Ranked-set key for a game.
pub fn game_key(game_id: GameId) -> String {
    format!("{}{}", LEADERBOARD_KEY_PREFIX, game_id)
}

/// Leaderboard index backed by a ranked-set store.
pub struct RankedIndex<R: RankedSetStore> {
    store: Arc<R>,
    timeout: Duration,
    max_page_size: usize,
    batch_size: usize,
}

impl<R: RankedSetStore> RankedIndex<R> {
    pub fn new(config: &LeaderboardConfig, store: Arc<R>) -> Result<Self, LeaderboardError> {
        config.validate()?;
        Ok(Self {
            store,
            timeout: config.operation_timeout(),
            max_page_size: config.max_page_size,
            batch_size: config.bulk_load_batch_size,
        })
    }

    /// Largest page `get_range` serves.
    pub fn max_page_size(&self) -> usize {
        self.max_page_size
    }

    /// Set or overwrite a player's score.
    pub async fn set_score(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        score: Score,
    ) -> Result<(), LeaderboardError> {
        let key = game_key(game_id);
        self.call("set_score", self.store.add(&key, player_id, score))
            .await
    }

    /// One page of the leaderboard. Empty when the game has no entries or
    /// `offset` is past the end.
    pub async fn get_range(
        &self,
        game_id: GameId,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        validate_game_id(game_id)?;
        validate_page(offset, limit, self.max_page_size)?;

        let key = game_key(game_id);
        let (start, stop) = page_bounds(offset, limit);
        let members = self
            .call(
                "get_range",
                self.store.range_desc_with_scores(&key, start, stop),
            )
            .await?;

        Ok(members
            .into_iter()
            .enumerate()
            .map(|(position, (player_id, score))| LeaderboardEntry {
                player_id,
                score,
                rank: rank_for_position(offset, position),
            })
            .collect())
    }

    /// 1-indexed rank and score of a player, or an unranked result.
    pub async fn get_member_rank(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<PlayerRank, LeaderboardError> {
        validate_game_id(game_id)?;
        validate_player_id(player_id)?;

        let key = game_key(game_id);
        let Some(position) = self
            .call("get_member_rank", self.store.rank_desc(&key, player_id))
            .await?
        else {
            return Ok(PlayerRank::unranked(game_id, player_id));
        };
        let score = self
            .call("get_member_rank", self.store.score(&key, player_id))
            .await?;

        // The member can disappear between the two calls (concurrent clear).
        Ok(match score {
            Some(score) => PlayerRank {
                game_id,
                player_id,
                rank: Some(position + 1),
                score: Some(score),
            },
            None => PlayerRank::unranked(game_id, player_id),
        })
    }

    /// Members currently indexed for a game.
    pub async fn member_count(&self, game_id: GameId) -> Result<usize, LeaderboardError> {
        let key = game_key(game_id);
        self.call("member_count", self.store.cardinality(&key)).await
    }

    /// Drop every member of a game.
    pub async fn clear(&self, game_id: GameId) -> Result<(), LeaderboardError> {
        let key = game_key(game_id);
        self.call("clear", self.store.delete(&key)).await
    }

    /// Load members in batches of `bulk_load_batch_size`, one round trip per
    /// batch. Returns the number of members sent.
    pub async fn bulk_load(
        &self,
        game_id: GameId,
        members: &[RankedMember],
    ) -> Result<usize, LeaderboardError> {
        let key = game_key(game_id);
        for batch in members.chunks(self.batch_size) {
            self.call("bulk_load", self.store.add_many(&key, batch))
                .await?;
        }
        debug!(
            game_id,
            members = members.len(),
            batches = members.len().div_ceil(self.batch_size),
            "Bulk-loaded index"
        );
        Ok(members.len())
    }

    async fn call<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, BackendError>>,
    ) -> Result<T, LeaderboardError> {
        let result = match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout(self.timeout)),
        };
        result.map_err(|e| {
            warn!(operation, error = %e, "Ranked index call failed");
            LeaderboardError::IndexUnavailable {
                operation,
                reason: e.to_string(),
            }
        })
    }
}
