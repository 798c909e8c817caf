//! # Inbound Ports
//!
//! The operations the leaderboard core exposes to its collaborators
//! (request handlers, the admin CLI).

use crate::domain::{
    GameId, GameRebuild, LeaderboardEntry, LeaderboardError, PlayerId, PlayerRank, RebuildReport,
    Score, ScoreRecord,
};
use async_trait::async_trait;

/// Leaderboard API - inbound port.
#[async_trait]
pub trait LeaderboardApi: Send + Sync {
    /// Persist a score, then update the ranked index.
    ///
    /// `PersistenceFailed` means nothing changed. `IndexUpdateFailed` means
    /// the score is durable but the index is stale until the next
    /// successful write or rebuild.
    async fn store_score(
        &self,
        player_id: PlayerId,
        game_id: GameId,
        score: Score,
    ) -> Result<ScoreRecord, LeaderboardError>;

    /// A page of the game's leaderboard, score descending.
    async fn get_leaderboard(
        &self,
        game_id: GameId,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;

    /// A player's rank and score. Unknown players are not an error.
    async fn get_player_rank(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<PlayerRank, LeaderboardError>;

    /// Recompute one game's index from every shard.
    async fn rebuild_game(&self, game_id: GameId) -> Result<GameRebuild, LeaderboardError>;

    /// Recompute every game's index. Per-game failures are collected in the
    /// report; only failing to enumerate games is an `Err`.
    async fn rebuild_all(&self) -> Result<RebuildReport, LeaderboardError>;
}
