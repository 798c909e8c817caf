//! # Domain Value Objects
//!
//! Read-side views of the ranked index and derived shard placement.

use serde::{Deserialize, Serialize};

use super::errors::{GameId, LeaderboardError, PlayerId, Score, ShardId};

/// One row of a leaderboard page. `rank` is 1-indexed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Player identifier.
    pub player_id: PlayerId,
    /// Player's score.
    pub score: Score,
    /// Position under descending-score order.
    pub rank: u64,
}

/// A player's standing in one game. Both fields are `None` when the player
/// has no entry for the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRank {
    /// Game identifier.
    pub game_id: GameId,
    /// Player identifier.
    pub player_id: PlayerId,
    /// 1-indexed rank.
    pub rank: Option<u64>,
    /// Current score.
    pub score: Option<Score>,
}

impl PlayerRank {
    /// Not-found result.
    pub fn unranked(game_id: GameId, player_id: PlayerId) -> Self {
        Self {
            game_id,
            player_id,
            rank: None,
            score: None,
        }
    }

    /// Whether the player has an entry.
    pub fn is_ranked(&self) -> bool {
        self.rank.is_some()
    }
}

/// Where a player's records live. Derived from the player id, never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardAssignment {
    /// The sharding key.
    pub player_id: PlayerId,
    /// Shard holding the player's records.
    pub shard_id: ShardId,
    /// Connection name, `{prefix}_{shard_id}`.
    pub connection_name: String,
}

/// Liveness of one shard connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShardHealth {
    /// Shard identifier.
    pub shard_id: ShardId,
    /// Connection name.
    pub connection_name: String,
    /// `None` when reachable, otherwise the failure reason.
    pub error: Option<String>,
}

impl ShardHealth {
    /// Whether the shard answered.
    pub fn is_healthy(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of a successful single-game rebuild.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRebuild {
    /// Game rebuilt.
    pub game_id: GameId,
    /// Members loaded into the index.
    pub entries_loaded: usize,
}

/// Aggregate outcome of `rebuild_all`.
#[derive(Debug, Default)]
pub struct RebuildReport {
    /// Number of distinct games found across all shards.
    pub games_attempted: usize,
    /// Games rebuilt successfully.
    pub rebuilt: Vec<GameRebuild>,
    /// Games whose rebuild failed, each with a `RebuildFailed` error.
    pub failed: Vec<(GameId, LeaderboardError)>,
}

impl RebuildReport {
    /// True when every attempted game was rebuilt.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total members loaded across all rebuilt games.
    pub fn total_entries(&self) -> usize {
        self.rebuilt.iter().map(|g| g.entries_loaded).sum()
    }
}
