//! # Outbound Ports
//!
//! Traits for the two external stores: the sharded relational store of
//! record and the remote ranked-set service backing the index.

use crate::domain::{BackendError, GameId, PlayerId, Score, ScoreRecord};
use async_trait::async_trait;

/// A `(member, score)` pair as stored in a ranked set.
pub type RankedMember = (PlayerId, Score);

/// One shard connection of the relational store.
///
/// Each instance owns exactly one partition of the
/// `(player_id, game_id, score)` table, keyed by `(player_id, game_id)`
/// with a secondary index on `game_id`. Routing is never the backend's
/// concern; the caller has already picked the shard.
#[async_trait]
pub trait ShardBackend: Send + Sync {
    /// Connection name, e.g. `score_shard_0`.
    fn name(&self) -> &str;

    /// Insert-or-update on the natural key. Returns the persisted record.
    async fn upsert(&self, record: ScoreRecord) -> Result<ScoreRecord, BackendError>;

    /// Point lookup on the natural key.
    async fn find_one(
        &self,
        player_id: PlayerId,
        game_id: GameId,
    ) -> Result<Option<ScoreRecord>, BackendError>;

    /// All records of a game held by this shard.
    async fn scan_game(&self, game_id: GameId) -> Result<Vec<ScoreRecord>, BackendError>;

    /// Distinct game ids held by this shard.
    async fn distinct_game_ids(&self) -> Result<Vec<GameId>, BackendError>;

    /// Cheap liveness check.
    async fn ping(&self) -> Result<(), BackendError>;
}

/// Remote ranked-set service.
///
/// Sets are addressed by string key; members are player ids. Ordering is
/// score descending with ties by ascending member.
#[async_trait]
pub trait RankedSetStore: Send + Sync {
    /// Add or overwrite a member's score.
    async fn add(&self, key: &str, member: PlayerId, score: Score) -> Result<(), BackendError>;

    /// Add or overwrite many members in one round trip.
    async fn add_many(&self, key: &str, members: &[RankedMember]) -> Result<(), BackendError>;

    /// Delete the whole set. Deleting a missing set is not an error.
    async fn delete(&self, key: &str) -> Result<(), BackendError>;

    /// Members at descending positions `start..=stop`, with scores.
    async fn range_desc_with_scores(
        &self,
        key: &str,
        start: usize,
        stop: usize,
    ) -> Result<Vec<RankedMember>, BackendError>;

    /// 0-indexed descending position of a member.
    async fn rank_desc(&self, key: &str, member: PlayerId) -> Result<Option<u64>, BackendError>;

    /// A member's score.
    async fn score(&self, key: &str, member: PlayerId) -> Result<Option<Score>, BackendError>;

    /// Number of members in the set.
    async fn cardinality(&self, key: &str) -> Result<usize, BackendError>;
}
