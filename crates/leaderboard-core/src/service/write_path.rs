//! # Score Write Path
//!
//! Store first, then index. The store write must commit before the index
//! is touched. An index failure after a committed write is reported as
//! `IndexUpdateFailed` and never rolls the store back; the next write for
//! the same key or a rebuild heals the index.

use tracing::{info, warn};

use super::LeaderboardService;
use crate::domain::{
    validate_game_id, validate_player_id, validate_score, GameId, LeaderboardError, PlayerId,
    Score, ScoreRecord,
};
use crate::ports::outbound::{RankedSetStore, ShardBackend};

impl<S: ShardBackend, R: RankedSetStore> LeaderboardService<S, R> {
    pub(super) async fn write_score(
        &self,
        player_id: PlayerId,
        game_id: GameId,
        score: Score,
    ) -> Result<ScoreRecord, LeaderboardError> {
        validate_player_id(player_id)?;
        validate_game_id(game_id)?;
        validate_score(score)?;

        let record = match self.store.upsert(player_id, game_id, score).await {
            Ok(record) => record,
            Err(e) => {
                self.metrics.record_persistence_failure();
                warn!(player_id, game_id, error = %e, "Score not persisted");
                return Err(LeaderboardError::PersistenceFailed {
                    player_id,
                    game_id,
                    cause: Box::new(e),
                });
            }
        };

        if let Err(e) = self
            .index
            .set_score(record.game_id, record.player_id, record.score)
            .await
        {
            self.metrics.record_store(false);
            warn!(
                player_id,
                game_id,
                error = %e,
                "Score persisted but leaderboard index is stale"
            );
            return Err(LeaderboardError::IndexUpdateFailed {
                record,
                reason: e.to_string(),
            });
        }

        self.metrics.record_store(true);
        info!(player_id, game_id, score = record.score, "Score stored");
        Ok(record)
    }
}
