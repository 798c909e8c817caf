//! # Rebuild Pipeline
//!
//! Recomputes a game's index from the store: clear, scan every shard, bulk
//! load. A rebuild is idempotent, so a failed one is retried whole.
//!
//! `rebuild_all` attempts every game even when some fail, running up to
//! `rebuild_concurrency` games at once, and reports failures per game.

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use tracing::{error, info};

use super::LeaderboardService;
use crate::domain::{GameId, GameRebuild, LeaderboardError, RebuildReport};
use crate::ports::outbound::{RankedMember, RankedSetStore, ShardBackend};

impl<S: ShardBackend, R: RankedSetStore> LeaderboardService<S, R> {
    pub(super) async fn rebuild_one(&self, game_id: GameId) -> Result<GameRebuild, LeaderboardError> {
        let outcome = self.load_game(game_id).await;
        match &outcome {
            Ok(rebuild) => {
                self.metrics.record_rebuild(Some(rebuild.entries_loaded));
                info!(game_id, entries = rebuild.entries_loaded, "Rebuilt leaderboard");
            }
            Err(e) => {
                self.metrics.record_rebuild(None);
                error!(game_id, error = %e, "Leaderboard rebuild failed");
            }
        }
        outcome.map_err(|cause| LeaderboardError::RebuildFailed {
            game_id,
            cause: Box::new(cause),
        })
    }

    async fn load_game(&self, game_id: GameId) -> Result<GameRebuild, LeaderboardError> {
        self.index.clear(game_id).await?;

        let records = self.store.scan_game(game_id).await?;
        if records.is_empty() {
            return Ok(GameRebuild {
                game_id,
                entries_loaded: 0,
            });
        }

        let members: Vec<RankedMember> = records
            .iter()
            .map(|record| (record.player_id, record.score))
            .collect();
        let entries_loaded = self.index.bulk_load(game_id, &members).await?;

        Ok(GameRebuild {
            game_id,
            entries_loaded,
        })
    }

    pub(super) async fn rebuild_every_game(&self) -> Result<RebuildReport, LeaderboardError> {
        let game_ids = self.store.scan_all_game_ids().await?;
        info!(games = game_ids.len(), "Rebuilding all leaderboards");

        let rebuilds: Vec<BoxFuture<'_, (GameId, Result<GameRebuild, LeaderboardError>)>> =
            game_ids
                .iter()
                .map(|&game_id| {
                    async move { (game_id, self.rebuild_one(game_id).await) }.boxed()
                })
                .collect();
        let outcomes: Vec<(GameId, Result<GameRebuild, LeaderboardError>)> = stream::iter(rebuilds)
            .buffer_unordered(self.rebuild_concurrency)
            .collect()
            .await;

        let mut report = RebuildReport {
            games_attempted: game_ids.len(),
            ..RebuildReport::default()
        };
        for (game_id, outcome) in outcomes {
            match outcome {
                Ok(rebuild) => report.rebuilt.push(rebuild),
                Err(e) => report.failed.push((game_id, e)),
            }
        }
        report.rebuilt.sort_by_key(|r| r.game_id);
        report.failed.sort_by_key(|(game_id, _)| *game_id);

        info!(
            attempted = report.games_attempted,
            rebuilt = report.rebuilt.len(),
            failed = report.failed.len(),
            entries = report.total_entries(),
            "Rebuild finished"
        );
        Ok(report)
    }
}
