//! # Rebuild Flows
//!
//! Rebuilding from SQLite shards: lost indexes, stale members, empty games,
//! partial shard outages and full rebuilds.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use leaderboard_core::{
        game_key, InMemoryRankedSet, LeaderboardApi, LeaderboardConfig, LeaderboardError,
        LeaderboardService, RankedSetStore,
    };

    use crate::fixtures::{Deployment, HangingShard};

    #[tokio::test]
    async fn test_fresh_process_recovers_index_by_rebuild() {
        let deployment = Deployment::new(3);
        for (player, score) in [(1, 50), (2, 90), (3, 70), (4, 10)] {
            deployment.service.store_score(player, 1, score).await.unwrap();
        }

        let (reopened, _) = deployment.reopen();
        assert!(reopened.get_leaderboard(1, 0, 10).await.unwrap().is_empty());

        let rebuild = reopened.rebuild_game(1).await.unwrap();
        assert_eq!(rebuild.entries_loaded, 4);
        assert_eq!(
            reopened.get_leaderboard(1, 0, 10).await.unwrap(),
            deployment.service.get_leaderboard(1, 0, 10).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_rebuild_matches_store_exactly() {
        let deployment = Deployment::new(4);
        for player in 1..=12u64 {
            deployment
                .service
                .store_score(player, 2, player * 7 % 50)
                .await
                .unwrap();
        }
        // Stale members that the store has never seen.
        deployment.ranked.add(&game_key(2), 500, 1).await.unwrap();
        deployment.ranked.add(&game_key(2), 501, 999).await.unwrap();

        deployment.service.rebuild_game(2).await.unwrap();

        let records = deployment.service.store().scan_game(2).await.unwrap();
        for record in &records {
            let rank = deployment
                .service
                .get_player_rank(2, record.player_id)
                .await
                .unwrap();
            assert_eq!(rank.score, Some(record.score));
        }
        assert_eq!(
            deployment.ranked.cardinality(&game_key(2)).await.unwrap(),
            records.len()
        );
        assert!(!deployment
            .service
            .get_player_rank(2, 501)
            .await
            .unwrap()
            .is_ranked());
    }

    #[tokio::test]
    async fn test_rebuild_batches_bulk_load() {
        let deployment = Deployment::new(2);
        for player in 1..=10u64 {
            deployment.service.store_score(player, 3, player).await.unwrap();
        }

        let before = deployment.ranked.round_trips();
        deployment.service.rebuild_game(3).await.unwrap();
        let batch = deployment.config.bulk_load_batch_size as u64;
        // One clear plus ceil(10 / batch) batched loads.
        assert_eq!(
            deployment.ranked.round_trips() - before,
            1 + 10u64.div_ceil(batch)
        );
    }

    #[tokio::test]
    async fn test_empty_game_rebuild() {
        let deployment = Deployment::new(2);
        deployment.service.store_score(1, 1, 10).await.unwrap();

        let rebuild = deployment.service.rebuild_game(99).await.unwrap();
        assert_eq!(rebuild.entries_loaded, 0);
        assert!(deployment
            .service
            .get_leaderboard(99, 0, 10)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(deployment.ranked.cardinality(&game_key(99)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rebuild_is_idempotent() {
        let deployment = Deployment::new(2);
        for (player, score) in [(1, 5), (2, 6)] {
            deployment.service.store_score(player, 4, score).await.unwrap();
        }
        deployment.service.rebuild_game(4).await.unwrap();
        let first = deployment.service.get_leaderboard(4, 0, 10).await.unwrap();
        deployment.service.rebuild_game(4).await.unwrap();
        assert_eq!(
            deployment.service.get_leaderboard(4, 0, 10).await.unwrap(),
            first
        );
    }

    #[tokio::test]
    async fn test_rebuild_failure_reports_game() {
        let deployment = Deployment::new(2);
        deployment.service.store_score(1, 8, 10).await.unwrap();
        deployment.ranked.set_available(false);

        match deployment.service.rebuild_game(8).await {
            Err(LeaderboardError::RebuildFailed { game_id, cause }) => {
                assert_eq!(game_id, 8);
                assert!(matches!(*cause, LeaderboardError::IndexUnavailable { .. }));
            }
            other => panic!("expected RebuildFailed, got {:?}", other),
        }

        // Retrying the whole rebuild once the index is back succeeds.
        deployment.ranked.set_available(true);
        assert_eq!(
            deployment.service.rebuild_game(8).await.unwrap().entries_loaded,
            1
        );
    }

    #[tokio::test]
    async fn test_rebuild_all() {
        let deployment = Deployment::new(3);
        for game in 1..=5u64 {
            for player in 1..=game {
                deployment
                    .service
                    .store_score(player, game, player * 10)
                    .await
                    .unwrap();
            }
        }

        let (reopened, _) = deployment.reopen();
        let report = reopened.rebuild_all().await.unwrap();
        assert!(report.is_success());
        assert_eq!(report.games_attempted, 5);
        assert_eq!(report.total_entries(), 1 + 2 + 3 + 4 + 5);

        for game in 1..=5u64 {
            let page = reopened.get_leaderboard(game, 0, 10).await.unwrap();
            assert_eq!(page.len() as u64, game);
            assert_eq!(page[0].player_id, game);
        }
    }

    #[tokio::test]
    async fn test_rebuild_all_reports_every_failure() {
        let deployment = Deployment::new(2);
        for game in [3u64, 1, 2] {
            deployment.service.store_score(1, game, 1).await.unwrap();
        }
        deployment.ranked.set_available(false);

        let report = deployment.service.rebuild_all().await.unwrap();
        assert_eq!(report.games_attempted, 3);
        assert!(report.rebuilt.is_empty());
        let failed: Vec<u64> = report.failed.iter().map(|(g, _)| *g).collect();
        assert_eq!(failed, vec![1, 2, 3]);
        assert_eq!(deployment.metrics.snapshot().rebuild_failures, 3);
    }

    #[tokio::test]
    async fn test_hanging_shard_fails_rebuild_within_deadline() {
        let config = LeaderboardConfig {
            shard_count: 1,
            operation_timeout_ms: 50,
            ..LeaderboardConfig::for_testing()
        };
        let ranked = Arc::new(InMemoryRankedSet::new());
        let service =
            LeaderboardService::new(&config, vec![Arc::new(HangingShard)], ranked.clone())
                .unwrap();
        ranked.add(&game_key(4), 1, 10).await.unwrap();

        let started = Instant::now();
        let outcome = tokio::time::timeout(Duration::from_secs(5), service.rebuild_game(4))
            .await
            .expect("rebuild must respect the shard deadline");
        assert!(started.elapsed() < Duration::from_secs(2));

        match outcome {
            Err(LeaderboardError::RebuildFailed { game_id, cause }) => {
                assert_eq!(game_id, 4);
                assert!(matches!(
                    *cause,
                    LeaderboardError::StoreUnavailable {
                        shard_id: 0,
                        operation: "scan_game",
                        ..
                    }
                ));
            }
            other => panic!("expected RebuildFailed, got {:?}", other),
        }

        let err = service.rebuild_all().await.unwrap_err();
        assert!(matches!(
            err,
            LeaderboardError::StoreUnavailable {
                operation: "scan_all_game_ids",
                ..
            }
        ));
        assert!(err.is_retryable());
    }
}
