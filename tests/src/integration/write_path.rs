//! # Write Path Flows
//!
//! Store-then-index writes, idempotence, and the two partial-failure modes.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use leaderboard_core::{
        game_key, InMemoryRankedSet, LeaderboardApi, LeaderboardConfig, LeaderboardError,
        LeaderboardService, RankedSetStore, ScoreRecord, Severity, ShardBackend, SqliteShard,
    };

    use crate::fixtures::{DeadShard, Deployment, HangingShard};

    #[tokio::test]
    async fn test_idempotent_store() {
        let deployment = Deployment::new(2);
        deployment.service.store_score(8, 1, 300).await.unwrap();
        let page_once = deployment.service.get_leaderboard(1, 0, 10).await.unwrap();
        let scan_once = deployment.service.store().scan_game(1).await.unwrap();

        deployment.service.store_score(8, 1, 300).await.unwrap();
        assert_eq!(
            deployment.service.get_leaderboard(1, 0, 10).await.unwrap(),
            page_once
        );
        assert_eq!(
            deployment.service.store().scan_game(1).await.unwrap(),
            scan_once
        );
    }

    #[tokio::test]
    async fn test_index_failure_reported_after_commit() {
        let deployment = Deployment::new(2);
        deployment.ranked.set_available(false);

        let err = deployment.service.store_score(3, 9, 45).await.unwrap_err();
        assert!(matches!(err, LeaderboardError::IndexUpdateFailed { .. }));
        assert_eq!(err.severity(), Severity::Warning);
        assert!(err.is_retryable());

        // Durable despite the index failure.
        let (reopened, _) = deployment.reopen();
        assert_eq!(
            reopened.store().find_one(3, 9).await.unwrap(),
            Some(ScoreRecord::new(3, 9, 45))
        );

        // The next successful write heals the index.
        deployment.ranked.set_available(true);
        deployment.service.store_score(3, 9, 46).await.unwrap();
        assert_eq!(
            deployment.service.get_player_rank(9, 3).await.unwrap().score,
            Some(46)
        );
        assert_eq!(deployment.metrics.snapshot().index_update_failures, 1);
    }

    #[tokio::test]
    async fn test_persistence_failure_skips_index() {
        let config = LeaderboardConfig {
            shard_count: 1,
            ..LeaderboardConfig::for_testing()
        };
        let ranked = Arc::new(InMemoryRankedSet::new());
        let service =
            LeaderboardService::new(&config, vec![Arc::new(DeadShard)], ranked.clone()).unwrap();

        let err = service.store_score(1, 1, 10).await.unwrap_err();
        assert!(matches!(err, LeaderboardError::PersistenceFailed { .. }));
        assert_eq!(err.severity(), Severity::Error);
        assert_eq!(ranked.cardinality("leaderboard:game:1").await.unwrap(), 0);
        assert!(ranked.keys().is_empty());
    }

    #[tokio::test]
    async fn test_hanging_shard_times_out() {
        let config = LeaderboardConfig {
            shard_count: 1,
            operation_timeout_ms: 50,
            ..LeaderboardConfig::for_testing()
        };
        let service = LeaderboardService::new(
            &config,
            vec![Arc::new(HangingShard)],
            Arc::new(InMemoryRankedSet::new()),
        )
        .unwrap();

        match service.store_score(1, 1, 10).await {
            Err(LeaderboardError::PersistenceFailed { cause, .. }) => {
                assert!(matches!(
                    *cause,
                    LeaderboardError::StoreUnavailable {
                        operation: "upsert",
                        ..
                    }
                ));
                assert!(cause.to_string().contains("Timed out"), "cause: {}", cause);
            }
            other => panic!("expected PersistenceFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_concurrent_writes_to_distinct_players() {
        let deployment = Arc::new(Deployment::new(4));
        let mut handles = Vec::new();
        for player in 1..=32u64 {
            let deployment = deployment.clone();
            handles.push(tokio::spawn(async move {
                deployment
                    .service
                    .store_score(player, 1, player * 3)
                    .await
                    .map(|_| ())
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let page = deployment.service.get_leaderboard(1, 0, 100).await.unwrap();
        assert_eq!(page.len(), 32);
        assert_eq!(page[0].player_id, 32);
        assert_eq!(deployment.metrics.snapshot().scores_stored, 32);
    }

    #[tokio::test]
    async fn test_concurrent_writes_to_same_key() {
        let deployment = Arc::new(Deployment::new(2));
        let scores: Vec<u64> = (1..=24).map(|i| i * 11).collect();

        let mut handles = Vec::new();
        for score in scores.clone() {
            let deployment = deployment.clone();
            handles.push(tokio::spawn(async move {
                deployment.service.store_score(7, 3, score).await.map(|_| ())
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // One row survives, holding one of the written scores.
        let stored = deployment.service.store().scan_game(3).await.unwrap();
        assert_eq!(stored.len(), 1);
        let winner = stored[0].score;
        assert!(scores.contains(&winner));
        assert_eq!(
            deployment.ranked.cardinality(&game_key(3)).await.unwrap(),
            1
        );

        // After a rebuild the index agrees with the store.
        deployment.service.rebuild_game(3).await.unwrap();
        let rank = deployment.service.get_player_rank(3, 7).await.unwrap();
        assert_eq!(rank.rank, Some(1));
        assert_eq!(rank.score, Some(winner));
    }

    #[tokio::test]
    async fn test_unstorable_score_is_invalid_input() {
        let deployment = Deployment::new(2);
        let err = deployment
            .service
            .store_score(1, 1, u64::MAX)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LeaderboardError::InvalidInput { field: "score", .. }
        ));
        assert!(!err.is_retryable());

        let err = deployment.service.store_score(u64::MAX, 1, 5).await.unwrap_err();
        assert!(matches!(
            err,
            LeaderboardError::InvalidInput {
                field: "player_id",
                ..
            }
        ));
        assert!(deployment.service.store().scan_all_game_ids().await.unwrap().is_empty());
        assert_eq!(deployment.metrics.snapshot().persistence_failures, 0);
    }

    #[tokio::test]
    async fn test_score_zero_accepted_and_sqlite_shard_named() {
        let shard = SqliteShard::open_in_memory("score_shard_0").unwrap();
        assert_eq!(shard.name(), "score_shard_0");

        let deployment = Deployment::new(1);
        let record = deployment.service.store_score(1, 1, 0).await.unwrap();
        assert_eq!(record.score, 0);
    }
}
