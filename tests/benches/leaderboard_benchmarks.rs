//! # Leaderboard Benchmarks
//!
//! | Operation | Expectation |
//! |-----------|-------------|
//! | Shard routing | Pure arithmetic, nanoseconds |
//! | Ranked-set page read | Grows with offset, not set size |
//! | Rebuild of one game | Dominated by the shard scan |

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use leaderboard_core::{
    resolve_shard, InMemoryRankedSet, InMemoryShard, LeaderboardApi, LeaderboardConfig,
    LeaderboardService, RankedMember, RankedSetStore,
};
use rand::Rng;

fn bench_resolve_shard(c: &mut Criterion) {
    let mut group = c.benchmark_group("shard-router");
    let keys: Vec<u64> = (0..1_000)
        .map(|_| rand::thread_rng().gen_range(1..u64::MAX))
        .collect();

    group.throughput(Throughput::Elements(keys.len() as u64));
    group.bench_function("resolve_shard_1000", |b| {
        b.iter(|| {
            for &key in &keys {
                black_box(resolve_shard(key, 16).ok());
            }
        })
    });
    group.finish();
}

fn bench_range_reads(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("ranked-set");

    for size in [1_000u64, 10_000, 100_000] {
        let store = InMemoryRankedSet::new();
        let members: Vec<RankedMember> = (1..=size).map(|p| (p, p * 31 % 10_007)).collect();
        runtime
            .block_on(store.add_many("bench", &members))
            .expect("load");

        group.bench_with_input(BenchmarkId::new("top_100", size), &store, |b, store| {
            b.iter(|| runtime.block_on(store.range_desc_with_scores("bench", 0, 99)))
        });
    }
    group.finish();
}

fn bench_rebuild(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("rebuild");

    for players in [100u64, 1_000] {
        let config = LeaderboardConfig {
            bulk_load_batch_size: 500,
            ..LeaderboardConfig::for_testing()
        };
        let shards = (0..4)
            .map(|i| Arc::new(InMemoryShard::new(format!("bench_shard_{}", i))))
            .collect();
        let service =
            LeaderboardService::new(&config, shards, Arc::new(InMemoryRankedSet::new()))
                .expect("service");
        runtime.block_on(async {
            for player in 1..=players {
                service.store_score(player, 1, player % 97).await.expect("store");
            }
        });

        group.throughput(Throughput::Elements(players));
        group.bench_with_input(BenchmarkId::new("rebuild_game", players), &service, |b, s| {
            b.iter(|| runtime.block_on(s.rebuild_game(1)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_resolve_shard, bench_range_reads, bench_rebuild);
criterion_main!(benches);
