//! Metrics hooks for leaderboard operations
//!
//! Counters for the write path, reads and rebuilds. The service records
//! through `MetricsRecorder`, so deployments can forward to an external
//! metrics system or disable recording entirely with `NoOpMetrics`.
//!
//! ## Usage
//!
//! ```ignore
//! use leaderboard_core::metrics::Metrics;
//! use leaderboard_core::{InMemoryRankedSet, LeaderboardService};
//! use std::sync::Arc;
//!
//! let metrics = Arc::new(Metrics::new());
//! let service = LeaderboardService::new(&config, shards, Arc::new(InMemoryRankedSet::new()))?
//!     .with_metrics(metrics.clone());
//!
//! service.store_score(1, 1, 500).await?;
//! assert_eq!(metrics.snapshot().scores_stored, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for leaderboard operations.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Scores durably written
    pub scores_stored: AtomicU64,
    /// Writes that failed before reaching the store
    pub persistence_failures: AtomicU64,
    /// Writes that committed but left the index stale
    pub index_update_failures: AtomicU64,
    /// Leaderboard pages and rank lookups served
    pub leaderboard_reads: AtomicU64,
    /// Games rebuilt successfully
    pub games_rebuilt: AtomicU64,
    /// Game rebuilds that aborted
    pub rebuild_failures: AtomicU64,
    /// Members bulk-loaded by rebuilds
    pub entries_loaded: AtomicU64,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed write and whether the index accepted it
    pub fn record_store(&self, index_updated: bool) {
        self.scores_stored.fetch_add(1, Ordering::Relaxed);
        if !index_updated {
            self.index_update_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a write rejected by the store
    pub fn record_persistence_failure(&self) {
        self.persistence_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a read served from the index
    pub fn record_read(&self) {
        self.leaderboard_reads.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one game rebuild
    ///
    /// # Arguments
    /// * `entries` - Members loaded, `None` if the rebuild failed
    pub fn record_rebuild(&self, entries: Option<usize>) {
        match entries {
            Some(n) => {
                self.games_rebuilt.fetch_add(1, Ordering::Relaxed);
                self.entries_loaded.fetch_add(n as u64, Ordering::Relaxed);
            }
            None => {
                self.rebuild_failures.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            scores_stored: self.scores_stored.load(Ordering::Relaxed),
            persistence_failures: self.persistence_failures.load(Ordering::Relaxed),
            index_update_failures: self.index_update_failures.load(Ordering::Relaxed),
            leaderboard_reads: self.leaderboard_reads.load(Ordering::Relaxed),
            games_rebuilt: self.games_rebuilt.load(Ordering::Relaxed),
            rebuild_failures: self.rebuild_failures.load(Ordering::Relaxed),
            entries_loaded: self.entries_loaded.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.scores_stored.store(0, Ordering::Relaxed);
        self.persistence_failures.store(0, Ordering::Relaxed);
        self.index_update_failures.store(0, Ordering::Relaxed);
        self.leaderboard_reads.store(0, Ordering::Relaxed);
        self.games_rebuilt.store(0, Ordering::Relaxed);
        self.rebuild_failures.store(0, Ordering::Relaxed);
        self.entries_loaded.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub scores_stored: u64,
    pub persistence_failures: u64,
    pub index_update_failures: u64,
    pub leaderboard_reads: u64,
    pub games_rebuilt: u64,
    pub rebuild_failures: u64,
    pub entries_loaded: u64,
}

/// Sink for leaderboard metrics.
pub trait MetricsRecorder: Send + Sync {
    fn record_store(&self, index_updated: bool);
    fn record_persistence_failure(&self);
    fn record_read(&self);
    fn record_rebuild(&self, entries: Option<usize>);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Debug, Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_store(&self, _: bool) {}
    fn record_persistence_failure(&self) {}
    fn record_read(&self) {}
    fn record_rebuild(&self, _: Option<usize>) {}
}

impl MetricsRecorder for Metrics {
    fn record_store(&self, index_updated: bool) {
        Metrics::record_store(self, index_updated);
    }

    fn record_persistence_failure(&self) {
        Metrics::record_persistence_failure(self);
    }

    fn record_read(&self) {
        Metrics::record_read(self);
    }

    fn record_rebuild(&self, entries: Option<usize>) {
        Metrics::record_rebuild(self, entries);
    }
}
