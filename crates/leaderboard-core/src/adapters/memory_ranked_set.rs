//! In-Memory Ranked Set Adapter
//!
//! A process-local sorted-set service implementing `RankedSetStore`. Each
//! set keeps members ordered by `(Reverse(score), player_id)` so range and
//! rank queries walk the same order the leaderboard reports.

use crate::algorithms::rank_key;
use crate::domain::{BackendError, PlayerId, Score};
use crate::ports::outbound::{RankedMember, RankedSetStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[derive(Debug, Default)]
struct SortedSet {
    by_rank: BTreeSet<(Reverse<Score>, PlayerId)>,
    scores: HashMap<PlayerId, Score>,
}

impl SortedSet {
    fn insert(&mut self, member: PlayerId, score: Score) {
        if let Some(old) = self.scores.insert(member, score) {
            self.by_rank.remove(&rank_key(member, old));
        }
        self.by_rank.insert(rank_key(member, score));
    }

    /// O(rank): counts the members ordered before this one.
    fn rank_of(&self, member: PlayerId) -> Option<u64> {
        let score = *self.scores.get(&member)?;
        Some(self.by_rank.range(..rank_key(member, score)).count() as u64)
    }
}

/// In-memory ranked-set store.
#[derive(Debug)]
pub struct InMemoryRankedSet {
    sets: RwLock<HashMap<String, SortedSet>>,
    available: AtomicBool,
    round_trips: AtomicU64,
}

impl Default for InMemoryRankedSet {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRankedSet {
    pub fn new() -> Self {
        Self {
            sets: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            round_trips: AtomicU64::new(0),
        }
    }

    /// Simulate the service going down or coming back.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Requests served so far, successful or not.
    pub fn round_trips(&self) -> u64 {
        self.round_trips.load(Ordering::Relaxed)
    }

    /// Keys currently holding a set.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.sets.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn begin(&self) -> Result<(), BackendError> {
        self.round_trips.fetch_add(1, Ordering::Relaxed);
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BackendError::Unavailable(
                "ranked-set service connection refused".to_string(),
            ))
        }
    }
}

#[async_trait]
impl RankedSetStore for InMemoryRankedSet {
    async fn add(&self, key: &str, member: PlayerId, score: Score) -> Result<(), BackendError> {
        self.begin()?;
        self.sets
            .write()
            .entry(key.to_string())
            .or_default()
            .insert(member, score);
        Ok(())
    }

    async fn add_many(&self, key: &str, members: &[RankedMember]) -> Result<(), BackendError> {
        self.begin()?;
        if members.is_empty() {
            return Ok(());
        }
        let mut sets = self.sets.write();
        let set = sets.entry(key.to_string()).or_default();
        for &(member, score) in members {
            set.insert(member, score);
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BackendError> {
        self.begin()?;
        self.sets.write().remove(key);
        Ok(())
    }

    async fn range_desc_with_scores(
        &self,
        key: &str,
        start: usize,
        stop: usize,
    ) -> Result<Vec<RankedMember>, BackendError> {
        self.begin()?;
        if stop < start {
            return Ok(Vec::new());
        }
        let sets = self.sets.read();
        let Some(set) = sets.get(key) else {
            return Ok(Vec::new());
        };
        Ok(set
            .by_rank
            .iter()
            .skip(start)
            .take(stop.saturating_sub(start).saturating_add(1))
            .map(|&(Reverse(score), member)| (member, score))
            .collect())
    }

    async fn rank_desc(&self, key: &str, member: PlayerId) -> Result<Option<u64>, BackendError> {
        self.begin()?;
        Ok(self.sets.read().get(key).and_then(|set| set.rank_of(member)))
    }

    async fn score(&self, key: &str, member: PlayerId) -> Result<Option<Score>, BackendError> {
        self.begin()?;
        Ok(self
            .sets
            .read()
            .get(key)
            .and_then(|set| set.scores.get(&member).copied()))
    }

    async fn cardinality(&self, key: &str) -> Result<usize, BackendError> {
        self.begin()?;
        Ok(self.sets.read().get(key).map_or(0, |set| set.scores.len()))
    }
}
