//! In-Memory Shard Adapter
//!
//! Implements `ShardBackend` over a map keyed by the natural key. Used in
//! unit tests and as a stand-in partition when no database is configured.

use crate::domain::{BackendError, GameId, PlayerId, ScoreRecord, MAX_STORABLE_VALUE};
use crate::ports::outbound::ShardBackend;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// In-memory shard partition.
pub struct InMemoryShard {
    name: String,
    /// (player_id, game_id) -> record.
    records: RwLock<BTreeMap<(PlayerId, GameId), ScoreRecord>>,
    available: AtomicBool,
}

impl InMemoryShard {
    /// Create an empty, reachable shard.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: RwLock::new(BTreeMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the shard going down or coming back.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the shard holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn check_available(&self) -> Result<(), BackendError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BackendError::Unavailable(format!(
                "connection '{}' refused",
                self.name
            )))
        }
    }
}

#[async_trait]
impl ShardBackend for InMemoryShard {
    fn name(&self) -> &str {
        &self.name
    }

    async fn upsert(&self, record: ScoreRecord) -> Result<ScoreRecord, BackendError> {
        self.check_available()?;
        // Same column range as the SQLite shards.
        if let Some(value) = [record.player_id, record.game_id, record.score]
            .into_iter()
            .find(|v| *v > MAX_STORABLE_VALUE)
        {
            return Err(BackendError::Query(format!(
                "value {} exceeds INTEGER range",
                value
            )));
        }
        debug!(
            shard = %self.name,
            player_id = record.player_id,
            game_id = record.game_id,
            "upsert"
        );
        self.records.write().insert(record.natural_key(), record);
        Ok(record)
    }

    async fn find_one(
        &self,
        player_id: PlayerId,
        game_id: GameId,
    ) -> Result<Option<ScoreRecord>, BackendError> {
        self.check_available()?;
        Ok(self.records.read().get(&(player_id, game_id)).copied())
    }

    async fn scan_game(&self, game_id: GameId) -> Result<Vec<ScoreRecord>, BackendError> {
        self.check_available()?;
        Ok(self
            .records
            .read()
            .values()
            .filter(|r| r.game_id == game_id)
            .copied()
            .collect())
    }

    async fn distinct_game_ids(&self) -> Result<Vec<GameId>, BackendError> {
        self.check_available()?;
        let ids: BTreeSet<GameId> = self.records.read().keys().map(|(_, g)| *g).collect();
        Ok(ids.into_iter().collect())
    }

    async fn ping(&self) -> Result<(), BackendError> {
        self.check_available()
    }
}
