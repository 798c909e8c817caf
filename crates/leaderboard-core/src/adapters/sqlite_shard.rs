//! SQLite Shard Adapter
//!
//! One SQLite database per shard, holding the `player_scores` table:
//! composite primary key `(player_id, game_id)` plus a secondary index on
//! `game_id` for the per-game scans used by rebuilds.
//!
//! rusqlite is blocking, so every call runs on the blocking thread pool.

use crate::domain::{BackendError, GameId, PlayerId, ScoreRecord};
use crate::ports::outbound::ShardBackend;
use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS player_scores (
    player_id  INTEGER NOT NULL CHECK (player_id >= 1),
    game_id    INTEGER NOT NULL CHECK (game_id >= 1),
    score      INTEGER NOT NULL DEFAULT 0 CHECK (score >= 0),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (player_id, game_id)
) WITHOUT ROWID;
CREATE INDEX IF NOT EXISTS idx_player_scores_game_id ON player_scores (game_id);
";

const UPSERT: &str = "
INSERT INTO player_scores (player_id, game_id, score, created_at, updated_at)
VALUES (?1, ?2, ?3, CAST(strftime('%s', 'now') AS INTEGER), CAST(strftime('%s', 'now') AS INTEGER))
ON CONFLICT (player_id, game_id) DO UPDATE SET
    score = excluded.score,
    updated_at = excluded.updated_at
RETURNING player_id, game_id, score
";

/// Lock wait before SQLite reports `SQLITE_BUSY`.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed shard partition.
pub struct SqliteShard {
    name: String,
    conn: Arc<Mutex<Connection>>,
}

impl SqliteShard {
    /// Open (or create) the shard database at `path`.
    pub fn open(path: impl AsRef<Path>, name: impl Into<String>) -> Result<Self, BackendError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(unavailable)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(query_error)?;
        let shard = Self::with_connection(conn, name.into())?;
        info!(shard = %shard.name, path = %path.display(), "Opened shard database");
        Ok(shard)
    }

    /// Open `{dir}/{name}.db`, creating the directory if needed.
    pub fn open_in_dir(dir: impl AsRef<Path>, name: impl Into<String>) -> Result<Self, BackendError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| {
            BackendError::Unavailable(format!("cannot create {}: {}", dir.display(), e))
        })?;
        let name = name.into();
        let path = dir.join(format!("{}.db", name));
        Self::open(path, name)
    }

    /// Private in-memory database, for tests.
    pub fn open_in_memory(name: impl Into<String>) -> Result<Self, BackendError> {
        let conn = Connection::open_in_memory().map_err(unavailable)?;
        Self::with_connection(conn, name.into())
    }

    fn with_connection(conn: Connection, name: String) -> Result<Self, BackendError> {
        conn.busy_timeout(BUSY_TIMEOUT).map_err(query_error)?;
        conn.execute_batch(SCHEMA).map_err(query_error)?;
        Ok(Self {
            name,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn run<T, F>(&self, f: F) -> Result<T, BackendError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, BackendError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            f(&guard)
        })
        .await
        .map_err(|e| BackendError::Unavailable(format!("shard task failed: {}", e)))?
    }
}

#[async_trait]
impl ShardBackend for SqliteShard {
    fn name(&self) -> &str {
        &self.name
    }

    async fn upsert(&self, record: ScoreRecord) -> Result<ScoreRecord, BackendError> {
        debug!(
            shard = %self.name,
            player_id = record.player_id,
            game_id = record.game_id,
            "upsert"
        );
        let player_id = to_sql_int(record.player_id)?;
        let game_id = to_sql_int(record.game_id)?;
        let score = to_sql_int(record.score)?;

        self.run(move |conn| {
            conn.query_row(UPSERT, params![player_id, game_id, score], read_record)
                .map_err(query_error)?
        })
        .await
    }

    async fn find_one(
        &self,
        player_id: PlayerId,
        game_id: GameId,
    ) -> Result<Option<ScoreRecord>, BackendError> {
        let player_id = to_sql_int(player_id)?;
        let game_id = to_sql_int(game_id)?;

        self.run(move |conn| {
            let row = conn
                .query_row(
                    "SELECT player_id, game_id, score FROM player_scores
                     WHERE player_id = ?1 AND game_id = ?2",
                    params![player_id, game_id],
                    read_record,
                )
                .optional()
                .map_err(query_error)?;
            row.transpose()
        })
        .await
    }

    async fn scan_game(&self, game_id: GameId) -> Result<Vec<ScoreRecord>, BackendError> {
        let game_id = to_sql_int(game_id)?;

        self.run(move |conn| {
            let mut stmt = conn
                .prepare_cached(
                    "SELECT player_id, game_id, score FROM player_scores WHERE game_id = ?1",
                )
                .map_err(query_error)?;
            let rows = stmt
                .query_map(params![game_id], read_record)
                .map_err(query_error)?;

            let mut records = Vec::new();
            for row in rows {
                records.push(row.map_err(query_error)??);
            }
            Ok(records)
        })
        .await
    }

    async fn distinct_game_ids(&self) -> Result<Vec<GameId>, BackendError> {
        self.run(|conn| {
            let mut stmt = conn
                .prepare_cached("SELECT DISTINCT game_id FROM player_scores ORDER BY game_id")
                .map_err(query_error)?;
            let rows = stmt
                .query_map([], |row| row.get::<_, i64>(0))
                .map_err(query_error)?;

            let mut ids = Vec::new();
            for row in rows {
                ids.push(from_sql_int(row.map_err(query_error)?)?);
            }
            Ok(ids)
        })
        .await
    }

    async fn ping(&self) -> Result<(), BackendError> {
        self.run(|conn| {
            conn.query_row("SELECT 1", [], |_| Ok(()))
                .map_err(unavailable)
        })
        .await
    }
}

/// Row mapper. Column conversion errors are surfaced as the inner `Result`
/// so a corrupt row does not masquerade as a rusqlite error.
fn read_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<ScoreRecord, BackendError>> {
    let player_id: i64 = row.get(0)?;
    let game_id: i64 = row.get(1)?;
    let score: i64 = row.get(2)?;
    Ok(record_from_columns(player_id, game_id, score))
}

fn record_from_columns(player_id: i64, game_id: i64, score: i64) -> Result<ScoreRecord, BackendError> {
    Ok(ScoreRecord::new(
        from_sql_int(player_id)?,
        from_sql_int(game_id)?,
        from_sql_int(score)?,
    ))
}

fn to_sql_int(value: u64) -> Result<i64, BackendError> {
    i64::try_from(value)
        .map_err(|_| BackendError::Query(format!("value {} exceeds SQLite INTEGER range", value)))
}

fn from_sql_int(value: i64) -> Result<u64, BackendError> {
    u64::try_from(value).map_err(|_| BackendError::Query(format!("negative column value {}", value)))
}

fn query_error(e: rusqlite::Error) -> BackendError {
    BackendError::Query(e.to_string())
}

fn unavailable(e: rusqlite::Error) -> BackendError {
    BackendError::Unavailable(e.to_string())
}
