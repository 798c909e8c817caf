//! # Domain Errors
//!
//! Error taxonomy for the leaderboard core. Every variant is recoverable at
//! the call boundary; none of them warrants a process crash.

use std::time::Duration;

use thiserror::Error;

use super::entities::ScoreRecord;

/// Player identifier (the sharding key).
pub type PlayerId = u64;

/// Game identifier.
pub type GameId = u64;

/// Player score within a game.
pub type Score = u64;

/// Shard identifier, 0-indexed.
pub type ShardId = u32;

/// How loudly an error should be reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Degraded but the durable state is intact.
    Warning,
    /// The requested operation did not take effect.
    Error,
}

/// Leaderboard error types.
#[derive(Debug, Error)]
pub enum LeaderboardError {
    /// Bad deployment configuration (e.g. shard count). Fatal at startup.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Malformed identifier, score or page parameters.
    #[error("Invalid input for `{field}`: {reason}")]
    InvalidInput {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// A shard was unreachable or timed out.
    #[error("Shard {shard_id} unavailable during {operation}: {reason}")]
    StoreUnavailable {
        /// Shard that failed
        shard_id: ShardId,
        /// Store operation being performed
        operation: &'static str,
        /// Underlying cause
        reason: String,
    },

    /// A shard executed the call but refused it. Retrying will not help.
    #[error("Shard {shard_id} rejected {operation}: {reason}")]
    StoreRejected {
        /// Shard that refused the call
        shard_id: ShardId,
        /// Store operation being performed
        operation: &'static str,
        /// Backend's reason
        reason: String,
    },

    /// The durable write failed; the ranked index was not touched.
    #[error("Failed to persist score for player {player_id} in game {game_id}: {cause}")]
    PersistenceFailed {
        /// Player being written
        player_id: PlayerId,
        /// Game being written
        game_id: GameId,
        /// Store error behind the failure
        cause: Box<LeaderboardError>,
    },

    /// The durable write committed but the ranked index update failed.
    #[error(
        "Score persisted for player {} in game {} but index update failed: {reason}",
        .record.player_id,
        .record.game_id
    )]
    IndexUpdateFailed {
        /// The record that was committed to the store
        record: ScoreRecord,
        /// Underlying cause
        reason: String,
    },

    /// The ranked index could not serve a read.
    #[error("Ranked index unavailable during {operation}: {reason}")]
    IndexUnavailable {
        /// Index operation being performed
        operation: &'static str,
        /// Underlying cause
        reason: String,
    },

    /// A single game's rebuild aborted.
    #[error("Rebuild of game {game_id} failed: {cause}")]
    RebuildFailed {
        /// Game being rebuilt
        game_id: GameId,
        /// Error that aborted the rebuild
        cause: Box<LeaderboardError>,
    },
}

impl LeaderboardError {
    /// Classify a failed shard call: unreachable or slow shards are
    /// `StoreUnavailable`, refused queries are `StoreRejected`.
    pub fn from_shard(shard_id: ShardId, operation: &'static str, error: BackendError) -> Self {
        match error {
            BackendError::Unavailable(_) | BackendError::Timeout(_) => Self::StoreUnavailable {
                shard_id,
                operation,
                reason: error.to_string(),
            },
            BackendError::Query(reason) => Self::StoreRejected {
                shard_id,
                operation,
                reason,
            },
        }
    }

    /// Shorthand for `InvalidInput`.
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::InvalidConfiguration(_)
            | Self::InvalidInput { .. }
            | Self::StoreRejected { .. } => false,
            Self::StoreUnavailable { .. }
            | Self::IndexUpdateFailed { .. }
            | Self::IndexUnavailable { .. } => true,
            Self::PersistenceFailed { cause, .. } | Self::RebuildFailed { cause, .. } => {
                cause.is_retryable()
            }
        }
    }

    /// Reporting severity.
    pub fn severity(&self) -> Severity {
        match self {
            Self::IndexUpdateFailed { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// Errors raised by outbound adapters (shard connections, ranked-set service).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// Connection refused, closed, or backend marked down.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// The call did not complete within its deadline.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// The backend rejected or failed to execute the query.
    #[error("Query error: {0}")]
    Query(String),
}
