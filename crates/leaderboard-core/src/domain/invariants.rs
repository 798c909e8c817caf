//! # Domain Invariants
//!
//! Input rules the core enforces on every inbound call, even though the
//! request layer is expected to have validated them already.

use super::errors::{GameId, LeaderboardError, PlayerId, Score};

/// Default number of shards.
pub const DEFAULT_SHARD_COUNT: u32 = 2;

/// Default shard connection prefix.
pub const DEFAULT_CONNECTION_PREFIX: &str = "score_shard";

/// Default leaderboard page size.
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Upper bound on a leaderboard page.
pub const MAX_PAGE_LIMIT: usize = 1000;

/// Ranked-set keys are `leaderboard:game:{game_id}`.
pub const LEADERBOARD_KEY_PREFIX: &str = "leaderboard:game:";

/// Largest id or score a shard column can hold (signed 64-bit INTEGER).
pub const MAX_STORABLE_VALUE: u64 = i64::MAX as u64;

/// Player ids start at 1.
pub fn validate_player_id(player_id: PlayerId) -> Result<(), LeaderboardError> {
    if player_id == 0 {
        return Err(LeaderboardError::invalid_input(
            "player_id",
            "must be a positive integer",
        ));
    }
    check_storable("player_id", player_id)
}

/// Game ids start at 1.
pub fn validate_game_id(game_id: GameId) -> Result<(), LeaderboardError> {
    if game_id == 0 {
        return Err(LeaderboardError::invalid_input(
            "game_id",
            "must be a positive integer",
        ));
    }
    check_storable("game_id", game_id)
}

/// Any non-negative score a shard can store.
pub fn validate_score(score: Score) -> Result<(), LeaderboardError> {
    check_storable("score", score)
}

fn check_storable(field: &'static str, value: u64) -> Result<(), LeaderboardError> {
    if value > MAX_STORABLE_VALUE {
        return Err(LeaderboardError::invalid_input(
            field,
            format!("{} exceeds maximum {}", value, MAX_STORABLE_VALUE),
        ));
    }
    Ok(())
}

/// Page bounds: `limit` in `1..=max_page_size`. Oversized pages are rejected,
/// not clamped.
pub fn validate_page(
    offset: usize,
    limit: usize,
    max_page_size: usize,
) -> Result<(), LeaderboardError> {
    if limit == 0 {
        return Err(LeaderboardError::invalid_input("limit", "must be at least 1"));
    }
    if limit > max_page_size {
        return Err(LeaderboardError::invalid_input(
            "limit",
            format!("{} exceeds maximum page size {}", limit, max_page_size),
        ));
    }
    if offset.checked_add(limit).is_none() {
        return Err(LeaderboardError::invalid_input(
            "offset",
            "offset + limit overflows",
        ));
    }
    Ok(())
}

/// Shard count must be positive and fit a `ShardId`.
pub fn validate_shard_count(raw: i64) -> Result<u32, LeaderboardError> {
    if raw <= 0 {
        return Err(LeaderboardError::InvalidConfiguration(format!(
            "shard count must be a positive integer, got {}",
            raw
        )));
    }
    u32::try_from(raw).map_err(|_| {
        LeaderboardError::InvalidConfiguration(format!("shard count {} is too large", raw))
    })
}
