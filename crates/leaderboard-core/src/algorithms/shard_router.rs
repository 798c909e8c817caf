//! # Shard Router
//!
//! Deterministic placement of a player's records: `player_id % shard_count`.
//!
//! Every reader and writer must agree on this function. A divergence puts a
//! record on one shard and looks it up on another.

use crate::domain::{LeaderboardError, PlayerId, ShardAssignment, ShardId};

/// Modulo shard assignment.
///
/// Pure and total for `shard_count > 0`; a zero shard count is a
/// configuration error.
pub fn resolve_shard(key: u64, shard_count: u32) -> Result<ShardId, LeaderboardError> {
    if shard_count == 0 {
        return Err(LeaderboardError::InvalidConfiguration(
            "number of shards must be a positive integer".to_string(),
        ));
    }
    // Result is < shard_count, so it always fits a ShardId.
    Ok((key % u64::from(shard_count)) as ShardId)
}

/// Connection name for a shard, `{prefix}_{shard_id}`.
pub fn connection_name(prefix: &str, shard_id: ShardId) -> String {
    format!("{}_{}", prefix, shard_id)
}

/// Full placement of a player's records.
pub fn assign(
    player_id: PlayerId,
    prefix: &str,
    shard_count: u32,
) -> Result<ShardAssignment, LeaderboardError> {
    let shard_id = resolve_shard(player_id, shard_count)?;
    Ok(ShardAssignment {
        player_id,
        shard_id,
        connection_name: connection_name(prefix, shard_id),
    })
}
