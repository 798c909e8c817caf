//! # Ranking
//!
//! Rank arithmetic shared by the ranked index and its adapters.
//!
//! Order is score descending. Equal scores are ordered by ascending player
//! id, so ranks are stable across rebuilds regardless of insertion order.

use std::cmp::{Ordering, Reverse};

use crate::domain::{PlayerId, Score};

/// Inclusive `[start, stop]` positions for a page. Caller has validated
/// `limit >= 1` and that `offset + limit` does not overflow.
pub fn page_bounds(offset: usize, limit: usize) -> (usize, usize) {
    (offset, offset + limit - 1)
}

/// 1-indexed rank of the `position`-th entry of a page starting at `offset`.
pub fn rank_for_position(offset: usize, position: usize) -> u64 {
    (offset + 1 + position) as u64
}

/// Sort key placing higher scores first, ties by ascending player id.
pub fn rank_key(player_id: PlayerId, score: Score) -> (Reverse<Score>, PlayerId) {
    (Reverse(score), player_id)
}

/// Comparator form of `rank_key`.
pub fn compare_ranked(a: (PlayerId, Score), b: (PlayerId, Score)) -> Ordering {
    rank_key(a.0, a.1).cmp(&rank_key(b.0, b.1))
}
