//! Ports Layer
//!
//! - Driving Ports (inbound) - API for external callers
//! - Driven Ports (outbound) - Shard connections and the ranked-set service

pub mod inbound;
pub mod outbound;

pub use inbound::LeaderboardApi;
pub use outbound::{RankedMember, RankedSetStore, ShardBackend};
