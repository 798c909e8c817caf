//! # Adapters Layer
//!
//! Concrete implementations of the outbound ports.
//!
//! - `SqliteShard` - one SQLite database per shard
//! - `InMemoryShard` - map-backed shard for tests
//! - `RedisRankedSet` - shared ranked sets on Redis
//! - `InMemoryRankedSet` - process-local ranked-set service

pub mod memory_ranked_set;
pub mod memory_shard;
pub mod redis_ranked_set;
pub mod sqlite_shard;

pub use memory_ranked_set::InMemoryRankedSet;
pub use memory_shard::InMemoryShard;
pub use redis_ranked_set::RedisRankedSet;
pub use sqlite_shard::SqliteShard;
