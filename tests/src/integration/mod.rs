//! # Integration Tests
//!
//! The leaderboard service end to end over SQLite shards.

pub mod rebuild;
pub mod write_path;
