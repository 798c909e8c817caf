//! # Algorithms Module
//!
//! Pure, I/O-free algorithms used by the store and the index.

pub mod ranking;
pub mod shard_router;

pub use ranking::{compare_ranked, page_bounds, rank_for_position, rank_key};
pub use shard_router::{assign, connection_name, resolve_shard};
