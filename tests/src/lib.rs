//! # Leaderboard Test Suite
//!
//! Cross-component tests that run the full service against real SQLite
//! shard databases in temporary directories.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/
//! │   ├── fixtures.rs          # Temp-dir shard deployments
//! │   └── integration/
//! │       ├── properties.rs    # Routing, ranking, paging, not-found
//! │       ├── write_path.rs    # Store-then-index, partial failures
//! │       └── rebuild.rs       # Single-game and full rebuilds
//! └── benches/
//!     └── leaderboard_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lb-tests
//! cargo test -p lb-tests integration::rebuild::
//! cargo bench -p lb-tests
//! ```

pub mod fixtures;
pub mod integration;
