//! # Leaderboard Telemetry
//!
//! Structured logging for leaderboard binaries. Library crates log only
//! through `tracing`; binaries call `init_tracing` once at startup.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use leaderboard_telemetry::{init_tracing, TelemetryConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TelemetryConfig::from_env();
//!     init_tracing(&config)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LB_SERVICE_NAME` | `leaderboard` | Service name attached to startup logs |
//! | `LB_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `LB_CONSOLE_OUTPUT` | `true` | Emit logs at all |
//! | `LB_JSON_LOGS` | `false` (`true` in containers) | JSON formatted logs |

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::init_tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install subscriber: {0}")]
    SubscriberInit(String),
}
