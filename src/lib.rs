//! Paddock: race pick strategy backtesting and A/B comparison
//!
//! This is the root crate that provides benchmark access to the internal modules.
//! For actual functionality, use the individual crates directly:
//!
//! - `paddock-core`: Race records, parameter schemas, presets, record stores, configuration
//! - `backtester`: Strategies, rollups, backtest and compare runners, predictions
//! - `paddock-cli`: The `paddock` command line

// Re-export for benchmarks
pub use backtester;
pub use paddock_core as core;
