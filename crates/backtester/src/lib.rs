//! Backtester
//!
//! Historical simulation of race pick strategies.
//!
//! # Features
//!
//! - **Strategy Trait**: Pluggable pick strategies with declarative parameter schemas
//! - **Rollups**: Hit rate and ROI bucketed overall, by month, by season and by year
//! - **Backtest Runner**: Flat-stake win bet settlement over a date range
//! - **A/B Compare**: Two presets run concurrently over the same range
//! - **Predictions**: The active preset applied to upcoming races
//!
//! # Example
//!
//! ```ignore
//! use backtester::{BacktestRunner, DateRange, RunnerConfig, StrategyRegistry};
//!
//! let registry = Arc::new(StrategyRegistry::with_defaults());
//! let runner = BacktestRunner::new(store, registry, RunnerConfig::default());
//! let summary = runner.run_preset(&DateRange::new("20240101", "20241231"), &preset).await?;
//! println!("ROI: {:.1}%", summary.total().map(|r| r.roi).unwrap_or(0.0) * 100.0);
//! ```

pub mod aggregate;
pub mod error;
pub mod predict;
pub mod presets;
pub mod runner;
pub mod strategy;

// Re-exports
pub use aggregate::{rollup, Granularity, MetricRow, Rollup, RollupInput, ALL_BUCKET};
pub use error::{BacktestError, Result};
pub use predict::{predict, this_weekend, Prediction};
pub use presets::PresetBook;
pub use runner::{BacktestRunner, Comparison, DateRange, RunnerConfig, SettledRecord, Summary};
pub use strategy::{CheckAverageStrategy, Strategy, StrategyInfo, StrategyRegistry, Verdict};
