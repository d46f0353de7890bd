//! Error types for backtest runs.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("Strategy not found: {0}")]
    UnknownStrategy(String),

    #[error("Preset not found: {0}")]
    PresetNotFound(String),

    #[error("Record store error: {0}")]
    Store(#[from] paddock_core::Error),
}

pub type Result<T> = std::result::Result<T, BacktestError>;
