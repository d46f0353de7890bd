//! Configuration management for Paddock.
//!
//! Values are layered: built-in defaults, then an optional `paddock.toml`,
//! then `PADDOCK__*` environment variables (e.g. `PADDOCK__DATABASE__URL`).

use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub backtest: BacktestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_url() -> String {
    "sqlite://paddock.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

/// Settlement settings used by the backtest runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Stake placed on every qualifying race. Recorded payouts are quoted
    /// per 100 and scaled to this amount.
    #[serde(default = "default_stake")]
    pub stake: Decimal,
    /// Payout table key of the single-winner bet.
    #[serde(default = "default_win_bet_label")]
    pub win_bet_label: String,
}

fn default_stake() -> Decimal {
    Decimal::new(100, 0)
}

fn default_win_bet_label() -> String {
    "win".to_string()
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            stake: default_stake(),
            win_bet_label: default_win_bet_label(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, `paddock.toml` and the environment.
    #[allow(clippy::result_large_err)]
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(config::File::with_name("paddock").required(false))
            .add_source(
                config::Environment::with_prefix("PADDOCK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the runner cannot work with.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            return Err(Error::Config {
                message: "database.url must not be empty".to_string(),
            });
        }
        if self.backtest.stake <= Decimal::ZERO {
            return Err(Error::Config {
                message: format!("backtest.stake must be positive, got {}", self.backtest.stake),
            });
        }
        if self.backtest.win_bet_label.is_empty() {
            return Err(Error::Config {
                message: "backtest.win_bet_label must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Configuration for tests: in-memory database, default settlement.
    pub fn test_config() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            backtest: BacktestConfig::default(),
        }
    }
}
