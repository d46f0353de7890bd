//! Backtest and A/B comparison runner.

use paddock_core::config::BacktestConfig;
use paddock_core::store::RecordStore;
use paddock_core::types::{resolve_params, ParamSet, Preset, Race, RaceResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::aggregate::{Granularity, MetricRow, Rollup, RollupInput};
use crate::error::Result;
use crate::strategy::{Strategy, StrategyRegistry, Verdict};

/// Stake that recorded payouts are quoted for.
pub const PAYOUT_BASE_STAKE: Decimal = Decimal::ONE_HUNDRED;

/// Inclusive range of `YYYYMMDD` dates, compared as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: String,
    pub to: String,
}

impl DateRange {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn contains(&self, date: &str) -> bool {
        date >= self.from.as_str() && date <= self.to.as_str()
    }
}

/// Settlement settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Stake placed on every qualifying race. Recorded payouts are quoted
    /// per 100 and scaled to this amount.
    pub stake: Decimal,
    /// Payout table key of the win bet.
    pub win_bet_label: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::from(&BacktestConfig::default())
    }
}

impl From<&BacktestConfig> for RunnerConfig {
    fn from(config: &BacktestConfig) -> Self {
        Self {
            stake: config.stake,
            win_bet_label: config.win_bet_label.clone(),
        }
    }
}

/// One simulated win bet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettledRecord {
    pub date: String,
    pub race_id: String,
    pub main: Option<String>,
    pub hit: bool,
    pub buy: Decimal,
    pub pay: Decimal,
}

impl SettledRecord {
    fn rollup_input(&self, granularity: Granularity) -> RollupInput {
        RollupInput {
            bucket: granularity.key(&self.date),
            target: 1,
            win: u64::from(self.hit),
            stake: self.buy,
            payout: self.pay,
        }
    }
}

/// Bucketed statistics of one backtest run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub overall: Vec<MetricRow>,
    pub monthly: Vec<MetricRow>,
    pub seasonal: Vec<MetricRow>,
    pub yearly: Vec<MetricRow>,
    /// Every settled bet, for drill-down.
    pub raw: Vec<SettledRecord>,
}

impl Summary {
    /// Roll `records` up at every granularity.
    pub fn from_records(records: Vec<SettledRecord>) -> Self {
        let rows = |g: Granularity| -> Vec<MetricRow> {
            records
                .iter()
                .map(|r| r.rollup_input(g))
                .collect::<Rollup>()
                .finish()
        };

        Self {
            overall: rows(Granularity::All),
            monthly: rows(Granularity::Month),
            seasonal: rows(Granularity::Season),
            yearly: rows(Granularity::Year),
            raw: records,
        }
    }

    pub fn rows(&self, granularity: Granularity) -> &[MetricRow] {
        match granularity {
            Granularity::All => &self.overall,
            Granularity::Month => &self.monthly,
            Granularity::Season => &self.seasonal,
            Granularity::Year => &self.yearly,
        }
    }

    /// The single all-time row, absent when nothing was settled.
    pub fn total(&self) -> Option<&MetricRow> {
        self.overall.first()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// Paired summaries of an A/B run over the same range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    #[serde(rename = "A")]
    pub a: Summary,
    #[serde(rename = "B")]
    pub b: Summary,
}

/// Runs strategies against the record store.
pub struct BacktestRunner {
    store: Arc<dyn RecordStore>,
    registry: Arc<StrategyRegistry>,
    config: RunnerConfig,
}

impl BacktestRunner {
    pub fn new(
        store: Arc<dyn RecordStore>,
        registry: Arc<StrategyRegistry>,
        config: RunnerConfig,
    ) -> Self {
        Self {
            store,
            registry,
            config,
        }
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Backtest `strategy` with `params` over `range`.
    ///
    /// Races the strategy passes on contribute nothing. A missing result
    /// settles as a miss.
    pub async fn run(
        &self,
        range: &DateRange,
        strategy: &dyn Strategy,
        params: &ParamSet,
    ) -> Result<Summary> {
        info!(
            strategy = strategy.id(),
            from = %range.from,
            to = %range.to,
            "Starting backtest"
        );

        let params = resolve_params(&strategy.schema(), params);
        let races = self.store.races_between(&range.from, &range.to).await?;
        let mut records = Vec::new();

        for race in &races {
            let field = self.store.entries_for(&race.race_id).await?;
            let main = match strategy.evaluate(&field, &params) {
                Verdict::Pick { main, .. } => main,
                Verdict::Pass => {
                    debug!(race = %race.race_id, "No pick, race skipped");
                    continue;
                }
            };

            let result = self.store.result_for(&race.race_id).await?;
            let record = self.settle(race, main, result.as_ref());
            debug!(
                race = %record.race_id,
                main = ?record.main,
                hit = record.hit,
                pay = %record.pay,
                "Race settled"
            );
            records.push(record);
        }

        let summary = Summary::from_records(records);

        info!(
            strategy = strategy.id(),
            races = races.len(),
            bets = summary.raw.len(),
            hit_rate = summary.total().map(|r| r.hit_rate).unwrap_or(0.0),
            roi = summary.total().map(|r| r.roi).unwrap_or(0.0),
            "Backtest completed"
        );

        Ok(summary)
    }

    /// Backtest a saved preset, resolving its strategy first.
    pub async fn run_preset(&self, range: &DateRange, preset: &Preset) -> Result<Summary> {
        let strategy = self.registry.resolve(&preset.strategy_id)?;
        self.run(range, strategy.as_ref(), &preset.params).await
    }

    /// Run two presets over the same range concurrently.
    ///
    /// Both strategy ids are resolved before any data is read. If either run
    /// fails the whole comparison fails.
    pub async fn compare(&self, range: &DateRange, a: &Preset, b: &Preset) -> Result<Comparison> {
        let strategy_a = self.registry.resolve(&a.strategy_id)?;
        let strategy_b = self.registry.resolve(&b.strategy_id)?;

        let (a, b) = tokio::try_join!(
            self.run(range, strategy_a.as_ref(), &a.params),
            self.run(range, strategy_b.as_ref(), &b.params),
        )?;

        Ok(Comparison { a, b })
    }

    fn settle(&self, race: &Race, main: String, result: Option<&RaceResult>) -> SettledRecord {
        let hit = result.and_then(RaceResult::winner) == Some(main.as_str());
        let pay = if hit {
            result
                .and_then(|r| r.payout(&self.config.win_bet_label))
                .map(|quoted| quoted * self.config.stake / PAYOUT_BASE_STAKE)
                .unwrap_or_else(|| {
                    warn!(
                        race = %race.race_id,
                        bet_type = %self.config.win_bet_label,
                        "Hit without a recorded payout, settling at zero"
                    );
                    Decimal::ZERO
                })
        } else {
            Decimal::ZERO
        };

        SettledRecord {
            date: race.date.clone(),
            race_id: race.race_id.clone(),
            main: Some(main),
            hit,
            buy: self.config.stake,
            pay,
        }
    }
}
