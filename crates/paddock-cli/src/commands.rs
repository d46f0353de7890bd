//! Command handlers.

use anyhow::{anyhow, bail, Context, Result};
use backtester::{
    predict, this_weekend, BacktestRunner, DateRange, PresetBook, RunnerConfig, Strategy,
    StrategyRegistry,
};
use paddock_core::config::Config;
use paddock_core::db::SqliteStore;
use paddock_core::store::RecordStore;
use paddock_core::types::{default_params, ParamSet, Preset, Slot, ACTIVE, SLOT_A, SLOT_B};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::cli::{Commands, PresetCommand};
use crate::output;

/// Parse `key=value` overrides against a strategy's schema.
pub fn parse_params(strategy: &dyn Strategy, raw: &[String]) -> Result<ParamSet> {
    let schema = strategy.schema();
    let mut params = ParamSet::new();

    for item in raw {
        let (key, value) = item
            .split_once('=')
            .ok_or_else(|| anyhow!("Parameter {:?} is not of the form KEY=VALUE", item))?;
        let key = key.trim();
        let spec = schema.iter().find(|s| s.key == key).ok_or_else(|| {
            let known: Vec<&str> = schema.iter().map(|s| s.key.as_str()).collect();
            anyhow!(
                "Strategy {} has no parameter {:?} (known: {})",
                strategy.id(),
                key,
                known.join(", ")
            )
        })?;
        params.insert(spec.key.clone(), spec.parse(value)?);
    }

    Ok(params)
}

fn check_date(label: &str, date: &str) -> Result<()> {
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        bail!("--{} must be a YYYYMMDD date, got {:?}", label, date);
    }
    Ok(())
}

fn date_range(from: &str, to: &str) -> Result<DateRange> {
    check_date("from", from)?;
    check_date("to", to)?;
    Ok(DateRange::new(from, to))
}

/// Wired-up services for one invocation.
pub struct App {
    store: Arc<SqliteStore>,
    registry: Arc<StrategyRegistry>,
    runner: BacktestRunner,
    presets: PresetBook,
    json: bool,
}

impl App {
    pub async fn connect(config: &Config, json: bool) -> Result<Self> {
        let store = Arc::new(
            SqliteStore::connect(&config.database)
                .await
                .with_context(|| format!("Failed to open database {}", config.database.url))?,
        );
        let registry = Arc::new(StrategyRegistry::with_defaults());

        let runner = BacktestRunner::new(
            store.clone(),
            registry.clone(),
            RunnerConfig::from(&config.backtest),
        );
        let presets = PresetBook::new(store.clone(), registry.clone());

        Ok(Self {
            store,
            registry,
            runner,
            presets,
            json,
        })
    }

    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Backtest {
                from,
                to,
                strategy,
                preset,
                params,
            } => self.backtest(&from, &to, strategy, preset, &params).await,
            Commands::Compare { from, to } => self.compare(&from, &to).await,
            Commands::Predict { from, to } => self.predict(from.zip(to)).await,
            Commands::Preset { command } => self.preset(command).await,
            Commands::Strategies => {
                self.emit(self.registry.list().as_slice(), output::strategies_table)
            }
            Commands::Seed { reset } => self.seed(reset).await,
        }
    }

    fn emit<T: Serialize + ?Sized>(&self, value: &T, render: impl Fn(&T) -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            print!("{}", render(value));
        }
        Ok(())
    }

    fn strategy_or_default(&self, id: Option<String>) -> Result<Arc<dyn Strategy>> {
        let id = match id {
            Some(id) => id,
            None => self
                .registry
                .default_id()
                .ok_or_else(|| anyhow!("No strategies registered"))?
                .to_string(),
        };
        Ok(self.registry.resolve(&id)?)
    }

    async fn backtest(
        &self,
        from: &str,
        to: &str,
        strategy: Option<String>,
        preset: Option<String>,
        params: &[String],
    ) -> Result<()> {
        let range = date_range(from, to)?;

        let preset = match preset {
            Some(id) => {
                if !params.is_empty() {
                    bail!("--param cannot be combined with --preset");
                }
                self.presets.require(&id).await?
            }
            None => {
                let strategy = self.strategy_or_default(strategy)?;
                let params = parse_params(strategy.as_ref(), params)?;
                Preset::new("adhoc", "ad hoc", strategy.id(), params)
            }
        };

        if !self.json {
            println!("{} / {}", preset.strategy_id, preset.params_summary());
        }
        let summary = self.runner.run_preset(&range, &preset).await?;
        self.emit(&summary, output::summary_table)
    }

    async fn compare(&self, from: &str, to: &str) -> Result<()> {
        let range = date_range(from, to)?;
        let (a, b) = self
            .presets
            .comparison_slots()
            .await
            .context("Save both slots with `paddock preset save A|B` first")?;

        if !self.json {
            println!("A: {} / {}", a.strategy_id, a.params_summary());
            println!("B: {} / {}", b.strategy_id, b.params_summary());
        }
        let comparison = self.runner.compare(&range, &a, &b).await?;
        self.emit(&comparison, output::comparison_table)
    }

    async fn predict(&self, range: Option<(String, String)>) -> Result<()> {
        let range = match range {
            Some((from, to)) => date_range(&from, &to)?,
            None => this_weekend(chrono::Local::now().date_naive()),
        };

        let preset = match self.presets.get_active().await? {
            Some(active) => active,
            None => {
                let strategy = self.strategy_or_default(None)?;
                info!(strategy = strategy.id(), "No active preset, using strategy defaults");
                Preset::new(ACTIVE, "defaults", strategy.id(), default_params(&strategy.schema()))
            }
        };

        if !self.json {
            println!(
                "{}..{}  {} / {}",
                range.from,
                range.to,
                preset.strategy_id,
                preset.params_summary()
            );
        }
        let predictions =
            predict(self.store.as_ref(), &self.registry, &range, &preset).await?;
        self.emit(predictions.as_slice(), output::predictions_table)
    }

    async fn preset(&self, command: PresetCommand) -> Result<()> {
        match command {
            PresetCommand::Save {
                id,
                strategy,
                params,
                label,
            } => {
                let strategy = self.strategy_or_default(strategy)?;
                let params = parse_params(strategy.as_ref(), &params)?;

                let saved = match id.as_str() {
                    SLOT_A => self.presets.save_slot(Slot::A, strategy.id(), params).await?,
                    SLOT_B => self.presets.save_slot(Slot::B, strategy.id(), params).await?,
                    ACTIVE => {
                        let preset = Preset::new(ACTIVE, ACTIVE, strategy.id(), params);
                        self.presets.set_active(&preset).await?
                    }
                    _ => {
                        let label = label.unwrap_or_else(|| id.clone());
                        self.presets
                            .upsert(Preset::new(id.as_str(), label, strategy.id(), params))
                            .await?
                    }
                };
                self.emit(std::slice::from_ref(&saved), output::presets_table)
            }
            PresetCommand::Show { id } => {
                let presets = match id {
                    Some(id) => vec![self.presets.require(&id).await?],
                    None => self.presets.list().await?,
                };
                self.emit(presets.as_slice(), output::presets_table)
            }
            PresetCommand::Delete { id } => {
                if !self.presets.delete(&id).await? {
                    bail!("Preset {} does not exist", id);
                }
                Ok(())
            }
            PresetCommand::Activate { id } => {
                let active = self.presets.activate(&id).await?;
                self.emit(std::slice::from_ref(&active), output::presets_table)
            }
        }
    }

    async fn seed(&self, reset: bool) -> Result<()> {
        if reset {
            self.store.clear().await?;
        } else if self.store.count_races().await? > 0 {
            info!("Database already holds races, skipping seed (use --reset to reload)");
            return Ok(());
        }

        let batch = paddock_core::sample::dataset();
        self.store.import(&batch).await?;
        info!(
            races = batch.races.len(),
            entries = batch.entries.len(),
            results = batch.results.len(),
            "Sample dataset loaded"
        );
        Ok(())
    }
}
