//! Integration tests for component interactions.
//!
//! These tests verify that the record stores, the preset book and the
//! backtest runner work together.

use backtester::{
    predict, BacktestError, BacktestRunner, DateRange, Granularity, PresetBook, RunnerConfig,
    StrategyRegistry,
};
use paddock_core::config::Config;
use paddock_core::db::SqliteStore;
use paddock_core::store::RecordStore;
use paddock_core::types::{
    Entry, FlagValue, ParamSet, ParamValue, Preset, Race, RecordBatch, Slot, ACTIVE,
};
use paddock_core::MemoryStore;
use rust_decimal::Decimal;
use std::sync::Arc;

async fn seeded_memory() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_batch(&paddock_core::sample::dataset()).await)
}

async fn sqlite_store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::connect(&Config::test_config().database).await.unwrap())
}

fn registry() -> Arc<StrategyRegistry> {
    Arc::new(StrategyRegistry::with_defaults())
}

fn january() -> DateRange {
    DateRange::new("20240101", "20240131")
}

fn gap(value: f64) -> ParamSet {
    let mut params = ParamSet::new();
    params.insert("minGap".to_string(), ParamValue::Number(value));
    params
}

/// The sample dataset backtested with default parameters.
#[tokio::test]
async fn test_sample_backtest_with_defaults() {
    let store = seeded_memory().await;
    let runner = BacktestRunner::new(store, registry(), RunnerConfig::default());

    let summary = runner
        .run_preset(&january(), &Preset::new("p", "p", "basic-check-avg", ParamSet::new()))
        .await
        .unwrap();

    let mains: Vec<&str> = summary.raw.iter().filter_map(|r| r.main.as_deref()).collect();
    assert_eq!(mains, vec!["Delta", "Hotel"]);

    let total = summary.total().unwrap();
    assert_eq!((total.target, total.win), (2, 2));
    assert_eq!(total.buy, Decimal::new(200, 0));
    assert_eq!(total.pay, Decimal::new(770, 0));
    assert!((total.roi - 3.85).abs() < 1e-9);

    assert_eq!(summary.rows(Granularity::Month).len(), 1);
    assert_eq!(summary.rows(Granularity::Season)[0].bucket, "2024Q1");
}

/// The same run against SQLite gives the same numbers as in memory.
#[tokio::test]
async fn test_sqlite_and_memory_agree() {
    let sqlite = sqlite_store().await;
    sqlite.import(&paddock_core::sample::dataset()).await.unwrap();
    let memory = seeded_memory().await;

    let preset = Preset::new("p", "p", "basic-check-avg", gap(2.0));
    let from_sqlite = BacktestRunner::new(sqlite, registry(), RunnerConfig::default())
        .run_preset(&january(), &preset)
        .await
        .unwrap();
    let from_memory = BacktestRunner::new(memory, registry(), RunnerConfig::default())
        .run_preset(&january(), &preset)
        .await
        .unwrap();

    assert_eq!(from_sqlite, from_memory);
}

/// Re-importing an entry leaves tie-breaks identical in both stores.
#[tokio::test]
async fn test_reimport_keeps_tie_break_order_across_stores() {
    let runner_entry = |id: &str, name: &str| {
        Entry::new("t1", id, name)
            .with_time_index([Some(90.0)])
            .with_flag("checkValues", FlagValue::Numbers(vec![95.0]))
    };
    let initial = RecordBatch {
        races: vec![Race::new("t1", "20240110")],
        entries: vec![runner_entry("h1", "First"), runner_entry("h2", "Second")],
        results: vec![],
    };
    let update = RecordBatch {
        races: vec![Race::new("t1", "20240110")],
        entries: vec![runner_entry("h1", "First")],
        results: vec![],
    };

    let sqlite = sqlite_store().await;
    sqlite.import(&initial).await.unwrap();
    sqlite.import(&update).await.unwrap();
    let memory = Arc::new(MemoryStore::with_batch(&initial).await);
    memory.import(&update).await;

    let order = |entries: Vec<Entry>| -> Vec<String> {
        entries.into_iter().map(|e| e.horse_name).collect()
    };
    assert_eq!(
        order(sqlite.entries_for("t1").await.unwrap()),
        order(memory.entries_for("t1").await.unwrap())
    );

    let preset = Preset::new("p", "p", "basic-check-avg", ParamSet::new());
    let from_sqlite = BacktestRunner::new(sqlite, registry(), RunnerConfig::default())
        .run_preset(&january(), &preset)
        .await
        .unwrap();
    let from_memory = BacktestRunner::new(memory, registry(), RunnerConfig::default())
        .run_preset(&january(), &preset)
        .await
        .unwrap();
    assert_eq!(from_sqlite.raw[0].main.as_deref(), Some("First"));
    assert_eq!(from_sqlite, from_memory);
}

/// Slots saved through the preset book drive an A/B comparison.
#[tokio::test]
async fn test_compare_saved_slots() {
    let store = seeded_memory().await;
    let registry = registry();
    let book = PresetBook::new(store.clone(), registry.clone());
    let runner = BacktestRunner::new(store, registry, RunnerConfig::default());

    book.save_slot(Slot::A, "basic-check-avg", gap(0.0)).await.unwrap();
    // Race 1 is decided by half a point, so a 1.0 gap passes on it
    book.save_slot(Slot::B, "basic-check-avg", gap(1.0)).await.unwrap();

    let (a, b) = book.comparison_slots().await.unwrap();
    let comparison = runner.compare(&january(), &a, &b).await.unwrap();

    assert_eq!(comparison.a.raw.len(), 2);
    assert_eq!(comparison.b.raw.len(), 1);
    assert_eq!(comparison.b.raw[0].main.as_deref(), Some("Hotel"));
    assert_eq!(comparison.b.total().unwrap().pay, Decimal::new(420, 0));
}

/// A comparison with a preset naming an unknown strategy fails outright.
#[tokio::test]
async fn test_compare_with_unknown_strategy() {
    let runner = BacktestRunner::new(seeded_memory().await, registry(), RunnerConfig::default());

    let result = runner
        .compare(
            &january(),
            &Preset::new("A", "A", "basic-check-avg", ParamSet::new()),
            &Preset::new("B", "B", "retired-strategy", ParamSet::new()),
        )
        .await;

    assert!(matches!(result, Err(BacktestError::UnknownStrategy(id)) if id == "retired-strategy"));
}

/// The active preset persists in SQLite and drives predictions.
#[tokio::test]
async fn test_active_preset_drives_predictions() {
    let store = sqlite_store().await;
    store.import(&paddock_core::sample::dataset()).await.unwrap();
    let registry = registry();
    let book = PresetBook::new(store.clone(), registry.clone());

    book.upsert(Preset::new("tight", "Tight", "basic-check-avg", gap(1.0)))
        .await
        .unwrap();
    let active = book.activate("tight").await.unwrap();
    assert_eq!(book.get_active().await.unwrap().map(|p| p.id), Some(ACTIVE.to_string()));

    let picks = predict(store.as_ref(), &registry, &january(), &active).await.unwrap();
    assert_eq!(picks.len(), 1);
    assert_eq!(picks[0].race_id, "202401020201");
    assert_eq!(picks[0].main, "Hotel");
    assert_eq!(picks[0].rivals, vec!["Foxtrot", "Echo", "Gamma"]);

    assert_eq!(store.count_races().await.unwrap(), 2);
}

/// Stake and payout label come from configuration; payouts scale with the stake.
#[tokio::test]
async fn test_runner_settings_from_config() {
    let mut config = Config::test_config();
    config.backtest.stake = Decimal::new(200, 0);
    let preset = Preset::new("p", "p", "basic-check-avg", ParamSet::new());

    let doubled = BacktestRunner::new(
        seeded_memory().await,
        registry(),
        RunnerConfig::from(&config.backtest),
    )
    .run_preset(&january(), &preset)
    .await
    .unwrap();
    let total = doubled.total().unwrap();
    assert_eq!(total.buy, Decimal::new(400, 0));
    assert_eq!(total.pay, Decimal::new(1540, 0));
    assert!((total.roi - 3.85).abs() < 1e-9);

    config.backtest.win_bet_label = "quinella".to_string();
    let quinella = BacktestRunner::new(
        seeded_memory().await,
        registry(),
        RunnerConfig::from(&config.backtest),
    )
    .run_preset(&january(), &preset)
    .await
    .unwrap();
    let total = quinella.total().unwrap();
    assert_eq!(total.buy, Decimal::new(400, 0));
    assert_eq!(total.pay, Decimal::new(4440, 0));
}
