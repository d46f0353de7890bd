//! Throughput benchmarks for rollups and full backtests.
//!
//! Run with: `cargo bench --bench throughput`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use rust_decimal::Decimal;
use std::sync::Arc;

use backtester::{
    BacktestRunner, DateRange, Granularity, Rollup, RollupInput, RunnerConfig, StrategyRegistry,
};
use paddock_core::types::{Entry, FlagValue, ParamSet, Preset, Race, RaceResult, RecordBatch};
use paddock_core::MemoryStore;

/// Random YYYYMMDD date within 2020..2024.
fn random_date(rng: &mut impl Rng) -> String {
    format!(
        "{}{:02}{:02}",
        rng.gen_range(2020..2025),
        rng.gen_range(1..13),
        rng.gen_range(1..29)
    )
}

/// Generate settled inputs bucketed by month.
fn generate_inputs(count: usize) -> Vec<RollupInput> {
    let mut rng = rand::thread_rng();

    (0..count)
        .map(|_| {
            let hit = rng.gen_bool(0.25);
            RollupInput {
                bucket: Granularity::Month.key(&random_date(&mut rng)),
                target: 1,
                win: u64::from(hit),
                stake: Decimal::new(100, 0),
                payout: if hit {
                    Decimal::new(rng.gen_range(110..3000), 0)
                } else {
                    Decimal::ZERO
                },
            }
        })
        .collect()
}

/// Generate races with full fields and results.
fn generate_batch(races: usize, field_size: usize) -> RecordBatch {
    let mut rng = rand::thread_rng();
    let mut batch = RecordBatch::default();

    for i in 0..races {
        let race_id = format!("race_{:06}", i);
        batch.races.push(Race::new(race_id.clone(), random_date(&mut rng)));

        let mut names = Vec::with_capacity(field_size);
        for h in 0..field_size {
            let name = format!("horse_{}_{}", i, h);
            let checks: Vec<f64> = (0..rng.gen_range(0..5))
                .map(|_| rng.gen_range(60.0..110.0))
                .collect();
            let readings: Vec<Option<f64>> = (0..5)
                .map(|_| rng.gen_bool(0.8).then(|| rng.gen_range(60.0..110.0)))
                .collect();
            batch.entries.push(
                Entry::new(race_id.clone(), format!("h{}", h), name.clone())
                    .with_time_index(readings)
                    .with_flag("checkValues", FlagValue::Numbers(checks)),
            );
            names.push(name);
        }

        let winner = names[rng.gen_range(0..field_size)].clone();
        batch.results.push(
            RaceResult::new(race_id, vec![winner])
                .with_payout("win", Decimal::new(rng.gen_range(110..5000), 0)),
        );
    }

    batch
}

/// Benchmark rolling up settled bets.
fn bench_rollup(c: &mut Criterion) {
    let mut group = c.benchmark_group("rollup");

    for count in [100, 1_000, 10_000, 100_000].iter() {
        let inputs = generate_inputs(*count);

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("monthly", count), &inputs, |b, inputs| {
            b.iter(|| {
                let rollup: Rollup = inputs.iter().cloned().collect();
                black_box(rollup.finish())
            });
        });
    }

    group.finish();
}

/// Benchmark a full backtest over an in-memory store.
fn bench_backtest(c: &mut Criterion) {
    let mut group = c.benchmark_group("backtest");
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    let preset = Preset::new("bench", "bench", "basic-check-avg", ParamSet::new());
    let range = DateRange::new("20200101", "20241231");

    for races in [100, 1_000, 5_000].iter() {
        let store = rt.block_on(MemoryStore::with_batch(&generate_batch(*races, 16)));
        let runner = BacktestRunner::new(
            Arc::new(store),
            Arc::new(StrategyRegistry::with_defaults()),
            RunnerConfig::default(),
        );

        group.throughput(Throughput::Elements(*races as u64));
        group.bench_with_input(BenchmarkId::new("check_average", races), &runner, |b, runner| {
            b.iter(|| black_box(rt.block_on(runner.run_preset(&range, &preset)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rollup, bench_backtest);
criterion_main!(benches);
