//! Date bucketing and the rollup engine.
//!
//! Settled bets are tagged with a bucket key derived from the race date and
//! summed per bucket. Ratios are computed once from the summed totals, never
//! averaged across records.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key of the single all-time bucket.
pub const ALL_BUCKET: &str = "ALL";

fn prefix(date: &str, len: usize) -> &str {
    match date.char_indices().nth(len) {
        Some((idx, _)) => &date[..idx],
        None => date,
    }
}

/// `YYYYMMDD` -> `YYYYMM`.
pub fn month_key(date: &str) -> String {
    prefix(date, 6).to_string()
}

/// `YYYYMMDD` -> `YYYY`.
pub fn year_key(date: &str) -> String {
    prefix(date, 4).to_string()
}

/// `YYYYMMDD` -> `YYYYQn`. An unreadable month yields quarter 0.
pub fn season_key(date: &str) -> String {
    let month: i32 = date
        .get(4..6)
        .and_then(|m| m.parse().ok())
        .unwrap_or(0);
    let quarter = (month - 1).div_euclid(3) + 1;
    format!("{}Q{}", prefix(date, 4), quarter)
}

pub fn all_key(_date: &str) -> String {
    ALL_BUCKET.to_string()
}

/// Aggregation granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    All,
    Month,
    Season,
    Year,
}

impl Granularity {
    pub const EVERY: [Granularity; 4] = [
        Granularity::All,
        Granularity::Month,
        Granularity::Season,
        Granularity::Year,
    ];

    /// Bucket key of `date` at this granularity.
    pub fn key(&self, date: &str) -> String {
        match self {
            Granularity::All => all_key(date),
            Granularity::Month => month_key(date),
            Granularity::Season => season_key(date),
            Granularity::Year => year_key(date),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Granularity::All => "overall",
            Granularity::Month => "monthly",
            Granularity::Season => "seasonal",
            Granularity::Year => "yearly",
        }
    }
}

/// One record fed into a rollup.
#[derive(Debug, Clone, PartialEq)]
pub struct RollupInput {
    pub bucket: String,
    pub target: u64,
    pub win: u64,
    pub stake: Decimal,
    pub payout: Decimal,
}

/// Summed totals and derived ratios of one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub bucket: String,
    /// Races considered.
    pub target: u64,
    pub win: u64,
    pub hit_rate: f64,
    /// Total stake.
    pub buy: Decimal,
    /// Total payout.
    pub pay: Decimal,
    pub roi: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Totals {
    target: u64,
    win: u64,
    stake: Decimal,
    payout: Decimal,
}

impl Totals {
    fn absorb(&mut self, other: &Totals) {
        self.target += other.target;
        self.win += other.win;
        self.stake += other.stake;
        self.payout += other.payout;
    }
}

/// Incremental per-bucket accumulator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rollup {
    buckets: BTreeMap<String, Totals>,
}

impl Rollup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, input: RollupInput) {
        let totals = Totals {
            target: input.target,
            win: input.win,
            stake: input.stake,
            payout: input.payout,
        };
        self.buckets.entry(input.bucket).or_default().absorb(&totals);
    }

    /// Fold another accumulator into this one.
    pub fn merge(&mut self, other: Rollup) {
        for (bucket, totals) in other.buckets {
            self.buckets.entry(bucket).or_default().absorb(&totals);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// One row per bucket, in byte-wise key order.
    pub fn finish(self) -> Vec<MetricRow> {
        self.buckets
            .into_iter()
            .map(|(bucket, t)| MetricRow {
                bucket,
                target: t.target,
                win: t.win,
                hit_rate: if t.target > 0 {
                    t.win as f64 / t.target as f64
                } else {
                    0.0
                },
                buy: t.stake,
                pay: t.payout,
                roi: if t.stake.is_zero() {
                    0.0
                } else {
                    (t.payout / t.stake).to_f64().unwrap_or(0.0)
                },
            })
            .collect()
    }
}

impl Extend<RollupInput> for Rollup {
    fn extend<I: IntoIterator<Item = RollupInput>>(&mut self, iter: I) {
        for input in iter {
            self.add(input);
        }
    }
}

impl FromIterator<RollupInput> for Rollup {
    fn from_iter<I: IntoIterator<Item = RollupInput>>(iter: I) -> Self {
        let mut rollup = Rollup::new();
        rollup.extend(iter);
        rollup
    }
}

/// Group `records` by bucket and emit one sorted row per bucket.
pub fn rollup(records: impl IntoIterator<Item = RollupInput>) -> Vec<MetricRow> {
    records.into_iter().collect::<Rollup>().finish()
}
