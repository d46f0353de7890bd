//! Text rendering of results.

use backtester::{Comparison, Granularity, MetricRow, Prediction, StrategyInfo, Summary};
use paddock_core::types::{ParamKind, Preset};
use std::collections::BTreeSet;
use std::fmt::Write;

fn pct(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

fn metric_line(out: &mut String, row: &MetricRow) {
    let _ = writeln!(
        out,
        "{:<10} {:>7} {:>5} {:>7} {:>12} {:>12} {:>8}",
        row.bucket,
        row.target,
        row.win,
        pct(row.hit_rate),
        row.buy,
        row.pay,
        pct(row.roi)
    );
}

/// One table per granularity.
pub fn summary_table(summary: &Summary) -> String {
    let mut out = String::new();
    if summary.is_empty() {
        out.push_str("No qualifying races in range\n");
        return out;
    }

    for granularity in Granularity::EVERY {
        let _ = writeln!(out, "[{}]", granularity.name());
        let _ = writeln!(
            out,
            "{:<10} {:>7} {:>5} {:>7} {:>12} {:>12} {:>8}",
            "bucket", "races", "wins", "hit", "buy", "pay", "roi"
        );
        for row in summary.rows(granularity) {
            metric_line(&mut out, row);
        }
        out.push('\n');
    }
    out
}

/// A and B side by side, bucket by bucket.
pub fn comparison_table(comparison: &Comparison) -> String {
    let mut out = String::new();

    for granularity in Granularity::EVERY {
        let a = comparison.a.rows(granularity);
        let b = comparison.b.rows(granularity);
        let buckets: BTreeSet<&str> = a.iter().chain(b).map(|r| r.bucket.as_str()).collect();
        if buckets.is_empty() {
            continue;
        }

        let _ = writeln!(out, "[{}]", granularity.name());
        let _ = writeln!(
            out,
            "{:<10} | {:>5} {:>7} {:>8} | {:>5} {:>7} {:>8}",
            "bucket", "A n", "A hit", "A roi", "B n", "B hit", "B roi"
        );
        for bucket in buckets {
            let cells = |rows: &[MetricRow]| match rows.iter().find(|r| r.bucket == bucket) {
                Some(r) => format!("{:>5} {:>7} {:>8}", r.target, pct(r.hit_rate), pct(r.roi)),
                None => format!("{:>5} {:>7} {:>8}", "-", "-", "-"),
            };
            let _ = writeln!(out, "{:<10} | {} | {}", bucket, cells(a), cells(b));
        }
        out.push('\n');
    }

    if out.is_empty() {
        out.push_str("No qualifying races in range for either preset\n");
    }
    out
}

pub fn predictions_table(predictions: &[Prediction]) -> String {
    let mut out = String::new();
    if predictions.is_empty() {
        out.push_str("No picks\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<9} {:<14} {:<16} {:<20} rivals",
        "date", "race", "venue", "main"
    );
    for p in predictions {
        let _ = writeln!(
            out,
            "{:<9} {:<14} {:<16} {:<20} {}",
            p.date,
            p.race_id,
            p.venue.as_deref().unwrap_or("-"),
            p.main,
            p.rivals.join(", ")
        );
    }
    out
}

pub fn presets_table(presets: &[Preset]) -> String {
    let mut out = String::new();
    if presets.is_empty() {
        out.push_str("No presets saved\n");
        return out;
    }

    for preset in presets {
        let saved = preset
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<10} {:<12} {:<18} {:<16} {}",
            preset.id,
            preset.label,
            preset.strategy_id,
            saved,
            preset.params_summary()
        );
    }
    out
}

pub fn strategies_table(strategies: &[StrategyInfo]) -> String {
    let mut out = String::new();

    for info in strategies {
        let _ = writeln!(out, "{} ({}) v{}", info.id, info.label, info.version);
        for spec in &info.params {
            let shape = match &spec.kind {
                ParamKind::Number { min: Some(lo), max: Some(hi), step } => match step {
                    Some(step) => format!("number {}..{} step {}", lo, hi, step),
                    None => format!("number {}..{}", lo, hi),
                },
                ParamKind::Number { .. } => "number".to_string(),
                ParamKind::Select { options } => {
                    let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
                    format!("one of {}", values.join("|"))
                }
                ParamKind::Switch => "on/off".to_string(),
            };
            let _ = writeln!(
                out,
                "  {:<10} {:<30} {:<24} default {}",
                spec.key, spec.label, shape, spec.default
            );
        }
    }
    out
}
