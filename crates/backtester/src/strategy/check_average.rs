//! Reference strategy: rank runners by the mean of their check values.
//!
//! Reads the `checkValues` flag (list of numbers) and the time-index slots of
//! each entry.

use paddock_core::types::{Entry, ParamSpec, ResolvedParams};

use super::{Strategy, Verdict};

/// Flag holding the evaluation list.
pub const CHECK_VALUES: &str = "checkValues";

const MIN_GAP: &str = "minGap";
const RIVALS: &str = "rivals";
const RECENT3: &str = "recent3";
const RATIO_MIN: &str = "ratioMin";

/// Score deducted per failed condition.
const PENALTY: f64 = 3.0;

/// Picks the runner with the best check-value average.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckAverageStrategy;

impl CheckAverageStrategy {
    fn score(entry: &Entry, params: &ResolvedParams) -> f64 {
        let checks = entry.numbers(CHECK_VALUES);
        if checks.is_empty() {
            return f64::NEG_INFINITY;
        }
        let mut score = checks.iter().sum::<f64>() / checks.len() as f64;

        let has_recent = entry.recent_time_index(3).iter().any(Option::is_some);
        if params.switch(RECENT3) && !has_recent {
            score -= PENALTY;
        }

        let present = entry.present_time_index();
        let ratio = if present > 0 {
            checks.len() as f64 / present as f64
        } else {
            0.0
        };
        if ratio < params.number(RATIO_MIN) {
            score -= PENALTY;
        }

        score
    }
}

impl Strategy for CheckAverageStrategy {
    fn id(&self) -> &'static str {
        "basic-check-avg"
    }

    fn label(&self) -> &'static str {
        "Check-average base"
    }

    fn version(&self) -> &'static str {
        "1.0.0"
    }

    fn schema(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::number(MIN_GAP, "Gap between 1st and 2nd", 0.0).bounds(0.0, 20.0, 0.5),
            ParamSpec::number(RIVALS, "Rival count", 4.0).bounds(1.0, 8.0, 1.0),
            ParamSpec::switch(RECENT3, "Require check in last 3 runs", false),
            ParamSpec::number(RATIO_MIN, "Minimum check ratio", 0.0).bounds(0.0, 1.0, 0.05),
        ]
    }

    fn evaluate(&self, field: &[Entry], params: &ResolvedParams) -> Verdict {
        let mut ranked: Vec<(&str, f64)> = field
            .iter()
            .map(|e| (e.horse_name.as_str(), Self::score(e, params)))
            .collect();
        // Stable: equal scores keep load order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let Some(&(main, top)) = ranked.first() else {
            return Verdict::Pass;
        };
        if top == f64::NEG_INFINITY {
            return Verdict::Pass;
        }
        if let Some(&(_, second)) = ranked.get(1) {
            if top - second < params.number(MIN_GAP) {
                return Verdict::Pass;
            }
        }

        let rival_count = params.number(RIVALS).max(0.0) as usize;
        let rivals = ranked
            .iter()
            .filter(|(name, _)| *name != main)
            .take(rival_count)
            .map(|(name, _)| name.to_string())
            .collect();

        Verdict::Pick {
            main: main.to_string(),
            rivals,
        }
    }
}
