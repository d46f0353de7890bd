//! The strategy contract and the registry strategies are resolved from.

mod check_average;
mod registry;

pub use check_average::CheckAverageStrategy;
pub use registry::StrategyRegistry;

use paddock_core::types::{Entry, ParamSpec, ResolvedParams};
use serde::Serialize;

/// What a strategy decided for one race.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "lowercase")]
pub enum Verdict {
    /// No actionable pick; the race is left out of settlement and every rollup.
    Pass,
    /// A main selection plus rivals, highest confidence first. `rivals` never contains `main`.
    Pick { main: String, rivals: Vec<String> },
}

impl Verdict {
    /// Whether the race qualified for a bet.
    pub fn is_filtered(&self) -> bool {
        matches!(self, Verdict::Pick { .. })
    }

    pub fn main(&self) -> Option<&str> {
        match self {
            Verdict::Pick { main, .. } => Some(main),
            Verdict::Pass => None,
        }
    }

    pub fn rivals(&self) -> &[String] {
        match self {
            Verdict::Pick { rivals, .. } => rivals,
            Verdict::Pass => &[],
        }
    }
}

/// A pluggable picking rule.
///
/// Implementations are pure: the same field and parameters always give the
/// same verdict.
pub trait Strategy: Send + Sync {
    /// Stable identifier used by presets.
    fn id(&self) -> &'static str;

    /// Human-readable name.
    fn label(&self) -> &'static str;

    fn version(&self) -> &'static str;

    /// Parameter schema, in display order.
    fn schema(&self) -> Vec<ParamSpec>;

    /// Decide the picks for one race. `field` is every entry of the race in
    /// load order; `params` has every schema key present.
    fn evaluate(&self, field: &[Entry], params: &ResolvedParams) -> Verdict;
}

/// Serializable description of a registered strategy.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyInfo {
    pub id: &'static str,
    pub label: &'static str,
    pub version: &'static str,
    pub params: Vec<ParamSpec>,
}

impl StrategyInfo {
    pub fn of(strategy: &dyn Strategy) -> Self {
        Self {
            id: strategy.id(),
            label: strategy.label(),
            version: strategy.version(),
            params: strategy.schema(),
        }
    }
}
