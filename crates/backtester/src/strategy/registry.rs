use std::collections::BTreeMap;
use std::sync::Arc;

use super::{CheckAverageStrategy, Strategy, StrategyInfo};
use crate::error::{BacktestError, Result};

/// Lookup table from strategy id to implementation.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: BTreeMap<&'static str, Arc<dyn Strategy>>,
}

impl StrategyRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in strategy.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CheckAverageStrategy));
        registry
    }

    /// Add a strategy, replacing any previous one with the same id.
    pub fn register(&mut self, strategy: Arc<dyn Strategy>) {
        self.strategies.insert(strategy.id(), strategy);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Strategy>> {
        self.strategies.get(id).cloned()
    }

    /// Like [`get`](Self::get), but an unknown id is an error.
    pub fn resolve(&self, id: &str) -> Result<Arc<dyn Strategy>> {
        self.get(id)
            .ok_or_else(|| BacktestError::UnknownStrategy(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.strategies.contains_key(id)
    }

    /// Id of the first strategy in id order, used when nothing is configured.
    pub fn default_id(&self) -> Option<&'static str> {
        self.strategies.keys().next().copied()
    }

    pub fn list(&self) -> Vec<StrategyInfo> {
        self.strategies
            .values()
            .map(|s| StrategyInfo::of(s.as_ref()))
            .collect()
    }
}
