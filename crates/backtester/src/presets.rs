//! Preset book: named strategy configurations, the A/B comparison slots
//! and the active configuration used for live predictions.

use chrono::Utc;
use paddock_core::store::PresetStore;
use paddock_core::types::{ParamSet, Preset, Slot, ACTIVE};
use std::sync::Arc;
use tracing::info;

use crate::error::{BacktestError, Result};
use crate::strategy::StrategyRegistry;

pub struct PresetBook {
    store: Arc<dyn PresetStore>,
    registry: Arc<StrategyRegistry>,
}

impl PresetBook {
    pub fn new(store: Arc<dyn PresetStore>, registry: Arc<StrategyRegistry>) -> Self {
        Self { store, registry }
    }

    /// Save `preset`, stamping `created_at` when it is unset.
    ///
    /// Presets naming an unregistered strategy are rejected.
    pub async fn upsert(&self, mut preset: Preset) -> Result<Preset> {
        self.registry.resolve(&preset.strategy_id)?;
        preset.created_at.get_or_insert_with(Utc::now);
        self.store.put(&preset).await?;

        info!(id = %preset.id, strategy = %preset.strategy_id, "Preset saved");
        Ok(preset)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Preset>> {
        Ok(self.store.get(id).await?)
    }

    /// Like [`get`](Self::get), but a missing preset is an error.
    pub async fn require(&self, id: &str) -> Result<Preset> {
        self.get(id)
            .await?
            .ok_or_else(|| BacktestError::PresetNotFound(id.to_string()))
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let removed = self.store.delete(id).await?;
        if removed {
            info!(id, "Preset deleted");
        }
        Ok(removed)
    }

    pub async fn list(&self) -> Result<Vec<Preset>> {
        Ok(self.store.list().await?)
    }

    /// Overwrite a comparison slot with a fresh preset.
    pub async fn save_slot(
        &self,
        slot: Slot,
        strategy_id: &str,
        params: ParamSet,
    ) -> Result<Preset> {
        self.upsert(Preset::new(slot.id(), slot.label(), strategy_id, params))
            .await
    }

    /// Adopt a copy of `preset` as the active configuration.
    pub async fn set_active(&self, preset: &Preset) -> Result<Preset> {
        let mut active = Preset::new(ACTIVE, ACTIVE, &preset.strategy_id, preset.params.clone());
        active.created_at = Some(Utc::now());
        self.upsert(active).await
    }

    /// Adopt the stored preset `id` as the active configuration.
    pub async fn activate(&self, id: &str) -> Result<Preset> {
        let preset = self.require(id).await?;
        self.set_active(&preset).await
    }

    pub async fn get_active(&self) -> Result<Option<Preset>> {
        self.get(ACTIVE).await
    }

    /// Both comparison slots; either being unset is an error.
    pub async fn comparison_slots(&self) -> Result<(Preset, Preset)> {
        let a = self.require(Slot::A.id()).await?;
        let b = self.require(Slot::B.id()).await?;
        Ok((a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paddock_core::types::ParamValue;
    use paddock_core::MemoryStore;

    fn book() -> PresetBook {
        PresetBook::new(
            Arc::new(MemoryStore::new()),
            Arc::new(StrategyRegistry::with_defaults()),
        )
    }

    fn gap(value: f64) -> ParamSet {
        let mut params = ParamSet::new();
        params.insert("minGap".into(), ParamValue::Number(value));
        params
    }

    #[tokio::test]
    async fn test_upsert_stamps_created_at_once() {
        let book = book();
        let saved = book
            .upsert(Preset::new("mine", "Mine", "basic-check-avg", gap(1.0)))
            .await
            .unwrap();
        let stamp = saved.created_at.unwrap();

        let again = book.upsert(saved.clone()).await.unwrap();
        assert_eq!(again.created_at, Some(stamp));
        assert_eq!(book.get("mine").await.unwrap(), Some(again));
    }

    #[tokio::test]
    async fn test_upsert_rejects_unknown_strategy() {
        let book = book();
        let err = book
            .upsert(Preset::new("x", "X", "no-such-strategy", ParamSet::new()))
            .await
            .unwrap_err();

        assert!(matches!(err, BacktestError::UnknownStrategy(_)));
        assert!(book.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_comparison_slots_require_both() {
        let book = book();
        book.save_slot(Slot::A, "basic-check-avg", gap(0.0)).await.unwrap();

        match book.comparison_slots().await {
            Err(BacktestError::PresetNotFound(id)) => assert_eq!(id, "B"),
            other => panic!("expected PresetNotFound, got {:?}", other),
        }

        book.save_slot(Slot::B, "basic-check-avg", gap(2.0)).await.unwrap();
        let (a, b) = book.comparison_slots().await.unwrap();
        assert_eq!(a.label, "Preset A");
        assert_eq!(b.params, gap(2.0));
    }

    #[tokio::test]
    async fn test_activate_copies_under_reserved_id() {
        let book = book();
        book.save_slot(Slot::B, "basic-check-avg", gap(3.5)).await.unwrap();

        let active = book.activate("B").await.unwrap();
        assert_eq!(active.id, ACTIVE);
        assert_eq!(active.label, ACTIVE);
        assert_eq!(active.params, gap(3.5));

        // The source slot is left untouched
        assert!(book.get("B").await.unwrap().is_some());
        assert_eq!(book.get_active().await.unwrap(), Some(active));
    }

    #[tokio::test]
    async fn test_activate_unknown_preset() {
        let result = book().activate("missing").await;
        assert!(matches!(result, Err(BacktestError::PresetNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let book = book();
        book.save_slot(Slot::A, "basic-check-avg", ParamSet::new()).await.unwrap();

        assert!(book.delete("A").await.unwrap());
        assert!(!book.delete("A").await.unwrap());
    }
}
