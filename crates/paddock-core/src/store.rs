//! Storage seams consumed by the backtest engine and the preset book.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::types::{Entry, Preset, Race, RaceResult, RecordBatch};
use crate::Result;

/// Read access to races, their fields and their results.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Races with `from <= date <= to`, ordered by date then race id.
    async fn races_between(&self, from: &str, to: &str) -> Result<Vec<Race>>;

    /// A single race by id.
    async fn race(&self, race_id: &str) -> Result<Option<Race>>;

    /// Every entry of a race, in load order.
    async fn entries_for(&self, race_id: &str) -> Result<Vec<Entry>>;

    /// The settled result of a race, if any.
    async fn result_for(&self, race_id: &str) -> Result<Option<RaceResult>>;

    /// Number of stored races.
    async fn count_races(&self) -> Result<u64>;
}

/// Keyed storage for presets.
#[async_trait]
pub trait PresetStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Preset>>;

    /// Insert or overwrite by id.
    async fn put(&self, preset: &Preset) -> Result<()>;

    /// Returns whether a preset was removed.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// All presets ordered by id.
    async fn list(&self) -> Result<Vec<Preset>>;
}

#[derive(Default)]
struct Records {
    races: HashMap<String, Race>,
    entries: HashMap<String, Vec<Entry>>,
    results: HashMap<String, RaceResult>,
}

/// In-memory store for tests and ephemeral runs.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<Records>>,
    presets: Arc<RwLock<HashMap<String, Preset>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store preloaded with `batch`.
    pub async fn with_batch(batch: &RecordBatch) -> Self {
        let store = Self::new();
        store.import(batch).await;
        store
    }

    /// Load races, entries and results. Existing keys are overwritten.
    pub async fn import(&self, batch: &RecordBatch) {
        self.insert_races(batch.races.iter().cloned()).await;
        self.insert_entries(batch.entries.iter().cloned()).await;
        self.insert_results(batch.results.iter().cloned()).await;
    }

    pub async fn insert_races(&self, races: impl IntoIterator<Item = Race>) {
        let mut records = self.records.write().await;
        for race in races {
            records.races.insert(race.race_id.clone(), race);
        }
    }

    /// Entries are keyed by race id + horse id; a repeated key replaces the old entry in place.
    pub async fn insert_entries(&self, entries: impl IntoIterator<Item = Entry>) {
        let mut records = self.records.write().await;
        for entry in entries {
            let field = records.entries.entry(entry.race_id.clone()).or_default();
            match field.iter_mut().find(|e| e.horse_id == entry.horse_id) {
                Some(existing) => *existing = entry,
                None => field.push(entry),
            }
        }
    }

    pub async fn insert_results(&self, results: impl IntoIterator<Item = RaceResult>) {
        let mut records = self.records.write().await;
        for result in results {
            records.results.insert(result.race_id.clone(), result);
        }
    }

    /// Drop all races, entries and results. Presets are kept.
    pub async fn clear(&self) {
        *self.records.write().await = Records::default();
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn races_between(&self, from: &str, to: &str) -> Result<Vec<Race>> {
        let records = self.records.read().await;
        let mut races: Vec<Race> = records
            .races
            .values()
            .filter(|r| r.date.as_str() >= from && r.date.as_str() <= to)
            .cloned()
            .collect();
        races.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.race_id.cmp(&b.race_id)));
        Ok(races)
    }

    async fn race(&self, race_id: &str) -> Result<Option<Race>> {
        Ok(self.records.read().await.races.get(race_id).cloned())
    }

    async fn entries_for(&self, race_id: &str) -> Result<Vec<Entry>> {
        Ok(self
            .records
            .read()
            .await
            .entries
            .get(race_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn result_for(&self, race_id: &str) -> Result<Option<RaceResult>> {
        Ok(self.records.read().await.results.get(race_id).cloned())
    }

    async fn count_races(&self) -> Result<u64> {
        Ok(self.records.read().await.races.len() as u64)
    }
}

#[async_trait]
impl PresetStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<Preset>> {
        Ok(self.presets.read().await.get(id).cloned())
    }

    async fn put(&self, preset: &Preset) -> Result<()> {
        self.presets
            .write()
            .await
            .insert(preset.id.clone(), preset.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.presets.write().await.remove(id).is_some())
    }

    async fn list(&self) -> Result<Vec<Preset>> {
        let mut presets: Vec<Preset> = self.presets.read().await.values().cloned().collect();
        presets.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(presets)
    }
}
