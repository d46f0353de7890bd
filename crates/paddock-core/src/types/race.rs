//! Race, entry and result records as held by the record store.

use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Number of time-index readings kept per entry (most recent last).
pub const TIME_INDEX_SLOTS: usize = 5;

/// Track surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Turf,
    Dirt,
    Jump,
}

impl Surface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::Turf => "turf",
            Surface::Dirt => "dirt",
            Surface::Jump => "jump",
        }
    }

    /// Parse a stored surface label; unknown labels map to `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "turf" | "芝" => Some(Surface::Turf),
            "dirt" | "ダート" => Some(Surface::Dirt),
            "jump" | "障害" => Some(Surface::Jump),
            _ => None,
        }
    }
}

/// One scheduled race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    pub race_id: String,
    /// Calendar date as `YYYYMMDD`.
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface: Option<Surface>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_label: Option<String>,
}

impl Race {
    pub fn new(race_id: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            race_id: race_id.into(),
            date: date.into(),
            venue: None,
            distance: None,
            surface: None,
            class_label: None,
        }
    }

    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = Some(venue.into());
        self
    }

    pub fn with_course(mut self, distance: u32, surface: Surface) -> Self {
        self.distance = Some(distance);
        self.surface = Some(surface);
        self
    }

    pub fn with_class(mut self, class_label: impl Into<String>) -> Self {
        self.class_label = Some(class_label.into());
        self
    }
}

/// Strategy-specific value attached to an entry.
///
/// Source data is loosely typed, so deserialization never fails: anything
/// that is not a number, a list of numbers or a label becomes `Absent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, from = "serde_json::Value")]
pub enum FlagValue {
    Number(f64),
    Numbers(Vec<f64>),
    Label(String),
    Absent,
}

impl From<serde_json::Value> for FlagValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Number(n) => n.as_f64().map(FlagValue::Number).unwrap_or(FlagValue::Absent),
            Value::String(s) => FlagValue::Label(s),
            // Non-numeric items in a list are dropped rather than failing the entry
            Value::Array(items) => {
                FlagValue::Numbers(items.iter().filter_map(Value::as_f64).collect())
            }
            Value::Null | Value::Bool(_) | Value::Object(_) => FlagValue::Absent,
        }
    }
}

/// One competitor's participation in a race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub race_id: String,
    pub horse_id: String,
    pub horse_name: String,
    /// Up to [`TIME_INDEX_SLOTS`] readings, most recent last.
    #[serde(default)]
    pub time_index: Vec<Option<f64>>,
    #[serde(default)]
    pub flags: BTreeMap<String, FlagValue>,
}

impl Entry {
    pub fn new(
        race_id: impl Into<String>,
        horse_id: impl Into<String>,
        horse_name: impl Into<String>,
    ) -> Self {
        Self {
            race_id: race_id.into(),
            horse_id: horse_id.into(),
            horse_name: horse_name.into(),
            time_index: Vec::new(),
            flags: BTreeMap::new(),
        }
    }

    /// Set the time-index readings, keeping only the most recent slots.
    pub fn with_time_index(mut self, readings: impl IntoIterator<Item = Option<f64>>) -> Self {
        let mut readings: Vec<Option<f64>> = readings.into_iter().collect();
        if readings.len() > TIME_INDEX_SLOTS {
            readings.drain(..readings.len() - TIME_INDEX_SLOTS);
        }
        self.time_index = readings;
        self
    }

    pub fn with_flag(mut self, key: impl Into<String>, value: FlagValue) -> Self {
        self.flags.insert(key.into(), value);
        self
    }

    pub fn flag(&self, key: &str) -> Option<&FlagValue> {
        self.flags.get(key)
    }

    /// Numeric list stored under `key`; empty when absent or not a list.
    pub fn numbers(&self, key: &str) -> &[f64] {
        match self.flags.get(key) {
            Some(FlagValue::Numbers(values)) => values,
            _ => &[],
        }
    }

    /// The last `n` time-index slots.
    pub fn recent_time_index(&self, n: usize) -> &[Option<f64>] {
        let start = self.time_index.len().saturating_sub(n);
        &self.time_index[start..]
    }

    /// Count of time-index slots holding a reading.
    pub fn present_time_index(&self) -> usize {
        self.time_index.iter().filter(|v| v.is_some()).count()
    }
}

/// Settled outcome of a race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    pub race_id: String,
    /// Finisher names in order, at most three.
    #[serde(default)]
    pub top3: Vec<String>,
    /// Bet-type label to payout for a 100-unit stake.
    #[serde(default)]
    pub payouts: BTreeMap<String, Decimal>,
}

impl RaceResult {
    pub fn new(race_id: impl Into<String>, top3: Vec<String>) -> Self {
        Self {
            race_id: race_id.into(),
            top3,
            payouts: BTreeMap::new(),
        }
    }

    pub fn with_payout(mut self, bet_type: impl Into<String>, amount: Decimal) -> Self {
        self.payouts.insert(bet_type.into(), amount);
        self
    }

    /// First-place finisher, if recorded.
    pub fn winner(&self) -> Option<&str> {
        self.top3.first().map(String::as_str)
    }

    pub fn payout(&self, bet_type: &str) -> Option<Decimal> {
        self.payouts.get(bet_type).copied()
    }
}

/// A batch of records loaded together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordBatch {
    pub races: Vec<Race>,
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub results: Vec<RaceResult>,
}

impl RecordBatch {
    /// Check that every race has an id and a `YYYYMMDD` date, and that
    /// entries and results only refer to races in the batch.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        for race in &self.races {
            if race.race_id.is_empty() {
                return Err(Error::InvalidRecord("race with empty id".to_string()));
            }
            if race.date.len() != 8 || !race.date.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::InvalidRecord(format!(
                    "race {} has malformed date {:?}",
                    race.race_id, race.date
                )));
            }
        }

        let known: HashSet<&str> = self.races.iter().map(|r| r.race_id.as_str()).collect();
        let orphan = self
            .entries
            .iter()
            .map(|e| e.race_id.as_str())
            .chain(self.results.iter().map(|r| r.race_id.as_str()))
            .find(|id| !known.contains(id));
        if let Some(id) = orphan {
            return Err(Error::InvalidRecord(format!("record refers to unknown race {}", id)));
        }

        Ok(())
    }
}
