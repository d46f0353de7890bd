//! Saved strategy configurations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::params::ParamSet;

/// Reserved id of the comparison slot A.
pub const SLOT_A: &str = "A";
/// Reserved id of the comparison slot B.
pub const SLOT_B: &str = "B";
/// Reserved id of the configuration adopted for live predictions.
pub const ACTIVE: &str = "ACTIVE";

/// Comparison slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    pub fn id(&self) -> &'static str {
        match self {
            Slot::A => SLOT_A,
            Slot::B => SLOT_B,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Slot::A => "Preset A",
            Slot::B => "Preset B",
        }
    }
}

/// A named (strategy, parameters) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub label: String,
    pub strategy_id: String,
    #[serde(default)]
    pub params: ParamSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Preset {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        strategy_id: impl Into<String>,
        params: ParamSet,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            strategy_id: strategy_id.into(),
            params,
            created_at: None,
        }
    }

    /// Whether the id is one of `A`, `B` or `ACTIVE`.
    pub fn is_reserved(&self) -> bool {
        matches!(self.id.as_str(), SLOT_A | SLOT_B | ACTIVE)
    }

    /// `key:value` pairs joined for display.
    pub fn params_summary(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}:{}", k, v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
