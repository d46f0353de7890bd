//! Strategy parameter schemas and resolved parameter sets.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Switch(bool),
    Number(f64),
    Choice(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Switch(v) => write!(f, "{}", v),
            ParamValue::Number(v) => write!(f, "{}", v),
            ParamValue::Choice(v) => write!(f, "{}", v),
        }
    }
}

/// Raw parameters as saved in a preset or given on the command line.
pub type ParamSet = BTreeMap<String, ParamValue>;

/// One option of a `select` parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

/// Shape of a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParamKind {
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
    },
    Select {
        options: Vec<SelectOption>,
    },
    Switch,
}

/// Declaration of one parameter in a strategy's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: ParamKind,
    pub default: ParamValue,
}

impl ParamSpec {
    pub fn number(key: &str, label: &str, default: f64) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind: ParamKind::Number {
                min: None,
                max: None,
                step: None,
            },
            default: ParamValue::Number(default),
        }
    }

    pub fn switch(key: &str, label: &str, default: bool) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind: ParamKind::Switch,
            default: ParamValue::Switch(default),
        }
    }

    pub fn select(key: &str, label: &str, options: &[(&str, &str)], default: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind: ParamKind::Select {
                options: options
                    .iter()
                    .map(|(label, value)| SelectOption {
                        label: label.to_string(),
                        value: value.to_string(),
                    })
                    .collect(),
            },
            default: ParamValue::Choice(default.to_string()),
        }
    }

    /// Attach UI bounds to a number parameter. No-op for other kinds.
    pub fn bounds(mut self, lo: f64, hi: f64, step_by: f64) -> Self {
        if let ParamKind::Number { min, max, step } = &mut self.kind {
            *min = Some(lo);
            *max = Some(hi);
            *step = Some(step_by);
        }
        self
    }

    /// Whether `value` has the type this parameter declares.
    pub fn accepts(&self, value: &ParamValue) -> bool {
        match (&self.kind, value) {
            (ParamKind::Number { .. }, ParamValue::Number(v)) => v.is_finite(),
            (ParamKind::Switch, ParamValue::Switch(_)) => true,
            (ParamKind::Select { options }, ParamValue::Choice(v)) => {
                options.iter().any(|o| &o.value == v)
            }
            _ => false,
        }
    }

    /// Parse a textual value (e.g. from `--param key=value`) for this parameter.
    #[allow(clippy::result_large_err)]
    pub fn parse(&self, raw: &str) -> Result<ParamValue> {
        let raw = raw.trim();
        let invalid = |message: String| Error::InvalidParam {
            key: self.key.clone(),
            message,
        };

        match &self.kind {
            ParamKind::Number { .. } => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(ParamValue::Number)
                .ok_or_else(|| invalid(format!("expected a number, got {:?}", raw))),
            ParamKind::Switch => match raw.to_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => Ok(ParamValue::Switch(true)),
                "false" | "off" | "no" | "0" => Ok(ParamValue::Switch(false)),
                _ => Err(invalid(format!("expected on/off, got {:?}", raw))),
            },
            ParamKind::Select { options } => {
                if options.iter().any(|o| o.value == raw) {
                    Ok(ParamValue::Choice(raw.to_string()))
                } else {
                    let allowed: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
                    Err(invalid(format!("expected one of {:?}, got {:?}", allowed, raw)))
                }
            }
        }
    }
}

/// The default value of every parameter in `schema`.
pub fn default_params(schema: &[ParamSpec]) -> ParamSet {
    schema
        .iter()
        .map(|spec| (spec.key.clone(), spec.default.clone()))
        .collect()
}

/// Fill `raw` out against `schema`.
///
/// Every schema key ends up present. Keys the schema does not declare are
/// dropped, and values of the wrong type are replaced by the default.
pub fn resolve_params(schema: &[ParamSpec], raw: &ParamSet) -> ResolvedParams {
    let values = schema
        .iter()
        .map(|spec| {
            let value = match raw.get(&spec.key) {
                Some(v) if spec.accepts(v) => v.clone(),
                Some(v) => {
                    debug!(
                        key = %spec.key,
                        value = %v,
                        "Parameter rejected by schema, using default"
                    );
                    spec.default.clone()
                }
                None => spec.default.clone(),
            };
            (spec.key.clone(), value)
        })
        .collect();

    ResolvedParams { values }
}

/// A parameter set with every schema key present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedParams {
    values: ParamSet,
}

impl ResolvedParams {
    /// Numeric value of `key`, `0.0` if the key is not a number parameter.
    pub fn number(&self, key: &str) -> f64 {
        match self.values.get(key) {
            Some(ParamValue::Number(v)) => *v,
            _ => 0.0,
        }
    }

    /// Switch value of `key`, `false` if the key is not a switch parameter.
    pub fn switch(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(ParamValue::Switch(true)))
    }

    pub fn choice(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(ParamValue::Choice(v)) => Some(v),
            _ => None,
        }
    }

    pub fn as_set(&self) -> &ParamSet {
        &self.values
    }

    pub fn into_set(self) -> ParamSet {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Vec<ParamSpec> {
        vec![
            ParamSpec::number("minGap", "Gap", 0.0).bounds(0.0, 20.0, 0.5),
            ParamSpec::switch("recent3", "Recent", false),
            ParamSpec::select("surface", "Surface", &[("Turf", "turf"), ("Dirt", "dirt")], "turf"),
        ]
    }

    #[test]
    fn test_resolve_fills_defaults_and_drops_unknown() {
        let mut raw = ParamSet::new();
        raw.insert("minGap".into(), ParamValue::Number(2.5));
        raw.insert("bogus".into(), ParamValue::Number(1.0));

        let resolved = resolve_params(&schema(), &raw);

        assert_eq!(resolved.number("minGap"), 2.5);
        assert!(!resolved.switch("recent3"));
        assert_eq!(resolved.choice("surface"), Some("turf"));
        assert!(!resolved.as_set().contains_key("bogus"));
        assert_eq!(resolved.as_set().len(), 3);
    }

    #[test]
    fn test_resolve_replaces_wrong_types() {
        let mut raw = ParamSet::new();
        raw.insert("minGap".into(), ParamValue::Switch(true));
        raw.insert("recent3".into(), ParamValue::Number(1.0));
        raw.insert("surface".into(), ParamValue::Choice("sand".into()));

        let resolved = resolve_params(&schema(), &raw);

        assert_eq!(resolved.number("minGap"), 0.0);
        assert!(!resolved.switch("recent3"));
        assert_eq!(resolved.choice("surface"), Some("turf"));
    }

    #[test]
    fn test_parse_textual_values() {
        let schema = schema();
        assert_eq!(schema[0].parse("1.5").unwrap(), ParamValue::Number(1.5));
        assert!(schema[0].parse("wide").is_err());
        assert_eq!(schema[1].parse("on").unwrap(), ParamValue::Switch(true));
        assert_eq!(schema[1].parse("0").unwrap(), ParamValue::Switch(false));
        assert_eq!(schema[2].parse("dirt").unwrap(), ParamValue::Choice("dirt".into()));
        assert!(matches!(schema[2].parse("sand"), Err(Error::InvalidParam { .. })));
    }

    #[test]
    fn test_param_set_json_shape() {
        let raw: ParamSet =
            serde_json::from_str(r#"{"minGap": 1, "recent3": true, "surface": "dirt"}"#).unwrap();

        assert_eq!(raw["minGap"], ParamValue::Number(1.0));
        assert_eq!(raw["recent3"], ParamValue::Switch(true));
        assert_eq!(raw["surface"], ParamValue::Choice("dirt".into()));
    }

    #[test]
    fn test_param_schema_serializes_with_type_tag() {
        let json = serde_json::to_value(ParamSpec::switch("recent3", "Recent", false)).unwrap();
        assert_eq!(json["type"], "switch");
        assert_eq!(json["default"], false);
    }
}
