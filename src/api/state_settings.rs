use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::value_as_f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StateSourceType {
    #[default]
    Constant,
    Range,
}

/// One user-defined state: raw values matching the source map to `value`,
/// which the axis renders as `label`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StateDefinition {
    pub label: String,
    pub value: f64,
    pub source_type: StateSourceType,
    pub source_value: Value,
    pub source_range_from: Option<f64>,
    pub source_range_to: Option<f64>,
}

impl StateDefinition {
    #[must_use]
    pub fn constant(label: impl Into<String>, value: f64, source_value: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            value,
            source_type: StateSourceType::Constant,
            source_value: source_value.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn range(label: impl Into<String>, value: f64, from: Option<f64>, to: Option<f64>) -> Self {
        Self {
            label: label.into(),
            value,
            source_type: StateSourceType::Range,
            source_range_from: from,
            source_range_to: to,
            ..Self::default()
        }
    }

    fn matches(&self, raw: &Value) -> bool {
        match self.source_type {
            StateSourceType::Constant => {
                if self.source_value == *raw {
                    return true;
                }
                match (value_as_f64(&self.source_value), value_as_f64(raw)) {
                    (Some(expected), Some(actual)) => expected == actual,
                    _ => false,
                }
            }
            StateSourceType::Range => value_as_f64(raw).is_some_and(|actual| {
                self.source_range_from.is_none_or(|from| actual >= from)
                    && self.source_range_to.is_none_or(|to| actual < to)
            }),
        }
    }
}

/// Value-to-state conversion installed for state charts.
///
/// Raw values are mapped onto the numeric state value of the first matching
/// definition; the axis renders state values through their labels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateValueConverter {
    states: Vec<StateDefinition>,
    labels: BTreeMap<OrderedFloat<f64>, String>,
}

impl StateValueConverter {
    #[must_use]
    pub fn new(states: &[StateDefinition]) -> Self {
        let labels = states
            .iter()
            .map(|state| (OrderedFloat(state.value), state.label.clone()))
            .collect();
        Self {
            states: states.to_vec(),
            labels,
        }
    }

    /// Numeric value plotted for `raw`; unmatched numeric values pass through.
    #[must_use]
    pub fn to_state_value(&self, raw: &Value) -> Option<f64> {
        self.states
            .iter()
            .find(|state| state.matches(raw))
            .map(|state| state.value)
            .or_else(|| value_as_f64(raw))
    }

    #[must_use]
    pub fn state_label(&self, value: f64) -> Option<&str> {
        self.labels.get(&OrderedFloat(value)).map(String::as_str)
    }

    /// Tick labels sorted by state value.
    #[must_use]
    pub fn tick_labels(&self) -> Vec<(f64, String)> {
        self.labels
            .iter()
            .map(|(value, label)| (value.into_inner(), label.clone()))
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn converter() -> StateValueConverter {
        StateValueConverter::new(&[
            StateDefinition::constant("Off", 0.0, "OFF"),
            StateDefinition::constant("On", 1.0, true),
            StateDefinition::range("Hot", 2.0, Some(30.0), None),
        ])
    }

    #[test]
    fn maps_constants_and_ranges() {
        let converter = converter();
        assert_eq!(converter.to_state_value(&json!("OFF")), Some(0.0));
        assert_eq!(converter.to_state_value(&json!(true)), Some(1.0));
        assert_eq!(converter.to_state_value(&json!(31.5)), Some(2.0));
        assert_eq!(converter.to_state_value(&json!(12)), Some(12.0));
        assert_eq!(converter.to_state_value(&json!("unknown")), None);
    }

    #[test]
    fn labels_are_sorted_by_value() {
        let converter = converter();
        assert_eq!(converter.state_label(1.0), Some("On"));
        let ticks: Vec<f64> = converter.tick_labels().iter().map(|(v, _)| *v).collect();
        assert_eq!(ticks, vec![0.0, 1.0, 2.0]);
    }
}
