use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, trace};

use crate::core::{
    AuxiliaryData, DataKey, DataKeyRef, DataKeyType, Datasource, DatasourceData, DatasourceType,
    TsPoint, UnitConverter, find_latest_key, value_as_f64,
};

use super::axis_builder::TimeSeriesChartYAxis;
use super::series_builder::TimeSeriesChartThresholdItem;
use super::threshold_settings::{ValueSourceConfig, ValueSourceType};

/// Settings field of a synthetic key listing the values it feeds.
pub const DYNAMIC_TARGETS_SETTING: &str = "dynamicTargets";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LimitBound {
    Min,
    Max,
}

/// Marker stored on a synthetic key, naming one value the key feeds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "camelCase")]
pub enum DynamicTarget {
    #[serde(rename_all = "camelCase")]
    Threshold { id: String },
    #[serde(rename_all = "camelCase")]
    AxisLimit { axis_id: String, bound: LimitBound },
}

/// Resolved origin of a threshold or axis-limit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicSource {
    Constant,
    /// Read from the widget's own latest data on every tick.
    LatestKey(DataKeyRef),
    /// Delivered by the auxiliary entity subscription.
    Entity,
}

impl DynamicSource {
    #[must_use]
    pub fn latest_key(self) -> Option<DataKeyRef> {
        match self {
            Self::LatestKey(key) => Some(key),
            _ => None,
        }
    }
}

/// Entity datasources needed by entity-sourced values, one per alias id.
///
/// Values sharing a source share one synthetic key; each key carries the
/// list of values it feeds under [`DYNAMIC_TARGETS_SETTING`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicSourcePlan {
    datasources: IndexMap<String, Datasource>,
}

impl DynamicSourcePlan {
    pub fn add_entity_key(
        &mut self,
        alias_id: &str,
        alias: &str,
        key: &str,
        key_type: DataKeyType,
        target: DynamicTarget,
    ) {
        let datasource = self
            .datasources
            .entry(alias_id.to_owned())
            .or_insert_with(|| Datasource {
                source_type: DatasourceType::Entity,
                name: alias.to_owned(),
                alias_name: Some(alias.to_owned()),
                entity_alias_id: Some(alias_id.to_owned()),
                ..Datasource::default()
            });
        let existing = datasource
            .data_keys
            .iter_mut()
            .find(|candidate| candidate.name == key && candidate.key_type == key_type);
        match existing {
            Some(data_key) => {
                let mut targets = dynamic_targets(data_key);
                if !targets.contains(&target) {
                    targets.push(target);
                    data_key.settings = targets_settings(&targets);
                }
            }
            None => datasource.data_keys.push(
                DataKey::new(key, key_type).with_settings(targets_settings(&[target])),
            ),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.datasources.is_empty()
    }

    #[must_use]
    pub fn datasources(&self) -> Vec<Datasource> {
        self.datasources.values().cloned().collect()
    }

    #[must_use]
    pub fn key_count(&self) -> usize {
        self.datasources
            .values()
            .map(|datasource| datasource.data_keys.len())
            .sum()
    }
}

fn targets_settings(targets: &[DynamicTarget]) -> Value {
    json!({ DYNAMIC_TARGETS_SETTING: targets })
}

/// Markers of a synthetic key; empty for keys the chart did not create.
#[must_use]
pub fn dynamic_targets(key: &DataKey) -> Vec<DynamicTarget> {
    key.settings
        .get(DYNAMIC_TARGETS_SETTING)
        .cloned()
        .and_then(|targets| serde_json::from_value(targets).ok())
        .unwrap_or_default()
}

/// Resolves where a configured value comes from.
///
/// Invalid configurations, latest keys absent from every datasource and
/// unresolvable entity aliases yield `None`: the owning item is dropped.
pub fn resolve_value_source(
    config: &ValueSourceConfig,
    target: DynamicTarget,
    datasources: &[Datasource],
    alias_id: impl Fn(&str) -> Option<String>,
    plan: &mut DynamicSourcePlan,
) -> Option<DynamicSource> {
    if !config.is_valid() {
        trace!(owner = ?target, "value source is incomplete");
        return None;
    }
    match config.source_type {
        ValueSourceType::Constant => Some(DynamicSource::Constant),
        ValueSourceType::LatestKey => {
            let key = config.latest_key.as_deref()?;
            let found = find_latest_key(datasources, key, config.latest_key_type);
            if found.is_none() {
                debug!(owner = ?target, key, "latest key not subscribed, skipping");
            }
            found.map(DynamicSource::LatestKey)
        }
        ValueSourceType::Entity => {
            let alias = config.entity_alias.as_deref()?;
            let key = config.entity_key.as_deref()?;
            let Some(resolved) = alias_id(alias) else {
                debug!(owner = ?target, alias, "entity alias not resolved, skipping");
                return None;
            };
            let key_type = config.entity_key_type.unwrap_or(DataKeyType::Attribute);
            plan.add_entity_key(&resolved, alias, key, key_type, target);
            Some(DynamicSource::Entity)
        }
    }
}

/// Numeric values of a threshold sample.
///
/// Strings are parsed as JSON first, so `"[10, 20]"` yields two values and
/// `"42"` one; anything non-numeric is dropped.
#[must_use]
pub fn parse_threshold_data(raw: &Value) -> Vec<f64> {
    match raw {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed) if !parsed.is_string() => parse_threshold_data(&parsed),
            _ => text.trim().parse::<f64>().ok().into_iter().collect(),
        },
        Value::Array(items) => items.iter().filter_map(value_as_f64).collect(),
        other => value_as_f64(other).into_iter().collect(),
    }
}

fn threshold_values(data: &[TsPoint], converter: UnitConverter) -> Option<Vec<f64>> {
    let values: Vec<f64> = parse_threshold_data(&data.first()?.value)
        .into_iter()
        .map(|value| converter.convert(value))
        .collect();
    (!values.is_empty()).then_some(values)
}

fn limit_value(data: &[TsPoint], converter: UnitConverter) -> Option<f64> {
    data.first()?
        .numeric_value()
        .map(|value| converter.convert(value))
}

/// What changed while applying dynamic values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DynamicUpdate {
    pub thresholds: bool,
    pub axis_limits: bool,
}

impl DynamicUpdate {
    #[must_use]
    pub fn is_changed(self) -> bool {
        self.thresholds || self.axis_limits
    }
}

/// Applies the widget's latest data to latest-key thresholds and limits.
///
/// Rows without a usable sample keep the cached value.
pub fn apply_latest_data(
    latest: &[DatasourceData],
    thresholds: &mut [TimeSeriesChartThresholdItem],
    y_axes: &mut [TimeSeriesChartYAxis],
) -> DynamicUpdate {
    let row = |key: DataKeyRef| latest.iter().find(|row| row.key == key);
    let mut update = DynamicUpdate::default();
    for threshold in thresholds.iter_mut() {
        let Some(values) = threshold
            .source
            .latest_key()
            .and_then(row)
            .and_then(|data| threshold_values(&data.data, threshold.converter))
        else {
            continue;
        };
        if threshold.set_values(Some(values)) {
            update.thresholds = true;
        }
    }
    for axis in y_axes.iter_mut() {
        for bound in [LimitBound::Min, LimitBound::Max] {
            let converter = axis.converter;
            let Some(limit) = axis.limit_mut(bound) else {
                continue;
            };
            let Some(value) = limit
                .source
                .latest_key()
                .and_then(row)
                .and_then(|data| limit_value(&data.data, converter))
            else {
                continue;
            };
            if limit.set(Some(value)) {
                update.axis_limits = true;
            }
        }
    }
    update
}

/// Routes auxiliary rows to the values named by their key markers.
///
/// Rows without a usable sample keep the cached value.
pub fn apply_auxiliary_data(
    rows: &[AuxiliaryData],
    thresholds: &mut [TimeSeriesChartThresholdItem],
    y_axes: &mut [TimeSeriesChartYAxis],
) -> DynamicUpdate {
    let mut update = DynamicUpdate::default();
    for row in rows {
        for target in dynamic_targets(&row.data_key) {
            match target {
                DynamicTarget::Threshold { id } => {
                    let Some(threshold) = thresholds
                        .iter_mut()
                        .find(|threshold| threshold.id == id)
                    else {
                        continue;
                    };
                    let Some(values) = threshold_values(&row.data, threshold.converter) else {
                        continue;
                    };
                    if threshold.set_values(Some(values)) {
                        update.thresholds = true;
                    }
                }
                DynamicTarget::AxisLimit { axis_id, bound } => {
                    let Some(axis) = y_axes.iter_mut().find(|axis| axis.id == axis_id) else {
                        continue;
                    };
                    let converter = axis.converter;
                    let Some(limit) = axis.limit_mut(bound) else {
                        continue;
                    };
                    let Some(value) = limit_value(&row.data, converter) else {
                        continue;
                    };
                    if limit.set(Some(value)) {
                        update.axis_limits = true;
                    }
                }
            }
        }
    }
    update
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn threshold_strings_are_parsed_as_json() {
        assert_eq!(parse_threshold_data(&json!("[10, 20]")), vec![10.0, 20.0]);
        assert_eq!(parse_threshold_data(&json!("42")), vec![42.0]);
        assert_eq!(parse_threshold_data(&json!(" 7.5 ")), vec![7.5]);
        assert!(parse_threshold_data(&json!("high")).is_empty());
        assert_eq!(parse_threshold_data(&json!([1, "x", 3])), vec![1.0, 3.0]);
    }

    #[test]
    fn plan_shares_one_key_between_targets() {
        let mut plan = DynamicSourcePlan::default();
        let threshold = DynamicTarget::Threshold {
            id: "threshold_0".to_owned(),
        };
        let limit = DynamicTarget::AxisLimit {
            axis_id: "default".to_owned(),
            bound: LimitBound::Max,
        };
        plan.add_entity_key("alias-1", "Boiler", "limit", DataKeyType::Attribute, threshold.clone());
        plan.add_entity_key("alias-1", "Boiler", "limit", DataKeyType::Attribute, limit.clone());
        plan.add_entity_key("alias-1", "Boiler", "limit", DataKeyType::Attribute, limit.clone());

        let datasources = plan.datasources();
        assert_eq!(datasources.len(), 1);
        assert_eq!(plan.key_count(), 1);
        assert_eq!(
            dynamic_targets(&datasources[0].data_keys[0]),
            vec![threshold, limit]
        );
    }
}
