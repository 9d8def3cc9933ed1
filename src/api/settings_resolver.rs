use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::core::{deep_merge, merged};
use crate::error::{ChartError, ChartResult};

use super::chart_settings::{TimeSeriesChartSettings, TimeSeriesChartType, YAxisSettings};
use super::key_settings::TimeSeriesChartKeySettings;
use super::state_settings::StateValueConverter;
use super::threshold_settings::ThresholdSettings;

/// Resolves chart-level settings: global defaults, then the user document.
///
/// Every configured Y axis and every threshold is additionally merged over
/// its own defaults, so partial entries come out fully populated. State
/// charts get a [`StateValueConverter`] built from the resolved states.
pub fn resolve_chart_settings(
    input: &Value,
    chart_type: TimeSeriesChartType,
) -> ChartResult<TimeSeriesChartSettings> {
    let defaults = to_layer(&TimeSeriesChartSettings::default(), "settings")?;
    let mut document = merged([&defaults, input]);
    expand_y_axes(&mut document)?;
    expand_thresholds(&mut document)?;

    let mut settings: TimeSeriesChartSettings = from_layer(document, "settings")?;
    if chart_type.is_state() {
        settings.state_converter = Some(StateValueConverter::new(&settings.states));
    }
    debug!(
        chart_type = ?chart_type,
        y_axes = settings.y_axes.len(),
        thresholds = settings.thresholds.len(),
        stack = settings.stack,
        "resolved chart settings"
    );
    Ok(settings)
}

/// Resolves one key's settings: global key defaults, then the chart type
/// layer, then the key's own partial settings.
pub fn resolve_key_settings(
    partial: &Value,
    chart_type: TimeSeriesChartType,
) -> ChartResult<TimeSeriesChartKeySettings> {
    let defaults = to_layer(&TimeSeriesChartKeySettings::default(), "keySettings")?;
    let type_defaults = chart_type.key_defaults();
    from_layer(
        merged([&defaults, &type_defaults, partial]),
        "keySettings",
    )
}

pub fn resolve_threshold_settings(partial: &Value) -> ChartResult<ThresholdSettings> {
    let defaults = to_layer(&ThresholdSettings::default(), "thresholds")?;
    from_layer(merged([&defaults, partial]), "thresholds")
}

pub fn resolve_y_axis_settings(partial: &Value) -> ChartResult<YAxisSettings> {
    let defaults = to_layer(&YAxisSettings::default(), "yAxes")?;
    from_layer(merged([&defaults, partial]), "yAxes")
}

fn expand_y_axes(document: &mut Value) -> ChartResult<()> {
    let defaults = to_layer(&YAxisSettings::default(), "yAxes")?;
    let Some(axes) = document.get_mut("yAxes").and_then(Value::as_object_mut) else {
        return Ok(());
    };
    for (id, axis) in axes.iter_mut() {
        let mut full = defaults.clone();
        deep_merge(&mut full, axis);
        // The map key is the axis identity.
        if let Some(fields) = full.as_object_mut() {
            fields.insert("id".to_owned(), Value::String(id.clone()));
        }
        *axis = full;
    }
    Ok(())
}

fn expand_thresholds(document: &mut Value) -> ChartResult<()> {
    let defaults = to_layer(&ThresholdSettings::default(), "thresholds")?;
    let Some(thresholds) = document.get_mut("thresholds").and_then(Value::as_array_mut) else {
        return Ok(());
    };
    for threshold in thresholds.iter_mut() {
        *threshold = merged([&defaults, &*threshold]);
    }
    Ok(())
}

fn to_layer<T: Serialize>(value: &T, path: &str) -> ChartResult<Value> {
    serde_json::to_value(value).map_err(|err| ChartError::InvalidSettings {
        path: path.to_owned(),
        message: err.to_string(),
    })
}

fn from_layer<T: DeserializeOwned>(document: Value, path: &str) -> ChartResult<T> {
    serde_json::from_value(document).map_err(|err| ChartError::InvalidSettings {
        path: path.to_owned(),
        message: err.to_string(),
    })
}
