use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::core::{
    ChartPoint, ColorRole, DataKeyRef, Rgba, TsPoint, UnitConverter, prepare_theme_color,
    resolve_units,
};
use crate::render::{
    AreaStyleOption, BarRenderContext, BarSeriesStyle, Fill, LineSeriesStyle, LineStyleOption,
    MarkLineData, MarkLineEnd, MarkLineLabelOption, MarkLineOption, SeriesLabelOption,
    SeriesOption, SeriesType, TextStyleOption,
};

use super::axis_builder::{TimeSeriesChartYAxis, y_axis_index};
use super::chart_settings::{TimeSeriesChartSettings, TimeSeriesChartType};
use super::dynamic_limits::{
    DynamicSource, DynamicSourcePlan, DynamicTarget, resolve_value_source,
};
use super::key_settings::{SeriesFillSettings, SeriesFillType, TimeSeriesChartKeySettings};
use super::settings_resolver::resolve_key_settings;
use super::state_settings::StateValueConverter;
use super::threshold_settings::{ThresholdOrientation, ThresholdSettings};
use super::widget_context::WidgetContext;

/// Runtime descriptor of one (datasource, data key) series.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesChartDataItem {
    /// Series id used for highlight/downplay actions.
    pub id: String,
    pub key: DataKeyRef,
    pub label: String,
    pub color: String,
    pub settings: TimeSeriesChartKeySettings,
    pub units: String,
    pub decimals: Option<u32>,
    pub converter: UnitConverter,
    pub y_axis_id: String,
    pub y_axis_index: Option<usize>,
    pub x_axis_index: usize,
    pub enabled: bool,
    /// Bars animate unless switched off around a resize.
    pub bar_animation: bool,
    data_set: Option<Vec<TsPoint>>,
    pub data: Arc<Vec<ChartPoint>>,
}

impl TimeSeriesChartDataItem {
    #[must_use]
    pub fn is_bar(&self) -> bool {
        self.settings.is_bar()
    }

    /// Raw samples the cached `data` was built from.
    #[must_use]
    pub fn data_set(&self) -> Option<&[TsPoint]> {
        self.data_set.as_deref()
    }

    /// Replaces the cached samples when `incoming` differs from them.
    ///
    /// Returns `false`, leaving `data` untouched (same allocation), when the
    /// incoming samples are equal to the cached ones.
    pub fn refresh(&mut self, incoming: &[TsPoint], states: Option<&StateValueConverter>) -> bool {
        if self.data_set.as_deref() == Some(incoming) {
            return false;
        }
        self.data = Arc::new(to_chart_points(incoming, self.converter, states));
        self.data_set = Some(incoming.to_vec());
        true
    }
}

/// Converts raw samples into plotted points.
///
/// State charts map raw values through the state table; numeric charts go
/// through the unit converter.
#[must_use]
pub fn to_chart_points(
    points: &[TsPoint],
    converter: UnitConverter,
    states: Option<&StateValueConverter>,
) -> Vec<ChartPoint> {
    points
        .iter()
        .map(|point| {
            let value = match states {
                Some(states) => states.to_state_value(&point.value),
                None => point.numeric_value().map(|value| converter.convert(value)),
            };
            ChartPoint::new(point.ts, value)
        })
        .collect()
}

/// Runtime descriptor of one threshold line.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesChartThresholdItem {
    pub id: String,
    pub settings: ThresholdSettings,
    pub units: String,
    pub decimals: Option<u32>,
    pub converter: UnitConverter,
    pub y_axis_id: String,
    pub y_axis_index: Option<usize>,
    pub source: DynamicSource,
    /// Converted values; `None` until a dynamic source delivers.
    pub values: Option<Vec<f64>>,
}

impl TimeSeriesChartThresholdItem {
    /// Stores `values`; returns whether they differ from the cached ones.
    pub fn set_values(&mut self, values: Option<Vec<f64>>) -> bool {
        if self.values == values {
            return false;
        }
        self.values = values;
        true
    }

    #[must_use]
    pub fn has_values(&self) -> bool {
        self.values.as_ref().is_some_and(|values| !values.is_empty())
    }
}

/// Id and index of the axis an item lands on. The id is taken from the
/// axis actually picked, so it never names an axis that does not exist.
fn resolve_item_axis(
    settings: &TimeSeriesChartSettings,
    y_axes: &[TimeSeriesChartYAxis],
    requested: &str,
) -> (String, Option<usize>) {
    let fallback = settings.resolve_y_axis_id(requested);
    let index = y_axis_index(y_axes, &fallback);
    let id = index
        .and_then(|index| y_axes.get(index))
        .map_or(fallback, |axis| axis.id.clone());
    (id, index)
}

/// One data item per (datasource, data key), in datasource order.
///
/// Keys whose settings cannot be resolved fall back to the chart type
/// defaults.
#[must_use]
pub fn setup_data_items(
    context: &WidgetContext,
    settings: &TimeSeriesChartSettings,
    chart_type: TimeSeriesChartType,
    y_axes: &[TimeSeriesChartYAxis],
) -> Vec<TimeSeriesChartDataItem> {
    let mut items = Vec::new();
    for (ds_index, datasource) in context.datasources.iter().enumerate() {
        for (key_index, data_key) in datasource.data_keys.iter().enumerate() {
            let key_settings = resolve_key_settings(&data_key.settings, chart_type)
                .unwrap_or_else(|err| {
                    warn!(
                        widget = %context.widget_title,
                        key = %data_key.label,
                        error = %err,
                        "malformed key settings, using defaults"
                    );
                    resolve_key_settings(&Value::Null, chart_type).unwrap_or_default()
                });
            let resolved = resolve_units(
                &context.item_units(data_key.units.as_deref()),
                context.unit_system,
            );
            let (y_axis_id, y_axis_index) =
                resolve_item_axis(settings, y_axes, &key_settings.y_axis_id);
            let x_axis_index = usize::from(settings.comparison_enabled && data_key.comparison);
            let enabled = !key_settings.data_hidden_by_default && !data_key.hidden;
            items.push(TimeSeriesChartDataItem {
                id: format!("series_{ds_index}_{key_index}"),
                key: DataKeyRef::series(ds_index, key_index),
                label: data_key.label.clone(),
                color: data_key.color.clone(),
                settings: key_settings,
                units: resolved.units,
                decimals: context.item_decimals(data_key.decimals),
                converter: resolved.converter,
                y_axis_id,
                y_axis_index,
                x_axis_index,
                enabled,
                bar_animation: true,
                data_set: None,
                data: Arc::new(Vec::new()),
            });
        }
    }
    debug!(data_items = items.len(), "set up data items");
    items
}

/// One threshold item per configured threshold whose source resolves.
pub fn setup_threshold_items(
    context: &WidgetContext,
    settings: &TimeSeriesChartSettings,
    y_axes: &[TimeSeriesChartYAxis],
    alias_id: impl Fn(&str) -> Option<String>,
    plan: &mut DynamicSourcePlan,
) -> Vec<TimeSeriesChartThresholdItem> {
    let mut items = Vec::new();
    for (index, threshold) in settings.thresholds.iter().enumerate() {
        let id = format!("threshold_{index}");
        let target = DynamicTarget::Threshold { id: id.clone() };
        let Some(source) = resolve_value_source(
            &threshold.source,
            target,
            &context.datasources,
            &alias_id,
            plan,
        ) else {
            continue;
        };
        let resolved = resolve_units(
            &context.item_units(threshold.units.as_deref()),
            context.unit_system,
        );
        let values = match source {
            DynamicSource::Constant => threshold
                .source
                .value
                .map(|value| vec![resolved.converter.convert(value)]),
            DynamicSource::LatestKey(_) | DynamicSource::Entity => None,
        };
        let (y_axis_id, y_axis_index) = resolve_item_axis(settings, y_axes, &threshold.y_axis_id);
        items.push(TimeSeriesChartThresholdItem {
            y_axis_index,
            id,
            settings: threshold.clone(),
            units: resolved.units,
            decimals: context.item_decimals(threshold.decimals),
            converter: resolved.converter,
            y_axis_id,
            source,
            values,
        });
    }
    debug!(
        configured = settings.thresholds.len(),
        active = items.len(),
        "set up threshold items"
    );
    items
}

/// Inputs of series generation that are not per item.
#[derive(Debug, Clone, Copy)]
pub struct SeriesContext<'a> {
    pub settings: &'a TimeSeriesChartSettings,
    pub dark_mode: bool,
    /// Samples are raw (no aggregation buckets).
    pub no_aggregation: bool,
    pub time_interval: Option<i64>,
}

/// Series for every enabled data item followed by one mark-line series per
/// threshold with values.
#[must_use]
pub fn generate_chart_series(
    items: &[TimeSeriesChartDataItem],
    thresholds: &[TimeSeriesChartThresholdItem],
    context: SeriesContext<'_>,
) -> Vec<SeriesOption> {
    let enabled: Vec<&TimeSeriesChartDataItem> =
        items.iter().filter(|item| item.enabled).collect();
    let bar_layout = BarLayout::new(&enabled, context.settings.stack);

    let mut series: Vec<SeriesOption> = enabled
        .iter()
        .map(|item| data_series(item, &bar_layout, context))
        .collect();
    series.extend(
        thresholds
            .iter()
            .filter(|threshold| threshold.has_values())
            .map(|threshold| threshold_series(threshold, context.dark_mode)),
    );
    series
}

/// Bar slots: one per bar, or one per Y axis group when stacking.
struct BarLayout<'a> {
    groups: Vec<(&'a str, Vec<&'a str>)>,
    stack: bool,
}

impl<'a> BarLayout<'a> {
    fn new(enabled: &[&'a TimeSeriesChartDataItem], stack: bool) -> Self {
        let mut groups: Vec<(&'a str, Vec<&'a str>)> = Vec::new();
        for item in enabled.iter().copied().filter(|item| item.is_bar()) {
            let group_key = if stack {
                item.y_axis_id.as_str()
            } else {
                item.id.as_str()
            };
            match groups.iter_mut().find(|(key, _)| *key == group_key) {
                Some((_, ids)) => ids.push(item.id.as_str()),
                None => groups.push((group_key, vec![item.id.as_str()])),
            }
        }
        Self { groups, stack }
    }

    fn slot(&self, item_id: &str) -> (usize, Option<usize>, Vec<String>) {
        for (bar_index, (_, ids)) in self.groups.iter().enumerate() {
            if let Some(stack_index) = ids.iter().position(|id| *id == item_id) {
                if self.stack {
                    let ids = ids.iter().map(|id| (*id).to_owned()).collect();
                    return (bar_index, Some(stack_index), ids);
                }
                return (bar_index, None, Vec::new());
            }
        }
        (0, None, Vec::new())
    }
}

fn data_series(
    item: &TimeSeriesChartDataItem,
    bar_layout: &BarLayout<'_>,
    context: SeriesContext<'_>,
) -> SeriesOption {
    let settings = context.settings;
    let mut series = SeriesOption {
        id: item.id.clone(),
        series_type: SeriesType::Line,
        name: Some(item.label.clone()),
        x_axis_index: item.x_axis_index,
        y_axis_index: item.y_axis_index.unwrap_or(0),
        color: Some(item.color.clone()),
        stack: settings.stack.then(|| item.y_axis_id.clone()),
        animation: settings.animation.animation,
        tooltip: true,
        data: Arc::clone(&item.data),
        line: None,
        bar: None,
        mark_line: None,
    };
    if item.is_bar() {
        let bar_settings = &item.settings.bar_settings;
        let (bar_index, bar_stack_index, stack_series_ids) = bar_layout.slot(&item.id);
        let no_aggregation = settings.no_aggregation_bar_width_settings;
        let target_width = no_aggregation.target_width();
        series.series_type = SeriesType::Custom;
        series.animation = series.animation && item.bar_animation;
        series.bar = Some(BarSeriesStyle {
            color: fill_color(&item.color, bar_settings.background_settings)
                .unwrap_or_else(|| Fill::Solid(item.color.clone())),
            border_color: item.color.clone(),
            border_width: if bar_settings.show_border {
                bar_settings.border_width
            } else {
                0.0
            },
            border_radius: bar_settings.border_radius,
            label: SeriesLabelOption {
                show: bar_settings.show_label,
                position: bar_settings.label_position,
                decimals: item.decimals,
                units: item.units.clone(),
                text: Some(TextStyleOption::from_font(
                    &bar_settings.label_font,
                    prepare_theme_color(
                        &bar_settings.label_color,
                        context.dark_mode,
                        Some(ColorRole::SeriesLabel),
                    ),
                )),
            },
            render_context: BarRenderContext {
                bar_gap: settings.bar_width_settings.bar_gap,
                interval_gap: settings.bar_width_settings.interval_gap,
                time_interval: context.time_interval,
                no_aggregation: context.no_aggregation,
                no_aggregation_strategy: no_aggregation.strategy,
                no_aggregation_width_relative: target_width.relative,
                no_aggregation_width: target_width.value(),
                bars_count: bar_layout.groups.len(),
                bar_index,
                bar_stack_index,
                stack_series_ids,
            },
        });
        // Custom bars stack themselves through the render context.
        series.stack = None;
    } else {
        let line = &item.settings.line_settings;
        series.line = Some(LineSeriesStyle {
            step: line.step.then_some(line.step_type),
            smooth: line.smooth,
            line_style: LineStyleOption {
                width: if line.show_line { line.line_width } else { 0.0 },
                line_type: line.line_type,
                color: None,
            },
            area_style: area_style(&item.color, line.fill_area_settings),
            show_symbol: line.show_points,
            symbol: line.point_shape,
            symbol_size: line.point_size,
            label: SeriesLabelOption {
                show: line.show_point_label,
                position: line.point_label_position,
                decimals: item.decimals,
                units: item.units.clone(),
                text: Some(TextStyleOption::from_font(
                    &line.point_label_font,
                    prepare_theme_color(
                        &line.point_label_color,
                        context.dark_mode,
                        Some(ColorRole::SeriesLabel),
                    ),
                )),
            },
        });
    }
    series
}

fn area_style(color: &str, fill: SeriesFillSettings) -> Option<AreaStyleOption> {
    match fill.fill_type {
        SeriesFillType::None => None,
        SeriesFillType::Opacity => Some(AreaStyleOption {
            opacity: fill.opacity,
            color: None,
        }),
        SeriesFillType::Gradient => Some(AreaStyleOption {
            opacity: 1.0,
            color: fill_color(color, fill),
        }),
    }
}

/// Fill colour derived from the series colour; `None` when no fill applies
/// or the colour cannot be parsed.
fn fill_color(color: &str, fill: SeriesFillSettings) -> Option<Fill> {
    let parsed = Rgba::parse(color)?;
    match fill.fill_type {
        SeriesFillType::None => None,
        SeriesFillType::Opacity => Some(Fill::Solid(
            parsed.with_alpha(fill.opacity).to_rgb_string(),
        )),
        SeriesFillType::Gradient => Some(Fill::LinearGradient {
            start: parsed
                .with_alpha(fill.gradient.start / 100.0)
                .to_rgb_string(),
            end: parsed.with_alpha(fill.gradient.end / 100.0).to_rgb_string(),
        }),
    }
}

fn threshold_series(threshold: &TimeSeriesChartThresholdItem, dark_mode: bool) -> SeriesOption {
    let settings = &threshold.settings;
    let vertical = settings.orientation == ThresholdOrientation::Vertical;
    let data = threshold
        .values
        .iter()
        .flatten()
        .map(|value| MarkLineData {
            vertical,
            start: MarkLineEnd {
                anchor: "min",
                value: *value,
                symbol: settings.start_symbol,
                symbol_size: settings.start_symbol_size,
            },
            end: MarkLineEnd {
                anchor: "max",
                value: *value,
                symbol: settings.end_symbol,
                symbol_size: settings.end_symbol_size,
            },
        })
        .collect();
    SeriesOption {
        id: threshold.id.clone(),
        series_type: SeriesType::Line,
        name: None,
        x_axis_index: 0,
        y_axis_index: threshold.y_axis_index.unwrap_or(0),
        color: None,
        stack: None,
        animation: false,
        tooltip: false,
        data: Arc::new(Vec::new()),
        line: None,
        bar: None,
        mark_line: Some(MarkLineOption {
            line_style: LineStyleOption {
                width: settings.line_width,
                line_type: settings.line_type,
                color: Some(prepare_theme_color(
                    &settings.line_color,
                    dark_mode,
                    Some(ColorRole::ThresholdLine),
                )),
            },
            label: MarkLineLabelOption {
                show: settings.show_label,
                position: settings.label_position,
                decimals: threshold.decimals,
                units: threshold.units.clone(),
                text: TextStyleOption::from_font(
                    &settings.label_font,
                    prepare_theme_color(
                        &settings.label_color,
                        dark_mode,
                        Some(ColorRole::ThresholdLabel),
                    ),
                ),
            },
            data,
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::state_settings::StateDefinition;

    #[test]
    fn state_values_bypass_the_unit_converter() {
        let states = StateValueConverter::new(&[StateDefinition::constant("On", 1.0, "ON")]);
        let points = [TsPoint::new(1, "ON"), TsPoint::new(2, json!(3))];
        let converted = to_chart_points(&points, UnitConverter::linear(2.0, 0.0), Some(&states));
        assert_eq!(converted[0].value, Some(1.0));
        assert_eq!(converted[1].value, Some(3.0));

        let numeric = to_chart_points(&points, UnitConverter::linear(2.0, 0.0), None);
        assert_eq!(numeric[0].value, None);
        assert_eq!(numeric[1].value, Some(6.0));
    }

    #[test]
    fn gradient_fill_uses_series_color() {
        let fill = SeriesFillSettings {
            fill_type: SeriesFillType::Gradient,
            ..SeriesFillSettings::default()
        };
        assert_eq!(
            fill_color("#ff0000", fill),
            Some(Fill::LinearGradient {
                start: "rgb(255, 0, 0)".to_owned(),
                end: "rgba(255, 0, 0, 0)".to_owned(),
            })
        );
        assert_eq!(fill_color("not a colour", fill), None);
    }
}
