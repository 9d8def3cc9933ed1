use tracing::debug;

use crate::core::{
    ColorRole, Datasource, TimeWindow, UnitConverter, prepare_theme_color, resolve_units,
};
use crate::render::{
    AxisLabelOption, AxisLineOption, AxisPosition, AxisTickOption, AxisValueFormat,
    SplitLineOption, TextStyleOption, XAxisOption, YAxisOption,
};

use super::chart_settings::{
    AxisLimitSettings, AxisSettings, DEFAULT_Y_AXIS_ID, TimeSeriesChartSettings, YAxisSettings,
};
use super::dynamic_limits::{
    DynamicSource, DynamicSourcePlan, DynamicTarget, LimitBound, resolve_value_source,
};
use super::series_builder::TimeSeriesChartDataItem;
use super::state_settings::StateValueConverter;
use super::widget_context::WidgetContext;

pub const MAIN_X_AXIS_ID: &str = "main";
pub const COMPARISON_X_AXIS_ID: &str = "comparison";

/// Runtime X axis: its settings and the option pushed for it.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesChartXAxis {
    pub id: String,
    pub settings: AxisSettings,
    pub option: XAxisOption,
}

impl TimeSeriesChartXAxis {
    pub fn apply_time_window(&mut self, time_window: TimeWindow) {
        self.option.min = time_window.min_time;
        self.option.max = time_window.max_time;
    }

    pub fn apply_theme(&mut self, dark_mode: bool) {
        let colors = AxisColors::resolve(&self.settings, dark_mode);
        self.option.name_text_style.color = colors.label;
        self.option.axis_line.color = colors.line;
        self.option.axis_tick.color = colors.ticks;
        self.option.axis_label.text.color = colors.tick_labels;
        self.option.split_line.color = colors.split_lines;
    }
}

/// Min or max bound of a Y axis with its resolved source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLimit {
    pub source: DynamicSource,
    pub value: Option<f64>,
}

impl AxisLimit {
    /// Stores `value`; returns whether it differs from the cached one.
    pub fn set(&mut self, value: Option<f64>) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        true
    }
}

/// Runtime Y axis: settings, resolved units and limits, and its option.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesChartYAxis {
    pub id: String,
    pub settings: YAxisSettings,
    pub units: String,
    pub decimals: Option<u32>,
    pub converter: UnitConverter,
    pub min: Option<AxisLimit>,
    pub max: Option<AxisLimit>,
    pub option: YAxisOption,
}

impl TimeSeriesChartYAxis {
    pub fn limit_mut(&mut self, bound: LimitBound) -> Option<&mut AxisLimit> {
        match bound {
            LimitBound::Min => self.min.as_mut(),
            LimitBound::Max => self.max.as_mut(),
        }
    }

    /// Copies the cached limit values into the axis option.
    pub fn apply_limits(&mut self) {
        self.option.min = self.min.and_then(|limit| limit.value);
        self.option.max = self.max.and_then(|limit| limit.value);
    }

    pub fn apply_theme(&mut self, dark_mode: bool) {
        let colors = AxisColors::resolve(&self.settings.axis, dark_mode);
        self.option.name_text_style.color = colors.label;
        self.option.axis_line.color = colors.line;
        self.option.axis_tick.color = colors.ticks;
        self.option.axis_label.text.color = colors.tick_labels;
        self.option.split_line.color = colors.split_lines;
    }
}

struct AxisColors {
    label: String,
    line: String,
    ticks: String,
    tick_labels: String,
    split_lines: String,
}

impl AxisColors {
    fn resolve(settings: &AxisSettings, dark_mode: bool) -> Self {
        let color = |value: &str, role| prepare_theme_color(value, dark_mode, Some(role));
        Self {
            label: color(&settings.label_color, ColorRole::AxisLabel),
            line: color(&settings.line_color, ColorRole::AxisLine),
            ticks: color(&settings.ticks_color, ColorRole::AxisTicks),
            tick_labels: color(&settings.tick_labels_color, ColorRole::AxisTickLabel),
            split_lines: color(&settings.split_lines_color, ColorRole::AxisSplitLine),
        }
    }
}

#[must_use]
pub fn create_x_axis(
    id: &str,
    settings: &AxisSettings,
    time_window: TimeWindow,
    dark_mode: bool,
) -> TimeSeriesChartXAxis {
    let colors = AxisColors::resolve(settings, dark_mode);
    let option = XAxisOption {
        id: id.to_owned(),
        show: settings.show,
        position: settings.position,
        scale: true,
        name: settings.label().map(str::to_owned),
        name_gap: None,
        name_text_style: TextStyleOption::from_font(&settings.label_font, colors.label),
        axis_line: AxisLineOption {
            show: settings.show_line,
            on_zero: false,
            color: colors.line,
        },
        axis_tick: AxisTickOption {
            show: settings.show_ticks,
            color: colors.ticks,
        },
        axis_label: AxisLabelOption {
            show: settings.show_tick_labels,
            hide_overlap: true,
            text: TextStyleOption::from_font(&settings.tick_labels_font, colors.tick_labels),
        },
        split_line: SplitLineOption {
            show: settings.show_split_lines,
            color: colors.split_lines,
        },
        min: time_window.min_time,
        max: time_window.max_time,
    };
    TimeSeriesChartXAxis {
        id: id.to_owned(),
        settings: settings.clone(),
        option,
    }
}

/// Main X axis, plus a comparison axis tracking the comparison window when
/// comparison is enabled.
#[must_use]
pub fn setup_x_axes(
    settings: &TimeSeriesChartSettings,
    context: &WidgetContext,
    dark_mode: bool,
) -> Vec<TimeSeriesChartXAxis> {
    let mut axes = vec![create_x_axis(
        MAIN_X_AXIS_ID,
        &settings.x_axis,
        context.time_window,
        dark_mode,
    )];
    if settings.comparison_enabled {
        let window = context
            .comparison_time_window
            .unwrap_or(context.time_window);
        axes.push(create_x_axis(
            COMPARISON_X_AXIS_ID,
            &settings.comparison_x_axis,
            window,
            dark_mode,
        ));
    }
    axes
}

/// Builds one Y axis. Limits are resolved separately by [`setup_y_axes`].
#[must_use]
pub fn create_y_axis(
    settings: &YAxisSettings,
    context: &WidgetContext,
    dark_mode: bool,
    states: Option<&StateValueConverter>,
) -> TimeSeriesChartYAxis {
    let resolved = resolve_units(
        &context.item_units(settings.units.as_deref()),
        context.unit_system,
    );
    let decimals = context.item_decimals(settings.decimals);
    let axis = &settings.axis;
    let colors = AxisColors::resolve(axis, dark_mode);
    let option = YAxisOption {
        id: settings.id.clone(),
        show: axis.show,
        position: axis.position,
        offset: 0.0,
        align_ticks: true,
        scale: true,
        min: None,
        max: None,
        interval: settings.interval,
        name: None,
        name_gap: None,
        name_rotate: if axis.position == AxisPosition::Right {
            -90
        } else {
            90
        },
        name_text_style: TextStyleOption::from_font(&axis.label_font, colors.label),
        axis_line: AxisLineOption {
            show: axis.show_line,
            on_zero: false,
            color: colors.line,
        },
        axis_tick: AxisTickOption {
            show: axis.show_ticks,
            color: colors.ticks,
        },
        axis_label: AxisLabelOption {
            show: axis.show_tick_labels,
            hide_overlap: false,
            text: TextStyleOption::from_font(&axis.tick_labels_font, colors.tick_labels),
        },
        value_format: AxisValueFormat {
            decimals,
            units: resolved.units.clone(),
            state_labels: states
                .map(StateValueConverter::tick_labels)
                .unwrap_or_default(),
        },
        split_line: SplitLineOption {
            show: axis.show_split_lines,
            color: colors.split_lines,
        },
    };
    TimeSeriesChartYAxis {
        id: settings.id.clone(),
        settings: settings.clone(),
        units: resolved.units,
        decimals,
        converter: resolved.converter,
        min: None,
        max: None,
        option,
    }
}

/// Builds every configured Y axis, sorted by `order` (ties keep
/// configuration order), with min/max resolved.
///
/// Entity-sourced limits are registered with `plan`; limits whose source
/// cannot be resolved are dropped.
pub fn setup_y_axes(
    settings: &TimeSeriesChartSettings,
    context: &WidgetContext,
    dark_mode: bool,
    alias_id: impl Fn(&str) -> Option<String>,
    plan: &mut DynamicSourcePlan,
) -> Vec<TimeSeriesChartYAxis> {
    let mut configured: Vec<&YAxisSettings> = settings.y_axes.values().collect();
    configured.sort_by_key(|axis| axis.order);

    let states = settings.state_converter.as_ref();
    let axes: Vec<TimeSeriesChartYAxis> = configured
        .into_iter()
        .map(|axis_settings| {
            let mut axis = create_y_axis(axis_settings, context, dark_mode, states);
            axis.min = resolve_limit(
                axis_settings.min.as_ref(),
                &axis,
                LimitBound::Min,
                &context.datasources,
                &alias_id,
                plan,
            );
            axis.max = resolve_limit(
                axis_settings.max.as_ref(),
                &axis,
                LimitBound::Max,
                &context.datasources,
                &alias_id,
                plan,
            );
            axis.apply_limits();
            axis
        })
        .collect();
    debug!(
        y_axes = axes.len(),
        ids = ?axes.iter().map(|axis| axis.id.as_str()).collect::<Vec<_>>(),
        "set up y axes"
    );
    axes
}

fn resolve_limit(
    limit: Option<&AxisLimitSettings>,
    axis: &TimeSeriesChartYAxis,
    bound: LimitBound,
    datasources: &[Datasource],
    alias_id: &impl Fn(&str) -> Option<String>,
    plan: &mut DynamicSourcePlan,
) -> Option<AxisLimit> {
    match limit? {
        AxisLimitSettings::Constant(value) => Some(AxisLimit {
            source: DynamicSource::Constant,
            value: Some(axis.converter.convert(*value)),
        }),
        AxisLimitSettings::Source(config) => {
            let target = DynamicTarget::AxisLimit {
                axis_id: axis.id.clone(),
                bound,
            };
            let source = resolve_value_source(config, target, datasources, alias_id, plan)?;
            let value = match source {
                DynamicSource::Constant => config.value.map(|value| axis.converter.convert(value)),
                DynamicSource::LatestKey(_) | DynamicSource::Entity => None,
            };
            Some(AxisLimit { source, value })
        }
    }
}

/// Index of the axis a series lands on: the requested id, else the default
/// axis, else the first axis.
#[must_use]
pub fn y_axis_index(axes: &[TimeSeriesChartYAxis], requested: &str) -> Option<usize> {
    axes.iter()
        .position(|axis| axis.id == requested)
        .or_else(|| axes.iter().position(|axis| axis.id == DEFAULT_Y_AXIS_ID))
        .or_else(|| (!axes.is_empty()).then_some(0))
}

/// Auto-scale rule: off in state mode and on axes carrying an enabled bar
/// series, which must grow from zero.
#[must_use]
pub fn y_axis_scale(axis_index: usize, items: &[TimeSeriesChartDataItem], state_mode: bool) -> bool {
    !state_mode
        && !items
            .iter()
            .any(|item| item.enabled && item.is_bar() && item.y_axis_index == Some(axis_index))
}

/// Recomputes every axis's `scale` flag; returns whether any flipped.
pub fn apply_y_axis_scale(
    axes: &mut [TimeSeriesChartYAxis],
    items: &[TimeSeriesChartDataItem],
    state_mode: bool,
) -> bool {
    let mut changed = false;
    for (index, axis) in axes.iter_mut().enumerate() {
        let scale = y_axis_scale(index, items, state_mode);
        if axis.option.scale != scale {
            axis.option.scale = scale;
            changed = true;
        }
    }
    changed
}
