use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::core::ColorRole;
use crate::render::{
    AnimationOption, AxisPosition, BarWidthStrategy, Font, TooltipTrigger, VisualMapPiece,
};

use super::state_settings::{StateDefinition, StateValueConverter};
use super::threshold_settings::{ThresholdSettings, ValueSourceConfig};

/// Id of the Y axis every chart carries and every unknown axis id falls back to.
pub const DEFAULT_Y_AXIS_ID: &str = "default";

/// Widget flavour; selects the type-specific key defaults layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeSeriesChartType {
    #[default]
    Default,
    Line,
    Bar,
    Point,
    State,
}

impl TimeSeriesChartType {
    #[must_use]
    pub const fn is_state(self) -> bool {
        matches!(self, Self::State)
    }

    /// Partial key settings layered between the global key defaults and the
    /// user's per-key settings.
    #[must_use]
    pub fn key_defaults(self) -> Value {
        match self {
            Self::Default | Self::Line => json!({}),
            Self::Bar => json!({ "type": "bar" }),
            Self::Point => json!({
                "type": "line",
                "lineSettings": {
                    "showLine": false,
                    "showPoints": true,
                    "pointShape": "circle",
                    "pointSize": 8
                }
            }),
            Self::State => json!({
                "type": "line",
                "lineSettings": {
                    "showLine": true,
                    "step": true,
                    "stepType": "start",
                    "smooth": false
                }
            }),
        }
    }
}

/// Presentation settings shared by X and Y axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AxisSettings {
    pub show: bool,
    pub label: String,
    pub label_font: Font,
    pub label_color: String,
    pub position: AxisPosition,
    pub show_tick_labels: bool,
    pub tick_labels_font: Font,
    pub tick_labels_color: String,
    pub show_ticks: bool,
    pub ticks_color: String,
    pub show_line: bool,
    pub line_color: String,
    pub show_split_lines: bool,
    pub split_lines_color: String,
}

impl AxisSettings {
    /// Axis name, `None` when the label is blank.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        let label = self.label.trim();
        (!label.is_empty()).then_some(label)
    }

    #[must_use]
    fn at(position: AxisPosition) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

impl Default for AxisSettings {
    fn default() -> Self {
        Self {
            show: true,
            label: String::new(),
            label_font: Font::roboto(12.0, "600"),
            label_color: ColorRole::AxisLabel.light().to_owned(),
            position: AxisPosition::Left,
            show_tick_labels: true,
            tick_labels_font: Font::roboto(12.0, "400"),
            tick_labels_color: ColorRole::AxisTickLabel.light().to_owned(),
            show_ticks: true,
            ticks_color: ColorRole::AxisTicks.light().to_owned(),
            show_line: true,
            line_color: ColorRole::AxisLine.light().to_owned(),
            show_split_lines: true,
            split_lines_color: ColorRole::AxisSplitLine.light().to_owned(),
        }
    }
}

/// Min or max bound of a Y axis: a plain number or a value source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisLimitSettings {
    Constant(f64),
    Source(ValueSourceConfig),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct YAxisSettings {
    pub id: String,
    pub order: i32,
    pub units: Option<String>,
    pub decimals: Option<u32>,
    #[serde(flatten)]
    pub axis: AxisSettings,
    pub min: Option<AxisLimitSettings>,
    pub max: Option<AxisLimitSettings>,
    pub interval: Option<f64>,
}

impl Default for YAxisSettings {
    fn default() -> Self {
        Self {
            id: DEFAULT_Y_AXIS_ID.to_owned(),
            order: 0,
            units: None,
            decimals: None,
            axis: AxisSettings::at(AxisPosition::Left),
            min: None,
            max: None,
            interval: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BarWidth {
    pub relative: bool,
    pub relative_width: f64,
    pub absolute_width: f64,
}

impl Default for BarWidth {
    fn default() -> Self {
        Self {
            relative: true,
            relative_width: 2.0,
            absolute_width: 1000.0,
        }
    }
}

impl BarWidth {
    /// Width handed to the bar renderer: percent when relative, milliseconds otherwise.
    #[must_use]
    pub fn value(self) -> f64 {
        if self.relative {
            self.relative_width
        } else {
            self.absolute_width
        }
    }
}

/// Bar width when data is not aggregated (no natural interval to fill).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoAggregationBarWidthSettings {
    pub strategy: BarWidthStrategy,
    pub group_width: BarWidth,
    pub bar_width: BarWidth,
}

impl NoAggregationBarWidthSettings {
    #[must_use]
    pub fn target_width(self) -> BarWidth {
        match self.strategy {
            BarWidthStrategy::Group => self.group_width,
            BarWidthStrategy::Separate => self.bar_width,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BarWidthSettings {
    pub bar_gap: f64,
    pub interval_gap: f64,
}

impl Default for BarWidthSettings {
    fn default() -> Self {
        Self {
            bar_gap: 0.3,
            interval_gap: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TooltipSettings {
    pub show_tooltip: bool,
    pub tooltip_trigger: TooltipTrigger,
    pub tooltip_show_date: bool,
    /// `chrono` strftime pattern.
    pub tooltip_date_format: String,
    /// Aggregated ticks show the bucket range instead of a single instant.
    pub tooltip_date_interval: bool,
    pub tooltip_time_zone_offset_minutes: i32,
    pub tooltip_show_focused_series: bool,
    pub tooltip_background_color: String,
    pub tooltip_background_blur: f64,
}

impl Default for TooltipSettings {
    fn default() -> Self {
        Self {
            show_tooltip: true,
            tooltip_trigger: TooltipTrigger::Axis,
            tooltip_show_date: true,
            tooltip_date_format: "%Y-%m-%d %H:%M:%S".to_owned(),
            tooltip_date_interval: true,
            tooltip_time_zone_offset_minutes: 0,
            tooltip_show_focused_series: false,
            tooltip_background_color: "rgba(255, 255, 255, 0.76)".to_owned(),
            tooltip_background_blur: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisualMapSettings {
    pub pieces: Vec<VisualMapPiece>,
}

/// Fully resolved chart-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeSeriesChartSettings {
    pub thresholds: Vec<ThresholdSettings>,
    pub dark_mode: bool,
    pub data_zoom: bool,
    pub stack: bool,
    pub y_axes: IndexMap<String, YAxisSettings>,
    pub x_axis: AxisSettings,
    pub comparison_enabled: bool,
    pub comparison_x_axis: AxisSettings,
    pub no_aggregation_bar_width_settings: NoAggregationBarWidthSettings,
    pub bar_width_settings: BarWidthSettings,
    #[serde(flatten)]
    pub tooltip: TooltipSettings,
    pub animation: AnimationOption,
    pub visual_map_settings: Option<VisualMapSettings>,
    pub states: Vec<StateDefinition>,
    /// Installed by the resolver for state charts.
    #[serde(skip)]
    pub state_converter: Option<StateValueConverter>,
}

impl Default for TimeSeriesChartSettings {
    fn default() -> Self {
        let mut y_axes = IndexMap::new();
        y_axes.insert(DEFAULT_Y_AXIS_ID.to_owned(), YAxisSettings::default());
        Self {
            thresholds: Vec::new(),
            dark_mode: false,
            data_zoom: true,
            stack: false,
            y_axes,
            x_axis: AxisSettings::at(AxisPosition::Bottom),
            comparison_enabled: false,
            comparison_x_axis: AxisSettings::at(AxisPosition::Top),
            no_aggregation_bar_width_settings: NoAggregationBarWidthSettings::default(),
            bar_width_settings: BarWidthSettings::default(),
            tooltip: TooltipSettings::default(),
            animation: AnimationOption::default(),
            visual_map_settings: None,
            states: Vec::new(),
            state_converter: None,
        }
    }
}

impl TimeSeriesChartSettings {
    #[must_use]
    pub fn y_axis(&self, id: &str) -> Option<&YAxisSettings> {
        self.y_axes.get(id)
    }

    /// Axis id a series or threshold actually lands on: the requested id when
    /// configured, otherwise the default axis.
    #[must_use]
    pub fn resolve_y_axis_id(&self, requested: &str) -> String {
        if self.y_axes.contains_key(requested) {
            requested.to_owned()
        } else {
            DEFAULT_Y_AXIS_ID.to_owned()
        }
    }
}
