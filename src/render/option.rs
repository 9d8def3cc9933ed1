use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::ChartPoint;

use super::{AxisPosition, Font, LineType, SeriesLabelPosition, Shape, StepType, ThresholdLabelPosition};

/// Top-level sections of [`ChartOption`], the unit of replace-merge updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OptionSection {
    Theme,
    Tooltip,
    Grid,
    XAxis,
    YAxis,
    Series,
    DataZoom,
    VisualMap,
    Animation,
}

impl OptionSection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Theme => "darkMode",
            Self::Tooltip => "tooltip",
            Self::Grid => "grid",
            Self::XAxis => "xAxis",
            Self::YAxis => "yAxis",
            Self::Series => "series",
            Self::DataZoom => "dataZoom",
            Self::VisualMap => "visualMap",
            Self::Animation => "animation",
        }
    }
}

/// Declarative chart description pushed to the rendering backend.
///
/// A fresh value is produced for every update and diffed against the value
/// pushed previously (see [`super::OptionPatch`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOption {
    pub dark_mode: bool,
    pub background_color: String,
    pub tooltip: TooltipOption,
    pub grid: GridOption,
    pub x_axis: Vec<XAxisOption>,
    pub y_axis: Vec<YAxisOption>,
    pub series: Vec<SeriesOption>,
    pub data_zoom: Vec<DataZoomOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual_map: Option<VisualMapOption>,
    #[serde(flatten)]
    pub animation: AnimationOption,
}

impl ChartOption {
    #[must_use]
    pub fn series_by_id(&self, id: &str) -> Option<&SeriesOption> {
        self.series.iter().find(|series| series.id == id)
    }

    /// Serialises the option tree to the JSON shape expected by ECharts-style backends.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TooltipTrigger {
    #[default]
    Axis,
    Item,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AxisPointerType {
    #[default]
    Line,
    Shadow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipOption {
    pub show: bool,
    pub trigger: TooltipTrigger,
    pub confine: bool,
    pub axis_pointer_type: AxisPointerType,
    pub padding: [u32; 2],
    pub background_color: String,
    pub background_blur: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GridOption {
    pub top: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyleOption {
    pub color: String,
    pub font_family: String,
    pub font_size: f64,
    pub font_style: String,
    pub font_weight: String,
}

impl TextStyleOption {
    #[must_use]
    pub fn from_font(font: &Font, color: String) -> Self {
        Self {
            color,
            font_family: font.family.clone(),
            font_size: font.size,
            font_style: font.style.clone(),
            font_weight: font.weight.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisLineOption {
    pub show: bool,
    pub on_zero: bool,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTickOption {
    pub show: bool,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisLabelOption {
    pub show: bool,
    pub hide_overlap: bool,
    #[serde(flatten)]
    pub text: TextStyleOption,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitLineOption {
    pub show: bool,
    pub color: String,
}

/// Tick label formatting delegated to the backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisValueFormat {
    pub decimals: Option<u32>,
    pub units: String,
    /// State-mode ticks: numeric state value to label.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub state_labels: Vec<(f64, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XAxisOption {
    pub id: String,
    pub show: bool,
    pub position: AxisPosition,
    pub scale: bool,
    pub name: Option<String>,
    pub name_gap: Option<f64>,
    pub name_text_style: TextStyleOption,
    pub axis_line: AxisLineOption,
    pub axis_tick: AxisTickOption,
    pub axis_label: AxisLabelOption,
    pub split_line: SplitLineOption,
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YAxisOption {
    pub id: String,
    pub show: bool,
    pub position: AxisPosition,
    pub offset: f64,
    pub align_ticks: bool,
    pub scale: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub interval: Option<f64>,
    pub name: Option<String>,
    pub name_gap: Option<f64>,
    pub name_rotate: i32,
    pub name_text_style: TextStyleOption,
    pub axis_line: AxisLineOption,
    pub axis_tick: AxisTickOption,
    pub axis_label: AxisLabelOption,
    pub value_format: AxisValueFormat,
    pub split_line: SplitLineOption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesType {
    Line,
    /// Bars are drawn by a backend-side custom renderer fed by [`BarRenderContext`].
    Custom,
}

/// Solid colour or vertical two-stop opacity gradient.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Fill {
    Solid(String),
    LinearGradient { start: String, end: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesLabelOption {
    pub show: bool,
    pub position: SeriesLabelPosition,
    pub decimals: Option<u32>,
    pub units: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextStyleOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStyleOption {
    pub width: f64,
    #[serde(rename = "type")]
    pub line_type: LineType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSeriesStyle {
    pub step: Option<StepType>,
    pub smooth: bool,
    pub line_style: LineStyleOption,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_style: Option<AreaStyleOption>,
    pub show_symbol: bool,
    pub symbol: Shape,
    pub symbol_size: f64,
    pub label: SeriesLabelOption,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaStyleOption {
    pub opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Fill>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BarWidthStrategy {
    #[default]
    Group,
    Separate,
}

/// Everything a custom bar renderer needs to lay one bar out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarRenderContext {
    pub bar_gap: f64,
    pub interval_gap: f64,
    pub time_interval: Option<i64>,
    pub no_aggregation: bool,
    pub no_aggregation_strategy: BarWidthStrategy,
    pub no_aggregation_width_relative: bool,
    pub no_aggregation_width: f64,
    pub bars_count: usize,
    pub bar_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_stack_index: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stack_series_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarSeriesStyle {
    pub color: Fill,
    pub border_color: String,
    pub border_width: f64,
    pub border_radius: f64,
    pub label: SeriesLabelOption,
    pub render_context: BarRenderContext,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkLineEnd {
    /// `"min"`/`"max"` anchor on the orthogonal axis.
    pub anchor: &'static str,
    pub value: f64,
    pub symbol: Shape,
    pub symbol_size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkLineData {
    pub vertical: bool,
    pub start: MarkLineEnd,
    pub end: MarkLineEnd,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkLineLabelOption {
    pub show: bool,
    pub position: ThresholdLabelPosition,
    pub decimals: Option<u32>,
    pub units: String,
    #[serde(flatten)]
    pub text: TextStyleOption,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkLineOption {
    pub line_style: LineStyleOption,
    pub label: MarkLineLabelOption,
    pub data: Vec<MarkLineData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesOption {
    pub id: String,
    #[serde(rename = "type")]
    pub series_type: SeriesType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub x_axis_index: usize,
    pub y_axis_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    pub animation: bool,
    pub tooltip: bool,
    pub data: Arc<Vec<ChartPoint>>,
    #[serde(flatten)]
    pub line: Option<LineSeriesStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar: Option<BarSeriesStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark_line: Option<MarkLineOption>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DataZoomType {
    Inside,
    Slider,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataZoomOption {
    #[serde(rename = "type")]
    pub zoom_type: DataZoomType,
    pub disabled: bool,
    pub show: bool,
    pub realtime: bool,
    pub show_detail: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualMapPiece {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualMapOption {
    pub show: bool,
    pub dimension: usize,
    pub pieces: Vec<VisualMapPiece>,
    pub selected: IndexMap<usize, bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationOption {
    pub animation: bool,
    pub animation_threshold: u32,
    pub animation_duration: u32,
    pub animation_easing: String,
    pub animation_delay: u32,
    pub animation_duration_update: u32,
    pub animation_easing_update: String,
    pub animation_delay_update: u32,
}

impl Default for AnimationOption {
    fn default() -> Self {
        Self {
            animation: true,
            animation_threshold: 2000,
            animation_duration: 500,
            animation_easing: "cubicOut".to_owned(),
            animation_delay: 0,
            animation_duration_update: 300,
            animation_easing_update: "cubicOut".to_owned(),
            animation_delay_update: 0,
        }
    }
}
