use serde::{Deserialize, Serialize};

use crate::core::ColorRole;
use crate::render::{Font, LineType, SeriesLabelPosition, Shape, StepType};

use super::chart_settings::DEFAULT_Y_AXIS_ID;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesKind {
    #[default]
    Line,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesFillType {
    #[default]
    None,
    Opacity,
    Gradient,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FillGradient {
    /// Opacity at the top of the fill, 0-100.
    pub start: f64,
    /// Opacity at the bottom of the fill, 0-100.
    pub end: f64,
}

impl Default for FillGradient {
    fn default() -> Self {
        Self {
            start: 100.0,
            end: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeriesFillSettings {
    #[serde(rename = "type")]
    pub fill_type: SeriesFillType,
    pub opacity: f64,
    pub gradient: FillGradient,
}

impl Default for SeriesFillSettings {
    fn default() -> Self {
        Self {
            fill_type: SeriesFillType::None,
            opacity: 0.4,
            gradient: FillGradient::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineSeriesSettings {
    pub show_line: bool,
    pub step: bool,
    pub step_type: StepType,
    pub smooth: bool,
    pub line_type: LineType,
    pub line_width: f64,
    pub show_points: bool,
    pub show_point_label: bool,
    pub point_label_position: SeriesLabelPosition,
    pub point_label_font: Font,
    pub point_label_color: String,
    pub point_shape: Shape,
    pub point_size: f64,
    pub fill_area_settings: SeriesFillSettings,
}

impl Default for LineSeriesSettings {
    fn default() -> Self {
        Self {
            show_line: true,
            step: false,
            step_type: StepType::Start,
            smooth: false,
            line_type: LineType::Solid,
            line_width: 2.0,
            show_points: false,
            show_point_label: false,
            point_label_position: SeriesLabelPosition::Top,
            point_label_font: Font::roboto(11.0, "500"),
            point_label_color: ColorRole::SeriesLabel.light().to_owned(),
            point_shape: Shape::EmptyCircle,
            point_size: 4.0,
            fill_area_settings: SeriesFillSettings::default(),
        }
    }
}

impl LineSeriesSettings {
    #[must_use]
    pub fn has_top_label(&self) -> bool {
        self.show_point_label && self.point_label_position == SeriesLabelPosition::Top
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BarSeriesSettings {
    pub show_border: bool,
    pub border_width: f64,
    pub border_radius: f64,
    pub show_label: bool,
    pub label_position: SeriesLabelPosition,
    pub label_font: Font,
    pub label_color: String,
    pub background_settings: SeriesFillSettings,
}

impl Default for BarSeriesSettings {
    fn default() -> Self {
        Self {
            show_border: false,
            border_width: 2.0,
            border_radius: 0.0,
            show_label: false,
            label_position: SeriesLabelPosition::Top,
            label_font: Font::roboto(11.0, "500"),
            label_color: ColorRole::SeriesLabel.light().to_owned(),
            background_settings: SeriesFillSettings {
                fill_type: SeriesFillType::Opacity,
                ..SeriesFillSettings::default()
            },
        }
    }
}

/// Fully resolved settings of one data key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeSeriesChartKeySettings {
    pub show_in_legend: bool,
    pub data_hidden_by_default: bool,
    #[serde(rename = "type")]
    pub series_type: SeriesKind,
    pub y_axis_id: String,
    pub line_settings: LineSeriesSettings,
    pub bar_settings: BarSeriesSettings,
}

impl Default for TimeSeriesChartKeySettings {
    fn default() -> Self {
        Self {
            show_in_legend: true,
            data_hidden_by_default: false,
            series_type: SeriesKind::Line,
            y_axis_id: DEFAULT_Y_AXIS_ID.to_owned(),
            line_settings: LineSeriesSettings::default(),
            bar_settings: BarSeriesSettings::default(),
        }
    }
}

impl TimeSeriesChartKeySettings {
    #[must_use]
    pub fn is_bar(&self) -> bool {
        self.series_type == SeriesKind::Bar
    }

    /// Whether the series draws labels above the plot area.
    #[must_use]
    pub fn has_top_label(&self) -> bool {
        match self.series_type {
            SeriesKind::Line => self.line_settings.has_top_label(),
            SeriesKind::Bar => self.bar_settings.show_label,
        }
    }
}
