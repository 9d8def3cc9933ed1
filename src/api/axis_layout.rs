use crate::render::{AxisPosition, ChartGeometry, GridOption, XAxisOption, YAxisOption};

use super::axis_builder::{TimeSeriesChartXAxis, TimeSeriesChartYAxis};
use super::series_builder::{TimeSeriesChartDataItem, TimeSeriesChartThresholdItem};

/// Gap between two Y axes stacked on the same side.
pub const AXIS_GAP: f64 = 5.0;

/// Grid padding used with data zoom when no axis occupies a side.
pub const DATA_ZOOM_SIDE_PADDING: f64 = 5.0;

/// Layout inputs that do not come from the backend.
#[derive(Debug, Clone, Copy)]
pub struct LayoutInput<'a> {
    pub x_axes: &'a [TimeSeriesChartXAxis],
    pub y_axes: &'a [TimeSeriesChartYAxis],
    pub thresholds: &'a [TimeSeriesChartThresholdItem],
    pub data_zoom: bool,
    pub min_top_offset: f64,
    pub min_bottom_offset: f64,
}

/// Axis options and grid padding computed from measured geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLayout {
    pub grid: GridOption,
    pub x_axis: Vec<XAxisOption>,
    pub y_axis: Vec<YAxisOption>,
}

/// Minimum top offset: room for labels drawn above the plot, otherwise for
/// the topmost tick label.
#[must_use]
pub fn min_top_offset(
    items: &[TimeSeriesChartDataItem],
    thresholds: &[TimeSeriesChartThresholdItem],
    y_axes: &[TimeSeriesChartYAxis],
) -> f64 {
    let top_labels = items.iter().any(|item| item.settings.has_top_label())
        || thresholds.iter().any(|threshold| {
            threshold.settings.show_label && !threshold.settings.label_position.is_bottom()
        });
    if top_labels {
        25.0
    } else if y_axes
        .iter()
        .any(|axis| axis.option.show && axis.option.axis_label.show)
    {
        10.0
    } else {
        5.0
    }
}

#[must_use]
pub fn min_bottom_offset(data_zoom: bool) -> f64 {
    if data_zoom { 45.0 } else { 5.0 }
}

/// Lays Y axes out side by side, names them when they render, and sizes the
/// grid around axes, axis names and threshold labels.
///
/// Pure over `geometry`: two calls with unchanged measurements return equal
/// layouts.
#[must_use]
pub fn compute_axis_layout(input: LayoutInput<'_>, geometry: &dyn ChartGeometry) -> AxisLayout {
    let mut y_axis: Vec<YAxisOption> = input
        .y_axes
        .iter()
        .map(|axis| axis.option.clone())
        .collect();

    let mut left = stack_side(input.y_axes, &mut y_axis, AxisPosition::Left, geometry);
    let mut right = stack_side(input.y_axes, &mut y_axis, AxisPosition::Right, geometry);
    if input.data_zoom {
        if left == 0.0 {
            left = DATA_ZOOM_SIDE_PADDING;
        }
        if right == 0.0 {
            right = DATA_ZOOM_SIDE_PADDING;
        }
    }

    let mut top = input.min_top_offset;
    let mut bottom = input.min_bottom_offset;
    let mut x_axis: Vec<XAxisOption> = Vec::with_capacity(input.x_axes.len());
    for axis in input.x_axes {
        let mut option = axis.option.clone();
        if option.show {
            let height = geometry.x_axis_height(&axis.id);
            let mut extent = height;
            match axis.settings.label() {
                Some(label) => {
                    option.name = Some(label.to_owned());
                    option.name_gap = Some(height);
                    extent += geometry.x_axis_name_height(label);
                }
                None => {
                    option.name = None;
                    option.name_gap = None;
                }
            }
            if option.position == AxisPosition::Top {
                top = top.max(extent);
            } else {
                bottom += extent;
            }
        }
        x_axis.push(option);
    }

    for threshold in input.thresholds {
        let Some(values) = threshold.values.as_deref() else {
            continue;
        };
        if !threshold.settings.show_label || values.is_empty() {
            continue;
        }
        let (threshold_left, threshold_right) =
            geometry.threshold_label_offset(&threshold.y_axis_id, &threshold.id, values);
        left = left.max(threshold_left);
        right = right.max(threshold_right);
    }

    AxisLayout {
        grid: GridOption {
            top,
            left,
            right,
            bottom,
        },
        x_axis,
        y_axis,
    }
}

fn stack_side(
    axes: &[TimeSeriesChartYAxis],
    options: &mut [YAxisOption],
    side: AxisPosition,
    geometry: &dyn ChartGeometry,
) -> f64 {
    let mut offset = 0.0;
    let mut previous_width = 0.0;
    for (axis, option) in axes.iter().zip(options.iter_mut()) {
        if option.position != side {
            continue;
        }
        let width = geometry.y_axis_width(&axis.id);
        if previous_width > 0.0 && width > 0.0 {
            offset += AXIS_GAP;
        }
        previous_width = width;
        option.offset = offset;
        option.axis_line.show = axis.settings.axis.show_line && width > 0.0;
        match axis.settings.axis.label() {
            Some(label) if width > 0.0 => {
                option.name = Some(label.to_owned());
                option.name_gap = Some(width);
                offset += geometry.y_axis_name_width(&axis.id, label);
            }
            _ => {
                option.name = None;
                option.name_gap = None;
            }
        }
        offset += width;
    }
    offset
}
