mod option;
mod option_diff;
mod recording_backend;
mod style;

use indexmap::IndexMap;
use serde::Serialize;

pub use option::{
    AnimationOption, AreaStyleOption, AxisLabelOption, AxisLineOption, AxisPointerType,
    AxisTickOption, AxisValueFormat, BarRenderContext, BarSeriesStyle, BarWidthStrategy,
    ChartOption, DataZoomOption, DataZoomType, Fill, GridOption, LineSeriesStyle, LineStyleOption,
    MarkLineData, MarkLineEnd, MarkLineLabelOption, MarkLineOption, OptionSection,
    SeriesLabelOption, SeriesOption, SeriesType, SplitLineOption, TextStyleOption, TooltipOption,
    TooltipTrigger, VisualMapOption, VisualMapPiece, XAxisOption, YAxisOption,
};
pub use option_diff::{OptionPatch, OptionUpdate, SetOptionMode};
pub use recording_backend::{RecordedCall, RecordingBackend};
pub use style::{
    AxisPosition, Font, LineType, SeriesLabelPosition, Shape, StepType, ThresholdLabelPosition,
};

use crate::core::Viewport;
use crate::error::ChartResult;

/// Imperative action dispatched to the rendering backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChartAction {
    Highlight { series_id: String },
    Downplay { series_id: String },
    HideTip,
    SelectDataRange { selected: IndexMap<usize, bool> },
}

/// Measurements taken against the rendered chart.
///
/// All values are in CSS pixels and reflect the last option the backend
/// applied. Unknown axis ids measure as zero.
pub trait ChartGeometry {
    /// Width of a Y axis including tick labels.
    fn y_axis_width(&self, axis_id: &str) -> f64;
    fn y_axis_name_width(&self, axis_id: &str, name: &str) -> f64;
    /// Height of an X axis including tick labels.
    fn x_axis_height(&self, axis_id: &str) -> f64;
    fn x_axis_name_height(&self, name: &str) -> f64;
    /// Current `[min, max]` extent of an axis, `None` before the first layout.
    fn axis_extent(&self, axis_id: &str) -> Option<(f64, f64)>;
    /// Left/right overhang of threshold labels beyond the grid.
    fn threshold_label_offset(
        &self,
        axis_id: &str,
        series_id: &str,
        values: &[f64],
    ) -> (f64, f64);
}

/// Contract implemented by any rendering backend.
///
/// Backends consume a declarative [`ChartOption`] and expose the handful of
/// imperative calls the chart needs. They never call back into the chart.
pub trait ChartBackend: ChartGeometry {
    fn init(&mut self, viewport: Viewport) -> ChartResult<()>;
    fn set_option(&mut self, option: &ChartOption, update: OptionUpdate) -> ChartResult<()>;
    fn dispatch_action(&mut self, action: ChartAction) -> ChartResult<()>;
    /// Currently rendered size.
    fn size(&self) -> Viewport;
    fn resize(&mut self, viewport: Viewport) -> ChartResult<()>;
    fn dispose(&mut self);
}
