mod axis_builder;
mod axis_layout;
mod chart;
mod chart_interaction;
mod chart_settings;
mod chart_update;
mod dynamic_limits;
mod events;
mod key_settings;
mod series_builder;
mod settings_resolver;
mod state_settings;
mod threshold_settings;
mod tooltip;
mod widget_context;

pub use axis_builder::{
    AxisLimit, COMPARISON_X_AXIS_ID, MAIN_X_AXIS_ID, TimeSeriesChartXAxis, TimeSeriesChartYAxis,
    apply_y_axis_scale, create_x_axis, create_y_axis, setup_x_axes, setup_y_axes, y_axis_index,
    y_axis_scale,
};
pub use axis_layout::{
    AXIS_GAP, AxisLayout, DATA_ZOOM_SIDE_PADDING, LayoutInput, compute_axis_layout,
    min_bottom_offset, min_top_offset,
};
pub use chart::{ChartLifecycle, TimeSeriesChart};
pub use chart_settings::{
    AxisLimitSettings, AxisSettings, BarWidth, BarWidthSettings, DEFAULT_Y_AXIS_ID,
    NoAggregationBarWidthSettings, TimeSeriesChartSettings, TimeSeriesChartType, TooltipSettings,
    VisualMapSettings, YAxisSettings,
};
pub use dynamic_limits::{
    DYNAMIC_TARGETS_SETTING, DynamicSource, DynamicSourcePlan, DynamicTarget, DynamicUpdate,
    LimitBound, apply_auxiliary_data, apply_latest_data, dynamic_targets, parse_threshold_data,
    resolve_value_source,
};
pub use events::{HostEvent, ListenerId, ValueSubject};
pub use key_settings::{
    BarSeriesSettings, FillGradient, LineSeriesSettings, SeriesFillSettings, SeriesFillType,
    SeriesKind, TimeSeriesChartKeySettings,
};
pub use series_builder::{
    SeriesContext, TimeSeriesChartDataItem, TimeSeriesChartThresholdItem, generate_chart_series,
    setup_data_items, setup_threshold_items, to_chart_points,
};
pub use settings_resolver::{
    resolve_chart_settings, resolve_key_settings, resolve_threshold_settings,
    resolve_y_axis_settings,
};
pub use state_settings::{StateDefinition, StateSourceType, StateValueConverter};
pub use threshold_settings::{
    ThresholdOrientation, ThresholdSettings, ValueSourceConfig, ValueSourceType,
};
pub use tooltip::{TooltipContent, TooltipContext, TooltipParam, TooltipRow, format_tooltip};
pub use widget_context::{
    DataTick, HostListener, StaticWidgetServices, SubscriptionHandle, ThemeContext,
    WidgetContext, WidgetServices,
};
