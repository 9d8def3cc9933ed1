use std::collections::HashMap;

use approx::assert_relative_eq;
use serde_json::{Value, json};
use tschart::api::{
    AXIS_GAP, DynamicSourcePlan, LayoutInput, TimeSeriesChartSettings, TimeSeriesChartThresholdItem,
    TimeSeriesChartType, TimeSeriesChartXAxis, TimeSeriesChartYAxis, WidgetContext,
    compute_axis_layout, min_bottom_offset, min_top_offset, resolve_chart_settings,
    setup_data_items, setup_threshold_items, setup_x_axes, setup_y_axes,
};
use tschart::core::{DataKey, DataKeyType, Datasource, TimeWindow};
use tschart::render::{AxisPosition, ChartGeometry};

#[derive(Default)]
struct FixedGeometry {
    y_widths: HashMap<String, f64>,
    name_width: f64,
    x_height: f64,
    x_name_height: f64,
    threshold_offset: (f64, f64),
}

impl ChartGeometry for FixedGeometry {
    fn y_axis_width(&self, axis_id: &str) -> f64 {
        self.y_widths.get(axis_id).copied().unwrap_or(0.0)
    }

    fn y_axis_name_width(&self, _axis_id: &str, _name: &str) -> f64 {
        self.name_width
    }

    fn x_axis_height(&self, _axis_id: &str) -> f64 {
        self.x_height
    }

    fn x_axis_name_height(&self, _name: &str) -> f64 {
        self.x_name_height
    }

    fn axis_extent(&self, _axis_id: &str) -> Option<(f64, f64)> {
        None
    }

    fn threshold_label_offset(&self, _axis_id: &str, _series_id: &str, _values: &[f64]) -> (f64, f64) {
        self.threshold_offset
    }
}

struct Fixture {
    settings: TimeSeriesChartSettings,
    x_axes: Vec<TimeSeriesChartXAxis>,
    y_axes: Vec<TimeSeriesChartYAxis>,
    thresholds: Vec<TimeSeriesChartThresholdItem>,
}

fn fixture(input: Value) -> Fixture {
    let settings = resolve_chart_settings(&input, TimeSeriesChartType::Line).expect("settings");
    let context = WidgetContext::new("Layout", TimeWindow::new(0, 60_000)).with_datasource(
        Datasource::entity("Sensor").with_data_key(DataKey::new("value", DataKeyType::Timeseries)),
    );
    let mut plan = DynamicSourcePlan::default();
    let x_axes = setup_x_axes(&settings, &context, false);
    let y_axes = setup_y_axes(&settings, &context, false, |_| None, &mut plan);
    let thresholds = setup_threshold_items(&context, &settings, &y_axes, |_| None, &mut plan);
    Fixture {
        settings,
        x_axes,
        y_axes,
        thresholds,
    }
}

impl Fixture {
    fn input(&self) -> LayoutInput<'_> {
        LayoutInput {
            x_axes: &self.x_axes,
            y_axes: &self.y_axes,
            thresholds: &self.thresholds,
            data_zoom: self.settings.data_zoom,
            min_top_offset: 10.0,
            min_bottom_offset: min_bottom_offset(self.settings.data_zoom),
        }
    }
}

#[test]
fn axes_on_one_side_are_stacked_with_a_gap() {
    let fixture = fixture(json!({
        "dataZoom": false,
        "yAxes": {
            "default": { "label": "Temperature" },
            "humidity": { "position": "right", "order": 1 },
            "pressure": { "position": "right", "order": 2, "label": "Pressure" }
        }
    }));
    let geometry = FixedGeometry {
        y_widths: HashMap::from([
            ("default".to_owned(), 30.0),
            ("humidity".to_owned(), 25.0),
            ("pressure".to_owned(), 35.0),
        ]),
        name_width: 16.0,
        ..FixedGeometry::default()
    };

    let layout = compute_axis_layout(fixture.input(), &geometry);
    let [default, humidity, pressure] = layout.y_axis.as_slice() else {
        panic!("expected three axes");
    };
    assert_eq!(default.name.as_deref(), Some("Temperature"));
    assert_eq!(default.name_gap, Some(30.0));
    assert_relative_eq!(layout.grid.left, 30.0 + 16.0);

    assert_relative_eq!(humidity.offset, 0.0);
    assert_eq!(humidity.name, None);
    assert_relative_eq!(pressure.offset, 25.0 + AXIS_GAP);
    assert_eq!(pressure.position, AxisPosition::Right);
    assert_relative_eq!(layout.grid.right, 25.0 + AXIS_GAP + 16.0 + 35.0);
}

#[test]
fn zero_width_axes_hide_name_and_line() {
    let fixture = fixture(json!({ "yAxes": { "default": { "label": "Temperature" } } }));
    let layout = compute_axis_layout(fixture.input(), &FixedGeometry::default());
    let axis = &layout.y_axis[0];
    assert_eq!(axis.name, None);
    assert!(!axis.axis_line.show);
    // Data zoom pads both empty sides.
    assert_relative_eq!(layout.grid.left, 5.0);
    assert_relative_eq!(layout.grid.right, 5.0);
}

#[test]
fn x_axis_name_sits_below_the_tick_labels() {
    let fixture = fixture(json!({ "xAxis": { "label": "Time" }, "dataZoom": false }));
    let geometry = FixedGeometry {
        x_height: 24.0,
        x_name_height: 14.0,
        ..FixedGeometry::default()
    };
    let layout = compute_axis_layout(fixture.input(), &geometry);
    assert_eq!(layout.x_axis[0].name.as_deref(), Some("Time"));
    assert_eq!(layout.x_axis[0].name_gap, Some(24.0));
    assert_relative_eq!(layout.grid.bottom, 5.0 + 24.0 + 14.0);
}

#[test]
fn comparison_axis_on_top_raises_the_top_offset() {
    let fixture = fixture(json!({ "comparisonEnabled": true }));
    let geometry = FixedGeometry {
        x_height: 24.0,
        ..FixedGeometry::default()
    };
    let layout = compute_axis_layout(fixture.input(), &geometry);
    assert_eq!(layout.x_axis.len(), 2);
    assert_relative_eq!(layout.grid.top, 24.0);
    assert_relative_eq!(layout.grid.bottom, 45.0 + 24.0);
}

#[test]
fn threshold_labels_widen_the_grid() {
    let fixture = fixture(json!({
        "thresholds": [{ "type": "constant", "value": 50, "showLabel": true }]
    }));
    assert_eq!(fixture.thresholds[0].values.as_deref(), Some(&[50.0][..]));
    let geometry = FixedGeometry {
        y_widths: HashMap::from([("default".to_owned(), 30.0)]),
        threshold_offset: (12.0, 48.0),
        ..FixedGeometry::default()
    };
    let layout = compute_axis_layout(fixture.input(), &geometry);
    assert_relative_eq!(layout.grid.left, 30.0);
    assert_relative_eq!(layout.grid.right, 48.0);
}

#[test]
fn layout_is_idempotent_over_unchanged_geometry() {
    let fixture = fixture(json!({
        "yAxes": { "humidity": { "position": "right", "label": "Humidity" } }
    }));
    let geometry = FixedGeometry {
        y_widths: HashMap::from([("default".to_owned(), 30.0), ("humidity".to_owned(), 28.0)]),
        name_width: 12.0,
        x_height: 20.0,
        ..FixedGeometry::default()
    };
    let first = compute_axis_layout(fixture.input(), &geometry);
    let second = compute_axis_layout(fixture.input(), &geometry);
    assert_eq!(first, second);
}

#[test]
fn top_offset_reserves_room_for_labels_above_the_plot() {
    let settings = resolve_chart_settings(&json!({}), TimeSeriesChartType::Line).expect("settings");
    let labelled = DataKey::new("value", DataKeyType::Timeseries)
        .with_settings(json!({ "lineSettings": { "showPointLabel": true } }));
    let context = WidgetContext::new("Layout", TimeWindow::new(0, 60_000))
        .with_datasource(Datasource::entity("Sensor").with_data_key(labelled));
    let mut plan = DynamicSourcePlan::default();
    let y_axes = setup_y_axes(&settings, &context, false, |_| None, &mut plan);
    let items = setup_data_items(&context, &settings, TimeSeriesChartType::Line, &y_axes);
    assert_relative_eq!(min_top_offset(&items, &[], &y_axes), 25.0);
    assert_relative_eq!(min_top_offset(&[], &[], &y_axes), 10.0);
    assert_relative_eq!(min_top_offset(&[], &[], &[]), 5.0);
}

#[test]
fn items_on_unknown_axes_take_the_id_of_the_axis_they_land_on() {
    let mut settings = resolve_chart_settings(
        &json!({
            "yAxes": { "power": { "position": "right" } },
            "thresholds": [{ "type": "constant", "value": 5, "yAxisId": "missing" }]
        }),
        TimeSeriesChartType::Bar,
    )
    .expect("settings");
    settings.y_axes.shift_remove("default");
    let key = DataKey::new("energy", DataKeyType::Timeseries)
        .with_settings(json!({ "yAxisId": "missing" }));
    let context = WidgetContext::new("Layout", TimeWindow::new(0, 60_000))
        .with_datasource(Datasource::entity("Meter").with_data_key(key));
    let mut plan = DynamicSourcePlan::default();
    let y_axes = setup_y_axes(&settings, &context, false, |_| None, &mut plan);
    assert_eq!(y_axes.len(), 1);

    let items = setup_data_items(&context, &settings, TimeSeriesChartType::Bar, &y_axes);
    assert_eq!(items[0].y_axis_index, Some(0));
    assert_eq!(items[0].y_axis_id, "power");

    let thresholds = setup_threshold_items(&context, &settings, &y_axes, |_| None, &mut plan);
    assert_eq!(thresholds[0].y_axis_index, Some(0));
    assert_eq!(thresholds[0].y_axis_id, "power");
}
