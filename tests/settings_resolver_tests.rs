use approx::assert_relative_eq;
use serde_json::json;
use tschart::api::{
    AxisLimitSettings, DEFAULT_Y_AXIS_ID, SeriesKind, TimeSeriesChartType, ThresholdOrientation,
    ValueSourceType, resolve_chart_settings, resolve_key_settings, resolve_threshold_settings,
    resolve_y_axis_settings,
};
use tschart::core::{deep_merge, merged};
use tschart::error::ChartError;
use tschart::render::{AxisPosition, Shape};

#[test]
fn later_layers_win_field_by_field() {
    let defaults = json!({ "line": { "width": 2, "color": "red" }, "points": [1, 2, 3] });
    let user = json!({ "line": { "width": 4 }, "points": [9], "extra": true });
    let result = merged([&defaults, &user]);
    assert_eq!(
        result,
        json!({ "line": { "width": 4, "color": "red" }, "points": [9, 2, 3], "extra": true })
    );
}

#[test]
fn null_in_a_later_layer_keeps_the_earlier_value() {
    let mut target = json!({ "units": "°C", "decimals": 1 });
    deep_merge(&mut target, &json!({ "units": null, "decimals": 2 }));
    assert_eq!(target, json!({ "units": "°C", "decimals": 2 }));
}

#[test]
fn empty_input_yields_fully_populated_defaults() {
    let settings = resolve_chart_settings(&json!({}), TimeSeriesChartType::Line).expect("resolve");
    assert!(settings.data_zoom);
    assert!(settings.tooltip.show_tooltip);
    assert_eq!(settings.y_axes.len(), 1);
    let axis = settings.y_axis(DEFAULT_Y_AXIS_ID).expect("default axis");
    assert_eq!(axis.id, DEFAULT_Y_AXIS_ID);
    assert_eq!(axis.axis.position, AxisPosition::Left);
    assert_eq!(settings.x_axis.position, AxisPosition::Bottom);
    assert_eq!(settings.comparison_x_axis.position, AxisPosition::Top);
    assert!(settings.state_converter.is_none());
}

#[test]
fn partial_y_axes_are_merged_over_axis_defaults_and_keyed_by_id() {
    let settings = resolve_chart_settings(
        &json!({
            "yAxes": {
                "default": { "units": "°C" },
                "humidity": { "position": "right", "order": 1, "max": 100 },
                "pressure": { "position": "right", "order": 1, "label": "Pressure" }
            }
        }),
        TimeSeriesChartType::Line,
    )
    .expect("resolve");

    let ids: Vec<&str> = settings.y_axes.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["default", "humidity", "pressure"]);
    let default = settings.y_axis("default").expect("default");
    assert_eq!(default.units.as_deref(), Some("°C"));
    assert!(default.axis.show_tick_labels);

    let humidity = settings.y_axis("humidity").expect("humidity");
    assert_eq!(humidity.id, "humidity");
    assert_eq!(humidity.axis.position, AxisPosition::Right);
    assert!(humidity.axis.show_line);
    assert_eq!(humidity.max, Some(AxisLimitSettings::Constant(100.0)));
    assert_eq!(settings.resolve_y_axis_id("missing"), DEFAULT_Y_AXIS_ID);
    assert_eq!(settings.resolve_y_axis_id("pressure"), "pressure");
}

#[test]
fn thresholds_are_expanded_with_threshold_defaults() {
    let settings = resolve_chart_settings(
        &json!({
            "thresholds": [
                { "type": "constant", "value": 80, "lineColor": "#f44336" },
                { "type": "latestKey", "latestKey": "limit", "orientation": "vertical" }
            ]
        }),
        TimeSeriesChartType::Line,
    )
    .expect("resolve");
    assert_eq!(settings.thresholds.len(), 2);
    let first = &settings.thresholds[0];
    assert_eq!(first.source.source_type, ValueSourceType::Constant);
    assert_eq!(first.source.value, Some(80.0));
    assert_relative_eq!(first.line_width, 1.0);
    assert_eq!(first.y_axis_id, DEFAULT_Y_AXIS_ID);
    assert_eq!(first.end_symbol, Shape::Arrow);
    assert_eq!(settings.thresholds[1].orientation, ThresholdOrientation::Vertical);
}

#[test]
fn key_settings_layer_type_defaults_under_user_overrides() {
    let bar = resolve_key_settings(&json!({}), TimeSeriesChartType::Bar).expect("bar");
    assert_eq!(bar.series_type, SeriesKind::Bar);

    let point = resolve_key_settings(
        &json!({ "lineSettings": { "pointSize": 12 } }),
        TimeSeriesChartType::Point,
    )
    .expect("point");
    assert!(!point.line_settings.show_line);
    assert!(point.line_settings.show_points);
    assert_eq!(point.line_settings.point_shape, Shape::Circle);
    assert_relative_eq!(point.line_settings.point_size, 12.0);
    assert_relative_eq!(point.line_settings.line_width, 2.0);

    let state = resolve_key_settings(&json!({}), TimeSeriesChartType::State).expect("state");
    assert!(state.line_settings.step);
}

#[test]
fn state_charts_get_a_value_converter() {
    let settings = resolve_chart_settings(
        &json!({
            "states": [
                { "label": "Off", "value": 0, "sourceType": "constant", "sourceValue": false },
                { "label": "On", "value": 1, "sourceType": "constant", "sourceValue": true }
            ]
        }),
        TimeSeriesChartType::State,
    )
    .expect("resolve");
    let converter = settings.state_converter.as_ref().expect("converter");
    assert_eq!(converter.state_label(1.0), Some("On"));
}

#[test]
fn wrongly_typed_fields_report_the_settings_path() {
    let err = resolve_y_axis_settings(&json!({ "order": "first" })).unwrap_err();
    assert!(matches!(err, ChartError::InvalidSettings { ref path, .. } if path == "yAxes"));

    let err = resolve_threshold_settings(&json!({ "lineWidth": "thick" })).unwrap_err();
    assert!(matches!(err, ChartError::InvalidSettings { ref path, .. } if path == "thresholds"));
}
