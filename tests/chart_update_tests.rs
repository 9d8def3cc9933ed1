use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::{Value, json};
use tschart::api::{
    ChartLifecycle, DataTick, HostEvent, StaticWidgetServices, TimeSeriesChart,
    TimeSeriesChartType, WidgetContext,
};
use tschart::core::{
    AggregationType, DataKey, DataKeyRef, DataKeyType, Datasource, DatasourceData, TimeWindow,
    TsPoint, Viewport,
};
use tschart::error::ChartError;
use tschart::render::{
    AxisPointerType, ChartAction, OptionSection, RecordedCall, RecordingBackend, SetOptionMode,
};

type Chart = TimeSeriesChart<RecordingBackend, StaticWidgetServices>;

fn context_with(keys: Vec<DataKey>) -> WidgetContext {
    let mut datasource = Datasource::entity("Boiler");
    for key in keys {
        datasource = datasource.with_data_key(key);
    }
    WidgetContext::new("Boiler temperature", TimeWindow::new(0, 10_000))
        .with_datasource(datasource)
        .with_container(Viewport::new(800, 400))
}

fn chart_with(context: WidgetContext, settings: Value) -> Chart {
    TimeSeriesChart::new(
        RecordingBackend::with_axis_sizes(40.0, 20.0),
        StaticWidgetServices::new(),
        context,
        &settings,
        TimeSeriesChartType::Line,
    )
    .expect("chart init")
}

fn temperature_tick(window: TimeWindow) -> DataTick {
    DataTick::new(
        window,
        vec![DatasourceData::new(
            DataKeyRef::series(0, 0),
            vec![TsPoint::new(1000, 5), TsPoint::new(2000, 7)],
        )],
    )
}

#[test]
fn single_line_key_update_produces_one_series_and_one_x_axis() {
    let context = context_with(vec![DataKey::new("temperature", DataKeyType::Timeseries)]);
    let mut chart = chart_with(context, json!({}));
    assert_eq!(chart.lifecycle(), ChartLifecycle::Active);

    chart
        .update(temperature_tick(TimeWindow::new(0, 10_000)))
        .expect("update");

    let option = chart.option().expect("option");
    assert_eq!(option.series.len(), 1);
    assert_eq!(option.series[0].id, "series_0_0");
    assert_eq!(option.series[0].data.len(), 2);
    assert_eq!(option.series[0].data[1].value, Some(7.0));
    assert_eq!(chart.x_axes().len(), 1);
}

#[test]
fn comparison_window_is_applied_to_the_second_x_axis_only() {
    let context = context_with(vec![
        DataKey::new("temperature", DataKeyType::Timeseries),
        DataKey::new("temperature", DataKeyType::Timeseries).with_comparison(true),
    ])
    .with_comparison_time_window(TimeWindow::new(-86_400_000, -86_390_000));
    let mut chart = chart_with(context, json!({ "comparisonEnabled": true }));
    assert_eq!(chart.x_axes().len(), 2);

    let main = TimeWindow::new(5_000, 15_000);
    let comparison = TimeWindow::new(-86_395_000, -86_385_000);
    chart
        .update(temperature_tick(main).with_comparison_time_window(comparison))
        .expect("update");

    let axes = chart.x_axes();
    assert_eq!((axes[0].option.min, axes[0].option.max), (5_000, 15_000));
    assert_eq!(
        (axes[1].option.min, axes[1].option.max),
        (-86_395_000, -86_385_000)
    );
    assert_eq!(chart.data_items()[1].x_axis_index, 1);
}

#[test]
fn showing_a_hidden_key_highlights_its_series_and_inverts_hidden() {
    let mut hidden = DataKey::new("pressure", DataKeyType::Timeseries);
    hidden.hidden = true;
    let context = context_with(vec![
        DataKey::new("temperature", DataKeyType::Timeseries),
        hidden,
    ]);
    let mut chart = chart_with(context, json!({}));
    let key = DataKeyRef::series(0, 1);
    assert!(!chart.data_items()[1].enabled);
    assert_eq!(chart.option().expect("option").series.len(), 1);

    chart.backend_mut().clear_calls();
    assert_eq!(chart.toggle_key(key).expect("toggle"), Some(true));

    assert!(chart.backend().actions().contains(&&ChartAction::Highlight {
        series_id: "series_0_1".to_owned()
    }));
    assert!(!chart.data_key(key).expect("key").hidden);
    assert_eq!(chart.option().expect("option").series.len(), 2);

    chart.backend_mut().clear_calls();
    assert_eq!(chart.toggle_key(key).expect("toggle"), Some(false));
    assert_eq!(
        chart.backend().actions().first(),
        Some(&&ChartAction::Downplay {
            series_id: "series_0_1".to_owned()
        })
    );
    assert!(chart.data_key(key).expect("key").hidden);
}

#[test]
fn repeated_layout_pass_does_not_push_options() {
    let context = context_with(vec![DataKey::new("temperature", DataKeyType::Timeseries)]);
    let mut chart = chart_with(context, json!({}));
    chart
        .update(temperature_tick(TimeWindow::new(0, 10_000)))
        .expect("update");

    chart.backend_mut().clear_calls();
    chart.handle_host_event(HostEvent::DataZoom).expect("zoom");
    chart.handle_host_event(HostEvent::DataZoom).expect("zoom");
    assert!(chart.backend().set_option_calls().is_empty());
}

#[test]
fn first_draw_replaces_everything_then_lays_axes_out() {
    let context = context_with(vec![DataKey::new("temperature", DataKeyType::Timeseries)]);
    let chart = chart_with(context, json!({}));
    let calls = chart.backend().set_option_calls();
    assert_eq!(calls[0].mode, SetOptionMode::NotMerge);
    let Some(layout) = calls.get(1) else {
        panic!("expected a layout pass after the first draw");
    };
    let SetOptionMode::ReplaceMerge(sections) = &layout.mode else {
        panic!("layout pass must replace sections");
    };
    assert!(sections.contains(&OptionSection::Grid));
    assert!(!sections.contains(&OptionSection::Series));

    let grid = chart.option().expect("option").grid;
    // Default axis on the left, data zoom padding on the right.
    assert_eq!(grid.left, 40.0);
    assert_eq!(grid.right, 5.0);
    assert_eq!(grid.bottom, 45.0 + 20.0);
}

#[test]
fn unchanged_data_keeps_series_data_identity_and_skips_the_push() {
    let context = context_with(vec![DataKey::new("temperature", DataKeyType::Timeseries)]);
    let mut chart = chart_with(context, json!({}));
    let window = TimeWindow::new(0, 10_000);
    chart.update(temperature_tick(window)).expect("update");
    let before = Arc::clone(&chart.data_items()[0].data);

    chart.backend_mut().clear_calls();
    chart.update(temperature_tick(window)).expect("update");
    assert!(Arc::ptr_eq(&before, &chart.data_items()[0].data));
    assert!(chart.backend().set_option_calls().is_empty());
}

#[test]
fn chart_waits_for_a_container_before_drawing() {
    let context = context_with(vec![DataKey::new("temperature", DataKeyType::Timeseries)])
        .with_container(Viewport::new(0, 0));
    let mut chart = chart_with(context, json!({}));
    assert_eq!(chart.lifecycle(), ChartLifecycle::Uninitialized);
    chart
        .update(temperature_tick(TimeWindow::new(0, 10_000)))
        .expect("update");
    assert!(chart.option().is_none());

    chart.resize(Viewport::new(640, 320)).expect("resize");
    assert_eq!(chart.lifecycle(), ChartLifecycle::Active);
    assert_eq!(chart.option().expect("option").series[0].data.len(), 2);
}

#[test]
fn resize_toggles_bar_animation_around_the_backend_resize() {
    let context = context_with(vec![DataKey::new("energy", DataKeyType::Timeseries)]);
    let mut chart = TimeSeriesChart::new(
        RecordingBackend::with_axis_sizes(40.0, 20.0),
        StaticWidgetServices::new(),
        context,
        &json!({}),
        TimeSeriesChartType::Bar,
    )
    .expect("chart init");
    assert!(!chart.y_axes()[0].option.scale);

    chart.backend_mut().clear_calls();
    chart.resize(Viewport::new(900, 400)).expect("resize");
    let calls = &chart.backend().calls;
    let resize_at = calls
        .iter()
        .position(|call| matches!(call, RecordedCall::Resize(_)))
        .expect("resize call");
    assert!(matches!(calls[0], RecordedCall::SetOption(_)));
    assert!(matches!(calls[resize_at + 1], RecordedCall::SetOption(_)));
    assert!(chart.data_items()[0].bar_animation);
    assert!(chart.option().expect("option").series[0].animation);
}

#[test]
fn highlight_survives_updates_until_the_key_is_left() {
    let context = context_with(vec![DataKey::new("temperature", DataKeyType::Timeseries)]);
    let mut chart = chart_with(context, json!({}));
    let key = DataKeyRef::series(0, 0);
    chart.key_enter(key).expect("enter");

    chart.backend_mut().clear_calls();
    chart
        .update(temperature_tick(TimeWindow::new(0, 10_000)))
        .expect("update");
    assert_eq!(
        chart.backend().actions().last(),
        Some(&&ChartAction::Highlight {
            series_id: "series_0_0".to_owned()
        })
    );

    chart.key_leave(key).expect("leave");
    chart.backend_mut().clear_calls();
    chart
        .update(temperature_tick(TimeWindow::new(0, 20_000)))
        .expect("update");
    assert!(chart.backend().actions().is_empty());
}

#[test]
fn published_extent_follows_the_layout_pass() {
    let context = context_with(vec![DataKey::new("temperature", DataKeyType::Timeseries)]);
    let mut backend = RecordingBackend::with_axis_sizes(40.0, 20.0);
    backend.extents.insert("default".to_owned(), (0.0, 10.0));
    let mut chart = TimeSeriesChart::new(
        backend,
        StaticWidgetServices::new(),
        context,
        &json!({}),
        TimeSeriesChartType::Line,
    )
    .expect("chart init");
    assert_eq!(chart.y_min(), Some(0.0));

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    chart
        .subscribe_y_max(move |value| sink.borrow_mut().push(*value))
        .expect("subscribe");
    chart
        .backend_mut()
        .extents
        .insert("default".to_owned(), (0.0, 20.0));
    chart.handle_host_event(HostEvent::DataZoom).expect("zoom");

    assert_eq!(*seen.borrow(), vec![Some(10.0), Some(20.0)]);
}

#[test]
fn destroy_is_idempotent_and_releases_everything() {
    let context = context_with(vec![DataKey::new("temperature", DataKeyType::Timeseries)]);
    let mut chart = chart_with(context, json!({}));
    assert!(!chart.services().active_handles().is_empty());

    chart.destroy();
    chart.destroy();

    assert_eq!(chart.lifecycle(), ChartLifecycle::Destroyed);
    assert!(chart.backend().disposed);
    assert!(chart.services().active_handles().is_empty());
    assert!(chart.subscribe_y_min(|_| {}).is_none());
    let disposals = chart
        .backend()
        .calls
        .iter()
        .filter(|call| matches!(call, RecordedCall::Dispose))
        .count();
    assert_eq!(disposals, 1);

    assert!(matches!(
        chart.update(temperature_tick(TimeWindow::new(0, 1))),
        Err(ChartError::Destroyed)
    ));
    assert!(chart.handle_host_event(HostEvent::Scrolled).is_ok());
}

#[test]
fn scroll_hides_the_tooltip_and_theme_change_recolours() {
    let context = context_with(vec![DataKey::new("temperature", DataKeyType::Timeseries)]);
    let mut chart = chart_with(context, json!({}));
    chart.backend_mut().clear_calls();

    chart.handle_host_event(HostEvent::Scrolled).expect("scroll");
    assert_eq!(chart.backend().actions(), vec![&ChartAction::HideTip]);

    let light_color = chart.y_axes()[0].option.axis_label.text.color.clone();
    chart
        .handle_host_event(HostEvent::ThemeChanged { dark_mode: true })
        .expect("theme");
    assert!(chart.is_dark_mode());
    assert!(chart.option().expect("option").dark_mode);
    assert_ne!(chart.y_axes()[0].option.axis_label.text.color, light_color);
    assert!(
        chart
            .backend()
            .set_option_calls()
            .iter()
            .any(|update| update.mode == SetOptionMode::Merge)
    );
}

#[test]
fn visual_map_toggle_dispatches_the_full_selection() {
    let context = context_with(vec![DataKey::new("temperature", DataKeyType::Timeseries)]);
    let settings = json!({
        "visualMapSettings": {
            "pieces": [
                { "lt": 10.0, "color": "#2196f3" },
                { "gte": 10.0, "color": "#f44336" }
            ]
        }
    });
    let mut chart = chart_with(context, settings);
    assert_eq!(chart.toggle_visual_map_range(1).expect("toggle"), Some(false));
    assert_eq!(chart.toggle_visual_map_range(7).expect("toggle"), None);

    let Some(ChartAction::SelectDataRange { selected }) = chart.backend().actions().last().copied()
    else {
        panic!("expected a selectDataRange dispatch");
    };
    assert_eq!(selected.get(&0), Some(&true));
    assert_eq!(selected.get(&1), Some(&false));
    let visual_map = chart
        .option()
        .and_then(|option| option.visual_map.as_ref())
        .expect("visual map");
    assert_eq!(visual_map.selected.get(&1), Some(&false));
}

#[test]
fn malformed_chart_settings_are_rejected() {
    let context = context_with(vec![DataKey::new("temperature", DataKeyType::Timeseries)]);
    let result = TimeSeriesChart::new(
        RecordingBackend::default(),
        StaticWidgetServices::new(),
        context,
        &json!({ "dataZoom": "sometimes" }),
        TimeSeriesChartType::Line,
    );
    assert!(matches!(result, Err(ChartError::InvalidSettings { .. })));
}

#[test]
fn stacked_series_are_always_replaced_in_full() {
    let context = context_with(vec![
        DataKey::new("temperature", DataKeyType::Timeseries),
        DataKey::new("humidity", DataKeyType::Timeseries),
    ]);
    let mut chart = chart_with(context, json!({ "stack": true }));
    chart.backend_mut().clear_calls();

    chart
        .update(temperature_tick(TimeWindow::new(0, 10_000)))
        .expect("update");
    let calls = chart.backend().set_option_calls();
    assert_eq!(calls[0].mode, SetOptionMode::NotMerge);

    chart.backend_mut().clear_calls();
    chart
        .update(temperature_tick(TimeWindow::new(0, 20_000)))
        .expect("update");
    let calls = chart.backend().set_option_calls();
    assert_eq!(calls[0].mode, SetOptionMode::NotMerge);
}

#[test]
fn aggregated_ticks_switch_the_axis_pointer_to_shadow() {
    let context = context_with(vec![DataKey::new("temperature", DataKeyType::Timeseries)]);
    let mut chart = chart_with(context, json!({}));
    chart
        .update(temperature_tick(TimeWindow::new(0, 10_000)))
        .expect("update");
    assert_eq!(
        chart.option().expect("option").tooltip.axis_pointer_type,
        AxisPointerType::Line
    );

    chart.backend_mut().clear_calls();
    chart
        .update(temperature_tick(TimeWindow::new(0, 10_000)).with_aggregation(AggregationType::Avg))
        .expect("update");
    assert_eq!(
        chart.option().expect("option").tooltip.axis_pointer_type,
        AxisPointerType::Shadow
    );
    let calls = chart.backend().set_option_calls();
    let SetOptionMode::ReplaceMerge(sections) = &calls[0].mode else {
        panic!("data push must replace sections");
    };
    assert!(sections.contains(&OptionSection::Tooltip));
    assert!(sections.contains(&OptionSection::Series));

    chart.backend_mut().clear_calls();
    chart
        .update(temperature_tick(TimeWindow::new(0, 10_000)))
        .expect("update");
    assert_eq!(
        chart.option().expect("option").tooltip.axis_pointer_type,
        AxisPointerType::Line
    );
}
