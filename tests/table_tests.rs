use serde_json::{Value, json};
use tschart::api::WidgetContext;
use tschart::core::{
    DataKey, DataKeyRef, DataKeyType, Datasource, DatasourceData, TimeWindow, TsPoint,
};
use tschart::error::ChartError;
use tschart::table::{Direction, RowData, SortOrder, TimeseriesTable};

fn context() -> WidgetContext {
    WidgetContext::new("Boiler table", TimeWindow::new(0, 60_000))
        .with_units("°C", Some(1))
        .with_datasource(
            Datasource::entity("Boiler")
                .with_data_key(DataKey::new("temperature", DataKeyType::Timeseries))
                .with_data_key(
                    DataKey::new("pressure", DataKeyType::Timeseries)
                        .with_units("bar")
                        .with_decimals(2),
                ),
        )
}

fn samples() -> Vec<DatasourceData> {
    vec![
        DatasourceData::new(
            DataKeyRef::series(0, 0),
            vec![
                TsPoint::new(1_000, 21.5),
                TsPoint::new(2_000, 22.0),
                TsPoint::new(3_000, Value::Null),
            ],
        ),
        DatasourceData::new(
            DataKeyRef::series(0, 1),
            vec![TsPoint::new(2_000, 1.25), TsPoint::new(4_000, 1.5)],
        ),
    ]
}

fn table(settings: Value) -> TimeseriesTable {
    let mut table = TimeseriesTable::new(&context(), &settings).expect("table");
    table.data_updated(&samples());
    table
}

#[test]
fn style_function_returning_a_string_falls_back_to_an_empty_style() {
    let mut table = table(json!({}));
    table.set_cell_style_function(DataKeyRef::series(0, 0), Box::new(|_| Ok(json!("red"))));
    let style = table.cell_style(0, 1, &json!(21.5));
    assert!(style.is_empty());
}

#[test]
fn style_and_content_functions_apply_per_column() {
    let mut table = table(json!({}));
    table.set_cell_style_function(
        DataKeyRef::series(0, 0),
        Box::new(|value| {
            let hot = value.as_f64().is_some_and(|value| value > 21.8);
            Ok(json!({ "color": if hot { "red" } else { "green" } }))
        }),
    );
    table.set_cell_content_function(
        DataKeyRef::series(0, 1),
        Box::new(|value, row: &RowData| {
            let temperature = row.get("temperature").cloned().unwrap_or(Value::Null);
            Ok(format!("{value} @ {temperature}"))
        }),
    );

    assert_eq!(table.cell_style(0, 1, &json!(22.0)).get("color"), Some(&json!("red")));
    assert!(table.cell_style(0, 0, &json!(22.0)).is_empty());
    assert!(table.cell_style(0, 2, &json!(1.25)).is_empty());

    let source = table.source(0).expect("source");
    let row = source
        .rows()
        .iter()
        .find(|row| row.ts == 2_000)
        .expect("row")
        .clone();
    assert_eq!(table.cell_content(0, 2, &row), "1.25 @ 22.0");
}

#[test]
fn failing_content_function_renders_empty_text() {
    let mut table = table(json!({}));
    table.set_cell_content_function(
        DataKeyRef::series(0, 0),
        Box::new(|_, _| Err(ChartError::UserFunction("undefined is not a function".to_owned()))),
    );
    let row = table.source(0).expect("source").rows()[0].clone();
    assert_eq!(table.cell_content(0, 1, &row), "");
}

#[test]
fn rows_merge_by_timestamp_with_default_formatting() {
    let table = table(json!({}));
    let source = table.source(0).expect("source");
    let timestamps: Vec<i64> = source.rows().iter().map(|row| row.ts).collect();
    assert_eq!(timestamps, vec![1_000, 2_000, 3_000, 4_000]);

    // Default sort is timestamp descending.
    let page: Vec<i64> = source.page().data.iter().map(|row| row.ts).collect();
    assert_eq!(page, vec![4_000, 3_000, 2_000, 1_000]);

    let row = &source.rows()[1];
    assert_eq!(row.formatted_ts, "1970-01-01 00:00:02");
    assert_eq!(table.cell_content(0, 0, row), "1970-01-01 00:00:02");
    assert_eq!(table.cell_content(0, 1, row), "22.0 °C");
    assert_eq!(table.cell_content(0, 2, row), "1.25 bar");
    assert_eq!(table.cell_content(0, 2, &source.rows()[0]), "");
}

#[test]
fn hide_empty_lines_and_milliseconds() {
    let table = table(json!({ "hideEmptyLines": true, "showMilliseconds": true }));
    let source = table.source(0).expect("source");
    let timestamps: Vec<i64> = source.rows().iter().map(|row| row.ts).collect();
    assert_eq!(timestamps, vec![1_000, 2_000, 4_000]);
    assert_eq!(source.rows()[0].formatted_ts, "1970-01-01 00:00:01.000");
}

#[test]
fn search_sort_and_paging() {
    let mut table = table(json!({ "defaultPageSize": 3 }));
    assert_eq!(table.page_size_options(), [3, 6, 9]);
    let page = table.source(0).expect("source").page();
    assert_eq!(page.total_elements, 4);
    assert_eq!(page.total_pages, 2);
    assert!(page.has_next);

    table.set_page(0, 1, None);
    let page = table.source(0).expect("source").page();
    assert_eq!(page.data.len(), 1);
    assert!(!page.has_next);

    table.set_sort(0, SortOrder::new(2, Direction::Asc));
    let order: Vec<i64> = table.source(0).expect("source").page().data.iter().map(|row| row.ts).collect();
    // Missing pressure cells first, then ascending pressure.
    assert_eq!(order, vec![1_000, 3_000, 2_000]);

    table.set_text_search(Some("1.25"));
    let page = table.source(0).expect("source").page();
    assert_eq!(page.total_elements, 1);
    assert_eq!(page.data[0].ts, 2_000);

    table.set_text_search(None);
    table.set_page(0, 0, Some(0));
    let page = table.source(0).expect("source").page();
    assert_eq!(page.data.len(), 4);
    assert_eq!(page.total_pages, 1);
}
