//! Time-series table model: one paged, searchable and sortable table per
//! datasource, with rows merged by timestamp.

mod cell_function;
mod page_link;

use std::collections::BTreeMap;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::api::WidgetContext;
use crate::core::{
    DataKey, DataKeyRef, DatasourceData, KeyKind, format_value, merged, value_as_f64,
};
use crate::error::{ChartError, ChartResult};

pub use cell_function::{
    CellContentFunction, CellStyle, CellStyleFunction, RowData, checked_cell_style,
    guarded_cell_content, guarded_cell_style,
};
pub use page_link::{
    DEFAULT_PAGE_SIZE, DEFAULT_SORT_ORDER, Direction, PageData, PageLink, SortOrder,
    page_size_options,
};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT_MILLIS: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeseriesTableSettings {
    pub show_milliseconds: bool,
    /// Drop rows where every key cell is empty.
    pub hide_empty_lines: bool,
    pub display_pagination: bool,
    pub default_page_size: usize,
    pub default_sort_order: String,
}

impl Default for TimeseriesTableSettings {
    fn default() -> Self {
        Self {
            show_milliseconds: false,
            hide_empty_lines: false,
            display_pagination: true,
            default_page_size: DEFAULT_PAGE_SIZE,
            default_sort_order: DEFAULT_SORT_ORDER.to_owned(),
        }
    }
}

/// One timestamp row. `cells[i]` holds the value of the i-th key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeseriesRow {
    pub ts: i64,
    pub formatted_ts: String,
    pub cells: Vec<Option<Value>>,
}

impl TimeseriesRow {
    /// Column `0` is the timestamp, column `n` the n-th key cell.
    #[must_use]
    pub fn column(&self, column: usize) -> Option<&Value> {
        match column {
            0 => None,
            n => self.cells.get(n - 1).and_then(Option::as_ref),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.formatted_ts.to_lowercase().contains(needle)
            || self
                .cells
                .iter()
                .flatten()
                .any(|value| page_link::cell_text(value).to_lowercase().contains(needle))
    }

    fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| match cell {
            None | Some(Value::Null) => true,
            Some(Value::String(text)) => text.is_empty(),
            Some(_) => false,
        })
    }
}

/// Per-key column: header key plus optional user functions.
pub struct TableColumn {
    pub key: DataKey,
    style: Option<CellStyleFunction>,
    content: Option<CellContentFunction>,
}

/// Table of one datasource.
pub struct TimeseriesTableSource {
    pub datasource: usize,
    pub name: String,
    pub columns: Vec<TableColumn>,
    pub page_link: PageLink,
    rows: Vec<TimeseriesRow>,
    page: PageData<TimeseriesRow>,
}

impl TimeseriesTableSource {
    #[must_use]
    pub fn rows(&self) -> &[TimeseriesRow] {
        &self.rows
    }

    /// Rows of the current page after the last `load_rows`.
    #[must_use]
    pub fn page(&self) -> &PageData<TimeseriesRow> {
        &self.page
    }

    fn load_rows(&mut self) {
        self.page = self.page_link.filter_data(&self.rows);
    }
}

/// Time-series table widget model.
pub struct TimeseriesTable {
    widget_title: String,
    units: String,
    decimals: Option<u32>,
    settings: TimeseriesTableSettings,
    sources: Vec<TimeseriesTableSource>,
}

impl TimeseriesTable {
    /// Builds one source per datasource. Settings are merged over the table
    /// defaults.
    pub fn new(context: &WidgetContext, input_settings: &Value) -> ChartResult<Self> {
        let defaults = serde_json::to_value(TimeseriesTableSettings::default()).map_err(
            |err| ChartError::InvalidSettings {
                path: "tableSettings".to_owned(),
                message: err.to_string(),
            },
        )?;
        let settings: TimeseriesTableSettings =
            serde_json::from_value(merged([&defaults, input_settings])).map_err(|err| {
                ChartError::InvalidSettings {
                    path: "tableSettings".to_owned(),
                    message: err.to_string(),
                }
            })?;

        let page_size = (settings.display_pagination && settings.default_page_size > 0)
            .then_some(settings.default_page_size);
        let sort_order = SortOrder::parse(&settings.default_sort_order)
            .or_else(|| SortOrder::parse(DEFAULT_SORT_ORDER));
        let sources = context
            .datasources
            .iter()
            .enumerate()
            .map(|(index, datasource)| TimeseriesTableSource {
                datasource: index,
                name: datasource.name.clone(),
                columns: datasource
                    .data_keys
                    .iter()
                    .map(|key| TableColumn {
                        key: key.clone(),
                        style: None,
                        content: None,
                    })
                    .collect(),
                page_link: PageLink::new(page_size, sort_order.clone()),
                rows: Vec::new(),
                page: PageData::default(),
            })
            .collect::<Vec<_>>();
        debug!(
            widget = %context.widget_title,
            sources = sources.len(),
            page_size = ?page_size,
            "created time series table"
        );
        Ok(Self {
            widget_title: context.widget_title.clone(),
            units: context.units.clone(),
            decimals: context.decimals,
            settings,
            sources,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &TimeseriesTableSettings {
        &self.settings
    }

    #[must_use]
    pub fn sources(&self) -> &[TimeseriesTableSource] {
        &self.sources
    }

    #[must_use]
    pub fn source(&self, index: usize) -> Option<&TimeseriesTableSource> {
        self.sources.get(index)
    }

    #[must_use]
    pub fn page_size_options(&self) -> [usize; 3] {
        page_size_options(self.settings.default_page_size.max(1))
    }

    /// Installs a style function for the column of `key`.
    pub fn set_cell_style_function(&mut self, key: DataKeyRef, function: CellStyleFunction) {
        if let Some(column) = self.column_mut(key) {
            column.style = Some(function);
        }
    }

    /// Installs a content function for the column of `key`.
    pub fn set_cell_content_function(&mut self, key: DataKeyRef, function: CellContentFunction) {
        if let Some(column) = self.column_mut(key) {
            column.content = Some(function);
        }
    }

    fn column_mut(&mut self, key: DataKeyRef) -> Option<&mut TableColumn> {
        if key.kind != KeyKind::Series {
            return None;
        }
        self.sources
            .get_mut(key.datasource)?
            .columns
            .get_mut(key.index)
    }

    /// Rebuilds the rows of every source touched by `data` and reloads
    /// their current page.
    pub fn data_updated(&mut self, data: &[DatasourceData]) {
        let format = if self.settings.show_milliseconds {
            DATE_FORMAT_MILLIS
        } else {
            DATE_FORMAT
        };
        for source in &mut self.sources {
            let columns: Vec<&DatasourceData> = data
                .iter()
                .filter(|row| {
                    row.key.kind == KeyKind::Series && row.key.datasource == source.datasource
                })
                .collect();
            if columns.is_empty() {
                continue;
            }
            source.rows = merge_rows(
                &columns,
                source.columns.len(),
                format,
                self.settings.hide_empty_lines,
            );
            trace!(source = %source.name, rows = source.rows.len(), "merged table rows");
            source.load_rows();
        }
    }

    /// Reapplies search, sort and paging to the rows of one source.
    pub fn load_rows(&mut self, source: usize) {
        if let Some(source) = self.sources.get_mut(source) {
            source.load_rows();
        }
    }

    /// Sets or clears the search text of every source and returns to the
    /// first page.
    pub fn set_text_search(&mut self, text: Option<&str>) {
        for source in &mut self.sources {
            source.page_link.text_search = text.map(str::to_owned);
            source.page_link.page = 0;
            source.load_rows();
        }
    }

    pub fn set_sort(&mut self, source: usize, sort_order: SortOrder) {
        if let Some(source) = self.sources.get_mut(source) {
            source.page_link.sort_order = Some(sort_order);
            source.page_link.page = 0;
            source.load_rows();
        }
    }

    /// Moves to `page`; a new page size keeps pagination enabled only when
    /// non-zero.
    pub fn set_page(&mut self, source: usize, page: usize, page_size: Option<usize>) {
        if let Some(source) = self.sources.get_mut(source) {
            if let Some(size) = page_size {
                source.page_link.page_size = (size > 0).then_some(size);
            }
            source.page_link.page = page;
            source.load_rows();
        }
    }

    /// Style of one cell. The timestamp column and columns without a style
    /// function get an empty style.
    #[must_use]
    pub fn cell_style(&self, source: usize, column: usize, value: &Value) -> CellStyle {
        let Some(key_column) = self.key_column(source, column) else {
            return CellStyle::new();
        };
        match &key_column.style {
            Some(function) => {
                guarded_cell_style(&self.widget_title, &key_column.key.label, function, value)
            }
            None => CellStyle::new(),
        }
    }

    /// Rendered content of one cell. Column `0` is the formatted timestamp.
    #[must_use]
    pub fn cell_content(&self, source: usize, column: usize, row: &TimeseriesRow) -> String {
        if column == 0 {
            return row.formatted_ts.clone();
        }
        let Some(key_column) = self.key_column(source, column) else {
            return String::new();
        };
        let value = row.column(column).cloned().unwrap_or(Value::Null);
        if let Some(function) = &key_column.content {
            let row_data = self.row_data(source, row);
            return guarded_cell_content(
                &self.widget_title,
                &key_column.key.label,
                function,
                &value,
                &row_data,
            );
        }
        let decimals = key_column.key.decimals.or(self.decimals);
        let units = key_column.key.units.as_deref().unwrap_or(&self.units);
        match (&value, value_as_f64(&value)) {
            (Value::Number(_), Some(number)) => format_value(number, decimals, units, true),
            _ => page_link::cell_text(&value),
        }
    }

    fn key_column(&self, source: usize, column: usize) -> Option<&TableColumn> {
        let index = column.checked_sub(1)?;
        self.sources.get(source)?.columns.get(index)
    }

    fn row_data(&self, source: usize, row: &TimeseriesRow) -> RowData {
        let mut data = RowData::new();
        data.insert("Timestamp".to_owned(), Value::from(row.ts));
        if let Some(source) = self.sources.get(source) {
            for (index, column) in source.columns.iter().enumerate() {
                let value = row.column(index + 1).cloned().unwrap_or(Value::Null);
                data.insert(column.key.name.clone(), value);
            }
        }
        data
    }
}

/// Merges per-key samples into one row per timestamp, oldest first.
fn merge_rows(
    columns: &[&DatasourceData],
    width: usize,
    format: &str,
    hide_empty_lines: bool,
) -> Vec<TimeseriesRow> {
    let width = columns
        .iter()
        .map(|column| column.key.index + 1)
        .max()
        .unwrap_or(0)
        .max(width);
    let mut rows: BTreeMap<i64, TimeseriesRow> = BTreeMap::new();
    for column in columns {
        for point in &column.data {
            let row = rows.entry(point.ts).or_insert_with(|| TimeseriesRow {
                ts: point.ts,
                formatted_ts: format_ts(point.ts, format),
                cells: vec![None; width],
            });
            if let Some(cell) = row.cells.get_mut(column.key.index) {
                *cell = Some(point.value.clone());
            }
        }
    }
    rows.into_values()
        .filter(|row| !hide_empty_lines || !row.is_empty())
        .collect()
}

fn format_ts(ts: i64, format: &str) -> String {
    DateTime::from_timestamp_millis(ts)
        .map(|time| time.format(format).to_string())
        .unwrap_or_default()
}
