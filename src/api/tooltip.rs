use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Serialize;

use crate::core::format_value;

use super::chart_settings::TooltipSettings;
use super::series_builder::TimeSeriesChartDataItem;
use super::state_settings::StateValueConverter;

const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One hovered point as reported by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipParam {
    pub series_id: String,
    pub ts: i64,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipRow {
    pub label: String,
    pub color: String,
    pub value: String,
}

/// Structured tooltip content; rendering is left to the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipContent {
    pub date: Option<String>,
    pub rows: Vec<TooltipRow>,
}

/// Tooltip formatting inputs not carried by the params.
#[derive(Debug, Clone, Copy)]
pub struct TooltipContext<'a> {
    pub settings: &'a TooltipSettings,
    pub items: &'a [TimeSeriesChartDataItem],
    /// Aggregation bucket size; `None` for raw samples.
    pub interval: Option<i64>,
    pub states: Option<&'a StateValueConverter>,
}

/// Formats the tooltip for `params`.
///
/// With `focused` set and focused-series mode enabled only that param is
/// shown. Returns `None` when the tooltip is disabled or nothing matches.
#[must_use]
pub fn format_tooltip(
    context: TooltipContext<'_>,
    params: &[TooltipParam],
    focused: Option<usize>,
) -> Option<TooltipContent> {
    let settings = context.settings;
    if !settings.show_tooltip || params.is_empty() {
        return None;
    }
    let shown: Vec<&TooltipParam> = match focused {
        Some(index) if settings.tooltip_show_focused_series => {
            params.get(index).into_iter().collect()
        }
        _ => params.iter().collect(),
    };
    let rows: Vec<TooltipRow> = shown
        .iter()
        .filter_map(|param| {
            let item = context
                .items
                .iter()
                .find(|item| item.id == param.series_id)?;
            Some(TooltipRow {
                label: item.label.clone(),
                color: item.color.clone(),
                value: format_param_value(item, param.value, context.states),
            })
        })
        .collect();
    if rows.is_empty() {
        return None;
    }
    let date = settings
        .tooltip_show_date
        .then(|| format_date(settings, shown[0].ts, context.interval))
        .flatten();
    Some(TooltipContent { date, rows })
}

fn format_param_value(
    item: &TimeSeriesChartDataItem,
    value: Option<f64>,
    states: Option<&StateValueConverter>,
) -> String {
    let Some(value) = value else {
        return String::new();
    };
    if let Some(label) = states.and_then(|states| states.state_label(value)) {
        return label.to_owned();
    }
    format_value(value, item.decimals, &item.units, false)
}

fn format_date(settings: &TooltipSettings, ts: i64, interval: Option<i64>) -> Option<String> {
    let offset = FixedOffset::east_opt(settings.tooltip_time_zone_offset_minutes * 60)
        .unwrap_or_else(|| Utc.fix());
    let pattern = date_pattern(&settings.tooltip_date_format);
    let render = |millis: i64| -> Option<String> {
        let time: DateTime<Utc> = DateTime::from_timestamp_millis(millis)?;
        Some(
            time.with_timezone(&offset)
                .format(pattern)
                .to_string(),
        )
    };
    match interval {
        Some(interval) if settings.tooltip_date_interval && interval > 0 => {
            // Aggregated samples sit in the middle of their bucket.
            let start = render(ts - interval / 2)?;
            let end = render(ts + interval / 2)?;
            Some(format!("{start} - {end}"))
        }
        _ => render(ts),
    }
}

/// User patterns with invalid specifiers fall back to the default pattern.
fn date_pattern(pattern: &str) -> &str {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        FALLBACK_DATE_FORMAT
    } else {
        pattern
    }
}
