use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::value_as_f64;

use super::TimeseriesRow;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Timestamp column, newest first.
pub const DEFAULT_SORT_ORDER: &str = "-0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Asc,
    Desc,
}

/// Sort by one column; column `0` is the timestamp, `n` the n-th key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub column: usize,
    pub direction: Direction,
}

impl SortOrder {
    #[must_use]
    pub fn new(column: usize, direction: Direction) -> Self {
        Self { column, direction }
    }

    /// Parses `"<column>"` or `"-<column>"` (descending).
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (direction, column) = match text.strip_prefix('-') {
            Some(rest) => (Direction::Desc, rest),
            None => (Direction::Asc, text.strip_prefix('+').unwrap_or(text)),
        };
        column
            .parse()
            .ok()
            .map(|column| Self::new(column, direction))
    }
}

/// Page size options offered for a default page size.
#[must_use]
pub fn page_size_options(page_size: usize) -> [usize; 3] {
    [
        page_size,
        page_size.saturating_mul(2),
        page_size.saturating_mul(3),
    ]
}

/// One page of rows plus totals over the filtered set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData<T> {
    pub data: Vec<T>,
    pub total_pages: usize,
    pub total_elements: usize,
    pub has_next: bool,
}

impl<T> Default for PageData<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            total_pages: 0,
            total_elements: 0,
            has_next: false,
        }
    }
}

/// Search, sort and page window applied to the rows of one source.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLink {
    /// `None` shows every row on a single page.
    pub page_size: Option<usize>,
    pub page: usize,
    pub text_search: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl PageLink {
    #[must_use]
    pub fn new(page_size: Option<usize>, sort_order: Option<SortOrder>) -> Self {
        Self {
            page_size: page_size.filter(|size| *size > 0),
            page: 0,
            text_search: None,
            sort_order,
        }
    }

    /// Filters by text search, sorts, then cuts out the current page.
    #[must_use]
    pub fn filter_data(&self, rows: &[TimeseriesRow]) -> PageData<TimeseriesRow> {
        let needle = self
            .text_search
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_lowercase);
        let mut filtered: Vec<&TimeseriesRow> = rows
            .iter()
            .filter(|row| needle.as_deref().is_none_or(|needle| row.matches(needle)))
            .collect();
        if let Some(order) = &self.sort_order {
            filtered.sort_by(|a, b| {
                let ordering = match order.column {
                    0 => a.ts.cmp(&b.ts),
                    column => compare_cells(a.column(column), b.column(column)),
                };
                match order.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
        }

        let total_elements = filtered.len();
        let Some(page_size) = self.page_size else {
            return PageData {
                data: filtered.into_iter().cloned().collect(),
                total_pages: usize::from(total_elements > 0),
                total_elements,
                has_next: false,
            };
        };
        let total_pages = total_elements.div_ceil(page_size);
        let start = self.page.saturating_mul(page_size).min(total_elements);
        let end = start.saturating_add(page_size).min(total_elements);
        PageData {
            data: filtered[start..end].iter().map(|row| (*row).clone()).collect(),
            total_pages,
            total_elements,
            has_next: end < total_elements,
        }
    }
}

/// Missing cells sort first; numbers compare numerically, anything else
/// by its text.
fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (numeric(a), numeric(b)) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            _ => cell_text(a).cmp(&cell_text(b)),
        },
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(_) => value_as_f64(value),
        _ => None,
    }
}

pub(super) fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_signed_sort_orders() {
        assert_eq!(
            SortOrder::parse(DEFAULT_SORT_ORDER),
            Some(SortOrder::new(0, Direction::Desc))
        );
        assert_eq!(SortOrder::parse("2"), Some(SortOrder::new(2, Direction::Asc)));
        assert_eq!(SortOrder::parse("-ts"), None);
    }

    #[test]
    fn numbers_sort_numerically_and_missing_cells_first() {
        let nine = Value::from(9);
        let ten = Value::from(10);
        assert_eq!(compare_cells(Some(&nine), Some(&ten)), Ordering::Less);
        assert_eq!(compare_cells(None, Some(&nine)), Ordering::Less);
        assert_eq!(
            compare_cells(Some(&Value::from("b")), Some(&Value::from("a"))),
            Ordering::Greater
        );
    }

    #[test]
    fn page_size_options_saturate() {
        assert_eq!(page_size_options(10), [10, 20, 30]);
        assert_eq!(
            page_size_options(usize::MAX / 2 + 1),
            [usize::MAX / 2 + 1, usize::MAX, usize::MAX]
        );
    }
}
