use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{ChartError, ChartResult};

/// Style object applied to one cell.
pub type CellStyle = Map<String, Value>;

/// Row values handed to content functions: `Timestamp` plus one entry per
/// key name.
pub type RowData = Map<String, Value>;

/// User supplied cell style function. It may return any JSON value; only
/// objects are accepted.
pub type CellStyleFunction = Box<dyn Fn(&Value) -> ChartResult<Value>>;

/// User supplied cell content function.
pub type CellContentFunction = Box<dyn Fn(&Value, &RowData) -> ChartResult<String>>;

/// Accepts a style function result only when it is a JSON object.
pub fn checked_cell_style(result: ChartResult<Value>) -> ChartResult<CellStyle> {
    match result? {
        Value::Object(style) => Ok(style),
        other => Err(ChartError::InvalidStyle {
            found: json_type_name(&other).to_owned(),
        }),
    }
}

/// Runs a style function. Failures and non-object results are logged and
/// replaced with an empty style.
pub fn guarded_cell_style(
    widget: &str,
    key: &str,
    function: &CellStyleFunction,
    value: &Value,
) -> CellStyle {
    checked_cell_style(function(value)).unwrap_or_else(|err| {
        warn!(
            widget,
            key,
            error = %err,
            "cell style function failed, using empty style"
        );
        CellStyle::new()
    })
}

/// Runs a content function. Failures are logged and render as empty text.
pub fn guarded_cell_content(
    widget: &str,
    key: &str,
    function: &CellContentFunction,
    value: &Value,
    row: &RowData,
) -> String {
    function(value, row).unwrap_or_else(|err| {
        warn!(
            widget,
            key,
            error = %err,
            "cell content function failed, using empty content"
        );
        String::new()
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn non_object_styles_are_rejected() {
        let err = checked_cell_style(Ok(json!("red"))).unwrap_err();
        assert!(matches!(err, ChartError::InvalidStyle { ref found } if found == "string"));
        assert!(checked_cell_style(Ok(json!(["color", "red"]))).is_err());
        let style = checked_cell_style(Ok(json!({ "color": "red" }))).unwrap();
        assert_eq!(style.get("color"), Some(&json!("red")));
    }

    #[test]
    fn failing_functions_fall_back_to_empty_values() {
        let style: CellStyleFunction =
            Box::new(|_| Err(ChartError::UserFunction("boom".to_owned())));
        assert!(guarded_cell_style("table", "temperature", &style, &json!(1)).is_empty());

        let content: CellContentFunction =
            Box::new(|_, _| Err(ChartError::UserFunction("boom".to_owned())));
        assert_eq!(
            guarded_cell_content("table", "temperature", &content, &json!(1), &RowData::new()),
            ""
        );
    }
}
