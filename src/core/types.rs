use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Host container size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// One raw `[timestamp, value]` sample as delivered by the data subscription.
///
/// Values stay untyped: numeric keys deliver numbers, attribute and state keys
/// frequently deliver strings or booleans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TsPoint {
    pub ts: i64,
    pub value: Value,
}

impl TsPoint {
    #[must_use]
    pub fn new(ts: i64, value: impl Into<Value>) -> Self {
        Self {
            ts,
            value: value.into(),
        }
    }

    /// Interprets the raw value as a number, accepting numeric strings and booleans.
    #[must_use]
    pub fn numeric_value(&self) -> Option<f64> {
        value_as_f64(&self.value)
    }
}

#[must_use]
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Converted sample handed to the rendering backend.
///
/// Serialises as `[ts, value]` so backends can map it straight into series
/// data. `None` values render as gaps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub ts: i64,
    pub value: Option<f64>,
}

impl ChartPoint {
    #[must_use]
    pub fn new(ts: i64, value: Option<f64>) -> Self {
        Self { ts, value }
    }
}

impl Serialize for ChartPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&self.ts)?;
        seq.serialize_element(&self.value)?;
        seq.end()
    }
}
