use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AxisPosition {
    #[default]
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineType {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Shape {
    #[default]
    EmptyCircle,
    Circle,
    Rect,
    RoundRect,
    Triangle,
    Diamond,
    Pin,
    Arrow,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepType {
    #[default]
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesLabelPosition {
    #[default]
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThresholdLabelPosition {
    Start,
    Middle,
    #[default]
    End,
    InsideStart,
    InsideStartTop,
    InsideStartBottom,
    InsideMiddle,
    InsideMiddleTop,
    InsideMiddleBottom,
    InsideEnd,
    InsideEndTop,
    InsideEndBottom,
}

impl ThresholdLabelPosition {
    #[must_use]
    pub const fn is_bottom(self) -> bool {
        matches!(
            self,
            Self::InsideStartBottom | Self::InsideMiddleBottom | Self::InsideEndBottom
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Font {
    pub family: String,
    pub size: f64,
    pub style: String,
    pub weight: String,
}

impl Font {
    #[must_use]
    pub fn roboto(size: f64, weight: &str) -> Self {
        Self {
            family: "Roboto".to_owned(),
            size,
            style: "normal".to_owned(),
            weight: weight.to_owned(),
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::roboto(12.0, "400")
    }
}
