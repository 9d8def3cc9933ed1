use serde::{Deserialize, Serialize};

use crate::core::{ColorRole, DataKeyType};
use crate::render::{Font, LineType, Shape, ThresholdLabelPosition};

use super::chart_settings::DEFAULT_Y_AXIS_ID;

/// Where a threshold or axis-limit value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueSourceType {
    #[default]
    Constant,
    /// Latest value of a key already subscribed by the widget.
    LatestKey,
    /// Attribute or telemetry of an entity resolved through an alias.
    Entity,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValueSourceConfig {
    #[serde(rename = "type")]
    pub source_type: ValueSourceType,
    pub value: Option<f64>,
    pub latest_key: Option<String>,
    pub latest_key_type: Option<DataKeyType>,
    pub entity_alias: Option<String>,
    pub entity_key: Option<String>,
    pub entity_key_type: Option<DataKeyType>,
}

impl ValueSourceConfig {
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self {
            source_type: ValueSourceType::Constant,
            value: Some(value),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn latest_key(key: impl Into<String>, key_type: DataKeyType) -> Self {
        Self {
            source_type: ValueSourceType::LatestKey,
            latest_key: Some(key.into()),
            latest_key_type: Some(key_type),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn entity(alias: impl Into<String>, key: impl Into<String>, key_type: DataKeyType) -> Self {
        Self {
            source_type: ValueSourceType::Entity,
            entity_alias: Some(alias.into()),
            entity_key: Some(key.into()),
            entity_key_type: Some(key_type),
            ..Self::default()
        }
    }

    /// Whether the fields required by the source type are present.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self.source_type {
            ValueSourceType::Constant => self.value.is_some_and(f64::is_finite),
            ValueSourceType::LatestKey => non_blank(self.latest_key.as_deref()),
            ValueSourceType::Entity => {
                non_blank(self.entity_alias.as_deref()) && non_blank(self.entity_key.as_deref())
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> bool {
    value.is_some_and(|text| !text.trim().is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThresholdOrientation {
    /// Horizontal line at a Y value.
    #[default]
    Horizontal,
    /// Vertical line at a timestamp.
    Vertical,
}

/// Fully resolved settings of one threshold line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThresholdSettings {
    #[serde(flatten)]
    pub source: ValueSourceConfig,
    pub y_axis_id: String,
    pub orientation: ThresholdOrientation,
    pub units: Option<String>,
    pub decimals: Option<u32>,
    pub line_color: String,
    pub line_type: LineType,
    pub line_width: f64,
    pub start_symbol: Shape,
    pub start_symbol_size: f64,
    pub end_symbol: Shape,
    pub end_symbol_size: f64,
    pub show_label: bool,
    pub label_position: ThresholdLabelPosition,
    pub label_font: Font,
    pub label_color: String,
    pub enable_label_background: bool,
    pub label_background: String,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            source: ValueSourceConfig::default(),
            y_axis_id: DEFAULT_Y_AXIS_ID.to_owned(),
            orientation: ThresholdOrientation::Horizontal,
            units: None,
            decimals: None,
            line_color: ColorRole::ThresholdLine.light().to_owned(),
            line_type: LineType::Solid,
            line_width: 1.0,
            start_symbol: Shape::None,
            start_symbol_size: 5.0,
            end_symbol: Shape::Arrow,
            end_symbol_size: 5.0,
            show_label: true,
            label_position: ThresholdLabelPosition::End,
            label_font: Font::roboto(11.0, "600"),
            label_color: ColorRole::ThresholdLabel.light().to_owned(),
            enable_label_background: false,
            label_background: "rgba(255,255,255,0.56)".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_depends_on_source_type() {
        assert!(ValueSourceConfig::constant(10.0).is_valid());
        assert!(!ValueSourceConfig::default().is_valid());
        assert!(ValueSourceConfig::latest_key("temp", DataKeyType::Timeseries).is_valid());
        assert!(!ValueSourceConfig::latest_key("  ", DataKeyType::Timeseries).is_valid());
        assert!(
            ValueSourceConfig::entity("Thermostat", "limit", DataKeyType::Attribute).is_valid()
        );
        let mut missing_key = ValueSourceConfig::entity("Thermostat", "", DataKeyType::Attribute);
        assert!(!missing_key.is_valid());
        missing_key.entity_key = Some("limit".to_owned());
        assert!(missing_key.is_valid());
    }
}
