use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TsPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataKeyType {
    #[default]
    Timeseries,
    Attribute,
    Function,
    EntityField,
    Alarm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DatasourceType {
    #[default]
    Entity,
    Function,
}

/// One configured key of a datasource.
///
/// `settings` is the raw per-key settings document; the chart resolves it
/// against layered defaults during setup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataKey {
    pub name: String,
    #[serde(rename = "type")]
    pub key_type: DataKeyType,
    pub label: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub decimals: Option<u32>,
    #[serde(default)]
    pub settings: Value,
    #[serde(default)]
    pub hidden: bool,
    /// Key belongs to the comparison (shifted) time window.
    #[serde(default)]
    pub comparison: bool,
}

impl DataKey {
    #[must_use]
    pub fn new(name: impl Into<String>, key_type: DataKeyType) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            key_type,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    #[must_use]
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    #[must_use]
    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = Some(decimals);
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: Value) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_comparison(mut self, comparison: bool) -> Self {
        self.comparison = comparison;
        self
    }

    /// Latest-key lookup rule: function keys match by label, other keys by
    /// name and type.
    #[must_use]
    pub fn matches_latest(&self, key: &str, key_type: Option<DataKeyType>) -> bool {
        if self.key_type == DataKeyType::Function {
            self.label == key
        } else {
            self.name == key && key_type.is_none_or(|expected| expected == self.key_type)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Datasource {
    #[serde(rename = "type")]
    pub source_type: DatasourceType,
    pub name: String,
    #[serde(default)]
    pub alias_name: Option<String>,
    #[serde(default)]
    pub entity_alias_id: Option<String>,
    #[serde(default)]
    pub data_keys: Vec<DataKey>,
    #[serde(default)]
    pub latest_data_keys: Vec<DataKey>,
}

impl Datasource {
    #[must_use]
    pub fn entity(name: impl Into<String>) -> Self {
        Self {
            source_type: DatasourceType::Entity,
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_data_key(mut self, key: DataKey) -> Self {
        self.data_keys.push(key);
        self
    }

    #[must_use]
    pub fn with_latest_data_key(mut self, key: DataKey) -> Self {
        self.latest_data_keys.push(key);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyKind {
    Series,
    Latest,
}

/// Stable position of a key inside the widget's datasource list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataKeyRef {
    pub datasource: usize,
    pub index: usize,
    pub kind: KeyKind,
}

impl DataKeyRef {
    #[must_use]
    pub const fn series(datasource: usize, index: usize) -> Self {
        Self {
            datasource,
            index,
            kind: KeyKind::Series,
        }
    }

    #[must_use]
    pub const fn latest(datasource: usize, index: usize) -> Self {
        Self {
            datasource,
            index,
            kind: KeyKind::Latest,
        }
    }
}

/// Samples of one key for the current tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasourceData {
    pub key: DataKeyRef,
    pub data: Vec<TsPoint>,
}

impl DatasourceData {
    #[must_use]
    pub fn new(key: DataKeyRef, data: Vec<TsPoint>) -> Self {
        Self { key, data }
    }
}

/// Row delivered by an auxiliary subscription. The key is the synthetic key
/// the chart registered, markers included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuxiliaryData {
    pub data_key: DataKey,
    pub data: Vec<TsPoint>,
}

/// Finds the first latest key matching `key` across all datasources.
#[must_use]
pub fn find_latest_key(
    datasources: &[Datasource],
    key: &str,
    key_type: Option<DataKeyType>,
) -> Option<DataKeyRef> {
    datasources
        .iter()
        .enumerate()
        .find_map(|(ds_index, datasource)| {
            datasource
                .latest_data_keys
                .iter()
                .position(|candidate| candidate.matches_latest(key, key_type))
                .map(|index| DataKeyRef::latest(ds_index, index))
        })
}
