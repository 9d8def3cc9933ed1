pub mod color;
pub mod datasource;
pub mod merge;
pub mod time_window;
pub mod types;
pub mod units;
pub mod value_format;

pub use color::{ColorRole, Rgba, prepare_theme_color};
pub use datasource::{
    AuxiliaryData, DataKey, DataKeyRef, DataKeyType, Datasource, DatasourceData, DatasourceType,
    KeyKind, find_latest_key,
};
pub use merge::{deep_merge, merged};
pub use time_window::{AggregationType, TimeWindow};
pub use types::{ChartPoint, TsPoint, Viewport, value_as_f64};
pub use units::{ResolvedUnits, UnitConverter, UnitSystem, resolve_units};
pub use value_format::format_value;
