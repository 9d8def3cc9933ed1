//! tschart: headless time-series chart reconciler.
//!
//! Resolves layered widget settings, builds axes, series and thresholds from
//! datasource data, and drives a pluggable rendering backend through one
//! declarative option value per change. A companion table model covers the
//! time-series table widget.

pub mod api;
pub mod core;
pub mod error;
pub mod render;
pub mod table;
pub mod telemetry;

pub use api::{TimeSeriesChart, TimeSeriesChartType, WidgetContext};
pub use error::{ChartError, ChartResult};
pub use table::TimeseriesTable;
