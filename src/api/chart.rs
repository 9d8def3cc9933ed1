use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::{DataKey, DataKeyRef};
use crate::error::{ChartError, ChartResult};
use crate::render::{ChartBackend, ChartOption, GridOption};

use super::axis_builder::{TimeSeriesChartXAxis, TimeSeriesChartYAxis, setup_x_axes, setup_y_axes};
use super::chart_settings::{TimeSeriesChartSettings, TimeSeriesChartType};
use super::dynamic_limits::DynamicSourcePlan;
use super::events::{ListenerId, ValueSubject};
use super::series_builder::{
    TimeSeriesChartDataItem, TimeSeriesChartThresholdItem, setup_data_items,
    setup_threshold_items,
};
use super::settings_resolver::resolve_chart_settings;
use super::widget_context::{HostListener, SubscriptionHandle, WidgetContext, WidgetServices};

/// Lifecycle of one chart instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartLifecycle {
    /// Waiting for a non-empty container.
    Uninitialized,
    Active,
    Destroyed,
}

/// Headless time-series chart.
///
/// Owns settings, axes, data and threshold items, and drives a
/// [`ChartBackend`] through one [`ChartOption`] per change. The chart draws
/// itself the first time its container has a non-zero size.
pub struct TimeSeriesChart<B: ChartBackend, S: WidgetServices> {
    pub(super) backend: B,
    pub(super) services: S,
    pub(super) context: WidgetContext,
    pub(super) settings: TimeSeriesChartSettings,
    pub(super) chart_type: TimeSeriesChartType,
    pub(super) lifecycle: ChartLifecycle,
    pub(super) dark_mode: bool,
    pub(super) x_axes: Vec<TimeSeriesChartXAxis>,
    pub(super) y_axes: Vec<TimeSeriesChartYAxis>,
    pub(super) data_items: Vec<TimeSeriesChartDataItem>,
    pub(super) thresholds: Vec<TimeSeriesChartThresholdItem>,
    pub(super) visual_map_selected: IndexMap<usize, bool>,
    pub(super) grid: GridOption,
    pub(super) option: Option<ChartOption>,
    pub(super) highlighted: Option<DataKeyRef>,
    pub(super) y_min: ValueSubject<Option<f64>>,
    pub(super) y_max: ValueSubject<Option<f64>>,
    pub(super) auxiliary: Option<SubscriptionHandle>,
    pub(super) listeners: Vec<(HostListener, SubscriptionHandle)>,
}

impl<B: ChartBackend, S: WidgetServices> TimeSeriesChart<B, S> {
    /// Resolves settings, builds axes and items, opens the auxiliary
    /// subscription when entity values are configured, and draws right away
    /// when the container already has a size.
    pub fn new(
        backend: B,
        mut services: S,
        mut context: WidgetContext,
        input_settings: &Value,
        chart_type: TimeSeriesChartType,
    ) -> ChartResult<Self> {
        let settings = resolve_chart_settings(input_settings, chart_type)?;
        let dark_mode = settings.dark_mode || context.theme.dark_mode;

        let mut plan = DynamicSourcePlan::default();
        let alias_id = |alias: &str| services.entity_alias_id(alias);
        let x_axes = setup_x_axes(&settings, &context, dark_mode);
        let y_axes = setup_y_axes(&settings, &context, dark_mode, alias_id, &mut plan);
        let data_items = setup_data_items(&context, &settings, chart_type, &y_axes);
        let thresholds =
            setup_threshold_items(&context, &settings, &y_axes, alias_id, &mut plan);

        for item in &data_items {
            if let Some(key) = context.data_key_mut(item.key) {
                key.hidden = !item.enabled;
            }
        }

        let auxiliary = if plan.is_empty() {
            None
        } else {
            match services.subscribe_latest(plan.datasources()) {
                Ok(handle) => Some(handle),
                Err(err) => {
                    warn!(
                        widget = %context.widget_title,
                        error = %err,
                        "entity value subscription failed"
                    );
                    None
                }
            }
        };

        let mut listeners = Vec::new();
        let mut wanted = vec![HostListener::Theme, HostListener::Scroll];
        if context.auto_resize {
            wanted.insert(0, HostListener::Resize);
        }
        for listener in wanted {
            if let Some(handle) = services.listen(listener) {
                listeners.push((listener, handle));
            }
        }

        let visual_map_selected = settings
            .visual_map_settings
            .as_ref()
            .map(|visual_map| (0..visual_map.pieces.len()).map(|index| (index, true)).collect())
            .unwrap_or_default();

        debug!(
            widget = %context.widget_title,
            data_items = data_items.len(),
            thresholds = thresholds.len(),
            y_axes = y_axes.len(),
            auxiliary_keys = plan.key_count(),
            "created time series chart"
        );

        let mut chart = Self {
            backend,
            services,
            context,
            settings,
            chart_type,
            lifecycle: ChartLifecycle::Uninitialized,
            dark_mode,
            x_axes,
            y_axes,
            data_items,
            thresholds,
            visual_map_selected,
            grid: GridOption::default(),
            option: None,
            highlighted: None,
            y_min: ValueSubject::new(None),
            y_max: ValueSubject::new(None),
            auxiliary,
            listeners,
        };
        chart.on_resize()?;
        Ok(chart)
    }

    #[must_use]
    pub fn lifecycle(&self) -> ChartLifecycle {
        self.lifecycle
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[must_use]
    pub fn services(&self) -> &S {
        &self.services
    }

    #[must_use]
    pub fn context(&self) -> &WidgetContext {
        &self.context
    }

    #[must_use]
    pub fn settings(&self) -> &TimeSeriesChartSettings {
        &self.settings
    }

    #[must_use]
    pub fn chart_type(&self) -> TimeSeriesChartType {
        self.chart_type
    }

    #[must_use]
    pub fn is_dark_mode(&self) -> bool {
        self.dark_mode
    }

    #[must_use]
    pub fn x_axes(&self) -> &[TimeSeriesChartXAxis] {
        &self.x_axes
    }

    #[must_use]
    pub fn y_axes(&self) -> &[TimeSeriesChartYAxis] {
        &self.y_axes
    }

    #[must_use]
    pub fn data_items(&self) -> &[TimeSeriesChartDataItem] {
        &self.data_items
    }

    #[must_use]
    pub fn threshold_items(&self) -> &[TimeSeriesChartThresholdItem] {
        &self.thresholds
    }

    #[must_use]
    pub fn data_key(&self, key: DataKeyRef) -> Option<&DataKey> {
        self.context.data_key(key)
    }

    /// Last option pushed to the backend.
    #[must_use]
    pub fn option(&self) -> Option<&ChartOption> {
        self.option.as_ref()
    }

    #[must_use]
    pub fn visual_map_selected(&self) -> &IndexMap<usize, bool> {
        &self.visual_map_selected
    }

    #[must_use]
    pub fn auxiliary_subscription(&self) -> Option<SubscriptionHandle> {
        self.auxiliary
    }

    /// Lower extent of the first Y axis after the latest layout pass.
    #[must_use]
    pub fn y_min(&self) -> Option<f64> {
        *self.y_min.value()
    }

    #[must_use]
    pub fn y_max(&self) -> Option<f64> {
        *self.y_max.value()
    }

    pub fn subscribe_y_min(
        &mut self,
        listener: impl FnMut(&Option<f64>) + 'static,
    ) -> Option<ListenerId> {
        self.y_min.subscribe(listener)
    }

    pub fn subscribe_y_max(
        &mut self,
        listener: impl FnMut(&Option<f64>) + 'static,
    ) -> Option<ListenerId> {
        self.y_max.subscribe(listener)
    }

    pub fn unsubscribe_y_min(&mut self, id: ListenerId) -> bool {
        self.y_min.unsubscribe(id)
    }

    pub fn unsubscribe_y_max(&mut self, id: ListenerId) -> bool {
        self.y_max.unsubscribe(id)
    }

    /// Tears the chart down. Safe to call more than once.
    ///
    /// Stops resize observation, disposes the backend, completes the
    /// published extents, then releases the theme and scroll listeners and
    /// the auxiliary subscription.
    pub fn destroy(&mut self) {
        if self.lifecycle == ChartLifecycle::Destroyed {
            return;
        }
        self.release_listener(HostListener::Resize);
        if self.lifecycle == ChartLifecycle::Active {
            self.backend.dispose();
        }
        self.y_min.complete();
        self.y_max.complete();
        self.release_listener(HostListener::Theme);
        self.release_listener(HostListener::Scroll);
        if let Some(handle) = self.auxiliary.take() {
            self.services.release(handle);
        }
        self.lifecycle = ChartLifecycle::Destroyed;
        self.option = None;
        debug!(widget = %self.context.widget_title, "destroyed time series chart");
    }

    fn release_listener(&mut self, kind: HostListener) {
        let (released, kept): (Vec<_>, Vec<_>) = self
            .listeners
            .drain(..)
            .partition(|(listener, _)| *listener == kind);
        self.listeners = kept;
        for (_, handle) in released {
            self.services.release(handle);
        }
    }

    pub(super) fn ensure_live(&self) -> ChartResult<()> {
        if self.lifecycle == ChartLifecycle::Destroyed {
            return Err(ChartError::Destroyed);
        }
        Ok(())
    }

    pub(super) fn is_active(&self) -> bool {
        self.lifecycle == ChartLifecycle::Active
    }
}
