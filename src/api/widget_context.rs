use indexmap::IndexMap;

use crate::core::{
    AggregationType, DataKey, DataKeyRef, Datasource, DatasourceData, KeyKind, TimeWindow,
    UnitSystem, Viewport,
};
use crate::error::{ChartError, ChartResult};

/// Theme information supplied by the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThemeContext {
    pub dark_mode: bool,
}

/// Everything the chart needs to know about its hosting widget.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetContext {
    pub widget_title: String,
    pub datasources: Vec<Datasource>,
    /// Widget-level units, used by keys without their own.
    pub units: String,
    pub decimals: Option<u32>,
    pub unit_system: Option<UnitSystem>,
    pub time_window: TimeWindow,
    pub comparison_time_window: Option<TimeWindow>,
    pub aggregation: AggregationType,
    pub theme: ThemeContext,
    pub container: Viewport,
    /// Observe container size changes.
    pub auto_resize: bool,
}

impl WidgetContext {
    #[must_use]
    pub fn new(widget_title: impl Into<String>, time_window: TimeWindow) -> Self {
        Self {
            widget_title: widget_title.into(),
            datasources: Vec::new(),
            units: String::new(),
            decimals: None,
            unit_system: None,
            time_window,
            comparison_time_window: None,
            aggregation: AggregationType::None,
            theme: ThemeContext::default(),
            container: Viewport::default(),
            auto_resize: true,
        }
    }

    #[must_use]
    pub fn with_datasource(mut self, datasource: Datasource) -> Self {
        self.datasources.push(datasource);
        self
    }

    #[must_use]
    pub fn with_units(mut self, units: impl Into<String>, decimals: Option<u32>) -> Self {
        self.units = units.into();
        self.decimals = decimals;
        self
    }

    #[must_use]
    pub fn with_unit_system(mut self, unit_system: UnitSystem) -> Self {
        self.unit_system = Some(unit_system);
        self
    }

    #[must_use]
    pub fn with_comparison_time_window(mut self, time_window: TimeWindow) -> Self {
        self.comparison_time_window = Some(time_window);
        self
    }

    #[must_use]
    pub fn with_aggregation(mut self, aggregation: AggregationType) -> Self {
        self.aggregation = aggregation;
        self
    }

    #[must_use]
    pub fn with_dark_mode(mut self, dark_mode: bool) -> Self {
        self.theme.dark_mode = dark_mode;
        self
    }

    #[must_use]
    pub fn with_container(mut self, container: Viewport) -> Self {
        self.container = container;
        self
    }

    #[must_use]
    pub fn data_key(&self, key: DataKeyRef) -> Option<&DataKey> {
        let datasource = self.datasources.get(key.datasource)?;
        match key.kind {
            KeyKind::Series => datasource.data_keys.get(key.index),
            KeyKind::Latest => datasource.latest_data_keys.get(key.index),
        }
    }

    pub(crate) fn data_key_mut(&mut self, key: DataKeyRef) -> Option<&mut DataKey> {
        let datasource = self.datasources.get_mut(key.datasource)?;
        match key.kind {
            KeyKind::Series => datasource.data_keys.get_mut(key.index),
            KeyKind::Latest => datasource.latest_data_keys.get_mut(key.index),
        }
    }

    /// Units of an item: its own when set, otherwise the widget's.
    #[must_use]
    pub fn item_units(&self, own: Option<&str>) -> String {
        match own {
            Some(units) if !units.is_empty() => units.to_owned(),
            _ => self.units.clone(),
        }
    }

    #[must_use]
    pub fn item_decimals(&self, own: Option<u32>) -> Option<u32> {
        own.or(self.decimals)
    }
}

/// One data tick delivered by the host subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTick {
    pub data: Vec<DatasourceData>,
    pub time_window: TimeWindow,
    pub comparison_time_window: Option<TimeWindow>,
    pub aggregation: AggregationType,
}

impl DataTick {
    #[must_use]
    pub fn new(time_window: TimeWindow, data: Vec<DatasourceData>) -> Self {
        Self {
            data,
            time_window,
            comparison_time_window: None,
            aggregation: AggregationType::None,
        }
    }

    #[must_use]
    pub fn with_comparison_time_window(mut self, time_window: TimeWindow) -> Self {
        self.comparison_time_window = Some(time_window);
        self
    }

    #[must_use]
    pub fn with_aggregation(mut self, aggregation: AggregationType) -> Self {
        self.aggregation = aggregation;
        self
    }
}

/// Handle returned by every registration; released on teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(pub u64);

/// Host-side notification sources the chart can listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostListener {
    Resize,
    Theme,
    Scroll,
}

/// Services the hosting dashboard injects into a chart.
pub trait WidgetServices {
    /// Resolves an entity alias name to its alias id.
    fn entity_alias_id(&self, alias: &str) -> Option<String>;

    /// Opens an auxiliary latest-value subscription; rows come back through
    /// `TimeSeriesChart::on_auxiliary_data` tagged with the returned handle.
    fn subscribe_latest(&mut self, datasources: Vec<Datasource>)
    -> ChartResult<SubscriptionHandle>;

    /// Registers for host notifications; `None` when the host has no such source.
    fn listen(&mut self, listener: HostListener) -> Option<SubscriptionHandle>;

    fn release(&mut self, handle: SubscriptionHandle);
}

/// In-memory services used for headless hosting and tests.
#[derive(Debug, Default)]
pub struct StaticWidgetServices {
    aliases: IndexMap<String, String>,
    pub subscriptions: Vec<(SubscriptionHandle, Vec<Datasource>)>,
    pub listeners: Vec<(SubscriptionHandle, HostListener)>,
    pub released: Vec<SubscriptionHandle>,
    pub theme_source: bool,
    pub fail_subscriptions: bool,
    next_handle: u64,
}

impl StaticWidgetServices {
    #[must_use]
    pub fn new() -> Self {
        Self {
            theme_source: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>, alias_id: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), alias_id.into());
        self
    }

    #[must_use]
    pub fn with_theme_source(mut self, theme_source: bool) -> Self {
        self.theme_source = theme_source;
        self
    }

    #[must_use]
    pub fn is_released(&self, handle: SubscriptionHandle) -> bool {
        self.released.contains(&handle)
    }

    /// Handles registered and not yet released.
    #[must_use]
    pub fn active_handles(&self) -> Vec<SubscriptionHandle> {
        self.subscriptions
            .iter()
            .map(|(handle, _)| *handle)
            .chain(self.listeners.iter().map(|(handle, _)| *handle))
            .filter(|handle| !self.is_released(*handle))
            .collect()
    }

    fn next_handle(&mut self) -> SubscriptionHandle {
        self.next_handle += 1;
        SubscriptionHandle(self.next_handle)
    }
}

impl WidgetServices for StaticWidgetServices {
    fn entity_alias_id(&self, alias: &str) -> Option<String> {
        self.aliases.get(alias).cloned()
    }

    fn subscribe_latest(
        &mut self,
        datasources: Vec<Datasource>,
    ) -> ChartResult<SubscriptionHandle> {
        if self.fail_subscriptions {
            return Err(ChartError::Subscription(
                "latest-value subscriptions are unavailable".to_owned(),
            ));
        }
        let handle = self.next_handle();
        self.subscriptions.push((handle, datasources));
        Ok(handle)
    }

    fn listen(&mut self, listener: HostListener) -> Option<SubscriptionHandle> {
        if listener == HostListener::Theme && !self.theme_source {
            return None;
        }
        let handle = self.next_handle();
        self.listeners.push((handle, listener));
        Some(handle)
    }

    fn release(&mut self, handle: SubscriptionHandle) {
        if !self.released.contains(&handle) {
            self.released.push(handle);
        }
    }
}
