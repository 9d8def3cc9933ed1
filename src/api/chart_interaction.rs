use tracing::{debug, trace};

use crate::core::{DataKeyRef, Viewport};
use crate::error::ChartResult;
use crate::render::{ChartAction, ChartBackend, OptionUpdate};

use super::chart::TimeSeriesChart;
use super::events::HostEvent;
use super::tooltip::{TooltipContent, TooltipContext, TooltipParam, format_tooltip};
use super::widget_context::WidgetServices;

impl<B: ChartBackend, S: WidgetServices> TimeSeriesChart<B, S> {
    /// Routes a host notification. Events reaching a destroyed chart are
    /// dropped.
    pub fn handle_host_event(&mut self, event: HostEvent) -> ChartResult<()> {
        if self.ensure_live().is_err() {
            trace!(event = ?event, "dropped host event after destroy");
            return Ok(());
        }
        match event {
            HostEvent::Resized(viewport) => self.resize(viewport),
            HostEvent::ThemeChanged { dark_mode } => self.set_dark_mode(dark_mode),
            HostEvent::Scrolled => self.dispatch(ChartAction::HideTip),
            HostEvent::DataZoom => self.update_axes(true),
        }
    }

    /// Applies a new container size; draws when the chart is still waiting
    /// for a non-empty container.
    pub fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        self.ensure_live()?;
        self.context.container = viewport;
        self.on_resize()
    }

    /// Highlights the series of `key` and remembers it across updates.
    pub fn key_enter(&mut self, key: DataKeyRef) -> ChartResult<()> {
        self.ensure_live()?;
        let enabled = self
            .data_items
            .iter()
            .any(|item| item.key == key && item.enabled);
        if !enabled {
            return Ok(());
        }
        self.highlighted = Some(key);
        self.dispatch_highlight(key)
    }

    pub fn key_leave(&mut self, key: DataKeyRef) -> ChartResult<()> {
        self.ensure_live()?;
        self.highlighted = None;
        match self.series_id(key) {
            Some(series_id) => self.dispatch(ChartAction::Downplay { series_id }),
            None => Ok(()),
        }
    }

    pub(super) fn dispatch_highlight(&mut self, key: DataKeyRef) -> ChartResult<()> {
        match self.series_id(key) {
            Some(series_id) => self.dispatch(ChartAction::Highlight { series_id }),
            None => Ok(()),
        }
    }

    /// Shows or hides the series of `key`.
    ///
    /// Hiding downplays the series first; showing highlights it once the new
    /// series are pushed. The key's `hidden` flag is inverted. Returns the
    /// new enabled state, `None` for unknown keys.
    pub fn toggle_key(&mut self, key: DataKeyRef) -> ChartResult<Option<bool>> {
        self.ensure_live()?;
        let Some(index) = self.data_items.iter().position(|item| item.key == key) else {
            return Ok(None);
        };
        let enable = !self.data_items[index].enabled;
        let series_id = self.data_items[index].id.clone();
        if !enable {
            self.dispatch(ChartAction::Downplay {
                series_id: series_id.clone(),
            })?;
            if self.highlighted == Some(key) {
                self.highlighted = None;
            }
        }
        self.data_items[index].enabled = enable;
        self.push_series(true)?;
        if let Some(data_key) = self.context.data_key_mut(key) {
            data_key.hidden = !data_key.hidden;
        }
        if enable {
            self.dispatch(ChartAction::Highlight { series_id })?;
        }
        debug!(series = %self.data_items[index].id, enabled = enable, "toggled data key");
        Ok(Some(enable))
    }

    /// Flips the selection of one visual map piece. Returns the new state,
    /// `None` when the piece does not exist.
    pub fn toggle_visual_map_range(&mut self, index: usize) -> ChartResult<Option<bool>> {
        self.ensure_live()?;
        let Some(selected) = self.visual_map_selected.get_mut(&index) else {
            return Ok(None);
        };
        *selected = !*selected;
        let state = *selected;
        self.dispatch(ChartAction::SelectDataRange {
            selected: self.visual_map_selected.clone(),
        })?;
        if let Some(visual_map) = self
            .option
            .as_mut()
            .and_then(|option| option.visual_map.as_mut())
        {
            visual_map.selected.clone_from(&self.visual_map_selected);
        }
        Ok(Some(state))
    }

    /// Switches the colour scheme of axes, labels and thresholds.
    pub fn set_dark_mode(&mut self, dark_mode: bool) -> ChartResult<()> {
        self.ensure_live()?;
        if self.dark_mode == dark_mode {
            return Ok(());
        }
        self.dark_mode = dark_mode;
        self.context.theme.dark_mode = dark_mode;
        for axis in &mut self.x_axes {
            axis.apply_theme(dark_mode);
        }
        for axis in &mut self.y_axes {
            axis.apply_theme(dark_mode);
        }
        debug!(widget = %self.context.widget_title, dark_mode, "switched colour scheme");
        let next = self.build_option();
        if self.push_option(next, |_| OptionUpdate::merge())? {
            self.update_axes(false)?;
        }
        Ok(())
    }

    /// Tooltip content for the hovered points.
    #[must_use]
    pub fn format_tooltip(
        &self,
        params: &[TooltipParam],
        focused: Option<usize>,
    ) -> Option<TooltipContent> {
        let interval = if self.context.aggregation.is_none() {
            None
        } else {
            self.context.time_window.interval
        };
        format_tooltip(
            TooltipContext {
                settings: &self.settings.tooltip,
                items: &self.data_items,
                interval,
                states: self.settings.state_converter.as_ref(),
            },
            params,
            focused,
        )
    }

    fn series_id(&self, key: DataKeyRef) -> Option<String> {
        self.data_items
            .iter()
            .find(|item| item.key == key)
            .map(|item| item.id.clone())
    }

    fn dispatch(&mut self, action: ChartAction) -> ChartResult<()> {
        if !self.is_active() {
            return Ok(());
        }
        self.backend.dispatch_action(action)
    }
}
