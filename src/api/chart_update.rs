use tracing::{debug, trace};

use crate::core::{AuxiliaryData, DatasourceData, Viewport};
use crate::error::ChartResult;
use crate::render::{
    AxisPointerType, ChartBackend, ChartOption, DataZoomOption, DataZoomType, GridOption,
    OptionPatch, OptionSection, OptionUpdate, TooltipOption, VisualMapOption,
};

use super::axis_builder::apply_y_axis_scale;
use super::axis_layout::{
    DATA_ZOOM_SIDE_PADDING, LayoutInput, compute_axis_layout, min_bottom_offset, min_top_offset,
};
use super::chart::{ChartLifecycle, TimeSeriesChart};
use super::dynamic_limits::{DynamicUpdate, apply_auxiliary_data, apply_latest_data};
use super::series_builder::{SeriesContext, generate_chart_series};
use super::widget_context::{DataTick, SubscriptionHandle, WidgetServices};

impl<B: ChartBackend, S: WidgetServices> TimeSeriesChart<B, S> {
    /// Applies one data tick.
    ///
    /// Data items are refreshed first, then time windows are applied and the
    /// series pushed, then axes are laid out and the Y extents published.
    pub fn update(&mut self, tick: DataTick) -> ChartResult<()> {
        self.ensure_live()?;
        self.context.time_window = tick.time_window;
        if tick.comparison_time_window.is_some() {
            self.context.comparison_time_window = tick.comparison_time_window;
        }
        self.context.aggregation = tick.aggregation;

        let states = self.settings.state_converter.as_ref();
        let mut refreshed = 0usize;
        for item in &mut self.data_items {
            let incoming = tick
                .data
                .iter()
                .find(|row| row.key == item.key)
                .map_or(&[][..], |row| row.data.as_slice());
            if item.refresh(incoming, states) {
                refreshed += 1;
            }
        }
        trace!(refreshed, total = self.data_items.len(), "refreshed data items");

        self.on_resize()?;
        if self.is_active() {
            self.apply_time_windows();
            self.push_series(true)?;
            if let Some(key) = self.highlighted {
                self.dispatch_highlight(key)?;
            }
        }
        Ok(())
    }

    /// Applies the widget's latest values to latest-key thresholds and limits.
    pub fn latest_updated(&mut self, latest: &[DatasourceData]) -> ChartResult<()> {
        self.ensure_live()?;
        let update = apply_latest_data(latest, &mut self.thresholds, &mut self.y_axes);
        self.after_dynamic_update(update)
    }

    /// Applies rows delivered by the auxiliary entity subscription.
    ///
    /// Rows tagged with any other handle are ignored.
    pub fn on_auxiliary_data(
        &mut self,
        handle: SubscriptionHandle,
        rows: &[AuxiliaryData],
    ) -> ChartResult<()> {
        self.ensure_live()?;
        if self.auxiliary != Some(handle) {
            trace!(handle = handle.0, "ignored rows from unknown subscription");
            return Ok(());
        }
        let update = apply_auxiliary_data(rows, &mut self.thresholds, &mut self.y_axes);
        self.after_dynamic_update(update)
    }

    fn after_dynamic_update(&mut self, update: DynamicUpdate) -> ChartResult<()> {
        if !update.is_changed() {
            return Ok(());
        }
        if update.axis_limits {
            for axis in &mut self.y_axes {
                axis.apply_limits();
            }
        }
        debug!(
            thresholds = update.thresholds,
            axis_limits = update.axis_limits,
            "dynamic values changed"
        );
        if self.is_active() {
            self.push_series(false)?;
        }
        Ok(())
    }

    fn apply_time_windows(&mut self) {
        let main = self.context.time_window;
        let comparison = self.context.comparison_time_window;
        if let Some(axis) = self.x_axes.first_mut() {
            axis.apply_time_window(main);
        }
        if let (Some(axis), Some(window)) = (self.x_axes.get_mut(1), comparison) {
            axis.apply_time_window(window);
        }
    }

    /// Draws on the first non-empty container, resizes the backend after.
    pub(super) fn on_resize(&mut self) -> ChartResult<()> {
        let container = self.context.container;
        if !container.is_valid() {
            return Ok(());
        }
        match self.lifecycle {
            ChartLifecycle::Uninitialized => self.draw_chart(),
            ChartLifecycle::Active if self.backend.size() != container => {
                self.resize_backend(container)
            }
            ChartLifecycle::Active | ChartLifecycle::Destroyed => Ok(()),
        }
    }

    fn draw_chart(&mut self) -> ChartResult<()> {
        self.backend.init(self.context.container)?;
        self.apply_time_windows();
        apply_y_axis_scale(
            &mut self.y_axes,
            &self.data_items,
            self.chart_type.is_state(),
        );
        let side = if self.settings.data_zoom {
            DATA_ZOOM_SIDE_PADDING
        } else {
            0.0
        };
        self.grid = GridOption {
            top: min_top_offset(&self.data_items, &self.thresholds, &self.y_axes),
            left: side,
            right: side,
            bottom: min_bottom_offset(self.settings.data_zoom),
        };
        let option = self.build_option();
        self.backend.set_option(&option, OptionUpdate::not_merge())?;
        self.option = Some(option);
        self.lifecycle = ChartLifecycle::Active;
        debug!(
            widget = %self.context.widget_title,
            width = self.context.container.width,
            height = self.context.container.height,
            "drew chart"
        );
        self.update_axes(false)
    }

    fn resize_backend(&mut self, container: Viewport) -> ChartResult<()> {
        let animated_bars = self.settings.animation.animation
            && self
                .data_items
                .iter()
                .any(|item| item.enabled && item.is_bar());
        if animated_bars {
            self.set_bar_animation(false)?;
        }
        self.backend.resize(container)?;
        if animated_bars {
            self.set_bar_animation(true)?;
        }
        self.update_axes(false)
    }

    fn set_bar_animation(&mut self, animation: bool) -> ChartResult<()> {
        for item in self.data_items.iter_mut().filter(|item| item.is_bar()) {
            item.bar_animation = animation;
        }
        let next = self.build_option();
        self.push_option(next, |_| OptionUpdate::replace([OptionSection::Series]))?;
        Ok(())
    }

    /// Regenerates the series and pushes every changed section, then lays
    /// the axes out again.
    pub(super) fn push_series(&mut self, update_scale: bool) -> ChartResult<()> {
        if self.option.is_none() {
            return Ok(());
        }
        if update_scale {
            apply_y_axis_scale(
                &mut self.y_axes,
                &self.data_items,
                self.chart_type.is_state(),
            );
        }
        let next = self.build_option();
        let stack = self.settings.stack;
        self.push_option(next, |patch| patch.series_update(stack))?;
        self.update_axes(true)
    }

    /// Pushes `next` when it differs from the current option.
    pub(super) fn push_option(
        &mut self,
        next: ChartOption,
        update: impl FnOnce(&OptionPatch) -> OptionUpdate,
    ) -> ChartResult<bool> {
        let Some(prev) = self.option.as_ref() else {
            return Ok(false);
        };
        let patch = OptionPatch::between(prev, &next);
        if patch.is_empty() {
            return Ok(false);
        }
        let update = update(&patch);
        trace!(mode = ?update.mode, sections = ?patch.sections(), "pushing option");
        self.backend.set_option(&next, update)?;
        self.option = Some(next);
        Ok(true)
    }

    /// Measures the rendered axes and rewrites axes and grid only when a
    /// computed value changed; publishes the first Y axis extent afterwards.
    pub(super) fn update_axes(&mut self, lazy: bool) -> ChartResult<()> {
        let Some(prev) = self.option.as_ref() else {
            return Ok(());
        };
        let input = LayoutInput {
            x_axes: &self.x_axes,
            y_axes: &self.y_axes,
            thresholds: &self.thresholds,
            data_zoom: self.settings.data_zoom,
            min_top_offset: min_top_offset(&self.data_items, &self.thresholds, &self.y_axes),
            min_bottom_offset: min_bottom_offset(self.settings.data_zoom),
        };
        let layout = compute_axis_layout(input, &self.backend);

        let mut next = prev.clone();
        next.grid = layout.grid;
        next.x_axis.clone_from(&layout.x_axis);
        next.y_axis.clone_from(&layout.y_axis);
        let patch = OptionPatch::between(prev, &next).layout_only();
        if !patch.is_empty() {
            self.grid = layout.grid;
            for (axis, option) in self.x_axes.iter_mut().zip(layout.x_axis) {
                axis.option = option;
            }
            for (axis, option) in self.y_axes.iter_mut().zip(layout.y_axis) {
                axis.option = option;
            }
            let update = OptionUpdate::replace(patch.sections().iter().copied()).lazy(lazy);
            trace!(sections = ?patch.sections(), grid = ?layout.grid, "updating axis layout");
            self.backend.set_option(&next, update)?;
            self.option = Some(next);
        }
        self.publish_extent();
        Ok(())
    }

    fn publish_extent(&mut self) {
        let extent = self
            .y_axes
            .first()
            .and_then(|axis| self.backend.axis_extent(&axis.id));
        let Some((min, max)) = extent else {
            return;
        };
        if *self.y_min.value() != Some(min) {
            self.y_min.next(Some(min));
        }
        if *self.y_max.value() != Some(max) {
            self.y_max.next(Some(max));
        }
    }

    /// Full option for the current state.
    pub(super) fn build_option(&self) -> ChartOption {
        let settings = &self.settings;
        let series = generate_chart_series(
            &self.data_items,
            &self.thresholds,
            SeriesContext {
                settings,
                dark_mode: self.dark_mode,
                no_aggregation: self.context.aggregation.is_none(),
                time_interval: self.context.time_window.interval,
            },
        );
        let data_zoom = if settings.data_zoom {
            vec![
                DataZoomOption {
                    zoom_type: DataZoomType::Inside,
                    disabled: false,
                    show: true,
                    realtime: true,
                    show_detail: false,
                    bottom: None,
                },
                DataZoomOption {
                    zoom_type: DataZoomType::Slider,
                    disabled: false,
                    show: true,
                    realtime: true,
                    show_detail: false,
                    bottom: Some(10.0),
                },
            ]
        } else {
            Vec::new()
        };
        ChartOption {
            dark_mode: self.dark_mode,
            background_color: "transparent".to_owned(),
            tooltip: TooltipOption {
                show: settings.tooltip.show_tooltip,
                trigger: settings.tooltip.tooltip_trigger,
                confine: true,
                axis_pointer_type: if self.context.aggregation.is_none() {
                    AxisPointerType::Line
                } else {
                    AxisPointerType::Shadow
                },
                padding: [8, 12],
                background_color: settings.tooltip.tooltip_background_color.clone(),
                background_blur: settings.tooltip.tooltip_background_blur,
            },
            grid: self.grid,
            x_axis: self.x_axes.iter().map(|axis| axis.option.clone()).collect(),
            y_axis: self.y_axes.iter().map(|axis| axis.option.clone()).collect(),
            series,
            data_zoom,
            visual_map: settings
                .visual_map_settings
                .as_ref()
                .map(|visual_map| VisualMapOption {
                    show: false,
                    dimension: 1,
                    pieces: visual_map.pieces.clone(),
                    selected: self.visual_map_selected.clone(),
                }),
            animation: settings.animation.clone(),
        }
    }
}
