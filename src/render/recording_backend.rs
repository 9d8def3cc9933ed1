use std::collections::HashMap;

use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{ChartAction, ChartBackend, ChartGeometry, ChartOption, OptionUpdate};

/// One call observed by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Init(Viewport),
    SetOption(OptionUpdate),
    Action(ChartAction),
    Resize(Viewport),
    Dispose,
}

/// Headless backend used by tests and server-side option generation.
///
/// Records every call, keeps the last applied option, and answers geometry
/// queries from fixed, configurable measurements.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<RecordedCall>,
    pub last_option: Option<ChartOption>,
    pub viewport: Viewport,
    pub disposed: bool,
    pub y_axis_width: f64,
    pub y_axis_widths: HashMap<String, f64>,
    pub y_axis_name_width: f64,
    pub x_axis_height: f64,
    pub x_axis_name_height: f64,
    pub threshold_offset: (f64, f64),
    pub extents: HashMap<String, (f64, f64)>,
}

impl RecordingBackend {
    /// Backend measuring every axis at `y_axis_width` x `x_axis_height`.
    #[must_use]
    pub fn with_axis_sizes(y_axis_width: f64, x_axis_height: f64) -> Self {
        Self {
            y_axis_width,
            x_axis_height,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn set_option_calls(&self) -> Vec<&OptionUpdate> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RecordedCall::SetOption(update) => Some(update),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn actions(&self) -> Vec<&ChartAction> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Action(action) => Some(action),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn ensure_live(&self) -> ChartResult<()> {
        if self.disposed {
            return Err(ChartError::Backend("backend already disposed".to_owned()));
        }
        Ok(())
    }

    fn axis_shown(&self, axis_id: &str) -> bool {
        self.last_option.as_ref().is_some_and(|option| {
            option
                .y_axis
                .iter()
                .any(|axis| axis.id == axis_id && axis.show)
        })
    }

    fn x_axis_shown(&self, axis_id: &str) -> bool {
        self.last_option.as_ref().is_some_and(|option| {
            option
                .x_axis
                .iter()
                .any(|axis| axis.id == axis_id && axis.show)
        })
    }
}

impl ChartGeometry for RecordingBackend {
    fn y_axis_width(&self, axis_id: &str) -> f64 {
        if !self.axis_shown(axis_id) {
            return 0.0;
        }
        self.y_axis_widths
            .get(axis_id)
            .copied()
            .unwrap_or(self.y_axis_width)
    }

    fn y_axis_name_width(&self, _axis_id: &str, name: &str) -> f64 {
        if name.is_empty() {
            0.0
        } else {
            self.y_axis_name_width
        }
    }

    fn x_axis_height(&self, axis_id: &str) -> f64 {
        if self.x_axis_shown(axis_id) {
            self.x_axis_height
        } else {
            0.0
        }
    }

    fn x_axis_name_height(&self, name: &str) -> f64 {
        if name.is_empty() {
            0.0
        } else {
            self.x_axis_name_height
        }
    }

    fn axis_extent(&self, axis_id: &str) -> Option<(f64, f64)> {
        self.extents.get(axis_id).copied()
    }

    fn threshold_label_offset(
        &self,
        _axis_id: &str,
        _series_id: &str,
        values: &[f64],
    ) -> (f64, f64) {
        if values.is_empty() {
            (0.0, 0.0)
        } else {
            self.threshold_offset
        }
    }
}

impl ChartBackend for RecordingBackend {
    fn init(&mut self, viewport: Viewport) -> ChartResult<()> {
        self.ensure_live()?;
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        self.viewport = viewport;
        self.calls.push(RecordedCall::Init(viewport));
        Ok(())
    }

    fn set_option(&mut self, option: &ChartOption, update: OptionUpdate) -> ChartResult<()> {
        self.ensure_live()?;
        self.last_option = Some(option.clone());
        self.calls.push(RecordedCall::SetOption(update));
        Ok(())
    }

    fn dispatch_action(&mut self, action: ChartAction) -> ChartResult<()> {
        self.ensure_live()?;
        self.calls.push(RecordedCall::Action(action));
        Ok(())
    }

    fn size(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        self.ensure_live()?;
        self.viewport = viewport;
        self.calls.push(RecordedCall::Resize(viewport));
        Ok(())
    }

    fn dispose(&mut self) {
        self.disposed = true;
        self.calls.push(RecordedCall::Dispose);
    }
}
