use smallvec::SmallVec;

use super::{ChartOption, OptionSection};

/// How the backend should combine a pushed option with its current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOptionMode {
    /// Deep-merge the whole option into the current one.
    Merge,
    /// Replace the listed top-level sections, merge the rest.
    ReplaceMerge(Vec<OptionSection>),
    /// Drop the current state and apply the option from scratch.
    NotMerge,
}

/// One `setOption` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionUpdate {
    pub mode: SetOptionMode,
    /// Defer the repaint to the backend's next frame.
    pub lazy: bool,
}

impl OptionUpdate {
    #[must_use]
    pub fn merge() -> Self {
        Self {
            mode: SetOptionMode::Merge,
            lazy: false,
        }
    }

    #[must_use]
    pub fn not_merge() -> Self {
        Self {
            mode: SetOptionMode::NotMerge,
            lazy: false,
        }
    }

    #[must_use]
    pub fn replace(sections: impl IntoIterator<Item = OptionSection>) -> Self {
        Self {
            mode: SetOptionMode::ReplaceMerge(sections.into_iter().collect()),
            lazy: false,
        }
    }

    #[must_use]
    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }
}

/// Top-level sections that differ between two option values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionPatch {
    sections: SmallVec<[OptionSection; 4]>,
}

impl OptionPatch {
    /// Compares `prev` and `next` section by section.
    #[must_use]
    pub fn between(prev: &ChartOption, next: &ChartOption) -> Self {
        let mut sections = SmallVec::new();
        if prev.dark_mode != next.dark_mode || prev.background_color != next.background_color {
            sections.push(OptionSection::Theme);
        }
        if prev.tooltip != next.tooltip {
            sections.push(OptionSection::Tooltip);
        }
        if prev.grid != next.grid {
            sections.push(OptionSection::Grid);
        }
        if prev.x_axis != next.x_axis {
            sections.push(OptionSection::XAxis);
        }
        if prev.y_axis != next.y_axis {
            sections.push(OptionSection::YAxis);
        }
        if prev.series != next.series {
            sections.push(OptionSection::Series);
        }
        if prev.data_zoom != next.data_zoom {
            sections.push(OptionSection::DataZoom);
        }
        if prev.visual_map != next.visual_map {
            sections.push(OptionSection::VisualMap);
        }
        if prev.animation != next.animation {
            sections.push(OptionSection::Animation);
        }
        Self { sections }
    }

    /// Restricts the patch to layout sections (axes and grid).
    #[must_use]
    pub fn layout_only(&self) -> Self {
        Self {
            sections: self
                .sections
                .iter()
                .copied()
                .filter(|section| {
                    matches!(
                        section,
                        OptionSection::Grid | OptionSection::XAxis | OptionSection::YAxis
                    )
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    #[must_use]
    pub fn contains(&self, section: OptionSection) -> bool {
        self.sections.contains(&section)
    }

    #[must_use]
    pub fn sections(&self) -> &[OptionSection] {
        &self.sections
    }

    /// Update for a series push: full replacement while stacking, otherwise a
    /// replace-merge of the changed sections (always including `series`).
    #[must_use]
    pub fn series_update(&self, stack: bool) -> OptionUpdate {
        if stack {
            return OptionUpdate::not_merge();
        }
        let mut sections: Vec<OptionSection> = self.sections.to_vec();
        if !sections.contains(&OptionSection::Series) {
            sections.push(OptionSection::Series);
        }
        sections.sort();
        OptionUpdate::replace(sections)
    }
}
