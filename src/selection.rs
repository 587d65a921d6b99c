//! Sidebar button groups and the active-metric switch.

use crate::choropleth::ChoroplethRenderer;
use crate::classify::ClassifyError;
use crate::metrics::Metric;
use crate::models::FeatureCollection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A row of mutually exclusive buttons; exactly one option is selected at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonGroup<T> {
    options: Vec<T>,
    selected: usize,
}

impl<T: Copy + PartialEq> ButtonGroup<T> {
    /// The first option starts selected. `options` must not be empty.
    pub fn new(options: Vec<T>) -> Self {
        Self {
            options,
            selected: 0,
        }
    }

    /// Select `value`; deselects every other option. Unknown values are ignored.
    pub fn select(&mut self, value: T) -> bool {
        match self.options.iter().position(|o| *o == value) {
            Some(idx) => {
                self.selected = idx;
                true
            }
            None => false,
        }
    }

    pub fn selected(&self) -> Option<T> {
        self.options.get(self.selected).copied()
    }

    pub fn is_selected(&self, value: T) -> bool {
        self.selected() == Some(value)
    }

    pub fn options(&self) -> &[T] {
        &self.options
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::Day,
        TimeRange::Week,
        TimeRange::Month,
        TimeRange::Year,
    ];
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadType {
    #[default]
    Total,
    Residential,
    Commercial,
}

impl LoadType {
    pub const ALL: [LoadType; 3] = [LoadType::Total, LoadType::Residential, LoadType::Commercial];
}

impl fmt::Display for LoadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Button state of the sidebar plus the metric currently driving the choropleth.
#[derive(Debug, Clone)]
pub struct LayerSelectionController {
    metrics: ButtonGroup<Metric>,
    time_range: ButtonGroup<TimeRange>,
    load_type: ButtonGroup<LoadType>,
    active: Option<Metric>,
}

impl Default for LayerSelectionController {
    fn default() -> Self {
        Self {
            metrics: ButtonGroup::new(Metric::ALL.to_vec()),
            time_range: ButtonGroup::new(TimeRange::ALL.to_vec()),
            load_type: ButtonGroup::new(LoadType::ALL.to_vec()),
            active: None,
        }
    }
}

impl LayerSelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highlight `metric` and re-render the full collection with it.
    ///
    /// The active metric only changes when rendering succeeds; the button state follows the click.
    pub fn select_metric(
        &mut self,
        metric: Metric,
        renderer: &mut ChoroplethRenderer,
        collection: &FeatureCollection,
    ) -> Result<(), ClassifyError> {
        self.metrics.select(metric);
        match renderer.render(collection, metric) {
            Ok(_) => {
                self.active = Some(metric);
                Ok(())
            }
            Err(e) => {
                log::error!("cannot render `{metric}`: {e}");
                Err(e)
            }
        }
    }

    /// Visual only: no data is reloaded.
    pub fn select_time_range(&mut self, range: TimeRange) {
        self.time_range.select(range);
    }

    /// Visual only: no data is reloaded.
    pub fn select_load_type(&mut self, load: LoadType) {
        self.load_type.select(load);
    }

    pub fn active_metric(&self) -> Option<Metric> {
        self.active
    }

    pub fn metrics(&self) -> &ButtonGroup<Metric> {
        &self.metrics
    }

    pub fn time_range(&self) -> &ButtonGroup<TimeRange> {
        &self.time_range
    }

    pub fn load_type(&self) -> &ButtonGroup<LoadType> {
        &self.load_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_is_mutually_exclusive() {
        let mut g = ButtonGroup::new(TimeRange::ALL.to_vec());
        assert!(g.is_selected(TimeRange::Day));
        g.select(TimeRange::Month);
        assert!(g.is_selected(TimeRange::Month));
        assert!(!g.is_selected(TimeRange::Day));
    }
}
