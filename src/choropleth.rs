//! Choropleth layer: per-region styles and the matching legend.
//!
//! A [`ChoroplethRenderer`] owns at most one [`RegionLayer`] and one [`Legend`].
//! Each successful [`ChoroplethRenderer::render`] releases both before installing
//! the new pair, so repeated metric switches never accumulate layers.

use crate::classify::{Breakpoints, ClassifyError, compute_thresholds};
use crate::color::{ColorMapper, ColorPalette, FALLBACK_COLOR, Rgb};
use crate::metrics::Metric;
use crate::models::FeatureCollection;
use serde::Serialize;
use std::fmt;

/// Border weight of a region in its resting state, in pixels.
pub const BASE_WEIGHT: f64 = 2.0;
pub const BASE_FILL_OPACITY: f64 = 0.8;
/// Emphasis applied while the pointer is over a region.
pub const HIGHLIGHT_WEIGHT: f64 = 5.0;
pub const HIGHLIGHT_BORDER: Rgb = Rgb::new(0x66, 0x66, 0x66);
pub const HIGHLIGHT_FILL_OPACITY: f64 = 0.7;

/// Drawing style of one region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionStyle {
    pub fill: Rgb,
    pub border: Rgb,
    pub weight: f64,
    pub fill_opacity: f64,
}

impl RegionStyle {
    /// Resting style: fill and border share the class color.
    pub fn base(color: Rgb) -> Self {
        Self {
            fill: color,
            border: color,
            weight: BASE_WEIGHT,
            fill_opacity: BASE_FILL_OPACITY,
        }
    }

    /// Hover emphasis. The fill color is kept.
    pub fn highlighted(self) -> Self {
        Self {
            border: HIGHLIGHT_BORDER,
            weight: HIGHLIGHT_WEIGHT,
            fill_opacity: HIGHLIGHT_FILL_OPACITY,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LayerId(u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer-{}", self.0)
    }
}

/// One rendered choropleth: a class and a style per feature, index-aligned with the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionLayer {
    id: LayerId,
    metric: Metric,
    breakpoints: Breakpoints,
    classes: Vec<Option<usize>>,
    styles: Vec<RegionStyle>,
}

impl RegionLayer {
    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    pub fn style(&self, feature: usize) -> Option<RegionStyle> {
        self.styles.get(feature).copied()
    }

    pub fn styles(&self) -> &[RegionStyle] {
        &self.styles
    }

    /// Palette index of a feature, `None` when it had no usable value.
    pub fn class_of(&self, feature: usize) -> Option<usize> {
        self.classes.get(feature).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

/// Upper or lower bound a legend row stands for, already scaled to display units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LegendBound {
    AtMost(f64),
    Above(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendRow {
    pub color: Rgb,
    pub bound: LegendBound,
}

impl LegendRow {
    /// Display value with 2 decimals, e.g. `"0.19"`.
    pub fn value_text(&self) -> String {
        match self.bound {
            LegendBound::AtMost(v) | LegendBound::Above(v) => format!("{v:.2}"),
        }
    }

    pub fn label(&self) -> String {
        match self.bound {
            LegendBound::AtMost(_) => format!("≤ {}", self.value_text()),
            LegendBound::Above(_) => format!("> {}", self.value_text()),
        }
    }
}

/// Color key for the active layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: String,
    pub rows: Vec<LegendRow>,
}

impl Legend {
    /// One row per color: N-1 "≤ threshold" rows and a final "> last threshold" row.
    /// Thresholds are multiplied by the metric's display factor.
    pub fn build(metric: Metric, breakpoints: &Breakpoints, palette: &ColorPalette) -> Self {
        let factor = metric.display_factor();
        let thresholds = breakpoints.thresholds();
        let mut rows: Vec<LegendRow> = thresholds
            .iter()
            .zip(palette.colors())
            .map(|(t, color)| LegendRow {
                color: *color,
                bound: LegendBound::AtMost(t * factor),
            })
            .collect();
        if let (Some(last), Some(color)) = (thresholds.last(), palette.get(thresholds.len())) {
            rows.push(LegendRow {
                color,
                bound: LegendBound::Above(last * factor),
            });
        }
        Self {
            title: metric.legend_title(),
            rows,
        }
    }
}

/// Owns the active region layer and legend; replaces both on every render.
#[derive(Debug, Clone)]
pub struct ChoroplethRenderer {
    palette: ColorPalette,
    fallback: Rgb,
    num_classes: usize,
    layer: Option<RegionLayer>,
    legend: Option<Legend>,
    next_id: u64,
}

impl Default for ChoroplethRenderer {
    fn default() -> Self {
        Self::new(ColorPalette::default(), FALLBACK_COLOR)
    }
}

impl ChoroplethRenderer {
    /// One class per palette color.
    pub fn new(palette: ColorPalette, fallback: Rgb) -> Self {
        let num_classes = palette.len();
        Self::with_classes(palette, fallback, num_classes)
    }

    /// Explicit class count; it must match the palette length or rendering fails.
    pub fn with_classes(palette: ColorPalette, fallback: Rgb, num_classes: usize) -> Self {
        Self {
            palette,
            fallback,
            num_classes,
            layer: None,
            legend: None,
            next_id: 0,
        }
    }

    /// Classify `collection` by `metric`, style every feature, rebuild the legend and
    /// swap them in for the previous layer.
    ///
    /// On error nothing changes: the previous layer and legend stay in place.
    pub fn render(
        &mut self,
        collection: &FeatureCollection,
        metric: Metric,
    ) -> Result<&RegionLayer, ClassifyError> {
        let breakpoints = compute_thresholds(collection, metric.property(), self.num_classes)?;
        let mapper = ColorMapper::new(&breakpoints, &self.palette, self.fallback)?;

        let classes: Vec<Option<usize>> = collection
            .iter()
            .map(|f| mapper.class_index(f.properties.number(metric.property())))
            .collect();
        let styles = collection
            .iter()
            .map(|f| RegionStyle::base(mapper.color_for(f.properties.number(metric.property()))))
            .collect();
        let legend = Legend::build(metric, &breakpoints, &self.palette);

        self.clear();
        self.next_id += 1;
        let layer = RegionLayer {
            id: LayerId(self.next_id),
            metric,
            breakpoints,
            classes,
            styles,
        };
        log::info!(
            "rendered {} for `{}` over {} regions",
            layer.id,
            metric.key(),
            layer.len()
        );
        self.legend = Some(legend);
        Ok(self.layer.insert(layer))
    }

    /// Release the current layer and legend.
    pub fn clear(&mut self) {
        if let Some(prev) = self.layer.take() {
            log::debug!("detached {}", prev.id);
        }
        self.legend = None;
    }

    pub fn layer(&self) -> Option<&RegionLayer> {
        self.layer.as_ref()
    }

    pub fn legend(&self) -> Option<&Legend> {
        self.legend.as_ref()
    }

    /// Number of live region layers (0 or 1).
    pub fn layer_count(&self) -> usize {
        usize::from(self.layer.is_some())
    }

    /// Number of live legends (0 or 1).
    pub fn legend_count(&self) -> usize {
        usize::from(self.legend.is_some())
    }
}
