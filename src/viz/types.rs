//! Public types and constants for the visualization module.

use std::path::Path;

/// Image encoding picked from the output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    /// Any raster format the `image` crate can write (PNG by default).
    Bitmap,
}

impl OutputFormat {
    /// `.svg` (any case) selects SVG; everything else is rasterized.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => OutputFormat::Svg,
            _ => OutputFormat::Bitmap,
        }
    }
}

/// Default output size of rendered maps.
pub const DEFAULT_MAP_SIZE: (u32, u32) = (1200, 900);
/// Default output size of rendered load charts.
pub const DEFAULT_CHART_SIZE: (u32, u32) = (1000, 500);

/// Line color of the load chart (emerald).
pub const CHART_LINE: (u8, u8, u8) = (5, 150, 105);
/// Opacity of the area under the load line.
pub const CHART_AREA_OPACITY: f64 = 0.1;
