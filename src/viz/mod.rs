//! Visualization: render the choropleth map and load charts to **SVG** or **PNG**,
//! or rasterize the map into an RGB buffer for the desktop viewer.
//!
//! - Regions are projected with Web Mercator and drawn bottom-to-top in the order the scene gives
//! - Polygon holes are outlined, not cut out of the fill
//! - Legend panel in the lower-right corner, attribution in the lower-left corner

pub mod chart;
pub mod legend;
pub mod types;
pub mod util;

pub use chart::plot_series;
pub use types::OutputFormat;

use crate::choropleth::{Legend, RegionStyle};
use crate::map::{ATTRIBUTION, BaseMap, Viewport};
use crate::models::GeoPoint;
use anyhow::{Result, anyhow};
use geo::{Geometry, LineString, Polygon};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::Path;
use std::sync::Once;

use legend::draw_legend;
use util::{to_rgb_color, tuple_color};

/// One-time registration for a fallback "sans-serif" font when using the `ab_glyph` text path.
/// Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

pub(crate) fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        // from `src/viz/mod.rs` → project root → `assets/DejaVuSans.ttf`
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
    });
}

const MARKER_RADIUS: i32 = 7;
const MARKER_FILL: RGBColor = RGBColor(229, 57, 53);

/// One region to draw: its geometry and current style.
#[derive(Debug, Clone, Copy)]
pub struct SceneRegion<'a> {
    pub geometry: &'a Geometry<f64>,
    pub style: RegionStyle,
}

/// Everything visible on the map surface, regions in bottom-to-top order.
#[derive(Debug, Clone)]
pub struct MapScene<'a> {
    pub viewport: Viewport,
    pub base_map: BaseMap,
    pub regions: Vec<SceneRegion<'a>>,
    pub legend: Option<&'a Legend>,
    pub marker: Option<GeoPoint>,
}

/// Render `scene` to `out_path` (`.svg` → SVG, anything else → PNG) at the viewport's size.
pub fn render_map<P: AsRef<Path>>(scene: &MapScene<'_>, out_path: P) -> Result<()> {
    ensure_fonts_registered();
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    let size = (scene.viewport.width, scene.viewport.height);

    match OutputFormat::from_path(out_path) {
        OutputFormat::Svg => {
            let root = SVGBackend::new(path_string.as_str(), size).into_drawing_area();
            draw_map(&root, scene)?;
        }
        OutputFormat::Bitmap => {
            let root = BitMapBackend::new(path_string.as_str(), size).into_drawing_area();
            draw_map(&root, scene)?;
        }
    }
    log::info!(
        "wrote map with {} regions to {}",
        scene.regions.len(),
        path_string
    );
    Ok(())
}

/// Rasterize `scene` into a tightly packed RGB8 buffer of `width * height * 3` bytes.
pub fn render_map_rgb(scene: &MapScene<'_>) -> Result<Vec<u8>> {
    ensure_fonts_registered();
    let (w, h) = (scene.viewport.width, scene.viewport.height);
    let mut buf = vec![0u8; w as usize * h as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
        draw_map(&root, scene)?;
    }
    Ok(buf)
}

/// Draw the whole map (background, regions, marker, legend, attribution) onto `root`.
pub fn draw_map<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, scene: &MapScene<'_>) -> Result<()> {
    let vp = &scene.viewport;
    root.fill(&tuple_color(scene.base_map.background()))
        .map_err(|e| anyhow!("{:?}", e))?;

    for region in &scene.regions {
        for polygon in polygons(region.geometry) {
            draw_polygon(root, vp, polygon, &region.style)?;
        }
    }

    if let Some(marker) = scene.marker {
        let (x, y) = vp.project(marker);
        let at = (x.round() as i32, y.round() as i32);
        root.draw(&Circle::new(at, MARKER_RADIUS, MARKER_FILL.filled()))
            .map_err(|e| anyhow!("{:?}", e))?;
        root.draw(&Circle::new(at, MARKER_RADIUS, WHITE.stroke_width(2)))
            .map_err(|e| anyhow!("{:?}", e))?;
    }

    if let Some(legend) = scene.legend {
        draw_legend(root, legend)?;
    }

    draw_attribution(root, scene.base_map)?;
    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_attribution<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, base: BaseMap) -> Result<()> {
    let (_, h) = root.dim_in_pixel();
    let fg = tuple_color(base.foreground());
    let style: TextStyle = TextStyle::from((FontFamily::SansSerif, 11))
        .color(&fg)
        .pos(Pos::new(HPos::Left, VPos::Bottom));
    root.draw(&Text::new(ATTRIBUTION, (6, h as i32 - 5), style))
        .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Every polygon of a geometry. Points and lines are not drawable regions.
fn polygons(geometry: &Geometry<f64>) -> Vec<&Polygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => vec![p],
        Geometry::MultiPolygon(mp) => mp.0.iter().collect(),
        Geometry::GeometryCollection(gc) => gc.0.iter().flat_map(polygons).collect(),
        _ => Vec::new(),
    }
}

fn ring_pixels(vp: &Viewport, ring: &LineString<f64>) -> Vec<(i32, i32)> {
    ring.coords()
        .map(|c| {
            let (x, y) = vp.project(GeoPoint::new(c.y, c.x));
            (x.round() as i32, y.round() as i32)
        })
        .collect()
}

fn off_screen(vp: &Viewport, pts: &[(i32, i32)]) -> bool {
    let (w, h) = (vp.width as i32, vp.height as i32);
    pts.iter().all(|p| p.0 < 0)
        || pts.iter().all(|p| p.0 > w)
        || pts.iter().all(|p| p.1 < 0)
        || pts.iter().all(|p| p.1 > h)
}

fn draw_polygon<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    vp: &Viewport,
    polygon: &Polygon<f64>,
    style: &RegionStyle,
) -> Result<()> {
    let exterior = ring_pixels(vp, polygon.exterior());
    if exterior.len() < 3 || off_screen(vp, &exterior) {
        return Ok(());
    }
    let fill = to_rgb_color(style.fill).mix(style.fill_opacity).filled();
    let border = to_rgb_color(style.border).stroke_width(style.weight.round().max(1.0) as u32);

    root.draw(&plotters::element::Polygon::new(exterior.clone(), fill))
        .map_err(|e| anyhow!("{:?}", e))?;
    root.draw(&PathElement::new(exterior, border))
        .map_err(|e| anyhow!("{:?}", e))?;
    for hole in polygon.interiors() {
        root.draw(&PathElement::new(ring_pixels(vp, hole), border))
            .map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}
