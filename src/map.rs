//! Map view state (center, zoom, base map, geocoder marker) and the Web Mercator viewport.

use crate::models::GeoPoint;
use geo::Rect;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const ATTRIBUTION: &str = "© OpenStreetMap contributors";
pub const DEFAULT_CENTER: GeoPoint = GeoPoint::new(9.082, 1.0199);
pub const DEFAULT_ZOOM: f64 = 5.0;
/// Zoom applied when recentering on a geocoding hit.
pub const GEOCODE_ZOOM: f64 = 8.0;
pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 19.0;
pub const TILE_SIZE: f64 = 256.0;
/// Latitude limit of the square Web Mercator world.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown base map `{0}` (expected standard, dark or satellite)")]
pub struct UnknownBaseMap(pub String);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseMap {
    #[default]
    Standard,
    Dark,
    Satellite,
}

impl BaseMap {
    pub const ALL: [BaseMap; 3] = [BaseMap::Standard, BaseMap::Dark, BaseMap::Satellite];

    pub fn tile_url(self) -> &'static str {
        match self {
            BaseMap::Standard => "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            BaseMap::Dark => "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png",
            BaseMap::Satellite => {
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BaseMap::Standard => "Standard",
            BaseMap::Dark => "Dark",
            BaseMap::Satellite => "Satellite",
        }
    }

    /// Flat color painted under the regions in place of tiles.
    pub fn background(self) -> (u8, u8, u8) {
        match self {
            BaseMap::Standard => (242, 239, 233),
            BaseMap::Dark => (38, 38, 38),
            BaseMap::Satellite => (31, 45, 38),
        }
    }

    /// Text color that stays readable on [`BaseMap::background`].
    pub fn foreground(self) -> (u8, u8, u8) {
        match self {
            BaseMap::Standard => (40, 40, 40),
            BaseMap::Dark | BaseMap::Satellite => (230, 230, 230),
        }
    }
}

impl fmt::Display for BaseMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BaseMap {
    type Err = UnknownBaseMap;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "osm" => Ok(BaseMap::Standard),
            "dark" => Ok(BaseMap::Dark),
            "satellite" | "imagery" => Ok(BaseMap::Satellite),
            _ => Err(UnknownBaseMap(s.to_string())),
        }
    }
}

/// World pixel coordinates of `p` at `zoom` (origin top-left, y down).
pub fn project_world(p: GeoPoint, zoom: f64) -> (f64, f64) {
    let size = TILE_SIZE * zoom.exp2();
    let lat = p.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (p.lon + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

pub fn unproject_world(x: f64, y: f64, zoom: f64) -> GeoPoint {
    let size = TILE_SIZE * zoom.exp2();
    let lon = x / size * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * y / size);
    let lat = n.sinh().atan().to_degrees();
    GeoPoint::new(lat, lon)
}

/// A screen-sized window onto the Web Mercator plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: GeoPoint,
    pub zoom: f64,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(center: GeoPoint, zoom: f64, width: u32, height: u32) -> Self {
        Self {
            center,
            zoom,
            width,
            height,
        }
    }

    /// Screen pixel of `p`, relative to the top-left corner.
    pub fn project(&self, p: GeoPoint) -> (f64, f64) {
        let (cx, cy) = project_world(self.center, self.zoom);
        let (x, y) = project_world(p, self.zoom);
        (
            x - cx + f64::from(self.width) / 2.0,
            y - cy + f64::from(self.height) / 2.0,
        )
    }

    pub fn unproject(&self, px: f64, py: f64) -> GeoPoint {
        let (cx, cy) = project_world(self.center, self.zoom);
        unproject_world(
            cx + px - f64::from(self.width) / 2.0,
            cy + py - f64::from(self.height) / 2.0,
            self.zoom,
        )
    }

    /// Largest view that shows all of `bounds` (lon/lat rect) with `padding` pixels on each side.
    pub fn fit_bounds(bounds: Rect<f64>, width: u32, height: u32, padding: f64) -> Self {
        let sw = GeoPoint::new(bounds.min().y, bounds.min().x);
        let ne = GeoPoint::new(bounds.max().y, bounds.max().x);
        let (x0, y1) = project_world(sw, 0.0);
        let (x1, y0) = project_world(ne, 0.0);
        let avail_w = (f64::from(width) - 2.0 * padding).max(1.0);
        let avail_h = (f64::from(height) - 2.0 * padding).max(1.0);
        let span_w = (x1 - x0).abs();
        let span_h = (y1 - y0).abs();
        let zoom = match (span_w > 0.0, span_h > 0.0) {
            (false, false) => MAX_ZOOM,
            (true, false) => (avail_w / span_w).log2(),
            (false, true) => (avail_h / span_h).log2(),
            (true, true) => (avail_w / span_w).min(avail_h / span_h).log2(),
        }
        .clamp(MIN_ZOOM, MAX_ZOOM);
        let center = unproject_world((x0 + x1) / 2.0, (y0 + y1) / 2.0, 0.0);
        Self::new(center, zoom, width, height)
    }
}

/// Camera and overlays of the map surface.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub center: GeoPoint,
    pub zoom: f64,
    pub base_map: BaseMap,
    marker: Option<GeoPoint>,
}

impl Default for MapView {
    fn default() -> Self {
        Self::new(DEFAULT_CENTER, DEFAULT_ZOOM, BaseMap::default())
    }
}

impl MapView {
    pub fn new(center: GeoPoint, zoom: f64, base_map: BaseMap) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            base_map,
            marker: None,
        }
    }

    pub fn set_view(&mut self, center: GeoPoint, zoom: f64) {
        self.center = center;
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Switch base layers; exactly one is shown at a time.
    pub fn set_base_map(&mut self, base_map: BaseMap) {
        self.base_map = base_map;
    }

    /// Drop a marker, replacing the previous one.
    pub fn add_temporary_marker(&mut self, at: GeoPoint) {
        self.marker = Some(at);
    }

    pub fn clear_markers(&mut self) {
        self.marker = None;
    }

    pub fn marker(&self) -> Option<GeoPoint> {
        self.marker
    }

    pub fn viewport(&self, width: u32, height: u32) -> Viewport {
        Viewport::new(self.center, self.zoom, width, height)
    }

    /// Move the map content by a screen delta (drag).
    pub fn pan_pixels(&mut self, dx: f64, dy: f64, width: u32, height: u32) {
        let vp = self.viewport(width, height);
        self.center = vp.unproject(f64::from(width) / 2.0 - dx, f64::from(height) / 2.0 - dy);
    }

    /// Zoom by `delta` levels while keeping the point under `anchor` fixed on screen.
    pub fn zoom_at(&mut self, delta: f64, anchor: (f64, f64), width: u32, height: u32) {
        let before = self.viewport(width, height);
        let fixed = before.unproject(anchor.0, anchor.1);
        self.zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
        let after = self.viewport(width, height);
        let (fx, fy) = after.project(fixed);
        self.pan_pixels(anchor.0 - fx, anchor.1 - fy, width, height);
    }

    /// Frame `bounds` in a `width`×`height` surface.
    pub fn fit(&mut self, bounds: Rect<f64>, width: u32, height: u32) {
        let vp = Viewport::fit_bounds(bounds, width, height, 20.0);
        self.set_view(vp.center, vp.zoom);
    }
}
