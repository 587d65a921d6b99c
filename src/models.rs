use geo::{BoundingRect, Contains, Geometry, Point, Rect};
use geojson::GeoJson;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a region layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read layers: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a GeoJSON FeatureCollection, found a {0}")]
    NotAFeatureCollection(&'static str),
}

/// A WGS84 position. Serialized as `{ "lat": .., "lon": .. }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    fn to_geo(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

/// Property mapping of a single region (string key → JSON value).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(Map<String, Value>);

impl Properties {
    /// Value of `key` if it is a JSON number. Strings holding digits are *not* numbers.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.0
            .get(key)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
    }

    /// Value of `key` if it is a JSON string.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// String form of `key` for display: strings verbatim, numbers and booleans via JSON.
    pub fn display(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Properties {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// One administrative region: an optional geometry plus its properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Option<Geometry<f64>>,
    pub properties: Properties,
}

impl Feature {
    pub fn new(geometry: Option<Geometry<f64>>, properties: Properties) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    /// True when the geometry covers `point` (boundaries excluded).
    pub fn contains(&self, point: GeoPoint) -> bool {
        self.geometry
            .as_ref()
            .is_some_and(|g| g.contains(&point.to_geo()))
    }
}

/// Ordered sequence of regions sharing one property schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    /// Parse a GeoJSON `FeatureCollection` document.
    ///
    /// Geometries that cannot be represented (e.g. empty coordinates) are kept as `None`;
    /// such regions are still classified but never drawn or hit.
    pub fn from_geojson_str(s: &str) -> Result<Self, LoadError> {
        let gj: GeoJson = s.parse()?;
        Self::from_geojson(gj)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let gj = GeoJson::from_reader(reader)?;
        Self::from_geojson(gj)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    fn from_geojson(gj: GeoJson) -> Result<Self, LoadError> {
        let fc = match gj {
            GeoJson::FeatureCollection(fc) => fc,
            GeoJson::Feature(_) => return Err(LoadError::NotAFeatureCollection("Feature")),
            GeoJson::Geometry(_) => return Err(LoadError::NotAFeatureCollection("Geometry")),
        };
        let features = fc
            .features
            .into_iter()
            .enumerate()
            .map(|(idx, f)| {
                let geometry = f.geometry.and_then(|g| match Geometry::<f64>::try_from(g) {
                    Ok(geom) => Some(geom),
                    Err(e) => {
                        log::debug!("feature {idx}: dropping unsupported geometry ({e})");
                        None
                    }
                });
                Feature::new(geometry, f.properties.map(Properties::from).unwrap_or_default())
            })
            .collect();
        Ok(Self { features })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Feature> {
        self.features.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    /// All numeric values of `key`, in feature order. Missing and non-numeric values are skipped.
    pub fn numeric_values(&self, key: &str) -> Vec<f64> {
        self.features
            .iter()
            .filter_map(|f| f.properties.number(key))
            .collect()
    }

    /// Bounding box over every geometry, `None` when nothing has a geometry.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.features
            .iter()
            .filter_map(|f| f.geometry.as_ref()?.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
                    (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
                )
            })
    }

    /// Topmost feature containing `point`, given the bottom-to-top `draw_order`.
    pub fn hit_test(&self, point: GeoPoint, draw_order: &[usize]) -> Option<usize> {
        draw_order
            .iter()
            .rev()
            .copied()
            .find(|&idx| self.features.get(idx).is_some_and(|f| f.contains(point)))
    }

    /// Topmost feature containing `point` in natural order (last feature wins).
    pub fn feature_at(&self, point: GeoPoint) -> Option<usize> {
        (0..self.features.len())
            .rev()
            .find(|&idx| self.features[idx].contains(point))
    }
}
