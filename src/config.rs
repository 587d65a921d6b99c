//! Dashboard settings, read from an optional JSON file. Every field has a default.
//!
//! ```json
//! { "backend_url": "http://127.0.0.1:8000", "initial_metric": "hh_mean", "num_classes": 10 }
//! ```

use crate::api::{
    Client, DEFAULT_BACKEND_URL, DEFAULT_GEOCODER_URL, DEFAULT_LAYERS_PATH, FetchError,
    LayerSource,
};
use crate::color::{ColorPalette, FALLBACK_COLOR, Rgb};
use crate::map::{BaseMap, DEFAULT_CENTER, DEFAULT_ZOOM, GEOCODE_ZOOM};
use crate::metrics::Metric;
use crate::models::GeoPoint;
use crate::panel::{FieldOrder, SourceSchema};
use crate::viz::types::DEFAULT_MAP_SIZE;
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Selector layout of the data source. `overrides` maps a country code to its field order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub country_field: String,
    pub level0_field: String,
    pub level1_field: String,
    pub default_order: FieldOrder,
    pub overrides: BTreeMap<String, FieldOrder>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            country_field: "ISO3".into(),
            level0_field: "level_0".into(),
            level1_field: "level_1".into(),
            default_order: FieldOrder::Level0First,
            overrides: BTreeMap::from([("NGA".to_string(), FieldOrder::Level1First)]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub backend_url: String,
    /// URL, backend path or local file of the region GeoJSON.
    pub layers: String,
    pub geocoder_url: String,
    pub initial_metric: Metric,
    pub num_classes: usize,
    pub palette: ColorPalette,
    pub fallback_color: Rgb,
    pub center: GeoPoint,
    pub zoom: f64,
    pub geocode_zoom: f64,
    pub base_map: BaseMap,
    pub schema: SchemaConfig,
    /// Day the per-minute samples are stamped on when exported.
    pub reference_day: NaiveDate,
    pub width: u32,
    pub height: u32,
    /// Number formatting of printed statistics (`en`, `de`, ...).
    pub locale: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.into(),
            layers: DEFAULT_LAYERS_PATH.into(),
            geocoder_url: DEFAULT_GEOCODER_URL.into(),
            initial_metric: Metric::Max,
            num_classes: 10,
            palette: ColorPalette::default(),
            fallback_color: FALLBACK_COLOR,
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            geocode_zoom: GEOCODE_ZOOM,
            base_map: BaseMap::Standard,
            schema: SchemaConfig::default(),
            reference_day: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            width: DEFAULT_MAP_SIZE.0,
            height: DEFAULT_MAP_SIZE.1,
            locale: "en".into(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s).context("parse config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("load config {}", path.display()))
    }

    /// `<config dir>/loadmap/config.json`, e.g. `~/.config/loadmap/config.json` on Linux.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("loadmap").join("config.json"))
    }

    /// Explicit path if given, else the per-user file if it exists, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        match Self::default_path().filter(|p| p.is_file()) {
            Some(path) => {
                log::info!("using config {}", path.display());
                Self::from_path(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Reject settings no render could succeed with.
    pub fn validate(&self) -> Result<()> {
        if self.num_classes < 2 {
            bail!("num_classes must be at least 2, got {}", self.num_classes);
        }
        if self.palette.len() != self.num_classes {
            bail!(
                "palette has {} colors but num_classes is {}",
                self.palette.len(),
                self.num_classes
            );
        }
        if self.width == 0 || self.height == 0 {
            bail!("output size must be non-zero");
        }
        Ok(())
    }

    pub fn source_schema(&self) -> SourceSchema {
        let s = &self.schema;
        s.overrides.iter().fold(
            SourceSchema::new(
                &s.country_field,
                &s.level0_field,
                &s.level1_field,
                s.default_order,
            ),
            |schema, (country, order)| schema.with_override(country, *order),
        )
    }

    pub fn layer_source(&self) -> LayerSource {
        LayerSource::parse(&self.layers)
    }

    pub fn client(&self) -> Result<Client, FetchError> {
        Client::new(&self.backend_url, &self.geocoder_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = DashboardConfig::from_json_str(r#"{"initial_metric": "num_hh", "zoom": 6}"#)
            .unwrap();
        assert_eq!(cfg.initial_metric, Metric::HouseholdCount);
        assert_eq!(cfg.zoom, 6.0);
        assert_eq!(cfg.num_classes, 10);
        assert_eq!(cfg.source_schema(), SourceSchema::default());
    }

    #[test]
    fn palette_must_match_classes() {
        let err = DashboardConfig::from_json_str(r##"{"palette": ["#000000", "#ffffff"]}"##)
            .unwrap_err();
        assert!(format!("{err:#}").contains("num_classes"));
    }
}
