//! loadmap_rs
//!
//! Classify, map and explore electricity-load statistics of administrative regions.
//! Pairs with the `loadmap` CLI and the `loadmap-gui` desktop dashboard.
//!
//! ### Features
//! - Equal-interval classification of a region metric into a 10-color palette
//! - Choropleth rendering with legend to SVG/PNG, hover highlight and region popups
//! - Per-minute load series of a region from the backend, charted and exported as CSV/JSON
//! - Place search through Nominatim
//!
//! ### Example
//! ```no_run
//! use loadmap_rs::{Dashboard, FeatureCollection, Metric};
//!
//! let regions = FeatureCollection::from_path("webmap_layers.geojson")?;
//! let mut dashboard = Dashboard::with_defaults(regions);
//! dashboard.select_metric(Metric::HouseholdMean)?;
//! dashboard.fit_to_regions(1200, 900);
//! loadmap_rs::viz::render_map(&dashboard.scene(1200, 900), "hh_mean.png")?;
//! let stats = loadmap_rs::stats::metric_summary(dashboard.regions(), Metric::HouseholdMean);
//! println!("{:#?}", stats);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod choropleth;
pub mod classify;
pub mod color;
pub mod config;
pub mod dashboard;
pub mod interaction;
pub mod map;
pub mod metrics;
pub mod models;
pub mod panel;
pub mod selection;
pub mod stats;
pub mod storage;
pub mod viz;

pub use api::{Client, FetchError};
pub use choropleth::{ChoroplethRenderer, Legend, RegionLayer};
pub use classify::{Breakpoints, ClassifyError, compute_thresholds};
pub use color::{ColorMapper, ColorPalette, Rgb};
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, SearchOutcome};
pub use metrics::Metric;
pub use models::{Feature, FeatureCollection, GeoPoint, Properties};
